use std::cmp::Ordering;

use chrono::{DateTime, Duration, FixedOffset};

use crate::config::engine::ScoringParams;
use crate::model::profile::{SpeciesProfile, WindowAnchor};
use crate::model::result::{OptimalWindow, WindowSource};
use crate::model::snapshot::EnvironmentSnapshot;
use crate::scoring::normalize::light_level;

/// A preferred window pinned to absolute times for the snapshot's day.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedWindow {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub weight: f64,
}

impl ResolvedWindow {
    pub fn midpoint(&self) -> DateTime<FixedOffset> {
        self.start + (self.end - self.start) / 2
    }

    pub fn contains(&self, t: DateTime<FixedOffset>) -> bool {
        self.start <= t && t <= self.end
    }

    fn distance_to(&self, t: DateTime<FixedOffset>) -> i64 {
        (self.midpoint() - t).num_seconds().abs()
    }
}

/// The windows a species is scored against, and where they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct DayWindows {
    pub windows: Vec<ResolvedWindow>,
    pub source: WindowSource,
}

/// `t` moved by `minutes`, or `None` when the result leaves chrono's range.
fn shifted(t: DateTime<FixedOffset>, minutes: i64) -> Option<DateTime<FixedOffset>> {
    t.checked_add_signed(Duration::try_minutes(minutes)?)
}

/// Resolve the profile's relative windows against today's sunrise and sunset.
/// Windows whose offsets leave the representable time range are dropped.
pub fn resolve_windows(
    profile: &SpeciesProfile,
    sunrise: DateTime<FixedOffset>,
    sunset: DateTime<FixedOffset>,
) -> Vec<ResolvedWindow> {
    profile
        .preferred_windows
        .iter()
        .filter_map(|w| {
            let anchor = match w.anchor {
                WindowAnchor::Sunrise => sunrise,
                WindowAnchor::Sunset => sunset,
            };
            Some(ResolvedWindow {
                start: shifted(anchor, w.start_offset_min)?,
                end: shifted(anchor, w.end_offset_min)?,
                weight: w.weight,
            })
        })
        .collect()
}

/// Dawn and dusk windows of `buffer_min` minutes either side of sunrise and
/// sunset, equally weighted.
pub fn default_windows(
    sunrise: DateTime<FixedOffset>,
    sunset: DateTime<FixedOffset>,
    buffer_min: i64,
) -> Vec<ResolvedWindow> {
    [sunrise, sunset]
        .into_iter()
        .filter_map(|anchor| {
            Some(ResolvedWindow {
                start: shifted(anchor, buffer_min.checked_neg()?)?,
                end: shifted(anchor, buffer_min)?,
                weight: 1.0,
            })
        })
        .collect()
}

/// Merge overlapping or touching windows; a merged window keeps the highest
/// weight of its members. Output is sorted by start.
pub fn merge_windows(mut windows: Vec<ResolvedWindow>) -> Vec<ResolvedWindow> {
    windows.sort_by(|a, b| a.start.cmp(&b.start).then(a.end.cmp(&b.end)));

    let mut merged: Vec<ResolvedWindow> = Vec::with_capacity(windows.len());
    for w in windows {
        match merged.last_mut() {
            Some(current) if w.start <= current.end => {
                current.end = current.end.max(w.end);
                current.weight = current.weight.max(w.weight);
            }
            _ => merged.push(w),
        }
    }
    merged
}

/// Highest weight wins; ties go to the window whose midpoint is nearest
/// `now`, then to the earlier window.
pub fn select_window(
    windows: &[ResolvedWindow],
    now: DateTime<FixedOffset>,
) -> Option<&ResolvedWindow> {
    windows.iter().reduce(|best, w| {
        let by_weight = w.weight.partial_cmp(&best.weight).unwrap_or(Ordering::Equal);
        let ordering = by_weight
            .then_with(|| best.distance_to(now).cmp(&w.distance_to(now)))
            .then_with(|| best.start.cmp(&w.start));
        if ordering == Ordering::Greater { w } else { best }
    })
}

/// The windows this species is judged against today: its own preferences,
/// or dawn/dusk when it has none. The dawn/dusk buffer widens in poor light.
/// `None` without sun times.
pub fn day_windows(
    snapshot: &EnvironmentSnapshot,
    profile: &SpeciesProfile,
    params: &ScoringParams,
) -> Option<DayWindows> {
    let sunrise = snapshot.sunrise?;
    let sunset = snapshot.sunset?;

    let preferred = resolve_windows(profile, sunrise, sunset);
    if !preferred.is_empty() {
        return Some(DayWindows {
            windows: merge_windows(preferred),
            source: WindowSource::Preferred,
        });
    }

    let light = light_level(
        snapshot.cloud_fraction().unwrap_or(0.0),
        snapshot.wind_speed.unwrap_or(0.0),
        snapshot.precipitation_mm.unwrap_or(0.0),
    );
    let buffer = (params.dawn_dusk_buffer_min as f64 * (2.0 - light)).round() as i64;
    Some(DayWindows {
        windows: merge_windows(default_windows(sunrise, sunset, buffer)),
        source: WindowSource::DefaultDawnDusk,
    })
}

/// Pick the day's recommended window.
pub fn optimal_window(
    day: &DayWindows,
    now: DateTime<FixedOffset>,
    params: &ScoringParams,
) -> Option<OptimalWindow> {
    let chosen = select_window(&day.windows, now)?;
    let confidence = match day.source {
        WindowSource::Preferred => 1.0,
        WindowSource::DefaultDawnDusk => params.fallback_confidence,
    };
    Some(OptimalWindow {
        start: chosen.start,
        end: chosen.end,
        confidence,
        source: day.source,
    })
}

/// How well `now` sits inside the day's windows: relative weight inside a
/// window, half of it within `edge_margin_min` of one, else 0.
pub fn daytime_window_contribution(
    windows: &[ResolvedWindow],
    now: DateTime<FixedOffset>,
    edge_margin_min: i64,
) -> f64 {
    let max_weight = windows.iter().map(|w| w.weight).fold(0.0, f64::max);
    if max_weight <= 0.0 {
        return 0.0;
    }

    windows
        .iter()
        .map(|w| {
            let relative = w.weight / max_weight;
            let near = shifted(w.start, edge_margin_min.saturating_neg()).unwrap_or(w.start) <= now
                && now <= shifted(w.end, edge_margin_min).unwrap_or(w.end);
            if w.contains(now) {
                relative
            } else if near {
                relative * 0.5
            } else {
                0.0
            }
        })
        .fold(0.0, f64::max)
}
