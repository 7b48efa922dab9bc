use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::model::snapshot::{PressureTrend, Season, Turbidity};

// === Ranges ===

/// Inclusive ideal interval for a reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IdealRange {
    pub min: f64,
    pub max: f64,
}

impl IdealRange {
    pub fn new(min: f64, max: f64) -> Self {
        IdealRange { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Distance from `value` to the nearest boundary; 0 inside the range.
    pub fn distance(&self, value: f64) -> f64 {
        if value < self.min {
            self.min - value
        } else if value > self.max {
            value - self.max
        } else {
            0.0
        }
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    fn check(&self, label: &str, errors: &mut Vec<String>) {
        if !self.min.is_finite() || !self.max.is_finite() {
            errors.push(format!("{} must be finite, got {}..{}", label, self.min, self.max));
        } else if self.min > self.max {
            errors.push(format!(
                "{} min must be <= max, got min = {} max = {}",
                label, self.min, self.max
            ));
        }
    }
}

/// One optional ideal range per season.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonalRanges {
    pub spring: Option<IdealRange>,
    pub summer: Option<IdealRange>,
    pub autumn: Option<IdealRange>,
    pub winter: Option<IdealRange>,
}

impl SeasonalRanges {
    /// The same range in every season.
    pub fn uniform(range: IdealRange) -> Self {
        SeasonalRanges {
            spring: Some(range),
            summer: Some(range),
            autumn: Some(range),
            winter: Some(range),
        }
    }

    pub fn for_season(&self, season: Season) -> Option<&IdealRange> {
        match season {
            Season::Spring => self.spring.as_ref(),
            Season::Summer => self.summer.as_ref(),
            Season::Autumn => self.autumn.as_ref(),
            Season::Winter => self.winter.as_ref(),
        }
    }

    fn check(&self, label: &str, errors: &mut Vec<String>) {
        let seasons = [
            ("spring", &self.spring),
            ("summer", &self.summer),
            ("autumn", &self.autumn),
            ("winter", &self.winter),
        ];
        for (name, range) in seasons {
            if let Some(r) = range {
                r.check(&format!("{}.{}", label, name), errors);
            }
        }
    }

    fn check_bounds(&self, label: &str, lowest: f64, highest: f64, errors: &mut Vec<String>) {
        let seasons = [
            ("spring", &self.spring),
            ("summer", &self.summer),
            ("autumn", &self.autumn),
            ("winter", &self.winter),
        ];
        for (name, range) in seasons {
            if let Some(r) = range {
                if r.min < lowest || r.max > highest {
                    errors.push(format!(
                        "{}.{} must lie within {}..{}, got {}..{}",
                        label, name, lowest, highest, r.min, r.max
                    ));
                }
            }
        }
    }
}

// === Time windows ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowAnchor {
    Sunrise,
    Sunset,
}

/// A fishing window expressed relative to sunrise or sunset, e.g.
/// 30 minutes before sunset until 45 minutes after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferredWindow {
    pub anchor: WindowAnchor,
    pub start_offset_min: i64,
    pub end_offset_min: i64,
    #[serde(default = "default_window_weight")]
    pub weight: f64,
}

fn default_window_weight() -> f64 {
    1.0
}

/// Offsets reach at most one day either side of the anchor.
pub const MAX_WINDOW_OFFSET_MIN: i64 = 1440;

/// Deepest water a depth range may name, in metres.
pub const MAX_DEPTH_M: f64 = 2000.0;

// === Wind, turbidity, closed season ===

/// A favoured wind bearing with an angular tolerance on either side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BearingPreference {
    pub bearing: f64,
    #[serde(default)]
    pub tolerance: f64,
}

/// Multiplier per turbidity level. Levels left out score 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TurbidityPreference {
    pub clear: Option<f64>,
    pub medium: Option<f64>,
    pub murky: Option<f64>,
}

impl TurbidityPreference {
    pub fn is_empty(&self) -> bool {
        self.clear.is_none() && self.medium.is_none() && self.murky.is_none()
    }

    pub fn multiplier(&self, level: Turbidity) -> Option<f64> {
        match level {
            Turbidity::Clear => self.clear,
            Turbidity::Medium => self.medium,
            Turbidity::Murky => self.murky,
        }
    }
}

/// Recurring protection period given as `MM-DD` bounds, inclusive.
/// A span whose start is later in the year than its end wraps over new year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosedSeasonSpan {
    pub start: String,
    pub end: String,
}

impl ClosedSeasonSpan {
    pub fn contains(&self, date: NaiveDate) -> bool {
        let (Some(start), Some(end)) = (parse_month_day(&self.start), parse_month_day(&self.end))
        else {
            return false;
        };
        let today = (date.month(), date.day());
        if start <= end {
            start <= today && today <= end
        } else {
            today >= start || today <= end
        }
    }
}

fn parse_month_day(s: &str) -> Option<(u32, u32)> {
    let (m, d) = s.trim().split_once('-')?;
    let month: u32 = m.parse().ok()?;
    let day: u32 = d.parse().ok()?;
    // 2024 is a leap year, so 02-29 is accepted.
    NaiveDate::from_ymd_opt(2024, month, day)?;
    Some((month, day))
}

// === Profile ===

/// Static per-species configuration. There is no behaviour per species beyond
/// this data: one evaluator handles every profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesProfile {
    pub species_id: String,
    pub display_name: String,
    #[serde(default)]
    pub water_temp: SeasonalRanges,
    #[serde(default)]
    pub depth: SeasonalRanges,
    #[serde(default)]
    pub preferred_windows: Vec<PreferredWindow>,
    #[serde(default)]
    pub nocturnal_affinity: f64,
    #[serde(default)]
    pub full_moon_affinity: bool,
    #[serde(default)]
    pub wind_directions: Vec<BearingPreference>,
    #[serde(default)]
    pub turbidity: TurbidityPreference,
    #[serde(default)]
    pub best_months: Vec<u32>,
    #[serde(default)]
    pub cloud_cover_pct: Option<IdealRange>,
    #[serde(default)]
    pub wind_speed: Option<IdealRange>,
    #[serde(default)]
    pub pressure_trends: Vec<PressureTrend>,
    #[serde(default)]
    pub closed_season: Option<ClosedSeasonSpan>,
}

impl SpeciesProfile {
    /// A profile with only an id and name; every preference empty.
    pub fn named(species_id: &str, display_name: &str) -> Self {
        SpeciesProfile {
            species_id: species_id.to_string(),
            display_name: display_name.to_string(),
            water_temp: SeasonalRanges::default(),
            depth: SeasonalRanges::default(),
            preferred_windows: Vec::new(),
            nocturnal_affinity: 0.0,
            full_moon_affinity: false,
            wind_directions: Vec::new(),
            turbidity: TurbidityPreference::default(),
            best_months: Vec::new(),
            cloud_cover_pct: None,
            wind_speed: None,
            pressure_trends: Vec::new(),
            closed_season: None,
        }
    }

    /// Check every invariant, reporting all violations at once.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.species_id.trim().is_empty() {
            errors.push("species_id must not be empty".to_string());
        }

        self.water_temp.check("water_temp", &mut errors);
        self.depth.check("depth", &mut errors);
        self.depth.check_bounds("depth", 0.0, MAX_DEPTH_M, &mut errors);
        if let Some(r) = &self.cloud_cover_pct {
            r.check("cloud_cover_pct", &mut errors);
        }
        if let Some(r) = &self.wind_speed {
            r.check("wind_speed", &mut errors);
        }

        for (i, w) in self.preferred_windows.iter().enumerate() {
            for (name, offset) in [
                ("start_offset_min", w.start_offset_min),
                ("end_offset_min", w.end_offset_min),
            ] {
                if !(-MAX_WINDOW_OFFSET_MIN..=MAX_WINDOW_OFFSET_MIN).contains(&offset) {
                    errors.push(format!(
                        "preferred_windows[{}] {} must be within ±{} minutes, got {}",
                        i, name, MAX_WINDOW_OFFSET_MIN, offset
                    ));
                }
            }
            if w.start_offset_min > w.end_offset_min {
                errors.push(format!(
                    "preferred_windows[{}] start_offset_min must be <= end_offset_min, got {} > {}",
                    i, w.start_offset_min, w.end_offset_min
                ));
            }
            if !w.weight.is_finite() || w.weight <= 0.0 {
                errors.push(format!(
                    "preferred_windows[{}] weight must be > 0, got {}",
                    i, w.weight
                ));
            }
        }

        if !(0.0..=1.0).contains(&self.nocturnal_affinity) {
            errors.push(format!(
                "nocturnal_affinity must be 0.0-1.0, got {}",
                self.nocturnal_affinity
            ));
        }

        for (i, b) in self.wind_directions.iter().enumerate() {
            if !(0.0..360.0).contains(&b.bearing) {
                errors.push(format!(
                    "wind_directions[{}] bearing must be 0-359, got {}",
                    i, b.bearing
                ));
            }
            if !(0.0..=180.0).contains(&b.tolerance) {
                errors.push(format!(
                    "wind_directions[{}] tolerance must be 0-180, got {}",
                    i, b.tolerance
                ));
            }
        }

        let levels = [
            ("clear", self.turbidity.clear),
            ("medium", self.turbidity.medium),
            ("murky", self.turbidity.murky),
        ];
        for (name, m) in levels {
            if let Some(m) = m {
                if !(0.0..=1.0).contains(&m) {
                    errors.push(format!("turbidity.{} must be 0.0-1.0, got {}", name, m));
                }
            }
        }

        for m in &self.best_months {
            if !(1..=12).contains(m) {
                errors.push(format!("best_months entries must be 1-12, got {}", m));
            }
        }

        if let Some(span) = &self.closed_season {
            for (name, value) in [("start", &span.start), ("end", &span.end)] {
                if parse_month_day(value).is_none() {
                    errors.push(format!(
                        "closed_season.{} must be MM-DD, got '{}'",
                        name, value
                    ));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
