use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::warn;

// === Enums ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    /// Meteorological season for a calendar month (1-12).
    pub fn from_month(month: u32) -> Season {
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Turbidity {
    Clear,
    Medium,
    Murky,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PressureTrend {
    Rising,
    Falling,
    Steady,
}

impl PressureTrend {
    /// Classify the change from `previous` to `current`; changes within
    /// `steady_band` hPa either way count as steady.
    pub fn classify(current: f64, previous: f64, steady_band: f64) -> PressureTrend {
        let delta = current - previous;
        if delta > steady_band {
            PressureTrend::Rising
        } else if delta < -steady_band {
            PressureTrend::Falling
        } else {
            PressureTrend::Steady
        }
    }
}

// === Snapshot ===

/// One immutable bundle of environmental readings for a single evaluation cycle.
///
/// Every reading is optional. A missing reading degrades the factors that use
/// it to "unavailable"; it is never read as zero. Only `timestamp` is
/// mandatory, and its absence fails the cycle for every species.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentSnapshot {
    pub timestamp: Option<DateTime<FixedOffset>>,
    pub air_temperature: Option<f64>,
    /// hPa
    pub air_pressure_current: Option<f64>,
    /// hPa, carried over from the previous cycle by the ingestion layer.
    pub air_pressure_previous: Option<f64>,
    /// m/s
    pub wind_speed: Option<f64>,
    /// Compass bearing in degrees, 0-359.
    pub wind_direction: Option<f64>,
    pub cloud_cover_pct: Option<f64>,
    pub precipitation_mm: Option<f64>,
    /// 0.0 = new moon, 1.0 = full moon.
    pub moon_illumination: Option<f64>,
    pub sunrise: Option<DateTime<FixedOffset>>,
    pub sunset: Option<DateTime<FixedOffset>>,
    pub water_temperature: Option<f64>,
    pub water_turbidity: Option<Turbidity>,
    /// Depth being fished, in metres.
    pub depth_m: Option<f64>,
    /// Closed-season flags keyed by species id.
    #[serde(default)]
    pub closed_season: BTreeMap<String, bool>,
}

impl EnvironmentSnapshot {
    /// An otherwise empty snapshot taken at `timestamp`.
    pub fn at(timestamp: DateTime<FixedOffset>) -> Self {
        EnvironmentSnapshot {
            timestamp: Some(timestamp),
            ..Default::default()
        }
    }

    pub fn season(&self) -> Option<Season> {
        self.timestamp.map(|t| Season::from_month(t.month()))
    }

    pub fn cloud_fraction(&self) -> Option<f64> {
        self.cloud_cover_pct.map(|pct| pct / 100.0)
    }

    pub fn pressure_trend(&self, steady_band: f64) -> Option<PressureTrend> {
        match (self.air_pressure_current, self.air_pressure_previous) {
            (Some(current), Some(previous)) => {
                Some(PressureTrend::classify(current, previous, steady_band))
            }
            _ => None,
        }
    }

    /// Whether the timestamp lies before sunrise or after sunset.
    /// `None` when either sun time or the timestamp is unknown.
    pub fn is_dark(&self) -> Option<bool> {
        let now = self.timestamp?;
        let sunrise = self.sunrise?;
        let sunset = self.sunset?;
        Some(now < sunrise || now > sunset)
    }

    /// Copy of this snapshot with every out-of-domain reading dropped.
    ///
    /// Ingestion is expected to hand over clean data; anything that still
    /// slips through is logged and treated as absent rather than clamped.
    pub fn sanitized(&self) -> EnvironmentSnapshot {
        let mut clean = self.clone();

        clean.air_temperature = keep_finite("air_temperature", self.air_temperature);
        clean.water_temperature = keep_finite("water_temperature", self.water_temperature);
        clean.air_pressure_current = keep_within(
            "air_pressure_current",
            self.air_pressure_current,
            0.0,
            f64::MAX,
        );
        clean.air_pressure_previous = keep_within(
            "air_pressure_previous",
            self.air_pressure_previous,
            0.0,
            f64::MAX,
        );
        clean.wind_speed = keep_within("wind_speed", self.wind_speed, 0.0, f64::MAX);
        clean.wind_direction = keep_within("wind_direction", self.wind_direction, 0.0, 360.0);
        clean.cloud_cover_pct = keep_within("cloud_cover_pct", self.cloud_cover_pct, 0.0, 100.0);
        clean.precipitation_mm =
            keep_within("precipitation_mm", self.precipitation_mm, 0.0, f64::MAX);
        clean.moon_illumination =
            keep_within("moon_illumination", self.moon_illumination, 0.0, 1.0);
        clean.depth_m = keep_within("depth_m", self.depth_m, 0.0, f64::MAX);

        if let (Some(sunrise), Some(sunset)) = (self.sunrise, self.sunset) {
            if sunrise >= sunset {
                warn!(%sunrise, %sunset, "Sunrise is not before sunset, ignoring sun times");
                clean.sunrise = None;
                clean.sunset = None;
            }
        }

        clean
    }
}

fn keep_finite(field: &str, value: Option<f64>) -> Option<f64> {
    keep_within(field, value, f64::MIN, f64::MAX)
}

fn keep_within(field: &str, value: Option<f64>, min: f64, max: f64) -> Option<f64> {
    let v = value?;
    if v.is_finite() && (min..=max).contains(&v) {
        Some(v)
    } else {
        warn!(field, value = v, "Reading out of range, treating as unavailable");
        None
    }
}
