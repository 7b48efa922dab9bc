//! Mapping raw readings to dimensionless [0, 1] contributions.
//!
//! Every function here is pure and total over finite inputs. Whether a factor
//! is available at all is decided by the caller; these functions only shape
//! values that are present.

use serde::Deserialize;

use crate::config::engine::ScoringParams;
use crate::model::profile::{BearingPreference, IdealRange};

/// Shape of the falloff outside an ideal range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecayCurve {
    /// Straight line from 1 at the boundary to 0 at the maximum deviation.
    #[default]
    Linear,
    /// Gaussian bell with σ = deviation / 3, cut to 0 at the maximum deviation.
    Gaussian,
}

/// 1.0 inside `range`, decaying with distance to the nearest boundary and
/// reaching 0 at `max_deviation`.
pub fn range_contribution(
    value: f64,
    range: &IdealRange,
    max_deviation: f64,
    curve: DecayCurve,
) -> f64 {
    let d = range.distance(value);
    if d <= 0.0 {
        return 1.0;
    }
    if max_deviation <= 0.0 || d >= max_deviation {
        return 0.0;
    }
    match curve {
        DecayCurve::Linear => 1.0 - d / max_deviation,
        DecayCurve::Gaussian => {
            let sigma = max_deviation / 3.0;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        }
    }
}

/// Peaks across the light-rain band, ramps up from dry and down to 0 at the
/// heavy threshold.
pub fn rain_bonus(precip_mm: f64, params: &ScoringParams) -> f64 {
    let light_min = params.light_rain_min_mm;
    let light_max = params.light_rain_max_mm;
    let heavy = params.heavy_rain_mm;

    if precip_mm <= 0.0 || precip_mm >= heavy {
        0.0
    } else if precip_mm < light_min {
        precip_mm / light_min
    } else if precip_mm <= light_max {
        1.0
    } else {
        (heavy - precip_mm) / (heavy - light_max)
    }
}

/// 0 up to the top of the light-rain band, rising to 1.0 at the heavy threshold.
pub fn rain_malus(precip_mm: f64, params: &ScoringParams) -> f64 {
    let light_max = params.light_rain_max_mm;
    let heavy = params.heavy_rain_mm;

    if precip_mm <= light_max {
        0.0
    } else if precip_mm >= heavy {
        1.0
    } else {
        (precip_mm - light_max) / (heavy - light_max)
    }
}

/// New moon favoured unless the species likes a full moon.
pub fn moon_contribution(illumination: f64, full_moon_affinity: bool) -> f64 {
    let illumination = illumination.clamp(0.0, 1.0);
    if full_moon_affinity {
        illumination
    } else {
        1.0 - illumination
    }
}

/// Shortest angle between two compass bearings, 0-180.
pub fn bearing_distance(a: f64, b: f64) -> f64 {
    let diff = (a - b).rem_euclid(360.0);
    diff.min(360.0 - diff)
}

/// Best match of `bearing` against any preferred bearing ± tolerance, with a
/// linear falloff of `falloff_deg` outside the tolerance. `None` when the
/// species has no wind preference.
pub fn wind_direction_contribution(
    bearing: f64,
    preferences: &[BearingPreference],
    falloff_deg: f64,
) -> Option<f64> {
    preferences
        .iter()
        .map(|p| {
            let excess = bearing_distance(bearing, p.bearing) - p.tolerance;
            if excess <= 0.0 {
                1.0
            } else if falloff_deg <= 0.0 {
                0.0
            } else {
                (1.0 - excess / falloff_deg).max(0.0)
            }
        })
        .reduce(f64::max)
}

/// Full credit in a best month, half credit next to one. `None` without
/// month preferences.
pub fn season_contribution(month: u32, best_months: &[u32]) -> Option<f64> {
    if best_months.is_empty() {
        return None;
    }
    let prev = if month == 1 { 12 } else { month - 1 };
    let next = if month == 12 { 1 } else { month + 1 };

    if best_months.contains(&month) {
        Some(1.0)
    } else if best_months.contains(&prev) || best_months.contains(&next) {
        Some(0.5)
    } else {
        Some(0.0)
    }
}

/// 0 (dark) to 1 (bright) estimate of daylight from cloud, wind and rain.
/// Wind adds up to 0.2 of apparent cloud; noticeable rain darkens by 0.15.
pub fn light_level(cloud_fraction: f64, wind_speed: f64, precip_mm: f64) -> f64 {
    let cloud_eff = cloud_fraction + 0.02 * wind_speed.min(10.0);
    let rain_eff = if precip_mm >= 0.2 { 0.15 } else { 0.0 };
    (1.0 - (cloud_eff + rain_eff).clamp(0.0, 1.0)).max(0.0)
}
