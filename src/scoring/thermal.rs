//! Lake stratification model used for depth advice.
//!
//! Summer lakes layer into a warm epilimnion, a thermocline where temperature
//! drops quickly, and a cold hypolimnion. Spring and autumn lakes are fully
//! mixed; winter lakes are inversely stratified around 4 °C.

use crate::model::profile::SpeciesProfile;
use crate::model::snapshot::{EnvironmentSnapshot, Season};

const EPILIMNION_GRADIENT: f64 = 0.2;
const THERMOCLINE_GRADIENT: f64 = 1.2;
const HYPOLIMNION_GRADIENT: f64 = 0.3;
const DENSEST_WATER_C: f64 = 4.0;
const DEPTH_STEP_M: f64 = 0.5;
/// Wider ranges are sampled more coarsely instead of with more candidates.
const MAX_DEPTH_STEPS: usize = 4000;

/// Epilimnion depth and thermocline thickness in metres. Only summer lakes
/// stratify; other seasons report an unbounded epilimnion.
pub fn stratification_layers(surface_temp: f64, season: Season, wind_speed: f64) -> (f64, f64) {
    if season != Season::Summer {
        return (f64::INFINITY, 0.0);
    }
    let wind = wind_speed.clamp(0.0, 5.0);
    let epilimnion = (0.2 * (surface_temp - 4.0) + 0.2 * wind).clamp(2.0, 6.0);
    let thermocline = (3.0 + 0.3 * wind).clamp(3.0, 5.0);
    (epilimnion, thermocline)
}

/// Estimated water temperature at `depth` metres.
pub fn temperature_at_depth(
    depth: f64,
    surface_temp: f64,
    season: Season,
    wind_speed: f64,
    cloud_fraction: f64,
) -> f64 {
    match season {
        Season::Summer => {
            let (epi, thermo) = stratification_layers(surface_temp, season, wind_speed);
            if depth <= epi {
                return surface_temp - depth * EPILIMNION_GRADIENT;
            }
            let top_of_thermocline = surface_temp - epi * EPILIMNION_GRADIENT;
            if depth <= epi + thermo {
                return top_of_thermocline - (depth - epi) * THERMOCLINE_GRADIENT;
            }
            let hypo_start = top_of_thermocline - thermo * THERMOCLINE_GRADIENT;
            (hypo_start - (depth - epi - thermo) * HYPOLIMNION_GRADIENT).max(DENSEST_WATER_C)
        }
        // Clear days warm the mixed column a little.
        Season::Spring | Season::Autumn => {
            surface_temp + 0.5 * (1.0 - cloud_fraction.clamp(0.0, 1.0))
        }
        Season::Winter => {
            if depth <= 0.5 {
                surface_temp.max(0.1)
            } else {
                DENSEST_WATER_C
            }
        }
    }
}

/// Depth within the species' ideal range whose modeled temperature is closest
/// to the middle of its ideal temperature range. In summer, depths below the
/// thermocline are only considered when nothing shallower is in range.
///
/// Advice only; never part of the score.
pub fn recommended_depth(snapshot: &EnvironmentSnapshot, profile: &SpeciesProfile) -> Option<f64> {
    let season = snapshot.season()?;
    let surface = snapshot.water_temperature?;
    let depth_range = profile.depth.for_season(season)?;
    let target = profile.water_temp.for_season(season)?.midpoint();
    let wind = snapshot.wind_speed.unwrap_or(0.0);
    let cloud = snapshot.cloud_fraction().unwrap_or(0.0);

    let span = depth_range.max - depth_range.min;
    let step = DEPTH_STEP_M.max(span / MAX_DEPTH_STEPS as f64);
    let steps = ((span / step).floor() as usize).min(MAX_DEPTH_STEPS);
    let mut candidates: Vec<f64> = (0..=steps)
        .map(|i| depth_range.min + i as f64 * step)
        .collect();
    if candidates.last().is_some_and(|d| *d < depth_range.max) {
        candidates.push(depth_range.max);
    }

    let (epi, thermo) = stratification_layers(surface, season, wind);
    let limit = epi + thermo;
    if candidates.iter().any(|d| *d <= limit) {
        candidates.retain(|d| *d <= limit);
    }

    candidates
        .into_iter()
        .map(|d| {
            let miss = (temperature_at_depth(d, surface, season, wind, cloud) - target).abs();
            (d, miss)
        })
        .reduce(|best, c| if c.1 < best.1 { c } else { best })
        .map(|(d, _)| d)
}
