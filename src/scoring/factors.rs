use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, FixedOffset};
use tracing::debug;

use crate::config::engine::ScoringParams;
use crate::config::weights::FactorWeights;
use crate::model::factor::Factor;
use crate::model::profile::SpeciesProfile;
use crate::model::result::FactorOutcome;
use crate::model::snapshot::{EnvironmentSnapshot, Season};
use crate::scoring::normalize;
use crate::scoring::window::{self, DayWindows};

/// Everything one species evaluation reads. Borrowed, never mutated.
pub struct FactorContext<'a> {
    pub snapshot: &'a EnvironmentSnapshot,
    pub profile: &'a SpeciesProfile,
    pub params: &'a ScoringParams,
    pub now: DateTime<FixedOffset>,
    pub season: Season,
    pub day: Option<&'a DayWindows>,
}

impl FactorContext<'_> {
    /// Normalized [0, 1] contribution of `factor`, or `None` when the inputs
    /// it needs are absent.
    pub fn contribution(&self, factor: Factor) -> Option<f64> {
        let snap = self.snapshot;
        let profile = self.profile;
        let params = self.params;

        match factor {
            Factor::Season => normalize::season_contribution(self.now.month(), &profile.best_months),
            Factor::WaterTemperature => {
                let range = profile.water_temp.for_season(self.season)?;
                Some(normalize::range_contribution(
                    snap.water_temperature?,
                    range,
                    params.water_temp_deviation,
                    params.decay_curve,
                ))
            }
            Factor::Depth => {
                let range = profile.depth.for_season(self.season)?;
                Some(normalize::range_contribution(
                    snap.depth_m?,
                    range,
                    params.depth_deviation,
                    params.decay_curve,
                ))
            }
            Factor::TempDepthMatch => {
                let temp_range = profile.water_temp.for_season(self.season)?;
                let depth_range = profile.depth.for_season(self.season)?;
                let both = temp_range.contains(snap.water_temperature?)
                    && depth_range.contains(snap.depth_m?);
                Some(if both { 1.0 } else { 0.0 })
            }
            Factor::DaytimeWindow => {
                let day = self.day?;
                Some(window::daytime_window_contribution(
                    &day.windows,
                    self.now,
                    params.window_edge_margin_min,
                ))
            }
            Factor::NightBoost => {
                let dark = snap.is_dark()?;
                Some(if dark { profile.nocturnal_affinity } else { 0.0 })
            }
            Factor::RainBonus => Some(normalize::rain_bonus(snap.precipitation_mm?, params)),
            Factor::RainMalus => Some(normalize::rain_malus(snap.precipitation_mm?, params)),
            Factor::CloudCover => {
                // Cloud only shades the water by day.
                if snap.is_dark() == Some(true) {
                    return None;
                }
                let range = profile.cloud_cover_pct.as_ref()?;
                Some(normalize::range_contribution(
                    snap.cloud_cover_pct?,
                    range,
                    params.cloud_cover_deviation,
                    params.decay_curve,
                ))
            }
            Factor::MoonPhase => Some(normalize::moon_contribution(
                snap.moon_illumination?,
                profile.full_moon_affinity,
            )),
            Factor::WindDirection => normalize::wind_direction_contribution(
                snap.wind_direction?,
                &profile.wind_directions,
                params.wind_direction_falloff_deg,
            ),
            Factor::WindStrength => {
                let range = profile.wind_speed.as_ref()?;
                Some(normalize::range_contribution(
                    snap.wind_speed?,
                    range,
                    params.wind_speed_deviation,
                    params.decay_curve,
                ))
            }
            Factor::Turbidity => {
                if profile.turbidity.is_empty() {
                    return None;
                }
                let level = snap.water_turbidity?;
                Some(profile.turbidity.multiplier(level).unwrap_or(0.0))
            }
            Factor::PressureTrend => {
                if profile.pressure_trends.is_empty() {
                    return None;
                }
                let trend = snap.pressure_trend(params.pressure_steady_band_hpa)?;
                Some(if profile.pressure_trends.contains(&trend) { 1.0 } else { 0.0 })
            }
        }
    }
}

/// Weight every factor the table gives weight to. Zero-weighted and unknown
/// factors are never computed and do not appear in the breakdown.
pub fn compute_breakdown(
    ctx: &FactorContext<'_>,
    weights: &FactorWeights,
) -> BTreeMap<Factor, FactorOutcome> {
    let mut breakdown = BTreeMap::new();
    for &factor in Factor::all() {
        let weight = weights.get(factor);
        if weight == 0 {
            continue;
        }
        let outcome = match ctx.contribution(factor) {
            Some(c) => FactorOutcome::scored(c.clamp(0.0, 1.0), weight),
            None => FactorOutcome::Unavailable { weight },
        };
        debug!(
            species = %ctx.profile.species_id,
            factor = %factor,
            contribution = ?outcome.contribution(),
            weight,
            "Factor scored"
        );
        breakdown.insert(factor, outcome);
    }
    breakdown
}
