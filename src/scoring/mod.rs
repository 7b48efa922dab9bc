pub mod composite;
pub mod factors;
pub mod forecast;
pub mod normalize;
pub mod statistics;
pub mod thermal;
pub mod window;

use std::collections::BTreeMap;

use chrono::Datelike;
use rayon::prelude::*;
use tracing::debug;

use crate::config::engine::ScoringParams;
use crate::config::species::ProfileStore;
use crate::config::weights::FactorWeights;
use crate::error::{MandatoryInput, ScoringError};
use crate::model::profile::SpeciesProfile;
use crate::model::result::ScoreResult;
use crate::model::snapshot::{EnvironmentSnapshot, Season};

use self::factors::FactorContext;

pub use self::forecast::{score_forecast, HourlyScore, SpeciesForecast};
pub use self::statistics::{summarize, CycleSummary};

/// Score one species against one snapshot.
///
/// Out-of-range readings are dropped before scoring. Fails only when a
/// mandatory input is missing; missing optional readings degrade the affected
/// factors instead.
pub fn evaluate_species(
    snapshot: &EnvironmentSnapshot,
    profile: &SpeciesProfile,
    weights: &FactorWeights,
    params: &ScoringParams,
) -> Result<ScoreResult, ScoringError> {
    evaluate_sanitized(&snapshot.sanitized(), profile, weights, params)
}

/// Score one species looked up by id in `store`.
pub fn evaluate_by_id(
    snapshot: &EnvironmentSnapshot,
    store: &ProfileStore,
    species_id: &str,
    weights: &FactorWeights,
    params: &ScoringParams,
) -> Result<ScoreResult, ScoringError> {
    let profile = store
        .get(species_id)
        .ok_or_else(|| ScoringError::missing(species_id, MandatoryInput::Profile))?;
    evaluate_species(snapshot, profile, weights, params)
}

/// Score every profile in `store` in parallel against the same snapshot.
/// One result per profile, in store order; a failure only affects its own
/// species.
pub fn evaluate_all(
    snapshot: &EnvironmentSnapshot,
    store: &ProfileStore,
    weights: &FactorWeights,
    params: &ScoringParams,
) -> Vec<Result<ScoreResult, ScoringError>> {
    let clean = snapshot.sanitized();
    store
        .profiles()
        .par_iter()
        .map(|profile| evaluate_sanitized(&clean, profile, weights, params))
        .collect()
}

fn evaluate_sanitized(
    snapshot: &EnvironmentSnapshot,
    profile: &SpeciesProfile,
    weights: &FactorWeights,
    params: &ScoringParams,
) -> Result<ScoreResult, ScoringError> {
    let species_id = profile.species_id.as_str();
    let now = snapshot
        .timestamp
        .ok_or_else(|| ScoringError::missing(species_id, MandatoryInput::Timestamp))?;
    if weights.is_empty() {
        return Err(ScoringError::missing(species_id, MandatoryInput::Weights));
    }

    if composite::is_closed(snapshot, profile, now.date_naive()) {
        debug!(species = %species_id, "Closed season, score vetoed");
        return Ok(ScoreResult {
            species_id: profile.species_id.clone(),
            display_name: profile.display_name.clone(),
            composite_score: 0,
            breakdown: BTreeMap::new(),
            optimal_window: None,
            closed_season: true,
            pressure_trend: snapshot.pressure_trend(params.pressure_steady_band_hpa),
            recommended_depth_m: None,
        });
    }

    let day = window::day_windows(snapshot, profile, params);
    let ctx = FactorContext {
        snapshot,
        profile,
        params,
        now,
        season: Season::from_month(now.month()),
        day: day.as_ref(),
    };
    let breakdown = factors::compute_breakdown(&ctx, weights);
    let composite_score = composite::aggregate(&breakdown);
    let optimal_window = day
        .as_ref()
        .and_then(|d| window::optimal_window(d, now, params));

    debug!(
        species = %species_id,
        score = composite_score,
        factors = breakdown.len(),
        "Species scored"
    );

    Ok(ScoreResult {
        species_id: profile.species_id.clone(),
        display_name: profile.display_name.clone(),
        composite_score,
        breakdown,
        optimal_window,
        closed_season: false,
        pressure_trend: snapshot.pressure_trend(params.pressure_steady_band_hpa),
        recommended_depth_m: thermal::recommended_depth(snapshot, profile),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::factor::Factor;
    use crate::model::profile::{
        BearingPreference, IdealRange, PreferredWindow, SeasonalRanges, TurbidityPreference,
        WindowAnchor,
    };
    use crate::model::result::{FactorOutcome, WindowSource};
    use crate::model::snapshot::Turbidity;
    use chrono::{DateTime, FixedOffset};
    use proptest::prelude::*;

    fn ts(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn zander() -> SpeciesProfile {
        let mut p = SpeciesProfile::named("zander", "Zander");
        p.water_temp = SeasonalRanges::uniform(IdealRange::new(14.0, 20.0));
        p.depth = SeasonalRanges::uniform(IdealRange::new(2.0, 6.0));
        p.best_months = vec![6, 7];
        p.wind_directions = vec![BearingPreference {
            bearing: 0.0,
            tolerance: 5.0,
        }];
        p.cloud_cover_pct = Some(IdealRange::new(0.0, 40.0));
        p.turbidity = TurbidityPreference {
            clear: Some(1.0),
            medium: Some(0.6),
            murky: None,
        };
        p.preferred_windows = vec![PreferredWindow {
            anchor: WindowAnchor::Sunrise,
            start_offset_min: -30,
            end_offset_min: 120,
            weight: 1.0,
        }];
        p
    }

    /// Every reading at the species' ideal, during its preferred window.
    fn ideal_snapshot() -> EnvironmentSnapshot {
        let mut snap = EnvironmentSnapshot::at(ts("2026-06-15T06:00:00+02:00"));
        snap.sunrise = Some(ts("2026-06-15T05:10:00+02:00"));
        snap.sunset = Some(ts("2026-06-15T21:30:00+02:00"));
        snap.water_temperature = Some(17.0);
        snap.depth_m = Some(4.0);
        snap.precipitation_mm = Some(0.0);
        snap.moon_illumination = Some(0.0);
        snap.wind_direction = Some(0.0);
        snap.wind_speed = Some(2.0);
        snap.cloud_cover_pct = Some(0.0);
        snap.water_turbidity = Some(Turbidity::Clear);
        snap
    }

    fn score(snap: &EnvironmentSnapshot, profile: &SpeciesProfile) -> ScoreResult {
        evaluate_species(
            snap,
            profile,
            &FactorWeights::default(),
            &ScoringParams::default(),
        )
        .unwrap()
    }

    #[test]
    fn ideal_conditions_score_100() {
        let result = score(&ideal_snapshot(), &zander());
        assert_eq!(result.composite_score, 100);
        assert!(!result.closed_season);
        assert_eq!(
            result.breakdown[&Factor::NightBoost],
            FactorOutcome::scored(0.0, 6)
        );
        let window = result.optimal_window.unwrap();
        assert_eq!(window.source, WindowSource::Preferred);
        assert_eq!(window.start, ts("2026-06-15T04:40:00+02:00"));
    }

    #[test]
    fn daytime_window_credit_ignores_light() {
        let mut snap = ideal_snapshot();
        snap.cloud_cover_pct = Some(100.0);
        snap.wind_speed = Some(10.0);
        snap.precipitation_mm = Some(1.0);
        let result = score(&snap, &zander());
        assert_eq!(
            result.breakdown[&Factor::DaytimeWindow],
            FactorOutcome::scored(1.0, 12)
        );
    }

    #[test]
    fn closed_season_vetoes_ideal_conditions() {
        let mut snap = ideal_snapshot();
        snap.closed_season.insert("zander".to_string(), true);
        let result = score(&snap, &zander());
        assert_eq!(result.composite_score, 0);
        assert!(result.closed_season);
        assert!(result.breakdown.is_empty());
        assert_eq!(result.optimal_window, None);
    }

    #[test]
    fn missing_timestamp_fails_species() {
        let mut snap = ideal_snapshot();
        snap.timestamp = None;
        let err = evaluate_species(
            &snap,
            &zander(),
            &FactorWeights::default(),
            &ScoringParams::default(),
        )
        .unwrap_err();
        assert_eq!(err, ScoringError::missing("zander", MandatoryInput::Timestamp));
    }

    #[test]
    fn empty_weights_fail_species() {
        let err = evaluate_species(
            &ideal_snapshot(),
            &zander(),
            &FactorWeights::from_pairs(&[]),
            &ScoringParams::default(),
        )
        .unwrap_err();
        assert_eq!(err, ScoringError::missing("zander", MandatoryInput::Weights));
    }

    #[test]
    fn unknown_species_id_is_missing_profile() {
        let store = ProfileStore::new(vec![zander()]);
        let err = evaluate_by_id(
            &ideal_snapshot(),
            &store,
            "sturgeon",
            &FactorWeights::default(),
            &ScoringParams::default(),
        )
        .unwrap_err();
        assert_eq!(err.species_id(), "sturgeon");
        assert!(err.to_string().contains("species profile"));
    }

    #[test]
    fn evaluate_all_keeps_store_order() {
        let mut eel = SpeciesProfile::named("eel", "Eel");
        eel.nocturnal_affinity = 0.9;
        let store = ProfileStore::new(vec![zander(), eel]);
        let results = evaluate_all(
            &ideal_snapshot(),
            &store,
            &FactorWeights::default(),
            &ScoringParams::default(),
        );
        let ids: Vec<&str> = results
            .iter()
            .map(|r| r.as_ref().unwrap().species_id.as_str())
            .collect();
        assert_eq!(ids, vec!["zander", "eel"]);
    }

    #[test]
    fn missing_timestamp_fails_every_species() {
        let mut snap = ideal_snapshot();
        snap.timestamp = None;
        let store = ProfileStore::new(vec![zander(), SpeciesProfile::named("eel", "Eel")]);
        let results = evaluate_all(&snap, &store, &FactorWeights::default(), &ScoringParams::default());
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.is_err()));
    }

    #[test]
    fn heavy_rain_pulls_score_down() {
        let mut snap = ideal_snapshot();
        snap.precipitation_mm = Some(12.0);
        let result = score(&snap, &zander());
        assert!(result.composite_score < 100);
        assert_eq!(
            result.breakdown[&Factor::RainMalus],
            FactorOutcome::scored(1.0, 4)
        );
    }

    #[test]
    fn out_of_range_reading_treated_as_missing() {
        let mut snap = ideal_snapshot();
        snap.wind_direction = Some(720.0);
        let result = score(&snap, &zander());
        assert_eq!(
            result.breakdown[&Factor::WindDirection],
            FactorOutcome::Unavailable { weight: 6 }
        );
        assert_eq!(result.composite_score, 100);
    }

    #[test]
    fn window_tie_resolved_by_nearest_midpoint() {
        let mut profile = zander();
        profile.preferred_windows = vec![
            PreferredWindow {
                anchor: WindowAnchor::Sunrise,
                start_offset_min: 50,
                end_offset_min: 110,
                weight: 10.0,
            },
            PreferredWindow {
                anchor: WindowAnchor::Sunset,
                start_offset_min: -150,
                end_offset_min: -90,
                weight: 10.0,
            },
        ];
        let mut snap = ideal_snapshot();
        snap.timestamp = Some(ts("2026-06-15T14:00:00+02:00"));
        let window = score(&snap, &profile).optimal_window.unwrap();
        // A = 06:00-07:00, B = 19:00-20:00; 14:00 is nearer B's midpoint.
        assert_eq!(window.start, ts("2026-06-15T19:00:00+02:00"));
    }

    proptest! {
        #[test]
        fn score_always_in_range(
            water in -5.0f64..40.0,
            depth in 0.0f64..30.0,
            rain in 0.0f64..50.0,
            moon in 0.0f64..=1.0,
            bearing in 0.0f64..360.0,
            cloud in 0.0f64..=100.0,
            hour in 0u32..24,
        ) {
            let mut snap = ideal_snapshot();
            snap.timestamp = Some(ts(&format!("2026-06-15T{:02}:00:00+02:00", hour)));
            snap.water_temperature = Some(water);
            snap.depth_m = Some(depth);
            snap.precipitation_mm = Some(rain);
            snap.moon_illumination = Some(moon);
            snap.wind_direction = Some(bearing);
            snap.cloud_cover_pct = Some(cloud);
            let result = score(&snap, &zander());
            prop_assert!(result.composite_score <= 100);
        }

        #[test]
        fn closed_always_zero(water in -5.0f64..40.0, rain in 0.0f64..50.0) {
            let mut snap = ideal_snapshot();
            snap.water_temperature = Some(water);
            snap.precipitation_mm = Some(rain);
            snap.closed_season.insert("zander".to_string(), true);
            let result = score(&snap, &zander());
            prop_assert_eq!(result.composite_score, 0);
            prop_assert!(result.closed_season);
        }

        #[test]
        fn scoring_is_idempotent(water in -5.0f64..40.0, cloud in 0.0f64..=100.0) {
            let mut snap = ideal_snapshot();
            snap.water_temperature = Some(water);
            snap.cloud_cover_pct = Some(cloud);
            prop_assert_eq!(score(&snap, &zander()), score(&snap, &zander()));
        }

        #[test]
        fn closer_water_temperature_never_scores_lower(
            a in 20.0f64..40.0,
            b in 20.0f64..40.0,
        ) {
            // Both above the 14-20 range; the one nearer the range scores at least as high.
            let (near, far) = if a <= b { (a, b) } else { (b, a) };
            let mut snap = ideal_snapshot();
            snap.water_temperature = Some(near);
            let near_score = score(&snap, &zander()).composite_score;
            snap.water_temperature = Some(far);
            let far_score = score(&snap, &zander()).composite_score;
            prop_assert!(near_score >= far_score);
        }

        #[test]
        fn dropping_a_reading_keeps_perfect_score(which in 0usize..6) {
            let mut snap = ideal_snapshot();
            match which {
                0 => snap.water_temperature = None,
                1 => snap.depth_m = None,
                2 => snap.moon_illumination = None,
                3 => snap.wind_direction = None,
                4 => snap.cloud_cover_pct = None,
                _ => snap.water_turbidity = None,
            }
            prop_assert_eq!(score(&snap, &zander()).composite_score, 100);
        }

        #[test]
        fn bearings_either_side_of_north_score_alike(offset in 0.0f64..5.0) {
            let mut east = ideal_snapshot();
            east.wind_direction = Some(offset);
            let mut west = ideal_snapshot();
            west.wind_direction = Some((360.0 - offset) % 360.0);
            prop_assert_eq!(
                score(&east, &zander()).breakdown[&Factor::WindDirection].clone(),
                score(&west, &zander()).breakdown[&Factor::WindDirection].clone()
            );
        }
    }
}
