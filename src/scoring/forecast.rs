use chrono::{DateTime, FixedOffset};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::engine::ScoringParams;
use crate::config::species::ProfileStore;
use crate::config::weights::FactorWeights;
use crate::error::ScoringError;
use crate::model::profile::SpeciesProfile;
use crate::model::snapshot::EnvironmentSnapshot;
use crate::scoring::evaluate_sanitized;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyScore {
    pub timestamp: DateTime<FixedOffset>,
    pub composite_score: u8,
    pub closed_season: bool,
}

/// Scores for one species across a forecast series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeciesForecast {
    pub species_id: String,
    pub display_name: String,
    pub hours: Vec<HourlyScore>,
    /// Highest-scoring hour; the earliest wins ties.
    pub peak: Option<HourlyScore>,
}

/// Score a series of hourly snapshots for every species in `store`.
///
/// Snapshots without a timestamp are skipped. Hours are reported in time
/// order whatever order they arrive in.
pub fn score_forecast(
    snapshots: &[EnvironmentSnapshot],
    store: &ProfileStore,
    weights: &FactorWeights,
    params: &ScoringParams,
) -> Vec<Result<SpeciesForecast, ScoringError>> {
    let mut series: Vec<EnvironmentSnapshot> = Vec::with_capacity(snapshots.len());
    for (i, snapshot) in snapshots.iter().enumerate() {
        if snapshot.timestamp.is_none() {
            warn!(index = i, "Forecast snapshot has no timestamp, skipping");
            continue;
        }
        series.push(snapshot.sanitized());
    }
    series.sort_by_key(|s| s.timestamp);

    info!(
        hours = series.len(),
        skipped = snapshots.len() - series.len(),
        species = store.len(),
        "Scoring forecast"
    );

    store
        .profiles()
        .par_iter()
        .map(|profile| forecast_species(&series, profile, weights, params))
        .collect()
}

fn forecast_species(
    series: &[EnvironmentSnapshot],
    profile: &SpeciesProfile,
    weights: &FactorWeights,
    params: &ScoringParams,
) -> Result<SpeciesForecast, ScoringError> {
    let mut hours = Vec::with_capacity(series.len());
    for snapshot in series {
        let result = evaluate_sanitized(snapshot, profile, weights, params)?;
        if let Some(timestamp) = snapshot.timestamp {
            hours.push(HourlyScore {
                timestamp,
                composite_score: result.composite_score,
                closed_season: result.closed_season,
            });
        }
    }

    let peak = hours
        .iter()
        .reduce(|best, h| {
            if h.composite_score > best.composite_score {
                h
            } else {
                best
            }
        })
        .cloned();

    Ok(SpeciesForecast {
        species_id: profile.species_id.clone(),
        display_name: profile.display_name.clone(),
        hours,
        peak,
    })
}
