use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::model::factor::{Factor, FactorKind};
use crate::model::profile::SpeciesProfile;
use crate::model::result::FactorOutcome;
use crate::model::snapshot::EnvironmentSnapshot;

/// Whether `profile` is protected on `date`. An explicit snapshot flag wins;
/// the profile's recurring span is only consulted when the snapshot is silent.
pub fn is_closed(snapshot: &EnvironmentSnapshot, profile: &SpeciesProfile, date: NaiveDate) -> bool {
    match snapshot.closed_season.get(&profile.species_id) {
        Some(flag) => *flag,
        None => profile
            .closed_season
            .as_ref()
            .is_some_and(|span| span.contains(date)),
    }
}

/// Fold a breakdown into the 0-100 composite score.
///
/// Base factors form the denominator from the weights actually applied, so an
/// unavailable factor removes itself from both sides. Bonus and malus factors
/// only move the numerator.
pub fn aggregate(breakdown: &BTreeMap<Factor, FactorOutcome>) -> u8 {
    let mut base_points = 0.0_f64;
    let mut base_weight = 0.0_f64;
    let mut adjustment = 0.0_f64;

    for (factor, outcome) in breakdown {
        let FactorOutcome::Scored { weight, points, .. } = outcome else {
            continue;
        };
        match factor.kind() {
            FactorKind::Base => {
                base_points += *points;
                base_weight += *weight as f64;
            }
            FactorKind::Bonus => adjustment += *points,
            FactorKind::Malus => adjustment -= *points,
        }
    }

    if base_weight <= 0.0 {
        debug!("No base factor available, nothing to score");
        return 0;
    }

    let raw = (base_points + adjustment) / base_weight * 100.0;
    raw.round().clamp(0.0, 100.0) as u8
}
