use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::model::factor::Factor;
use crate::model::snapshot::PressureTrend;

/// What one factor contributed this cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FactorOutcome {
    /// `contribution` is the normalized [0, 1] value, `points` = contribution × weight.
    Scored {
        contribution: f64,
        weight: u32,
        points: f64,
    },
    /// The inputs needed for this factor were absent; excluded from the score.
    Unavailable { weight: u32 },
}

impl FactorOutcome {
    pub fn scored(contribution: f64, weight: u32) -> Self {
        FactorOutcome::Scored {
            contribution,
            weight,
            points: contribution * weight as f64,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, FactorOutcome::Scored { .. })
    }

    pub fn contribution(&self) -> Option<f64> {
        match self {
            FactorOutcome::Scored { contribution, .. } => Some(*contribution),
            FactorOutcome::Unavailable { .. } => None,
        }
    }
}

/// Whether a window came from the species' own preferences or was guessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowSource {
    Preferred,
    DefaultDawnDusk,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimalWindow {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub confidence: f64,
    pub source: WindowSource,
}

/// Outcome of scoring one species for one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub species_id: String,
    pub display_name: String,
    pub composite_score: u8,
    /// Empty when the closed-season veto applied.
    pub breakdown: BTreeMap<Factor, FactorOutcome>,
    pub optimal_window: Option<OptimalWindow>,
    pub closed_season: bool,
    pub pressure_trend: Option<PressureTrend>,
    pub recommended_depth_m: Option<f64>,
}
