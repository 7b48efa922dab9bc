use std::collections::BTreeMap;
use std::path::Path;

use tracing::warn;

use crate::error::ConfigError;
use crate::model::factor::Factor;

/// Largest weight a weight file may assign to one factor.
pub const MAX_FACTOR_WEIGHT: u32 = 10_000;

/// Integer weight per factor, shared by every species.
///
/// The engine never assumes a particular total: scores are normalized by the
/// weights actually applied in a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactorWeights {
    weights: BTreeMap<Factor, u32>,
}

impl Default for FactorWeights {
    /// The reference table: the thirteen core factors sum to 100, pressure trend is opt-in.
    fn default() -> Self {
        FactorWeights::from_pairs(&[
            (Factor::Season, 8),
            (Factor::WaterTemperature, 15),
            (Factor::Depth, 10),
            (Factor::TempDepthMatch, 15),
            (Factor::DaytimeWindow, 12),
            (Factor::NightBoost, 6),
            (Factor::RainBonus, 4),
            (Factor::RainMalus, 4),
            (Factor::CloudCover, 4),
            (Factor::MoonPhase, 4),
            (Factor::WindDirection, 6),
            (Factor::WindStrength, 8),
            (Factor::Turbidity, 4),
        ])
    }
}

impl FactorWeights {
    pub fn from_pairs(pairs: &[(Factor, u32)]) -> Self {
        FactorWeights {
            weights: pairs.iter().copied().collect(),
        }
    }

    /// Weight of `factor`; factors absent from the table weigh 0.
    pub fn get(&self, factor: Factor) -> u32 {
        self.weights.get(&factor).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.weights.values().map(|w| u64::from(*w)).sum()
    }

    /// True when no factor carries weight, which leaves nothing to score with.
    pub fn is_empty(&self) -> bool {
        self.weights.values().all(|w| *w == 0)
    }

    /// Load a flat `factor = weight` TOML table. Unknown factor names are
    /// skipped with a warning; negative or fractional weights are rejected.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        Self::from_toml_str(&content, path)
    }

    pub fn from_toml_str(content: &str, source_path: &Path) -> Result<Self, ConfigError> {
        let raw: BTreeMap<String, i64> =
            toml::from_str(content).map_err(|e| ConfigError::parse(source_path, e))?;

        let mut weights = BTreeMap::new();
        let mut errors = Vec::new();
        for (name, value) in raw {
            let factor = match name.parse::<Factor>() {
                Ok(f) => f,
                Err(_) => {
                    warn!(factor = %name, path = %source_path.display(), "Unknown factor in weight table, skipping");
                    continue;
                }
            };
            match u32::try_from(value) {
                Ok(w) if w <= MAX_FACTOR_WEIGHT => {
                    weights.insert(factor, w);
                }
                Ok(_) => errors.push(format!(
                    "{} must be <= {}, got {}",
                    name, MAX_FACTOR_WEIGHT, value
                )),
                Err(_) => errors.push(format!("{} must be >= 0, got {}", name, value)),
            }
        }

        if !errors.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "{}: {}",
                source_path.display(),
                errors.join("\n")
            )));
        }

        Ok(FactorWeights { weights })
    }
}
