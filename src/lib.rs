pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod scoring;

pub use config::engine::{EngineConfig, ScoringParams};
pub use config::species::ProfileStore;
pub use config::weights::FactorWeights;
pub use error::{ConfigError, MandatoryInput, ScoringError};
pub use model::{EnvironmentSnapshot, Factor, ScoreResult, SpeciesProfile};
pub use scoring::{evaluate_all, evaluate_by_id, evaluate_species, score_forecast};
