use std::fmt;
use std::io;
use std::path::PathBuf;

/// Inputs without which a species cannot be scored at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MandatoryInput {
    Timestamp,
    Profile,
    Weights,
}

impl fmt::Display for MandatoryInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MandatoryInput::Timestamp => "timestamp",
            MandatoryInput::Profile => "species profile",
            MandatoryInput::Weights => "factor weight table",
        };
        f.write_str(name)
    }
}

/// A species that could not be scored this cycle. Other species are unaffected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error("species '{species_id}': missing mandatory input: {input}")]
    MissingMandatoryInput {
        species_id: String,
        input: MandatoryInput,
    },
}

impl ScoringError {
    pub fn missing(species_id: &str, input: MandatoryInput) -> Self {
        ScoringError::MissingMandatoryInput {
            species_id: species_id.to_string(),
            input,
        }
    }

    pub fn species_id(&self) -> &str {
        match self {
            ScoringError::MissingMandatoryInput { species_id, .. } => species_id,
        }
    }
}

/// Errors raised while loading configuration and input files.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
    #[error("{0}")]
    Invalid(String),
    #[error("species '{species_id}' rejected: {}", reasons.join("; "))]
    InvalidProfile {
        species_id: String,
        reasons: Vec<String>,
    },
}

impl ConfigError {
    pub fn io(path: &std::path::Path, source: io::Error) -> Self {
        ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn parse(path: &std::path::Path, message: impl fmt::Display) -> Self {
        ConfigError::Parse {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }
}
