use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::config::engine::EngineConfig;
use crate::config::species::ProfileStore;
use crate::config::weights::FactorWeights;
use crate::error::{ConfigError, ScoringError};
use crate::model::snapshot::EnvironmentSnapshot;
use crate::scoring::{self, SpeciesForecast};

/// One line of command output: a result, or the reason a species was skipped.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Entry<'a, T> {
    Done(&'a T),
    Failed { species_id: &'a str, error: String },
}

impl<'a, T> Entry<'a, T> {
    fn from_result(result: &'a Result<T, ScoringError>) -> Self {
        match result {
            Ok(value) => Entry::Done(value),
            Err(e) => Entry::Failed {
                species_id: e.species_id(),
                error: e.to_string(),
            },
        }
    }
}

/// Load the profile store and weight table named by `config`.
pub fn load_inputs(config: &EngineConfig) -> Result<(ProfileStore, FactorWeights), ConfigError> {
    let store = ProfileStore::from_file(Path::new(&config.species_file))?;
    let weights = FactorWeights::from_file(Path::new(&config.weights_file))?;
    Ok((store, weights))
}

/// Read one snapshot object from a JSON file.
pub fn load_snapshot(path: &Path) -> Result<EnvironmentSnapshot, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| ConfigError::parse(path, e))
}

/// Read an array of snapshots from a JSON file.
pub fn load_snapshot_series(path: &Path) -> Result<Vec<EnvironmentSnapshot>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| ConfigError::parse(path, e))
}

/// Score every species against one snapshot and print the results as JSON.
pub fn score(config: &EngineConfig, snapshot_path: &str) -> Result<(), String> {
    let (store, weights) =
        load_inputs(config).map_err(|e| format!("Failed to load inputs: {}", e))?;
    let snapshot = load_snapshot(Path::new(snapshot_path))
        .map_err(|e| format!("Failed to load snapshot: {}", e))?;

    let results = scoring::evaluate_all(&snapshot, &store, &weights, &config.scoring);

    let summary = scoring::summarize(&results);
    info!(
        species = summary.species_count,
        scored = summary.scored,
        failed = summary.failed,
        closed = summary.closed,
        mean_score = summary.mean_score,
        best = ?summary.best,
        "Cycle scored"
    );

    println!("{}", render(&results)?);
    Ok(())
}

/// Score an hourly series for every species and print the forecasts as JSON.
pub fn forecast(config: &EngineConfig, snapshots_path: &str) -> Result<(), String> {
    let (store, weights) =
        load_inputs(config).map_err(|e| format!("Failed to load inputs: {}", e))?;
    let series = load_snapshot_series(Path::new(snapshots_path))
        .map_err(|e| format!("Failed to load snapshots: {}", e))?;

    let forecasts: Vec<Result<SpeciesForecast, ScoringError>> =
        scoring::score_forecast(&series, &store, &weights, &config.scoring);

    println!("{}", render(&forecasts)?);
    Ok(())
}

/// Load profiles and weights and report what would be excluded.
pub fn validate(config: &EngineConfig) -> Result<(), String> {
    let (store, weights) =
        load_inputs(config).map_err(|e| format!("Failed to load inputs: {}", e))?;

    println!("Species file: {}", config.species_file);
    println!("  Valid profiles: {}", store.len());
    for id in store.species_ids() {
        println!("    {}", id);
    }
    println!("Weights file: {}", config.weights_file);
    println!("  Total weight: {}", weights.total());

    if weights.is_empty() {
        return Err("Weight table gives no factor any weight".to_string());
    }
    if !store.rejected().is_empty() {
        println!("  Rejected profiles: {}", store.rejected().len());
        for err in store.rejected() {
            println!("    {}", err);
        }
        return Err(format!("{} invalid profile(s)", store.rejected().len()));
    }
    Ok(())
}

fn render<T: Serialize>(results: &[Result<T, ScoringError>]) -> Result<String, String> {
    let entries: Vec<Entry<'_, T>> = results.iter().map(Entry::from_result).collect();
    serde_json::to_string_pretty(&entries).map_err(|e| format!("Cannot serialize results: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MandatoryInput;
    use crate::model::result::ScoreResult;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, content: &str) -> String {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn config_in(dir: &Path, species: &str, weights: &str) -> EngineConfig {
        let species_file = write_file(dir, "species.toml", species);
        let weights_file = write_file(dir, "weights.toml", weights);
        let toml = format!(
            "species_file = {:?}\nweights_file = {:?}\n",
            species_file, weights_file
        );
        EngineConfig::from_toml_str(&toml, Path::new("catchcast.toml")).unwrap()
    }

    #[test]
    fn loads_snapshot_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "snap.json",
            r#"{ "timestamp": "2026-05-01T06:30:00+02:00", "moon_illumination": 0.3 }"#,
        );
        let snap = load_snapshot(Path::new(&path)).unwrap();
        assert_eq!(snap.moon_illumination, Some(0.3));
    }

    #[test]
    fn malformed_snapshot_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "broken.json", "{ not json");
        let err = load_snapshot(Path::new(&path)).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn loads_snapshot_series() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "series.json",
            r#"[
                { "timestamp": "2026-05-01T06:00:00+02:00" },
                { "timestamp": "2026-05-01T07:00:00+02:00", "precipitation_mm": 1.0 }
            ]"#,
        );
        let series = load_snapshot_series(Path::new(&path)).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[1].precipitation_mm, Some(1.0));
    }

    #[test]
    fn failed_species_rendered_with_reason() {
        let results: Vec<Result<ScoreResult, ScoringError>> =
            vec![Err(ScoringError::missing("eel", MandatoryInput::Timestamp))];
        let json = render(&results).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["species_id"], "eel");
        assert!(value[0]["error"].as_str().unwrap().contains("timestamp"));
    }

    #[test]
    fn validate_reports_rejected_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(
            dir.path(),
            r#"
                [[species]]
                species_id = "perch"
                display_name = "Perch"
                nocturnal_affinity = 3.0
            "#,
            "water_temperature = 10\n",
        );
        let err = validate(&config).unwrap_err();
        assert!(err.contains("1 invalid profile"));
    }

    #[test]
    fn validate_accepts_clean_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(
            dir.path(),
            r#"
                [[species]]
                species_id = "perch"
                display_name = "Perch"
            "#,
            "water_temperature = 10\n",
        );
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn validate_rejects_weightless_table() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), "", "water_temperature = 0\n");
        assert!(validate(&config).unwrap_err().contains("no factor"));
    }
}
