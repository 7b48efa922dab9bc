use serde::Deserialize;
use std::path::Path;

use crate::error::ConfigError;
use crate::scoring::normalize::DecayCurve;

/// Top-level configuration for the `catchcast` binary.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_species_file")]
    pub species_file: String,
    #[serde(default = "default_weights_file")]
    pub weights_file: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
    #[serde(default)]
    pub scoring: ScoringParams,
}

/// Tunables of the scoring engine. Shared read-only by every species evaluation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScoringParams {
    #[serde(default)]
    pub decay_curve: DecayCurve,
    /// Distance outside the ideal water temperature range (°C) at which the factor reaches 0.
    #[serde(default = "default_water_temp_deviation")]
    pub water_temp_deviation: f64,
    #[serde(default = "default_depth_deviation")]
    pub depth_deviation: f64,
    #[serde(default = "default_cloud_cover_deviation")]
    pub cloud_cover_deviation: f64,
    #[serde(default = "default_wind_speed_deviation")]
    pub wind_speed_deviation: f64,
    #[serde(default = "default_wind_direction_falloff_deg")]
    pub wind_direction_falloff_deg: f64,
    #[serde(default = "default_light_rain_min_mm")]
    pub light_rain_min_mm: f64,
    #[serde(default = "default_light_rain_max_mm")]
    pub light_rain_max_mm: f64,
    #[serde(default = "default_heavy_rain_mm")]
    pub heavy_rain_mm: f64,
    #[serde(default = "default_pressure_steady_band_hpa")]
    pub pressure_steady_band_hpa: f64,
    #[serde(default = "default_window_edge_margin_min")]
    pub window_edge_margin_min: i64,
    #[serde(default = "default_dawn_dusk_buffer_min")]
    pub dawn_dusk_buffer_min: i64,
    #[serde(default = "default_fallback_confidence")]
    pub fallback_confidence: f64,
}

fn default_species_file() -> String {
    "./species.toml".to_string()
}
fn default_weights_file() -> String {
    "./weights.toml".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "text".to_string()
}
fn default_water_temp_deviation() -> f64 {
    5.0
}
fn default_depth_deviation() -> f64 {
    2.0
}
fn default_cloud_cover_deviation() -> f64 {
    30.0
}
fn default_wind_speed_deviation() -> f64 {
    4.0
}
fn default_wind_direction_falloff_deg() -> f64 {
    45.0
}
fn default_light_rain_min_mm() -> f64 {
    0.5
}
fn default_light_rain_max_mm() -> f64 {
    2.0
}
fn default_heavy_rain_mm() -> f64 {
    8.0
}
fn default_pressure_steady_band_hpa() -> f64 {
    1.0
}
/// A day either side of a window.
const MAX_EDGE_MARGIN_MIN: i64 = 1440;

/// Doubled in poor light, the fallback buffer still spans at most a day.
const MAX_DAWN_DUSK_BUFFER_MIN: i64 = 720;

fn default_window_edge_margin_min() -> i64 {
    60
}
fn default_dawn_dusk_buffer_min() -> i64 {
    45
}
fn default_fallback_confidence() -> f64 {
    0.5
}

impl Default for ScoringParams {
    fn default() -> Self {
        ScoringParams {
            decay_curve: DecayCurve::default(),
            water_temp_deviation: default_water_temp_deviation(),
            depth_deviation: default_depth_deviation(),
            cloud_cover_deviation: default_cloud_cover_deviation(),
            wind_speed_deviation: default_wind_speed_deviation(),
            wind_direction_falloff_deg: default_wind_direction_falloff_deg(),
            light_rain_min_mm: default_light_rain_min_mm(),
            light_rain_max_mm: default_light_rain_max_mm(),
            heavy_rain_mm: default_heavy_rain_mm(),
            pressure_steady_band_hpa: default_pressure_steady_band_hpa(),
            window_edge_margin_min: default_window_edge_margin_min(),
            dawn_dusk_buffer_min: default_dawn_dusk_buffer_min(),
            fallback_confidence: default_fallback_confidence(),
        }
    }
}

impl ScoringParams {
    pub fn validate(&self) -> Result<(), String> {
        let mut errors = Vec::new();

        let deviations = [
            ("water_temp_deviation", self.water_temp_deviation, "5.0"),
            ("depth_deviation", self.depth_deviation, "2.0"),
            ("cloud_cover_deviation", self.cloud_cover_deviation, "30.0"),
            ("wind_speed_deviation", self.wind_speed_deviation, "4.0"),
            ("wind_direction_falloff_deg", self.wind_direction_falloff_deg, "45.0"),
        ];
        for (name, value, example) in deviations {
            if !(value.is_finite() && value > 0.0) {
                errors.push(format!(
                    "scoring.{} must be > 0.0, got {}. Example: {} = {}",
                    name, value, name, example
                ));
            }
        }

        if !(self.light_rain_min_mm > 0.0
            && self.light_rain_min_mm <= self.light_rain_max_mm
            && self.light_rain_max_mm < self.heavy_rain_mm)
        {
            errors.push(format!(
                "scoring rain thresholds must satisfy 0 < light_rain_min_mm <= light_rain_max_mm < heavy_rain_mm, got {} / {} / {}",
                self.light_rain_min_mm, self.light_rain_max_mm, self.heavy_rain_mm
            ));
        }

        if !(self.pressure_steady_band_hpa >= 0.0) {
            errors.push(format!(
                "scoring.pressure_steady_band_hpa must be >= 0.0, got {}. Example: pressure_steady_band_hpa = 1.0",
                self.pressure_steady_band_hpa
            ));
        }

        if !(0..=MAX_EDGE_MARGIN_MIN).contains(&self.window_edge_margin_min) {
            errors.push(format!(
                "scoring.window_edge_margin_min must be 0-{}, got {}. Example: window_edge_margin_min = 60",
                MAX_EDGE_MARGIN_MIN, self.window_edge_margin_min
            ));
        }

        if !(1..=MAX_DAWN_DUSK_BUFFER_MIN).contains(&self.dawn_dusk_buffer_min) {
            errors.push(format!(
                "scoring.dawn_dusk_buffer_min must be 1-{}, got {}. Example: dawn_dusk_buffer_min = 45",
                MAX_DAWN_DUSK_BUFFER_MIN, self.dawn_dusk_buffer_min
            ));
        }

        if !(0.0..=1.0).contains(&self.fallback_confidence) {
            errors.push(format!(
                "scoring.fallback_confidence must be 0.0-1.0, got {}. Example: fallback_confidence = 0.5",
                self.fallback_confidence
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.join("\n"))
        }
    }
}

impl EngineConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        Self::from_toml_str(&content, path)
    }

    pub fn from_toml_str(content: &str, source_path: &Path) -> Result<Self, ConfigError> {
        let config: EngineConfig =
            toml::from_str(content).map_err(|e| ConfigError::parse(source_path, e))?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        let mut errors = Vec::new();

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            errors.push(format!(
                "log_level must be one of {:?}, got '{}'. Example: log_level = \"info\"",
                valid_levels, self.log_level
            ));
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.log_format.as_str()) {
            errors.push(format!(
                "log_format must be one of {:?}, got '{}'. Example: log_format = \"text\"",
                valid_formats, self.log_format
            ));
        }

        if let Err(e) = self.scoring.validate() {
            errors.push(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.join("\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    fn test_path() -> PathBuf {
        PathBuf::from("test-catchcast.toml")
    }

    #[test]
    fn valid_config_loads_all_fields() {
        let toml = r#"
            species_file = "./data/species.toml"
            weights_file = "./data/weights.toml"
            log_level = "debug"
            log_format = "json"

            [scoring]
            decay_curve = "gaussian"
            water_temp_deviation = 4.0
            depth_deviation = 1.5
            light_rain_min_mm = 0.2
            light_rain_max_mm = 3.0
            heavy_rain_mm = 10.0
            window_edge_margin_min = 30
            fallback_confidence = 0.4
        "#;
        let config = EngineConfig::from_toml_str(toml, &test_path()).unwrap();
        assert_eq!(config.species_file, "./data/species.toml");
        assert_eq!(config.weights_file, "./data/weights.toml");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, "json");
        assert_eq!(config.scoring.decay_curve, DecayCurve::Gaussian);
        assert_eq!(config.scoring.water_temp_deviation, 4.0);
        assert_eq!(config.scoring.depth_deviation, 1.5);
        assert_eq!(config.scoring.heavy_rain_mm, 10.0);
        assert_eq!(config.scoring.window_edge_margin_min, 30);
        assert_eq!(config.scoring.fallback_confidence, 0.4);
        assert_eq!(config.scoring.dawn_dusk_buffer_min, 45);
    }

    #[test]
    fn defaults_applied_for_empty_config() {
        let config = EngineConfig::from_toml_str("", &test_path()).unwrap();
        assert_eq!(config.species_file, "./species.toml");
        assert_eq!(config.weights_file, "./weights.toml");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, "text");
        assert_eq!(config.scoring, ScoringParams::default());
        assert_eq!(config.scoring.decay_curve, DecayCurve::Linear);
    }

    #[test]
    fn invalid_rain_thresholds_rejected() {
        let toml = "[scoring]\nlight_rain_max_mm = 9.0\nheavy_rain_mm = 8.0";
        let err = EngineConfig::from_toml_str(toml, &test_path()).unwrap_err();
        assert!(err.to_string().contains("heavy_rain_mm"));
    }

    #[test]
    fn zero_deviation_rejected() {
        let err = EngineConfig::from_toml_str("[scoring]\ndepth_deviation = 0.0", &test_path())
            .unwrap_err();
        assert!(err.to_string().contains("depth_deviation"));
        assert!(err.to_string().contains("> 0.0"));
    }

    #[test]
    fn invalid_log_level_rejected() {
        let err =
            EngineConfig::from_toml_str(r#"log_level = "verbose""#, &test_path()).unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn multiple_errors_reported_together() {
        let toml = "log_format = \"xml\"\n[scoring]\nfallback_confidence = 2.0\ndawn_dusk_buffer_min = 0";
        let err = EngineConfig::from_toml_str(toml, &test_path())
            .unwrap_err()
            .to_string();
        assert!(err.contains("log_format"));
        assert!(err.contains("fallback_confidence"));
        assert!(err.contains("dawn_dusk_buffer_min"));
    }

    #[test]
    fn oversized_window_minutes_rejected() {
        let toml = "[scoring]\nwindow_edge_margin_min = 9223372036854775807\ndawn_dusk_buffer_min = 100000";
        let err = EngineConfig::from_toml_str(toml, &test_path())
            .unwrap_err()
            .to_string();
        assert!(err.contains("window_edge_margin_min must be 0-1440"));
        assert!(err.contains("dawn_dusk_buffer_min must be 1-720"));

        let toml = "[scoring]\nwindow_edge_margin_min = 1440\ndawn_dusk_buffer_min = 720";
        assert!(EngineConfig::from_toml_str(toml, &test_path()).is_ok());
    }

    #[test]
    fn malformed_toml_includes_source_path() {
        let err = EngineConfig::from_toml_str("log_level = [invalid", &test_path()).unwrap_err();
        assert!(err.to_string().contains("test-catchcast.toml"));
    }

    #[test]
    fn from_file_loads_valid_config() {
        let mut tmp = NamedTempFile::new().unwrap();
        use std::io::Write;
        writeln!(tmp, "log_level = \"warn\"").unwrap();
        let config = EngineConfig::from_file(tmp.path()).unwrap();
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn from_file_missing_file_error() {
        let err = EngineConfig::from_file(Path::new("/nonexistent/catchcast.toml")).unwrap_err();
        assert!(err.to_string().contains("Cannot read"));
    }
}
