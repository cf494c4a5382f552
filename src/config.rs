use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::debris::DEFAULT_MAX_STEPS;
use crate::predict::GroundStation;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid station coordinates: {0:?}")]
    Coordinates(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub station: StationConfig,
    #[serde(default)]
    pub web: WebConfig,
    pub debris: Option<DebrisConfig>,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationConfig {
    pub name: Option<String>,
    /// `"lat, lon"` in degrees.
    pub coordinates: String,
    #[serde(default)]
    pub altitude_m: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct DebrisConfig {
    /// Concatenated 3-line element sets.
    pub catalog_file: PathBuf,
}

/// Defaults applied when a request or command leaves a parameter out.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_num_periods")]
    pub num_periods: u32,
    #[serde(default = "default_step_minutes")]
    pub step_minutes: f64,
    #[serde(default = "default_threshold_km")]
    pub threshold_km: f64,
    #[serde(default = "default_min_elevation_deg")]
    pub min_elevation_deg: f64,
    #[serde(default = "default_search_hours")]
    pub search_hours: f64,
    /// Largest trajectory a single screening may sample.
    #[serde(default = "default_max_trajectory_steps")]
    pub max_trajectory_steps: usize,
    /// Longest pass search window, hours.
    #[serde(default = "default_max_search_hours")]
    pub max_search_hours: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            num_periods: default_num_periods(),
            step_minutes: default_step_minutes(),
            threshold_km: default_threshold_km(),
            min_elevation_deg: default_min_elevation_deg(),
            search_hours: default_search_hours(),
            max_trajectory_steps: default_max_trajectory_steps(),
            max_search_hours: default_max_search_hours(),
        }
    }
}

fn default_num_periods() -> u32 {
    5
}

fn default_step_minutes() -> f64 {
    1.0
}

fn default_threshold_km() -> f64 {
    5.0
}

fn default_min_elevation_deg() -> f64 {
    10.0
}

fn default_search_hours() -> f64 {
    24.0
}

fn default_max_trajectory_steps() -> usize {
    DEFAULT_MAX_STEPS
}

fn default_max_search_hours() -> f64 {
    30.0 * 24.0
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    pub fn station(&self) -> Result<GroundStation, ConfigError> {
        GroundStation::from_coordinates(
            &self.station.coordinates,
            Some(self.station.altitude_m),
        )
        .ok_or_else(|| ConfigError::Coordinates(self.station.coordinates.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_gets_defaults() {
        let config = Config::from_yaml(
            r#"
station:
  coordinates: "-6.2, 106.816666"
"#,
        )
        .unwrap();

        assert_eq!(config.web.bind, "0.0.0.0:8080");
        assert!(config.debris.is_none());
        assert_eq!(config.analysis.num_periods, 5);
        assert_eq!(config.analysis.step_minutes, 1.0);
        assert_eq!(config.analysis.threshold_km, 5.0);
        assert_eq!(config.analysis.min_elevation_deg, 10.0);
        assert_eq!(config.analysis.search_hours, 24.0);
        assert_eq!(config.analysis.max_trajectory_steps, 100_000);
        assert_eq!(config.analysis.max_search_hours, 720.0);

        let station = config.station().unwrap();
        assert_eq!(station.latitude_deg, -6.2);
        assert_eq!(station.altitude_m, 0.0);
    }

    #[test]
    fn full_config() {
        let config = Config::from_yaml(
            r#"
station:
  name: Jakarta
  coordinates: "-6.2, 106.816666"
  altitude_m: 5
web:
  bind: "127.0.0.1:9000"
debris:
  catalog_file: data/debris.txt
analysis:
  threshold_km: 10
  search_hours: 48
"#,
        )
        .unwrap();

        assert_eq!(config.station.name.as_deref(), Some("Jakarta"));
        assert_eq!(config.web.bind, "127.0.0.1:9000");
        assert_eq!(
            config.debris.unwrap().catalog_file,
            PathBuf::from("data/debris.txt")
        );
        assert_eq!(config.analysis.threshold_km, 10.0);
        assert_eq!(config.analysis.search_hours, 48.0);
        assert_eq!(config.analysis.num_periods, 5);
    }

    #[test]
    fn bad_coordinates_are_reported() {
        let config = Config::from_yaml("station:\n  coordinates: \"north pole\"\n").unwrap();
        assert!(matches!(config.station(), Err(ConfigError::Coordinates(_))));
    }

    #[test]
    fn missing_station_is_a_yaml_error() {
        assert!(matches!(
            Config::from_yaml("web:\n  bind: \"0.0.0.0:1\"\n"),
            Err(ConfigError::Yaml(_))
        ));
    }
}
