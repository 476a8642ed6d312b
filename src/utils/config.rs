use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::algorithms::refinement::RefinementParams;
use crate::core::constants::{DEFAULT_LEARNING_RATE, DEFAULT_MAX_ITERATIONS, DEFAULT_UPDATE_INTERVAL_MS};
use crate::core::types::LatLonAlt;

/// Process-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApplicationConfig {
    /// Interval between processing ticks (milliseconds)
    pub update_interval_ms: u64,
    /// Log level name, e.g. `info` or `Information`
    pub log_level: Option<String>,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: DEFAULT_UPDATE_INTERVAL_MS,
            log_level: None,
        }
    }
}

impl ApplicationConfig {
    /// `log` filter directive for the configured level, if one is set and recognised
    pub fn log_filter(&self) -> Option<&'static str> {
        let level = self.log_level.as_deref()?.trim().to_ascii_lowercase();
        match level.as_str() {
            "trace" => Some("trace"),
            "debug" => Some("debug"),
            "info" | "information" => Some("info"),
            "warn" | "warning" => Some("warn"),
            "error" | "critical" => Some("error"),
            "off" | "none" => Some("off"),
            _ => None,
        }
    }
}

/// Solver tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AlgorithmConfig {
    /// Maximum refinement passes per cycle
    pub max_iterations: u32,
    /// Refinement gradient step
    pub learning_rate: f64,
    /// Run the refinement phase at all
    pub refinement_enabled: bool,
    /// Use the metres-per-degree estimate instead of the full ECEF round trip
    pub linear_geodetic_estimate: bool,
}

impl Default for AlgorithmConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            learning_rate: DEFAULT_LEARNING_RATE,
            refinement_enabled: true,
            linear_geodetic_estimate: false,
        }
    }
}

impl AlgorithmConfig {
    pub fn refinement_params(&self) -> RefinementParams {
        RefinementParams {
            max_iterations: self.max_iterations,
            learning_rate: self.learning_rate,
        }
    }
}

/// Orientation of the local frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FrameConfig {
    /// North direction in the horizontal plane of the local frame
    pub north: [f64; 2],
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self { north: [0.0, -1.0] }
    }
}

/// Beacon with a surveyed position, overlaid on every snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BeaconConfig {
    pub id: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Altitude in metres
    pub altitude: f64,
}

impl Default for BeaconConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            latitude: 0.0,
            longitude: 0.0,
            altitude: 0.0,
        }
    }
}

impl BeaconConfig {
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            id: id.into(),
            latitude,
            longitude,
            altitude,
        }
    }

    pub fn lat_lon_alt(&self) -> LatLonAlt {
        LatLonAlt::new(self.latitude, self.longitude, self.altitude)
    }
}

/// Whole configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub application: ApplicationConfig,
    pub algorithm: AlgorithmConfig,
    pub frame: FrameConfig,
    pub beacons: Vec<BeaconConfig>,
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config: {message}")]
    Parse { message: String },
    #[error("invalid value '{value}' for {parameter}: {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },
}

/// Outcome of validating a configuration
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigError>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Loads and validates the application configuration
#[derive(Debug, Default)]
pub struct ConfigurationManager {
    config: AppConfig,
    config_file_path: Option<PathBuf>,
}

impl ConfigurationManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from `path`, which must exist
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut manager = Self::new();
        manager.load_from_file(path)?;
        Ok(manager)
    }

    /// Load from `path`, falling back to defaults when the file does not exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            log::warn!(
                "Config file '{}' not found, using default configuration",
                path.as_ref().display()
            );
            Ok(Self::new())
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn config_file_path(&self) -> Option<&Path> {
        self.config_file_path.as_deref()
    }

    pub fn into_config(self) -> AppConfig {
        self.config
    }

    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            source,
        })?;

        self.load_from_str(&content)?;
        self.config_file_path = Some(path.as_ref().to_path_buf());
        Ok(())
    }

    /// Parse, validate and apply a JSON document
    pub fn load_from_str(&mut self, content: &str) -> Result<(), ConfigError> {
        let mut config: AppConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse { message: e.to_string() })?;

        let validation = Self::validate(&config);
        for warning in &validation.warnings {
            log::warn!("{}", warning);
        }
        if let Some(error) = validation.errors.into_iter().next() {
            return Err(error);
        }

        config.beacons.retain(|beacon| !beacon.id.trim().is_empty());
        self.config = config;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(&self.config)
            .map_err(|e| ConfigError::Parse { message: e.to_string() })?;

        fs::write(&path, content).map_err(|source| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            source,
        })?;

        self.config_file_path = Some(path.as_ref().to_path_buf());
        Ok(())
    }

    /// Validate a configuration without applying it
    pub fn validate(config: &AppConfig) -> ValidationResult {
        let mut result = ValidationResult::default();

        if config.application.update_interval_ms == 0 {
            result.errors.push(invalid(
                "application.updateIntervalMs",
                config.application.update_interval_ms,
                "update interval must be at least 1 ms",
            ));
        }
        if config.application.log_level.is_some() && config.application.log_filter().is_none() {
            result.warnings.push(format!(
                "Unrecognised log level {:?}, ignoring",
                config.application.log_level
            ));
        }

        if config.algorithm.max_iterations == 0 {
            result.errors.push(invalid(
                "algorithm.maxIterations",
                config.algorithm.max_iterations,
                "at least one refinement pass is required",
            ));
        }
        let rate = config.algorithm.learning_rate;
        if !rate.is_finite() || rate < 0.0 {
            result.errors.push(invalid(
                "algorithm.learningRate",
                rate,
                "learning rate must be finite and non-negative",
            ));
        } else if rate > 1.0 {
            result
                .warnings
                .push(format!("Learning rate {} above 1.0 may overshoot during refinement", rate));
        }

        let [nx, ny] = config.frame.north;
        if !(nx.is_finite() && ny.is_finite()) || (nx == 0.0 && ny == 0.0) {
            result.errors.push(invalid(
                "frame.north",
                format!("[{}, {}]", nx, ny),
                "north must be a finite non-zero vector",
            ));
        }

        for (i, beacon) in config.beacons.iter().enumerate() {
            if beacon.id.trim().is_empty() {
                result
                    .warnings
                    .push(format!("Beacon at index {} has no id and will be skipped", i));
                continue;
            }
            if !beacon.lat_lon_alt().is_finite() {
                result.errors.push(invalid(
                    &format!("beacons[{}]", beacon.id),
                    format!("[{}, {}, {}]", beacon.latitude, beacon.longitude, beacon.altitude),
                    "beacon coordinates must be finite",
                ));
            } else if beacon.latitude == 0.0 || beacon.longitude == 0.0 {
                result.warnings.push(format!(
                    "Beacon {} has a zero latitude or longitude and cannot act as an anchor",
                    beacon.id
                ));
            }
        }

        result
    }
}

fn invalid(parameter: &str, value: impl ToString, reason: &str) -> ConfigError {
    ConfigError::InvalidParameter {
        parameter: parameter.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
