//! Utility modules for configuration and monitoring

pub mod config;
pub mod monitor;

pub use config::{AppConfig, ConfigError, ConfigurationManager};
pub use monitor::{HealthMonitor, HealthReport, HealthStatus};
