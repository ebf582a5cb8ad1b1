//! Error taxonomy for the simulation controller.
//!
//! Configuration problems are the only errors this crate surfaces: they are
//! rejected synchronously before a run begins. Everything that goes wrong
//! inside a run is modelled as a `Failed` task outcome, never as an error.

use thiserror::Error;

/// Validation failure in a [`SimulationConfig`](crate::config::SimulationConfig) bundle.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid range for {field}: min {min} exceeds max {max}")]
    InvertedRange {
        field: &'static str,
        min: f64,
        max: f64,
    },

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    #[error("{field} must be a probability in [0, 1], got {value}")]
    InvalidProbability { field: &'static str, value: f64 },

    #[error("fog latency range [{fog_min}, {fog_max}] ms must lie strictly below cloud latency range [{cloud_min}, {cloud_max}] ms")]
    LatencyRangesOverlap {
        fog_min: f64,
        fog_max: f64,
        cloud_min: f64,
        cloud_max: f64,
    },
}

/// Failure to start a simulation run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StartError {
    #[error("simulation already running")]
    AlreadyRunning,

    #[error("run duration must be a positive number of seconds, got {0}")]
    InvalidDuration(f64),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Rejected device-priority update.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeviceError {
    #[error("unknown device id {0}, expected 1..={1}")]
    UnknownDevice(u32, u32),
}
