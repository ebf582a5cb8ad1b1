//! Simulation configuration bundle.
//!
//! Mirrors the sectioned layout of the external config file (network, tasks,
//! latency, failures, offloading) and performs all range validation up front:
//! a bundle that passes [`SimulationConfig::validate`] can drive a full run
//! without any mid-run clamping.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Node and device counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Number of fog nodes, informational for reporting.
    pub fog_nodes: u32,
    /// Number of task-generating devices, `device_id` range is `1..=iot_devices`.
    pub iot_devices: u32,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            fog_nodes: 3,
            iot_devices: 10,
        }
    }
}

/// Task generation knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Per-device generation rate range in tasks per sim second.
    pub rate_range: [f64; 2],
    /// Uniform workload range in instruction-count units.
    pub complexity_range: [u32; 2],
    /// Relative deadline range in sim seconds (recorded, not enforced).
    pub deadline_range: [f64; 2],
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            rate_range: [0.1, 0.3],
            complexity_range: [50, 2000],
            deadline_range: [5.0, 30.0],
        }
    }
}

/// Simulated latency model constants, all in milliseconds.
///
/// A dispatched task's latency is `base + complexity / divisor + jitter` for
/// its tier. The fog range must sit strictly below the cloud range; this is
/// the asymmetry the whole simulation exists to demonstrate and it is checked
/// at start time rather than assumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencyConfig {
    pub fog_base_ms: f64,
    pub fog_complexity_divisor: f64,
    pub cloud_base_ms: f64,
    pub cloud_complexity_divisor: f64,
    /// Half-width of the uniform jitter applied to every sample.
    pub jitter_ms: f64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            fog_base_ms: 200.0,
            fog_complexity_divisor: 50.0,
            cloud_base_ms: 500.0,
            cloud_complexity_divisor: 40.0,
            jitter_ms: 5.0,
        }
    }
}

/// Failure injection knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureConfig {
    pub enable_failures: bool,
    /// Per-dispatch probability that the task completes as `Failed`.
    pub failure_probability: f64,
}

impl Default for FailureConfig {
    fn default() -> Self {
        Self {
            enable_failures: true,
            failure_probability: 0.1,
        }
    }
}

/// Concurrent processing slots per tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityConfig {
    pub fog_capacity: u32,
    pub cloud_capacity: u32,
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            fog_capacity: 3,
            cloud_capacity: 10,
        }
    }
}

/// Offloading thresholds carried in the schema but not consulted by the
/// router, which classifies on priority alone. Reserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffloadingConfig {
    pub complexity_threshold: f64,
    pub utilization_threshold: f64,
}

impl Default for OffloadingConfig {
    fn default() -> Self {
        Self {
            complexity_threshold: 1000.0,
            utilization_threshold: 0.8,
        }
    }
}

/// Complete configuration bundle handed to `Simulation::start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub network: NetworkConfig,
    pub tasks: TaskConfig,
    pub latency: LatencyConfig,
    pub failures: FailureConfig,
    pub capacity: CapacityConfig,
    pub offloading: OffloadingConfig,
    /// Seed for the simulation RNG; equal seeds replay identically.
    pub seed: u64,
    /// Sim seconds advanced per tick.
    pub tick_seconds: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            tasks: TaskConfig::default(),
            latency: LatencyConfig::default(),
            failures: FailureConfig::default(),
            capacity: CapacityConfig::default(),
            offloading: OffloadingConfig::default(),
            seed: 42,
            tick_seconds: DEFAULT_TICK_SECONDS,
        }
    }
}

impl SimulationConfig {
    /// Lowest and highest latency a fog dispatch can draw, in ms.
    pub(crate) fn fog_latency_bounds(&self) -> (f64, f64) {
        let l = &self.latency;
        let [cmin, cmax] = self.tasks.complexity_range;
        (
            l.fog_base_ms + f64::from(cmin) / l.fog_complexity_divisor - l.jitter_ms,
            l.fog_base_ms + f64::from(cmax) / l.fog_complexity_divisor + l.jitter_ms,
        )
    }

    /// Lowest and highest latency a cloud dispatch can draw, in ms.
    pub(crate) fn cloud_latency_bounds(&self) -> (f64, f64) {
        let l = &self.latency;
        let [cmin, cmax] = self.tasks.complexity_range;
        (
            l.cloud_base_ms + f64::from(cmin) / l.cloud_complexity_divisor - l.jitter_ms,
            l.cloud_base_ms + f64::from(cmax) / l.cloud_complexity_divisor + l.jitter_ms,
        )
    }

    /// Reject any bundle that could misbehave mid-run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
            if value.is_finite() {
                Ok(())
            } else {
                Err(ConfigError::NotFinite { field, value })
            }
        }
        fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
            finite(field, value)?;
            if value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::NonPositive { field, value })
            }
        }

        if self.network.fog_nodes == 0 {
            return Err(ConfigError::NonPositive {
                field: "network.fog_nodes",
                value: 0.0,
            });
        }
        if self.network.iot_devices == 0 {
            return Err(ConfigError::NonPositive {
                field: "network.iot_devices",
                value: 0.0,
            });
        }

        let [rate_min, rate_max] = self.tasks.rate_range;
        finite("tasks.rate_range.min", rate_min)?;
        finite("tasks.rate_range.max", rate_max)?;
        if rate_min < 0.0 {
            return Err(ConfigError::NonPositive {
                field: "tasks.rate_range.min",
                value: rate_min,
            });
        }
        if rate_min > rate_max {
            return Err(ConfigError::InvertedRange {
                field: "tasks.rate_range",
                min: rate_min,
                max: rate_max,
            });
        }

        let [cmin, cmax] = self.tasks.complexity_range;
        if cmin == 0 {
            return Err(ConfigError::NonPositive {
                field: "tasks.complexity_range.min",
                value: 0.0,
            });
        }
        if cmin > cmax {
            return Err(ConfigError::InvertedRange {
                field: "tasks.complexity_range",
                min: f64::from(cmin),
                max: f64::from(cmax),
            });
        }

        let [dmin, dmax] = self.tasks.deadline_range;
        positive("tasks.deadline_range.min", dmin)?;
        positive("tasks.deadline_range.max", dmax)?;
        if dmin > dmax {
            return Err(ConfigError::InvertedRange {
                field: "tasks.deadline_range",
                min: dmin,
                max: dmax,
            });
        }

        positive("latency.fog_base_ms", self.latency.fog_base_ms)?;
        positive("latency.cloud_base_ms", self.latency.cloud_base_ms)?;
        positive(
            "latency.fog_complexity_divisor",
            self.latency.fog_complexity_divisor,
        )?;
        positive(
            "latency.cloud_complexity_divisor",
            self.latency.cloud_complexity_divisor,
        )?;
        finite("latency.jitter_ms", self.latency.jitter_ms)?;
        if self.latency.jitter_ms < 0.0 {
            return Err(ConfigError::NonPositive {
                field: "latency.jitter_ms",
                value: self.latency.jitter_ms,
            });
        }

        let p = self.failures.failure_probability;
        finite("failures.failure_probability", p)?;
        if !(0.0..=1.0).contains(&p) {
            return Err(ConfigError::InvalidProbability {
                field: "failures.failure_probability",
                value: p,
            });
        }

        if self.capacity.fog_capacity == 0 {
            return Err(ConfigError::NonPositive {
                field: "capacity.fog_capacity",
                value: 0.0,
            });
        }
        if self.capacity.cloud_capacity == 0 {
            return Err(ConfigError::NonPositive {
                field: "capacity.cloud_capacity",
                value: 0.0,
            });
        }

        positive("tick_seconds", self.tick_seconds)?;

        let (fog_min, fog_max) = self.fog_latency_bounds();
        let (cloud_min, cloud_max) = self.cloud_latency_bounds();
        if fog_max >= cloud_min {
            return Err(ConfigError::LatencyRangesOverlap {
                fog_min,
                fog_max,
                cloud_min,
                cloud_max,
            });
        }

        Ok(())
    }
}

/// Sim seconds per tick when the bundle leaves `tick_seconds` unset.
pub const DEFAULT_TICK_SECONDS: f64 = 0.1;
