//! Task representation shared by the generator, queues, and dispatcher.

use crate::priority::Priority;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Processing tier a task is assigned to by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeTier {
    Fog,
    Cloud,
}

impl fmt::Display for NodeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeTier::Fog => write!(f, "fog"),
            NodeTier::Cloud => write!(f, "cloud"),
        }
    }
}

/// Lifecycle state of a task. Transitions are forward-only:
/// `Queued → Processing → Completed | Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

/// A unit of work travelling through the simulation.
///
/// Each task captures its priority class, a workload measure, and the sim-clock
/// timestamp at which it entered the system. The arrival timestamp doubles as
/// the primary tie-break key inside the fog queue and as the basis for latency
/// accounting. `deadline` is recorded for reporting but not enforced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub priority: Priority,
    /// Workload measure in arbitrary instruction-count units, always positive.
    pub complexity: u32,
    /// Sim-clock seconds at which the task entered the system.
    pub arrival_time: f64,
    /// Originating device, `1..=iot_devices`.
    pub device_id: u32,
    /// Relative deadline in sim seconds, recorded but never enforced.
    pub deadline: f64,
    pub status: TaskStatus,
    pub assigned_node: NodeTier,
    /// End-to-end latency in milliseconds, populated at dispatch.
    pub completion_latency_ms: Option<f64>,
}

impl Task {
    pub fn new(
        id: u64,
        priority: Priority,
        complexity: u32,
        arrival_time: f64,
        device_id: u32,
        deadline: f64,
        assigned_node: NodeTier,
    ) -> Task {
        Task {
            id,
            priority,
            complexity,
            arrival_time,
            device_id,
            deadline,
            status: TaskStatus::Queued,
            assigned_node,
            completion_latency_ms: None,
        }
    }
}
