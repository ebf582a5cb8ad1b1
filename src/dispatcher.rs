//! Dispatch: moving tasks from the queues into simulated processing.
//!
//! Capacities model a fixed pool of concurrent processing slots per tier. A
//! dispatched task occupies a slot until its simulated completion time passes,
//! at which point the engine retires it. Dispatch itself cannot fail; an empty
//! queue simply yields no dispatch that tick.

use crate::config::{FailureConfig, LatencyConfig};
use crate::task::{NodeTier, Task, TaskStatus};
use rand::Rng;
use rand_pcg::Pcg64;

/// A task occupying a processing slot.
#[derive(Debug, Clone)]
pub struct InFlightTask {
    pub task: Task,
    /// Sim-clock second at which the slot frees and the task retires.
    pub completes_at: f64,
    /// Outcome decided by the failure draw at dispatch time.
    pub will_fail: bool,
}

/// Stateless dispatch policy: latency model plus failure injection.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    latency: LatencyConfig,
    failures: FailureConfig,
}

impl Dispatcher {
    pub fn new(latency: LatencyConfig, failures: FailureConfig) -> Self {
        Self { latency, failures }
    }

    /// Sample the end-to-end latency for a task on its tier, in ms.
    ///
    /// `base + complexity / divisor + jitter`, with the fog constants sitting
    /// strictly below the cloud constants (enforced by config validation).
    fn sample_latency(&self, task: &Task, rng: &mut Pcg64) -> f64 {
        let (base, divisor) = match task.assigned_node {
            NodeTier::Fog => (self.latency.fog_base_ms, self.latency.fog_complexity_divisor),
            NodeTier::Cloud => (
                self.latency.cloud_base_ms,
                self.latency.cloud_complexity_divisor,
            ),
        };
        let jitter = if self.latency.jitter_ms > 0.0 {
            rng.gen_range(-self.latency.jitter_ms..=self.latency.jitter_ms)
        } else {
            0.0
        };
        base + f64::from(task.complexity) / divisor + jitter
    }

    /// Move one task into a processing slot: Queued → Processing, latency
    /// sampled and recorded on the task, failure outcome drawn.
    pub fn dispatch(&self, mut task: Task, now: f64, rng: &mut Pcg64) -> InFlightTask {
        debug_assert_eq!(task.status, TaskStatus::Queued);

        let latency_ms = self.sample_latency(&task, rng);
        task.status = TaskStatus::Processing;
        task.completion_latency_ms = Some(latency_ms);

        let will_fail = self.failures.enable_failures
            && rng.gen::<f64>() < self.failures.failure_probability;

        InFlightTask {
            task,
            completes_at: now + latency_ms / 1000.0,
            will_fail,
        }
    }
}
