//! Simulation engine: the owned state advanced tick by tick.
//!
//! One engine instance holds everything a single run mutates: the sim clock,
//! the seeded RNG, both queues, the in-flight slot map, and the metrics
//! aggregator. The controller wraps it in a single mutex together with the
//! device-priority table (which outlives runs) and the driver thread calls
//! [`SimulationEngine::step`] once per tick, so every multi-step update
//! (pop, transition, tally) is one atomic unit to outside readers.

use crate::config::SimulationConfig;
use crate::device::DevicePriorityTable;
use crate::dispatcher::{Dispatcher, InFlightTask};
use crate::error::{ConfigError, StartError};
use crate::events::{EventKind, EventSender};
use crate::generator::TaskGenerator;
use crate::metrics::{MetricsAggregator, MetricsSnapshot};
use crate::scheduler::{CloudQueue, FogQueue};
use crate::task::{NodeTier, Task, TaskStatus};
use log::debug;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Current contents of both queues and the in-flight slots, each ordered the
/// way the tier drains them (fog: pop order, cloud: arrival order, in-flight:
/// id order).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskListing {
    pub fog_queue: Vec<Task>,
    pub cloud_queue: Vec<Task>,
    pub active_tasks: Vec<Task>,
}

pub struct SimulationEngine {
    config: SimulationConfig,
    duration: f64,
    clock: f64,
    rng: Pcg64,
    next_task_id: u64,
    generator: TaskGenerator,
    dispatcher: Dispatcher,
    fog_queue: FogQueue,
    cloud_queue: CloudQueue,
    in_flight: BTreeMap<u64, InFlightTask>,
    metrics: MetricsAggregator,
    events: EventSender,
    finished: bool,
}

impl SimulationEngine {
    /// Build a fresh engine for one run. The bundle and duration are validated
    /// here, before any state exists, so a bad configuration can never reach
    /// the tick loop.
    pub fn new(
        duration: f64,
        config: SimulationConfig,
        events: EventSender,
    ) -> Result<Self, StartError> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(StartError::InvalidDuration(duration));
        }
        config.validate()?;

        let mut rng = Pcg64::seed_from_u64(config.seed);
        let generator = TaskGenerator::new(&config.tasks, config.network.iot_devices, &mut rng);
        let dispatcher = Dispatcher::new(config.latency.clone(), config.failures.clone());

        Ok(Self {
            duration,
            clock: 0.0,
            rng,
            next_task_id: 0,
            generator,
            dispatcher,
            fog_queue: FogQueue::new(),
            cloud_queue: CloudQueue::new(),
            in_flight: BTreeMap::new(),
            metrics: MetricsAggregator::new(),
            events,
            finished: false,
            config,
        })
    }

    /// Advance one tick: retire finished slots, generate and route new tasks,
    /// dispatch up to the free capacity of each tier.
    pub fn step(&mut self, devices: &DevicePriorityTable) {
        if self.finished {
            return;
        }
        let tick = self.config.tick_seconds;
        self.clock += tick;

        self.retire_completed();
        self.generate_tasks(tick, devices);
        self.dispatch_tier(NodeTier::Fog);
        self.dispatch_tier(NodeTier::Cloud);

        if self.clock >= self.duration {
            self.finished = true;
            self.events.emit(
                EventKind::Success,
                self.clock,
                "Simulation completed successfully",
            );
        }
    }

    /// Run every remaining tick synchronously. Used by tests and benches; the
    /// controller paces ticks on its own thread instead.
    pub fn run_to_completion(&mut self, devices: &DevicePriorityTable) {
        while !self.finished {
            self.step(devices);
        }
    }

    fn retire_completed(&mut self) {
        let due: Vec<u64> = self
            .in_flight
            .iter()
            .filter(|(_, slot)| slot.completes_at <= self.clock)
            .map(|(&id, _)| id)
            .collect();

        for id in due {
            let mut slot = self.in_flight.remove(&id).expect("slot id collected above");
            if slot.will_fail {
                slot.task.status = TaskStatus::Failed;
                self.metrics.record_failed();
                self.events.emit(
                    EventKind::Warning,
                    self.clock,
                    format!(
                        "Task {} failed on {} node",
                        slot.task.id, slot.task.assigned_node
                    ),
                );
            } else {
                slot.task.status = TaskStatus::Completed;
                self.metrics.record_completed();
            }
            debug!(
                "task {} retired as {:?} after {:.1} ms",
                slot.task.id,
                slot.task.status,
                slot.task.completion_latency_ms.unwrap_or_default()
            );
        }
    }

    fn generate_tasks(&mut self, tick: f64, devices: &DevicePriorityTable) {
        let tasks = self.generator.generate(
            self.clock,
            tick,
            devices,
            &mut self.next_task_id,
            &mut self.rng,
        );
        for task in tasks {
            self.metrics.record_generated(task.priority);
            self.events.emit(
                EventKind::Info,
                self.clock,
                format!(
                    "Task {} generated by device_{} with {} priority (complexity={})",
                    task.id, task.device_id, task.priority, task.complexity
                ),
            );
            match task.assigned_node {
                NodeTier::Fog => {
                    self.events.emit(
                        EventKind::Info,
                        self.clock,
                        format!("Task {} assigned to fog", task.id),
                    );
                    self.fog_queue.push(task);
                }
                NodeTier::Cloud => {
                    self.events.emit(
                        EventKind::Info,
                        self.clock,
                        format!("Task {} offloaded to cloud", task.id),
                    );
                    self.cloud_queue.push(task);
                }
            }
        }
    }

    fn dispatch_tier(&mut self, tier: NodeTier) {
        let capacity = match tier {
            NodeTier::Fog => self.config.capacity.fog_capacity,
            NodeTier::Cloud => self.config.capacity.cloud_capacity,
        } as usize;
        let occupied = self
            .in_flight
            .values()
            .filter(|slot| slot.task.assigned_node == tier)
            .count();

        for _ in occupied..capacity {
            let next = match tier {
                NodeTier::Fog => self.fog_queue.pop_highest(),
                NodeTier::Cloud => self.cloud_queue.pop_front(),
            };
            let Some(task) = next else { break };

            let slot = self.dispatcher.dispatch(task, self.clock, &mut self.rng);
            let latency = slot
                .task
                .completion_latency_ms
                .expect("dispatch always samples a latency");
            self.metrics.record_latency(tier, latency);
            debug!(
                "task {} dispatched on {} ({:.1} ms)",
                slot.task.id, tier, latency
            );
            self.in_flight.insert(slot.task.id, slot);
        }
    }

    pub fn finished(&self) -> bool {
        self.finished
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Percent of the run duration elapsed, capped at 100.
    pub fn progress(&self) -> f64 {
        (self.clock / self.duration * 100.0).min(100.0)
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Replace the configuration bundle mid-run. Queued tasks are untouched; a
    /// device-count change resizes the per-device rate pool without
    /// invalidating anything already admitted.
    pub fn set_config(&mut self, config: SimulationConfig) -> Result<(), ConfigError> {
        config.validate()?;

        if config.tasks != self.config.tasks {
            self.generator =
                TaskGenerator::new(&config.tasks, config.network.iot_devices, &mut self.rng);
        } else if config.network.iot_devices != self.config.network.iot_devices {
            self.generator
                .resize(config.network.iot_devices, &mut self.rng);
        }
        self.dispatcher = Dispatcher::new(config.latency.clone(), config.failures.clone());
        self.config = config;
        Ok(())
    }

    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot(
            self.fog_queue.len(),
            self.cloud_queue.len(),
            self.in_flight.len(),
        )
    }

    pub fn task_listing(&self) -> TaskListing {
        TaskListing {
            fog_queue: self.fog_queue.snapshot(),
            cloud_queue: self.cloud_queue.snapshot(),
            active_tasks: self.in_flight.values().map(|slot| slot.task.clone()).collect(),
        }
    }
}
