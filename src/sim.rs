//! Simulation controller.
//!
//! Owns the engine behind a single mutex, paces the tick loop on a named
//! worker thread, and exposes the control surface an external status layer
//! consumes: start, stop, status, task listing, device-priority get/set,
//! config get/set, and the event feed. All snapshot types are plain serde
//! structs, so any JSON wrapper can serialize them directly.

use crate::config::SimulationConfig;
use crate::device::DevicePriorityTable;
use crate::engine::{SimulationEngine, TaskListing};
use crate::error::{ConfigError, DeviceError, StartError};
use crate::events::{EventFeed, SimEvent};
use crate::metrics::{MetricsAggregator, MetricsSnapshot};
use crate::priority::Priority;
use log::info;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Point-in-time view of a run for external polling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub running: bool,
    /// Percent of the run duration elapsed.
    pub progress: f64,
    pub metrics: MetricsSnapshot,
}

/// State shared between the controller and the driver thread. The device
/// table lives here rather than in the engine because it outlives runs.
struct Inner {
    config: SimulationConfig,
    devices: DevicePriorityTable,
    engine: Option<SimulationEngine>,
}

pub struct Simulation {
    inner: Arc<Mutex<Inner>>,
    running: Arc<AtomicBool>,
    events: EventFeed,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Simulation {
    /// Controller with the default configuration bundle; no run is active
    /// until [`Simulation::start`].
    pub fn new() -> Self {
        let config = SimulationConfig::default();
        let devices = DevicePriorityTable::new(config.network.iot_devices);
        Self {
            inner: Arc::new(Mutex::new(Inner {
                config,
                devices,
                engine: None,
            })),
            running: Arc::new(AtomicBool::new(false)),
            events: EventFeed::new(),
            worker: Mutex::new(None),
        }
    }

    /// Begin a run of `duration` sim seconds under `config`.
    ///
    /// Validation happens before any state is touched: a rejected bundle
    /// leaves the previous run's snapshot intact and spawns nothing. The
    /// driver thread paces one tick per `tick_seconds` of wall time and clears
    /// the running flag when the duration elapses.
    pub fn start(&self, duration: f64, config: SimulationConfig) -> Result<(), StartError> {
        if self.running.load(Ordering::Relaxed) {
            return Err(StartError::AlreadyRunning);
        }
        // A previous run may have finished on its own; reap its thread.
        self.join_worker();

        let engine = SimulationEngine::new(duration, config.clone(), self.events.sender())?;
        let pacing = Duration::from_secs_f64(config.tick_seconds);

        {
            let mut inner = self.inner.lock();
            if inner.devices.num_devices() != config.network.iot_devices {
                inner.devices.resize(config.network.iot_devices);
            }
            inner.config = config;
            inner.engine = Some(engine);
        }

        self.running.store(true, Ordering::Relaxed);
        let inner = self.inner.clone();
        let running = self.running.clone();
        let handle = std::thread::Builder::new()
            .name("fogsim-driver".to_string())
            .spawn(move || {
                info!("simulation driver started ({duration} sim seconds)");
                loop {
                    if !running.load(Ordering::Relaxed) {
                        break;
                    }
                    let finished = {
                        let mut guard = inner.lock();
                        let inner = &mut *guard;
                        match inner.engine.as_mut() {
                            Some(engine) => {
                                engine.step(&inner.devices);
                                engine.finished()
                            }
                            None => true,
                        }
                    };
                    if finished {
                        running.store(false, Ordering::Relaxed);
                        break;
                    }
                    std::thread::sleep(pacing);
                }
                info!("simulation driver stopped");
            })
            .expect("failed to spawn simulation driver thread");
        *self.worker.lock() = Some(handle);
        Ok(())
    }

    /// Signal the tick loop to halt before its next iteration and wait for it.
    /// Idempotent: a second call observes the flag already cleared and does
    /// nothing further.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
        self.join_worker();
    }

    fn join_worker(&self) {
        if let Some(handle) = self.worker.lock().take() {
            let _ = handle.join();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Consistent point-in-time status view. Before the first start this
    /// reports an idle, empty run.
    pub fn status(&self) -> StatusSnapshot {
        let inner = self.inner.lock();
        let (progress, metrics) = match inner.engine.as_ref() {
            Some(engine) => (engine.progress(), engine.metrics_snapshot()),
            None => (0.0, MetricsAggregator::new().snapshot(0, 0, 0)),
        };
        StatusSnapshot {
            running: self.running.load(Ordering::Relaxed),
            progress,
            metrics,
        }
    }

    /// Current queue contents and in-flight tasks.
    pub fn tasks(&self) -> TaskListing {
        let inner = self.inner.lock();
        match inner.engine.as_ref() {
            Some(engine) => engine.task_listing(),
            None => TaskListing {
                fog_queue: Vec::new(),
                cloud_queue: Vec::new(),
                active_tasks: Vec::new(),
            },
        }
    }

    pub fn device_priorities(&self) -> BTreeMap<u32, Priority> {
        self.inner.lock().devices.snapshot()
    }

    /// Merge device-priority assignments. Applies to tasks generated after the
    /// call, never retroactively to queued tasks.
    pub fn set_device_priorities(
        &self,
        updates: &BTreeMap<u32, Priority>,
    ) -> Result<(), DeviceError> {
        self.inner.lock().devices.set_priorities(updates)
    }

    pub fn config(&self) -> SimulationConfig {
        self.inner.lock().config.clone()
    }

    /// Replace the configuration bundle. Takes effect immediately for ticks
    /// that follow; queued tasks are never invalidated. A device-count change
    /// resizes the priority table's expected key range.
    pub fn set_config(&self, config: SimulationConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        if inner.devices.num_devices() != config.network.iot_devices {
            inner.devices.resize(config.network.iot_devices);
        }
        if let Some(engine) = inner.engine.as_mut() {
            engine.set_config(config.clone())?;
        }
        inner.config = config;
        Ok(())
    }

    /// Drain buffered simulation events for external consumption.
    pub fn drain_events(&self) -> Vec<SimEvent> {
        self.events.drain()
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        self.join_worker();
    }
}
