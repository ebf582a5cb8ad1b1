// Demo binary: runs one simulation to completion (or Ctrl+C) and reports
// progress and final metrics on the log.

use fogsim::events::EventKind;
use fogsim::{Simulation, SimulationConfig};
use log::{info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Command-line options parsed from program arguments.
struct CliOptions {
    /// Run length in simulated seconds.
    duration: f64,
    /// RNG seed; equal seeds replay identically.
    seed: Option<u64>,
    /// Number of task-generating devices.
    devices: Option<u32>,
}

fn parse_cli_options() -> CliOptions {
    let mut options = CliOptions {
        duration: 100.0,
        seed: None,
        devices: None,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        let (key, value) = match arg.split_once('=') {
            Some((key, value)) => (key.to_string(), Some(value.to_string())),
            None => (arg, args.next()),
        };
        match (key.as_str(), value) {
            ("--duration", Some(v)) => {
                if let Ok(parsed) = v.parse() {
                    options.duration = parsed;
                }
            }
            ("--seed", Some(v)) => options.seed = v.parse().ok(),
            ("--devices", Some(v)) => options.devices = v.parse().ok(),
            _ => {}
        }
    }
    options
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let options = parse_cli_options();

    let mut config = SimulationConfig::default();
    if let Some(seed) = options.seed {
        config.seed = seed;
    }
    if let Some(devices) = options.devices {
        config.network.iot_devices = devices;
    }

    let sim = Arc::new(Simulation::new());

    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupted_handler = interrupted.clone();
    ctrlc::set_handler(move || {
        interrupted_handler.store(true, Ordering::Relaxed);
    })?;

    sim.start(options.duration, config)?;
    info!(
        "simulation started: {} sim seconds, Ctrl+C to stop",
        options.duration
    );

    while sim.is_running() {
        if interrupted.load(Ordering::Relaxed) {
            sim.stop();
            break;
        }
        std::thread::sleep(Duration::from_secs(1));

        for event in sim.drain_events() {
            match event.kind {
                EventKind::Warning => warn!("[{:6.1}s] {}", event.time, event.message),
                _ => log::debug!("[{:6.1}s] {}", event.time, event.message),
            }
        }

        let status = sim.status();
        info!(
            "progress {:5.1}% | generated {} processed {} failed {} | fog queue {} cloud queue {} active {}",
            status.progress,
            status.metrics.tasks_generated,
            status.metrics.tasks_processed,
            status.metrics.failure_events,
            status.metrics.fog_queue_length,
            status.metrics.cloud_queue_length,
            status.metrics.active_tasks,
        );
    }

    let status = sim.status();
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}
