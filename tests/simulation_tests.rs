// End-to-end engine and controller tests: conservation, latency separation,
// boundary behavior, and control-surface semantics.

#[cfg(test)]
mod tests {
    use fogsim::device::DevicePriorityTable;
    use fogsim::engine::SimulationEngine;
    use fogsim::error::{ConfigError, StartError};
    use fogsim::events::EventFeed;
    use fogsim::priority::Priority;
    use fogsim::task::TaskStatus;
    use fogsim::{Simulation, SimulationConfig};

    fn busy_config() -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.tasks.rate_range = [50.0, 50.0];
        config
    }

    fn run_engine(config: SimulationConfig, duration: f64) -> SimulationEngine {
        let devices = DevicePriorityTable::new(config.network.iot_devices);
        let mut engine =
            SimulationEngine::new(duration, config, EventFeed::new().sender()).unwrap();
        engine.run_to_completion(&devices);
        engine
    }

    #[test]
    fn conservation_law_holds_over_a_full_run() {
        let config = busy_config();
        let devices = DevicePriorityTable::new(config.network.iot_devices);
        let mut engine =
            SimulationEngine::new(30.0, config, EventFeed::new().sender()).unwrap();

        while !engine.finished() {
            engine.step(&devices);
            let m = engine.metrics_snapshot();
            assert_eq!(
                m.tasks_generated,
                m.fog_queue_length as u64
                    + m.cloud_queue_length as u64
                    + m.active_tasks as u64
                    + m.tasks_processed
                    + m.failure_events,
                "conservation violated at t={:.1}",
                engine.clock()
            );
        }
    }

    #[test]
    fn fog_latency_tail_sits_below_cloud_latency_floor() {
        let engine = run_engine(busy_config(), 60.0);
        let metrics = engine.metrics_snapshot();

        assert!(metrics.fog.samples > 100);
        assert!(metrics.cloud.samples > 100);
        // Stronger than the p95-below-p5 requirement: the entire fog tail
        // sits below the smallest cloud sample.
        let fog_p95 = metrics.fog.p95_ms.unwrap();
        let cloud_min = metrics.cloud.min_ms.unwrap();
        assert!(
            fog_p95 < cloud_min,
            "fog p95 {fog_p95:.1} ms not below cloud min {cloud_min:.1} ms"
        );
    }

    #[test]
    fn zero_rate_run_generates_nothing() {
        let mut config = SimulationConfig::default();
        config.tasks.rate_range = [0.0, 0.0];
        let engine = run_engine(config, 10.0);
        let metrics = engine.metrics_snapshot();

        assert_eq!(metrics.tasks_generated, 0);
        assert_eq!(metrics.fog_queue_length, 0);
        assert_eq!(metrics.cloud_queue_length, 0);
        assert_eq!(metrics.active_tasks, 0);
        assert!(engine.finished());
    }

    #[test]
    fn inverted_range_is_rejected_before_the_loop_begins() {
        let sim = Simulation::new();
        let mut config = SimulationConfig::default();
        config.tasks.complexity_range = [2000, 50];

        let result = sim.start(10.0, config);
        assert!(matches!(
            result,
            Err(StartError::Config(ConfigError::InvertedRange { .. }))
        ));
        assert!(!sim.is_running());
        assert_eq!(sim.status().metrics.tasks_generated, 0);
    }

    #[test]
    fn offloading_rate_matches_priority_tally() {
        let engine = run_engine(busy_config(), 20.0);
        let metrics = engine.metrics_snapshot();
        let dist = metrics.priority_distribution;
        let cloud_share = (dist.moderate + dist.low) as f64 / metrics.tasks_generated as f64;
        assert!((metrics.offloading_rate - cloud_share * 100.0).abs() < 1e-9);
        // Default table is 30/40/30, so roughly 70% offloads.
        assert!(metrics.offloading_rate > 50.0 && metrics.offloading_rate < 90.0);
    }

    #[test]
    fn failures_are_tallied_but_never_abort_the_run() {
        let mut config = busy_config();
        config.failures.failure_probability = 1.0;
        let engine = run_engine(config, 20.0);
        let metrics = engine.metrics_snapshot();

        assert!(engine.finished());
        assert!(metrics.failure_events > 0);
        assert_eq!(metrics.tasks_processed, 0);
    }

    #[test]
    fn disabled_failures_complete_everything_dispatched() {
        let mut config = busy_config();
        config.failures.enable_failures = false;
        let engine = run_engine(config, 20.0);
        let metrics = engine.metrics_snapshot();

        assert_eq!(metrics.failure_events, 0);
        assert!(metrics.tasks_processed > 0);
    }

    #[test]
    fn task_listing_orders_fog_by_dispatch_and_cloud_by_arrival() {
        let config = busy_config();
        let devices = DevicePriorityTable::new(config.network.iot_devices);
        let mut engine =
            SimulationEngine::new(60.0, config, EventFeed::new().sender()).unwrap();
        for _ in 0..30 {
            engine.step(&devices);
        }

        let listing = engine.task_listing();
        assert!(!listing.fog_queue.is_empty());
        assert!(!listing.cloud_queue.is_empty());

        for pair in listing.fog_queue.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            let key = |t: &fogsim::task::Task| {
                (
                    std::cmp::Reverse(t.priority.weight()),
                    t.arrival_time.to_bits(),
                    t.complexity,
                    t.id,
                )
            };
            assert!(key(a) < key(b));
        }
        for pair in listing.cloud_queue.windows(2) {
            assert!(pair[0].id < pair[1].id);
        }
        for task in &listing.active_tasks {
            assert_eq!(task.status, TaskStatus::Processing);
            assert!(task.completion_latency_ms.is_some());
        }
    }

    #[test]
    fn device_priority_override_redirects_new_tasks() {
        // All devices HIGH: every generated task must route to fog.
        let sim = Simulation::new();
        let mut config = busy_config();
        config.tick_seconds = 0.001;
        config.network.iot_devices = 5;
        sim.set_config(config.clone()).unwrap();

        let updates: std::collections::BTreeMap<u32, Priority> =
            (1..=5).map(|id| (id, Priority::High)).collect();
        sim.set_device_priorities(&updates).unwrap();

        sim.start(60.0, config).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(50));
        sim.stop();

        let metrics = sim.status().metrics;
        assert!(metrics.tasks_generated > 0);
        assert_eq!(metrics.priority_distribution.moderate, 0);
        assert_eq!(metrics.priority_distribution.low, 0);
        assert_eq!(metrics.offloading_rate, 0.0);
    }

    #[test]
    fn status_snapshot_serializes_to_json() {
        let sim = Simulation::new();
        let json = serde_json::to_string(&sim.status()).unwrap();
        assert!(json.contains("\"running\":false"));
        assert!(json.contains("\"priority_distribution\""));
    }
}
