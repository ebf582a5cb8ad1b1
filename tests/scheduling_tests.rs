// Queue-discipline and routing tests exercised through the public API.

#[cfg(test)]
mod tests {
    use fogsim::priority::Priority;
    use fogsim::router::route;
    use fogsim::scheduler::{CloudQueue, FogQueue};
    use fogsim::task::{NodeTier, Task};
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg64;

    fn fog_task(id: u64, priority: Priority, arrival: f64, complexity: u32) -> Task {
        Task::new(id, priority, complexity, arrival, 1, 10.0, NodeTier::Fog)
    }

    #[test]
    fn routing_partition_is_complete() {
        for priority in Priority::ALL {
            match route(priority) {
                NodeTier::Fog => assert_eq!(priority, Priority::High),
                NodeTier::Cloud => assert_ne!(priority, Priority::High),
            }
        }
    }

    #[test]
    fn fog_queue_resolves_arrival_tie_by_complexity() {
        // Pushed in id order: the lighter task must pop first.
        let mut queue = FogQueue::new();
        queue.push(fog_task(7, Priority::High, 2.0, 300));
        queue.push(fog_task(9, Priority::High, 2.0, 150));

        assert_eq!(queue.pop_highest().unwrap().id, 9);
        assert_eq!(queue.pop_highest().unwrap().id, 7);
        assert!(queue.pop_highest().is_none());
    }

    #[test]
    fn fog_pop_sequence_is_totally_ordered() {
        let mut rng = Pcg64::seed_from_u64(1234);
        let mut queue = FogQueue::new();
        for id in 1..=500u64 {
            // Few distinct arrival times and complexities force real tie-breaks.
            let priority = match rng.gen_range(0..3) {
                0 => Priority::High,
                1 => Priority::Moderate,
                _ => Priority::Low,
            };
            let arrival = f64::from(rng.gen_range(0..5u32));
            let complexity = rng.gen_range(1..=3u32) * 100;
            queue.push(fog_task(id, priority, arrival, complexity));
        }

        let mut previous: Option<Task> = None;
        while let Some(task) = queue.pop_highest() {
            if let Some(prev) = previous {
                let prev_key = (
                    std::cmp::Reverse(prev.priority.weight()),
                    prev.arrival_time.to_bits(),
                    prev.complexity,
                    prev.id,
                );
                let task_key = (
                    std::cmp::Reverse(task.priority.weight()),
                    task.arrival_time.to_bits(),
                    task.complexity,
                    task.id,
                );
                assert!(prev_key < task_key, "pop order violated at task {}", task.id);
            }
            previous = Some(task);
        }
    }

    #[test]
    fn earlier_arrival_pops_no_later_at_equal_weight() {
        let mut queue = FogQueue::new();
        queue.push(fog_task(1, Priority::High, 3.5, 100));
        queue.push(fog_task(2, Priority::High, 1.5, 2000));
        queue.push(fog_task(3, Priority::High, 2.5, 50));

        let order: Vec<u64> = std::iter::from_fn(|| queue.pop_highest())
            .map(|t| t.id)
            .collect();
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[test]
    fn cloud_queue_never_reorders() {
        let mut rng = Pcg64::seed_from_u64(99);
        let mut queue = CloudQueue::new();
        let mut expected = Vec::new();
        for id in 1..=200u64 {
            let complexity = rng.gen_range(50..=2000);
            let priority = if rng.gen_bool(0.5) {
                Priority::Moderate
            } else {
                Priority::Low
            };
            queue.push(Task::new(
                id,
                priority,
                complexity,
                rng.gen_range(0.0..10.0),
                1,
                10.0,
                NodeTier::Cloud,
            ));
            expected.push(id);
        }

        let order: Vec<u64> = std::iter::from_fn(|| queue.pop_front())
            .map(|t| t.id)
            .collect();
        assert_eq!(order, expected);
    }
}
