//! Fog priority queue.
//!
//! A binary heap over a four-key composite ordering. Keys are compared in this
//! exact precedence:
//!
//! 1. priority weight, descending (HIGH=3 > MODERATE=2 > LOW=1)
//! 2. arrival time, ascending (earlier arrivals win ties)
//! 3. complexity, ascending (lighter tasks win remaining ties)
//! 4. task id, ascending (total order, reproducible pop sequences)
//!
//! Only HIGH tasks reach this queue under priority-only routing, but the
//! weight comparison is implemented generally: a device-priority override
//! could in principle seed non-HIGH entries and they must still order
//! correctly.

use crate::task::Task;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Heap entry wrapping a task with its cached priority weight.
#[derive(Debug, Clone)]
struct FogEntry {
    weight: u8,
    task: Task,
}

impl Ord for FogEntry {
    /// `BinaryHeap` is a max-heap, so "greater" means "popped first": higher
    /// weight is greater, and the remaining keys are reversed so that earlier
    /// arrival, lower complexity, and lower id rise to the top.
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight
            .cmp(&other.weight)
            .then_with(|| other.task.arrival_time.total_cmp(&self.task.arrival_time))
            .then_with(|| other.task.complexity.cmp(&self.task.complexity))
            .then_with(|| other.task.id.cmp(&self.task.id))
    }
}

impl PartialOrd for FogEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FogEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FogEntry {}

/// Priority queue for fog-bound tasks. Push and pop are O(log n).
#[derive(Debug, Default)]
pub struct FogQueue {
    heap: BinaryHeap<FogEntry>,
}

impl FogQueue {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    pub fn push(&mut self, task: Task) {
        self.heap.push(FogEntry {
            weight: task.priority.weight(),
            task,
        });
    }

    /// Remove and return the next task under the composite ordering.
    /// Returns `None` on an empty queue; never blocks.
    pub fn pop_highest(&mut self) -> Option<Task> {
        self.heap.pop().map(|entry| entry.task)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }

    /// Copy of the queued tasks in pop order, for external listings.
    pub fn snapshot(&self) -> Vec<Task> {
        let mut entries: Vec<FogEntry> = self.heap.iter().cloned().collect();
        entries.sort_by(|a, b| b.cmp(a));
        entries.into_iter().map(|entry| entry.task).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::priority::Priority;
    use crate::task::NodeTier;

    fn task(id: u64, priority: Priority, arrival: f64, complexity: u32) -> Task {
        Task::new(id, priority, complexity, arrival, 1, 10.0, NodeTier::Fog)
    }

    #[test]
    fn pop_on_empty_returns_none() {
        let mut queue = FogQueue::new();
        assert!(queue.pop_highest().is_none());
    }

    #[test]
    fn higher_weight_pops_first_regardless_of_arrival() {
        let mut queue = FogQueue::new();
        queue.push(task(1, Priority::Low, 0.0, 100));
        queue.push(task(2, Priority::Moderate, 1.0, 100));
        queue.push(task(3, Priority::High, 2.0, 100));

        assert_eq!(queue.pop_highest().unwrap().id, 3);
        assert_eq!(queue.pop_highest().unwrap().id, 2);
        assert_eq!(queue.pop_highest().unwrap().id, 1);
    }

    #[test]
    fn earlier_arrival_wins_weight_tie() {
        let mut queue = FogQueue::new();
        queue.push(task(1, Priority::High, 5.0, 100));
        queue.push(task(2, Priority::High, 3.0, 900));

        assert_eq!(queue.pop_highest().unwrap().id, 2);
        assert_eq!(queue.pop_highest().unwrap().id, 1);
    }

    #[test]
    fn lower_complexity_wins_arrival_tie() {
        // Pushed in id order; the lighter task must come out first.
        let mut queue = FogQueue::new();
        queue.push(task(7, Priority::High, 2.0, 300));
        queue.push(task(9, Priority::High, 2.0, 150));

        assert_eq!(queue.pop_highest().unwrap().id, 9);
        assert_eq!(queue.pop_highest().unwrap().id, 7);
    }

    #[test]
    fn lower_id_wins_full_tie() {
        let mut queue = FogQueue::new();
        queue.push(task(12, Priority::High, 2.0, 150));
        queue.push(task(11, Priority::High, 2.0, 150));

        assert_eq!(queue.pop_highest().unwrap().id, 11);
        assert_eq!(queue.pop_highest().unwrap().id, 12);
    }

    #[test]
    fn snapshot_matches_pop_order_without_draining() {
        let mut queue = FogQueue::new();
        queue.push(task(1, Priority::High, 4.0, 100));
        queue.push(task(2, Priority::High, 1.0, 500));
        queue.push(task(3, Priority::Moderate, 0.5, 100));
        queue.push(task(4, Priority::High, 1.0, 200));

        let snapshot_ids: Vec<u64> = queue.snapshot().iter().map(|t| t.id).collect();
        let mut popped_ids = Vec::new();
        while let Some(popped) = queue.pop_highest() {
            popped_ids.push(popped.id);
        }
        assert_eq!(snapshot_ids, popped_ids);
        assert_eq!(popped_ids, vec![4, 2, 1, 3]);
    }
}
