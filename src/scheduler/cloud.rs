//! Cloud FIFO queue: strict arrival order, the deliberate contrast with the
//! fog tier's priority discipline. No reordering under any circumstance.

use crate::task::Task;
use std::collections::VecDeque;

#[derive(Debug, Default)]
pub struct CloudQueue {
    queue: VecDeque<Task>,
}

impl CloudQueue {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    pub fn push(&mut self, task: Task) {
        self.queue.push_back(task);
    }

    pub fn pop_front(&mut self) -> Option<Task> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Copy of the queued tasks in arrival order.
    pub fn snapshot(&self) -> Vec<Task> {
        self.queue.iter().cloned().collect()
    }
}
