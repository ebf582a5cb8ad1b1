//! Priority definitions and helpers used across the scheduler and metrics.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

/// Task priority classes ordered from most to least critical.
///
/// The ordering is stable so the fog queue and metrics can rely on integer
/// indexes instead of branching on specific labels. Adding a new class only
/// requires appending it to [`Priority::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    Moderate,
    Low,
}

impl Priority {
    /// Ordered list of all priorities (high → low) for iteration utilities.
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Moderate, Priority::Low];

    /// Stable index for priority based arrays.
    pub const fn index(self) -> usize {
        match self {
            Priority::High => 0,
            Priority::Moderate => 1,
            Priority::Low => 2,
        }
    }

    /// Numeric rank used to order the fog queue: higher weight dispatches first.
    pub const fn weight(self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Moderate => 2,
            Priority::Low => 1,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Priority::High => "HIGH",
            Priority::Moderate => "MODERATE",
            Priority::Low => "LOW",
        };
        write!(f, "{label}")
    }
}

/// Helper structure wrapping a value per [`Priority`].
///
/// Keeps per-class state (tallies, generation weights) in a fixed array so call
/// sites iterate dynamically over [`Priority::ALL`] instead of naming classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityTable<T> {
    values: Vec<T>,
}

impl<T> PriorityTable<T> {
    /// Build a table by executing a closure for each priority.
    pub fn from_fn(mut f: impl FnMut(Priority) -> T) -> Self {
        let mut values = Vec::with_capacity(Priority::ALL.len());
        for priority in Priority::ALL {
            values.push(f(priority));
        }
        PriorityTable { values }
    }

    /// Borrow the value for a given priority.
    pub fn get(&self, priority: Priority) -> &T {
        &self.values[priority.index()]
    }

    /// Mutably borrow the value for a given priority.
    pub fn get_mut(&mut self, priority: Priority) -> &mut T {
        &mut self.values[priority.index()]
    }
}

impl<T: Default> Default for PriorityTable<T> {
    fn default() -> Self {
        Self::from_fn(|_| T::default())
    }
}

impl<T> Index<Priority> for PriorityTable<T> {
    type Output = T;

    fn index(&self, index: Priority) -> &Self::Output {
        self.get(index)
    }
}

impl<T> IndexMut<Priority> for PriorityTable<T> {
    fn index_mut(&mut self, index: Priority) -> &mut Self::Output {
        self.get_mut(index)
    }
}
