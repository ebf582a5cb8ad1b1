//! Device priority table.
//!
//! Each task-generating device carries a default priority that its tasks
//! inherit at creation time. The table is seeded positionally (first 30% of
//! devices HIGH, next 40% MODERATE, rest LOW) and can be edited through the
//! controller; edits affect only tasks generated afterwards.

use crate::error::DeviceError;
use crate::priority::Priority;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone)]
pub struct DevicePriorityTable {
    priorities: HashMap<u32, Priority>,
    num_devices: u32,
}

/// Default priority for device `index` out of `total`, the 30/40/30 split.
fn default_priority(index: u32, total: u32) -> Priority {
    let position = f64::from(index);
    let total = f64::from(total);
    if position <= total * 0.3 {
        Priority::High
    } else if position <= total * 0.7 {
        Priority::Moderate
    } else {
        Priority::Low
    }
}

impl DevicePriorityTable {
    pub fn new(num_devices: u32) -> Self {
        let mut priorities = HashMap::with_capacity(num_devices as usize);
        for device_id in 1..=num_devices {
            priorities.insert(device_id, default_priority(device_id, num_devices));
        }
        Self {
            priorities,
            num_devices,
        }
    }

    pub fn num_devices(&self) -> u32 {
        self.num_devices
    }

    /// Configured priority for `device_id`, if it has a table entry.
    pub fn get(&self, device_id: u32) -> Option<Priority> {
        self.priorities.get(&device_id).copied()
    }

    /// Priority a task from `device_id` inherits. Unknown devices fall back to
    /// MODERATE rather than failing generation.
    pub fn priority_of(&self, device_id: u32) -> Priority {
        self.get(device_id).unwrap_or(Priority::Moderate)
    }

    /// Merge explicit assignments. Ids outside `1..=num_devices` are rejected
    /// as a whole batch so a partial update never applies.
    pub fn set_priorities(&mut self, updates: &BTreeMap<u32, Priority>) -> Result<(), DeviceError> {
        for &device_id in updates.keys() {
            if device_id == 0 || device_id > self.num_devices {
                return Err(DeviceError::UnknownDevice(device_id, self.num_devices));
            }
        }
        for (&device_id, &priority) in updates {
            self.priorities.insert(device_id, priority);
        }
        Ok(())
    }

    /// Adjust the expected key range after a device-count config change.
    /// Existing assignments survive; new ids get positional defaults; ids
    /// beyond the new count are dropped.
    pub fn resize(&mut self, num_devices: u32) {
        if num_devices > self.num_devices {
            for device_id in self.num_devices + 1..=num_devices {
                self.priorities
                    .insert(device_id, default_priority(device_id, num_devices));
            }
        } else {
            self.priorities.retain(|&id, _| id <= num_devices);
        }
        self.num_devices = num_devices;
    }

    /// Ordered copy for external reporting.
    pub fn snapshot(&self) -> BTreeMap<u32, Priority> {
        self.priorities.iter().map(|(&id, &p)| (id, p)).collect()
    }
}
