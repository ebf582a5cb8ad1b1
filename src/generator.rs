//! Task generation.
//!
//! Each device carries its own generation rate, drawn once per run from the
//! configured range. On every tick the generator rolls a Bernoulli trial per
//! device (`rate * tick length`) and materializes a task for each success.
//! Generation is a pure production step: it never fails and never blocks.

use crate::config::TaskConfig;
use crate::device::DevicePriorityTable;
use crate::priority::Priority;
use crate::router;
use crate::task::Task;
use rand::Rng;
use rand_pcg::Pcg64;

/// Categorical fallback weights for devices without a table entry,
/// approximately 30% HIGH / 40% MODERATE / 30% LOW.
const FALLBACK_WEIGHTS: [(Priority, f64); 3] = [
    (Priority::High, 0.3),
    (Priority::Moderate, 0.4),
    (Priority::Low, 0.3),
];

pub struct TaskGenerator {
    complexity_range: [u32; 2],
    deadline_range: [f64; 2],
    rate_range: [f64; 2],
    /// Per-device rate in tasks per sim second, index = device_id - 1.
    device_rates: Vec<f64>,
}

impl TaskGenerator {
    pub fn new(config: &TaskConfig, num_devices: u32, rng: &mut Pcg64) -> Self {
        let mut generator = Self {
            complexity_range: config.complexity_range,
            deadline_range: config.deadline_range,
            rate_range: config.rate_range,
            device_rates: Vec::new(),
        };
        generator.resize(num_devices, rng);
        generator
    }

    /// Draw rates for newly added devices after a device-count change.
    pub fn resize(&mut self, num_devices: u32, rng: &mut Pcg64) {
        let target = num_devices as usize;
        while self.device_rates.len() < target {
            let rate = draw_rate(self.rate_range, rng);
            self.device_rates.push(rate);
        }
        self.device_rates.truncate(target);
    }

    /// Produce this tick's tasks. Ids are assigned from `next_id`, which is
    /// advanced for every task so ids stay monotonic across ticks.
    pub fn generate(
        &self,
        now: f64,
        tick_seconds: f64,
        devices: &DevicePriorityTable,
        next_id: &mut u64,
        rng: &mut Pcg64,
    ) -> Vec<Task> {
        let mut tasks = Vec::new();
        for (index, &rate) in self.device_rates.iter().enumerate() {
            let probability = (rate * tick_seconds).min(1.0);
            if probability <= 0.0 || rng.gen::<f64>() >= probability {
                continue;
            }

            let device_id = index as u32 + 1;
            let priority = self.draw_priority(device_id, devices, rng);
            let [cmin, cmax] = self.complexity_range;
            let complexity = rng.gen_range(cmin..=cmax);
            let [dmin, dmax] = self.deadline_range;
            let deadline = rng.gen_range(dmin..=dmax);

            *next_id += 1;
            // The tier is stamped at creation so a task is never observable
            // in an unassigned state.
            let tier = router::route(priority);
            tasks.push(Task::new(
                *next_id, priority, complexity, now, device_id, deadline, tier,
            ));
        }
        tasks
    }

    fn draw_priority(
        &self,
        device_id: u32,
        devices: &DevicePriorityTable,
        rng: &mut Pcg64,
    ) -> Priority {
        if let Some(priority) = devices.get(device_id) {
            return priority;
        }
        // Categorical draw for devices without a table entry.
        let roll: f64 = rng.gen();
        let mut cumulative = 0.0;
        for (priority, weight) in FALLBACK_WEIGHTS {
            cumulative += weight;
            if roll < cumulative {
                return priority;
            }
        }
        Priority::Low
    }
}

fn draw_rate(range: [f64; 2], rng: &mut Pcg64) -> f64 {
    let [min, max] = range;
    if min < max {
        rng.gen_range(min..=max)
    } else {
        min
    }
}
