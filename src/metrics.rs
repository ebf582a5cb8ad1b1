//! Metrics accumulation and reporting.
//!
//! The aggregator lives inside the engine and is mutated under the engine
//! lock, so every multi-step update (counter + sample + tally) lands as one
//! atomic unit. External readers get a [`MetricsSnapshot`] copied out under a
//! brief lock hold.

use crate::priority::{Priority, PriorityTable};
use crate::task::NodeTier;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Latency samples retained per tier for the rolling statistics.
const SAMPLE_WINDOW: usize = 4096;

/// Rolling latency statistics for one processing tier.
#[derive(Debug, Clone, Default)]
pub struct TierMetrics {
    samples: VecDeque<f64>,
    total_count: u64,
}

impl TierMetrics {
    pub fn record(&mut self, latency_ms: f64) {
        self.total_count += 1;
        self.samples.push_back(latency_ms);
        while self.samples.len() > SAMPLE_WINDOW {
            self.samples.pop_front();
        }
    }

    pub fn count(&self) -> u64 {
        self.total_count
    }

    pub fn average(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        Some(self.samples.iter().sum::<f64>() / self.samples.len() as f64)
    }

    pub fn min(&self) -> Option<f64> {
        self.samples.iter().copied().reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.samples.iter().copied().reduce(f64::max)
    }

    /// Nearest-rank percentile over the sample window, `pct` in (0, 100].
    pub fn percentile(&self, pct: f64) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        let mut sorted: Vec<f64> = self.samples.iter().copied().collect();
        sorted.sort_by(|a, b| a.partial_cmp(b).expect("latency samples are finite"));
        let len = sorted.len();
        let rank = ((len as f64 * pct / 100.0).ceil() as usize).clamp(1, len);
        Some(sorted[rank - 1])
    }
}

/// Per-tier latency figures included in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierLatencySnapshot {
    pub samples: u64,
    pub avg_ms: Option<f64>,
    pub min_ms: Option<f64>,
    pub max_ms: Option<f64>,
    pub p50_ms: Option<f64>,
    pub p95_ms: Option<f64>,
}

/// Tally of generated tasks per priority class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PriorityDistribution {
    pub high: u64,
    pub moderate: u64,
    pub low: u64,
}

/// Point-in-time metrics view handed to external consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub tasks_generated: u64,
    pub tasks_processed: u64,
    pub failure_events: u64,
    /// Mean latency in ms over the rolling windows of both tiers.
    pub avg_latency: Option<f64>,
    pub fog_queue_length: usize,
    pub cloud_queue_length: usize,
    pub active_tasks: usize,
    pub priority_distribution: PriorityDistribution,
    /// Share of generated tasks routed to the cloud tier, in percent.
    pub offloading_rate: f64,
    pub fog: TierLatencySnapshot,
    pub cloud: TierLatencySnapshot,
}

/// Accumulates counters, latency series, and the priority tally for one run.
#[derive(Debug, Clone, Default)]
pub struct MetricsAggregator {
    tasks_generated: u64,
    tasks_processed: u64,
    failure_events: u64,
    fog: TierMetrics,
    cloud: TierMetrics,
    priority_tally: PriorityTable<u64>,
}

impl MetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_generated(&mut self, priority: Priority) {
        self.tasks_generated += 1;
        self.priority_tally[priority] += 1;
    }

    /// Record the latency sample for a dispatched task. Called at dispatch
    /// time for every task, including those that will be retired as failed.
    pub fn record_latency(&mut self, tier: NodeTier, latency_ms: f64) {
        match tier {
            NodeTier::Fog => self.fog.record(latency_ms),
            NodeTier::Cloud => self.cloud.record(latency_ms),
        }
    }

    pub fn record_completed(&mut self) {
        self.tasks_processed += 1;
    }

    pub fn record_failed(&mut self) {
        self.failure_events += 1;
    }

    pub fn tasks_generated(&self) -> u64 {
        self.tasks_generated
    }

    pub fn tasks_processed(&self) -> u64 {
        self.tasks_processed
    }

    pub fn failure_events(&self) -> u64 {
        self.failure_events
    }

    pub fn tier(&self, tier: NodeTier) -> &TierMetrics {
        match tier {
            NodeTier::Fog => &self.fog,
            NodeTier::Cloud => &self.cloud,
        }
    }

    /// Percentage of generated tasks routed to the cloud tier.
    pub fn offloading_rate(&self) -> f64 {
        if self.tasks_generated == 0 {
            return 0.0;
        }
        let cloud = self.priority_tally[Priority::Moderate] + self.priority_tally[Priority::Low];
        cloud as f64 / self.tasks_generated as f64 * 100.0
    }

    pub fn snapshot(
        &self,
        fog_queue_length: usize,
        cloud_queue_length: usize,
        active_tasks: usize,
    ) -> MetricsSnapshot {
        let tier_snapshot = |m: &TierMetrics| TierLatencySnapshot {
            samples: m.count(),
            avg_ms: m.average(),
            min_ms: m.min(),
            max_ms: m.max(),
            p50_ms: m.percentile(50.0),
            p95_ms: m.percentile(95.0),
        };

        // Combined mean weighted by each tier's windowed sample count.
        let avg_latency = match (self.fog.average(), self.cloud.average()) {
            (Some(f), Some(c)) => {
                let fog_n = self.fog.samples.len() as f64;
                let cloud_n = self.cloud.samples.len() as f64;
                Some((f * fog_n + c * cloud_n) / (fog_n + cloud_n))
            }
            (Some(f), None) => Some(f),
            (None, Some(c)) => Some(c),
            (None, None) => None,
        };

        MetricsSnapshot {
            tasks_generated: self.tasks_generated,
            tasks_processed: self.tasks_processed,
            failure_events: self.failure_events,
            avg_latency,
            fog_queue_length,
            cloud_queue_length,
            active_tasks,
            priority_distribution: PriorityDistribution {
                high: self.priority_tally[Priority::High],
                moderate: self.priority_tally[Priority::Moderate],
                low: self.priority_tally[Priority::Low],
            },
            offloading_rate: self.offloading_rate(),
            fog: tier_snapshot(&self.fog),
            cloud: tier_snapshot(&self.cloud),
        }
    }
}
