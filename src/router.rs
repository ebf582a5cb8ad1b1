//! Routing policy: which tier a task is dispatched on.
//!
//! Classification is a pure function of priority. HIGH tasks stay on the fog
//! tier for low latency; everything else is offloaded to the cloud. The
//! complexity and utilization thresholds in
//! [`OffloadingConfig`](crate::config::OffloadingConfig) are reserved and do
//! not participate.

use crate::priority::Priority;
use crate::task::NodeTier;

/// Deterministic, total classification: every priority maps to exactly one tier.
pub fn route(priority: Priority) -> NodeTier {
    match priority {
        Priority::High => NodeTier::Fog,
        Priority::Moderate | Priority::Low => NodeTier::Cloud,
    }
}
