/*!
 * Scheduler Statistics
 * Cumulative counters, updated under the scheduler lock
 */

use super::Scheduler;
use serde::{Deserialize, Serialize};

/// Cumulative scheduler counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStats {
    pub submitted: u64,
    pub dispatched: u64,
    pub completed: u64,
    pub slept: u64,
    pub released: u64,
    pub promotions: u64,
    pub ticks: u64,
}

impl Scheduler {
    /// Get a copy of the cumulative counters
    pub fn stats(&self) -> SchedulerStats {
        self.state.lock().stats
    }
}
