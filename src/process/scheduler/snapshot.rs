/*!
 * Scheduler Snapshot
 * Consistent point-in-time view for reporting
 */

use super::{Scheduler, SchedulerStats};
use crate::process::types::ItemView;
use serde::{Deserialize, Serialize};

/// Point-in-time view of the whole scheduler
///
/// Taken under a single lock acquisition: ready levels, sleepers and
/// in-flight counters always agree with each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Number of ticks elapsed when the snapshot was taken
    pub tick: u64,
    /// Ready levels, bottom (least preferred) to top
    pub levels: Vec<Vec<ItemView>>,
    /// Sleeping items in ascending id order
    pub waiting: Vec<ItemView>,
    /// Foreground items dispatched and not yet completed
    pub running: usize,
    /// Background items dispatched and not yet completed
    pub detached: usize,
    /// Cumulative counters at the same instant
    pub stats: SchedulerStats,
}

impl Snapshot {
    pub fn ready_len(&self) -> usize {
        self.levels.iter().map(Vec::len).sum()
    }

    pub fn waiting_len(&self) -> usize {
        self.waiting.len()
    }

    pub fn in_flight(&self) -> usize {
        self.running + self.detached
    }

    /// Every live item: ready, sleeping and in flight
    pub fn total(&self) -> usize {
        self.ready_len() + self.waiting_len() + self.in_flight()
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl Scheduler {
    /// Take a consistent, non-mutating view of the scheduler
    pub fn snapshot(&self) -> Snapshot {
        let state = self.state.lock();
        Snapshot {
            tick: state.ticks,
            levels: state.ready.snapshot_order(),
            waiting: state.wait.views(),
            running: state.running(),
            detached: state.detached(),
            stats: state.stats,
        }
    }
}
