/*!
 * Scheduler
 * Owns the ready structure and the wait set behind one critical section
 */

use crate::core::config::Config;
use crate::core::id::SequentialGenerator;
use crate::core::limits::DEFAULT_MAX_LEVELS;
use crate::core::types::WorkId;
use crate::process::types::ItemClass;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

mod operations;
pub mod ready;
mod snapshot;
mod stats;
pub mod wait;

pub use operations::TickOutcome;
pub use ready::ReadyStructure;
pub use snapshot::Snapshot;
pub use stats::SchedulerStats;
pub use wait::{Rejected, WaitSet};

/// Everything the scheduler guards
///
/// Counters live next to the structures they describe so a snapshot can never
/// see one updated without the other.
#[derive(Debug)]
struct State {
    ready: ReadyStructure,
    wait: WaitSet,
    /// Dispatched items that have not reported completion
    in_flight: BTreeMap<WorkId, ItemClass>,
    ids: SequentialGenerator,
    ticks: u64,
    stats: SchedulerStats,
}

impl State {
    fn new(max_levels: usize) -> Self {
        Self {
            ready: ReadyStructure::with_max_levels(max_levels),
            wait: WaitSet::new(),
            in_flight: BTreeMap::new(),
            ids: SequentialGenerator::default(),
            ticks: 0,
            stats: SchedulerStats::default(),
        }
    }

    fn running(&self) -> usize {
        self.in_flight.values().filter(|c| c.is_foreground()).count()
    }

    fn detached(&self) -> usize {
        self.in_flight.len() - self.running()
    }
}

/// Dynamic-queue scheduler
///
/// Cheap to clone: clones share the same state, so producers, the monitor
/// task and detached workers can each hold one.
#[derive(Debug, Clone)]
pub struct Scheduler {
    state: Arc<Mutex<State>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::with_max_levels(DEFAULT_MAX_LEVELS)
    }

    /// Create scheduler with a custom ready level cap
    pub fn with_max_levels(max_levels: usize) -> Self {
        let state = State::new(max_levels);
        info!(
            max_levels = state.ready.max_levels(),
            "Scheduler initialized"
        );
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_max_levels(config.max_levels)
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
