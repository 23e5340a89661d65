/*!
 * Scheduler Core Operations
 * Submit, sleep, tick, dispatch and completion
 */

use super::wait::WaitSet;
use super::Scheduler;
use crate::core::errors::SchedulerError;
use crate::core::id::IdGenerator;
use crate::core::types::{SchedulerResult, Ticks, WorkId};
use crate::process::types::{ItemClass, ItemState, Payload, WorkItem};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// What one tick did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickOutcome {
    /// Tick number, starting at 1
    pub tick: u64,
    /// Items woken up and re-admitted, ascending id order
    pub released: Vec<WorkId>,
    /// Item aged by the promotion step
    pub promoted: Option<WorkId>,
}

impl Scheduler {
    /// Submit new work; always succeeds
    pub fn submit(&self, class: ItemClass, payload: Payload) -> WorkId {
        let mut state = self.state.lock();
        let id = state.ids.next();
        state.ready.admit(WorkItem::new(id, class, payload));
        state.stats.submitted += 1;
        let levels = state.ready.level_count();
        drop(state);

        info!(id, ?class, levels, "Work item submitted");
        id
    }

    /// Move a ready item into the wait set for `ticks` ticks
    ///
    /// The item is looked up among foreground items first, then background
    /// ones. Both checks run before anything is moved.
    pub fn sleep(&self, id: WorkId, ticks: Ticks) -> SchedulerResult<()> {
        let ticks = WaitSet::check_duration(ticks)?;

        let mut state = self.state.lock();
        let item = state.ready.take(id).ok_or(SchedulerError::UnknownId(id))?;
        let class = item.class();

        if let Err(rejected) = state.wait.put(item, ticks) {
            // Duration was validated above; restore the item rather than lose it
            state.ready.admit(rejected.item);
            return Err(rejected.error);
        }
        state.stats.slept += 1;
        drop(state);

        info!(id, ?class, ticks, "Work item sleeping");
        Ok(())
    }

    /// Advance simulated time by one tick
    ///
    /// Counts the wait set down, re-admits released items in ascending id
    /// order, then runs one promotion step. Safe to call from a timer while
    /// producers submit concurrently.
    #[instrument(skip(self), level = "debug")]
    pub fn tick(&self) -> TickOutcome {
        let mut state = self.state.lock();
        state.ticks += 1;
        let tick = state.ticks;

        let released_items = state.wait.advance();
        let released: Vec<WorkId> = released_items.iter().map(WorkItem::id).collect();
        for item in released_items {
            state.ready.admit(item);
        }

        let promoted = state.ready.promote_step();

        state.stats.ticks += 1;
        state.stats.released += released.len() as u64;
        if promoted.is_some() {
            state.stats.promotions += 1;
        }
        drop(state);

        if !released.is_empty() {
            info!(tick, ?released, "Sleeping items released");
        }
        debug!(tick, ?promoted, "Tick complete");

        TickOutcome {
            tick,
            released,
            promoted,
        }
    }

    /// Take the most-preferred ready item, if any; never blocks
    ///
    /// The item is recorded as in flight until `complete` is called:
    /// foreground work counts as running, background work as detached.
    pub fn next_to_run(&self) -> Option<WorkItem> {
        let mut state = self.state.lock();
        let item = state.ready.remove_next()?;
        state.in_flight.insert(item.id(), item.class());
        state.stats.dispatched += 1;
        drop(state);

        debug!(id = item.id(), class = ?item.class(), "Work item dispatched");
        Some(item)
    }

    /// Report that dispatched work has finished
    pub fn complete(&self, id: WorkId) -> SchedulerResult<()> {
        let mut state = self.state.lock();
        let Some(class) = state.in_flight.remove(&id) else {
            drop(state);
            warn!(id, "Completion reported for unknown work item");
            return Err(SchedulerError::UnknownId(id));
        };
        state.stats.completed += 1;
        drop(state);

        debug!(id, ?class, "Work item completed");
        Ok(())
    }

    /// Where an item currently lives; `None` once done or if never submitted
    pub fn state(&self, id: WorkId) -> Option<ItemState> {
        let state = self.state.lock();
        if state.ready.contains(id) {
            return Some(ItemState::Ready);
        }
        if state.wait.contains(id) {
            return Some(ItemState::Sleeping);
        }
        state.in_flight.get(&id).map(|class| match class {
            ItemClass::Foreground => ItemState::Running,
            ItemClass::Background => ItemState::Detached,
        })
    }

    /// Remaining sleep of a waiting item
    pub fn remaining(&self, id: WorkId) -> Option<Ticks> {
        self.state.lock().wait.remaining(id)
    }

    /// Number of ready items
    pub fn len(&self) -> usize {
        self.state.lock().ready.len()
    }

    /// No ready items
    pub fn is_empty(&self) -> bool {
        self.state.lock().ready.is_empty()
    }

    /// Nothing ready, sleeping or in flight
    pub fn is_idle(&self) -> bool {
        let state = self.state.lock();
        state.ready.is_empty() && state.wait.is_empty() && state.in_flight.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_releases_then_promotes() {
        let scheduler = Scheduler::new();
        let fg = scheduler.submit(ItemClass::Foreground, Payload::new("a"));
        let bg = scheduler.submit(ItemClass::Background, Payload::new("b"));
        scheduler.sleep(bg, 1).unwrap();

        let outcome = scheduler.tick();
        assert_eq!(outcome.tick, 1);
        assert_eq!(outcome.released, vec![bg]);
        // Released to a fresh bottom level; the cursor was on the top one
        assert_eq!(outcome.promoted, None);
        assert_eq!(scheduler.snapshot().level_count(), 2);

        let outcome = scheduler.tick();
        assert_eq!(outcome.tick, 2);
        assert!(outcome.released.is_empty());
        assert_eq!(outcome.promoted, Some(bg));

        let snapshot = scheduler.snapshot();
        assert_eq!(snapshot.level_count(), 1);
        assert_eq!(snapshot.levels[0][0].id, fg);
        assert!(snapshot.levels[0][1].promoted);
        assert_eq!(snapshot.stats.promotions, 1);
    }

    #[test]
    fn test_stats_track_operations() {
        let scheduler = Scheduler::new();
        let id = scheduler.submit(ItemClass::Foreground, Payload::new("a"));
        scheduler.sleep(id, 1).unwrap();
        scheduler.tick();
        let item = scheduler.next_to_run().unwrap();
        scheduler.complete(item.id()).unwrap();

        let stats = scheduler.stats();
        assert_eq!(stats.submitted, 1);
        assert_eq!(stats.slept, 1);
        assert_eq!(stats.released, 1);
        assert_eq!(stats.ticks, 1);
        assert_eq!(stats.dispatched, 1);
        assert_eq!(stats.completed, 1);
    }

    #[test]
    fn test_len_and_emptiness() {
        let scheduler = Scheduler::new();
        assert!(scheduler.is_empty());
        assert!(scheduler.is_idle());

        let id = scheduler.submit(ItemClass::Background, Payload::new("a"));
        assert_eq!(scheduler.len(), 1);

        scheduler.sleep(id, 3).unwrap();
        assert!(scheduler.is_empty());
        assert!(!scheduler.is_idle());
        assert_eq!(scheduler.remaining(id), Some(3));
    }
}
