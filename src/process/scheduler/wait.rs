/*!
 * Wait Set
 * Sleeping work items keyed by id, each with a tick countdown
 */

use crate::core::errors::SchedulerError;
use crate::core::types::{SchedulerResult, Ticks, WorkId};
use crate::process::types::{ItemView, WorkItem};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::trace;

/// An item the wait set refused, handed back to the caller
#[derive(Debug, Error)]
#[error("{error}")]
pub struct Rejected {
    pub item: WorkItem,
    pub error: SchedulerError,
}

#[derive(Debug, Default)]
pub struct WaitSet {
    items: BTreeMap<WorkId, WorkItem>,
}

impl WaitSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a sleep duration without touching any item
    #[inline]
    pub fn check_duration(ticks: Ticks) -> SchedulerResult<Ticks> {
        if ticks == 0 {
            return Err(SchedulerError::InvalidDuration(ticks));
        }
        Ok(ticks)
    }

    /// Put an item to sleep for `ticks` advance steps
    ///
    /// A zero duration or an id that is already sleeping hands the item back
    /// untouched.
    pub fn put(&mut self, mut item: WorkItem, ticks: Ticks) -> Result<(), Rejected> {
        if let Err(error) = Self::check_duration(ticks) {
            return Err(Rejected { item, error });
        }

        if self.items.contains_key(&item.id()) {
            let error = SchedulerError::AlreadySleeping(item.id());
            return Err(Rejected { item, error });
        }

        item.set_remaining(ticks);
        self.items.insert(item.id(), item);
        Ok(())
    }

    /// Count every sleeper down by one tick
    ///
    /// Items reaching zero leave the set and are returned in ascending id order.
    pub fn advance(&mut self) -> Vec<WorkItem> {
        let expired: Vec<WorkId> = self
            .items
            .iter_mut()
            .filter_map(|(id, item)| (item.tick_down() == 0).then_some(*id))
            .collect();

        let released: Vec<WorkItem> = expired
            .into_iter()
            .filter_map(|id| self.items.remove(&id))
            .collect();

        if !released.is_empty() {
            trace!(count = released.len(), remaining = self.items.len(), "wait set released items");
        }
        released
    }

    pub fn remaining(&self, id: WorkId) -> Option<Ticks> {
        self.items.get(&id).map(WorkItem::remaining_ticks)
    }

    pub fn contains(&self, id: WorkId) -> bool {
        self.items.contains_key(&id)
    }

    /// Views in ascending id order
    pub fn views(&self) -> Vec<ItemView> {
        self.items.values().map(WorkItem::view).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
