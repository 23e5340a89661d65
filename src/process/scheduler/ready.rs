/*!
 * Ready Structure
 * Multilevel two-sided queue for work that is not sleeping
 *
 * Levels run from least-preferred (bottom, index 0) to most-preferred
 * (top, last index); each level is a FIFO run of items. Foreground work
 * enters at the top, background work at the bottom, and a round-robin
 * promotion step ages items upward one level at a time.
 *
 * Empty levels are dropped as soon as they appear. The only empty level the
 * structure ever holds is the single level of an empty structure.
 */

use crate::core::limits::{DEFAULT_MAX_LEVELS, MIN_LEVELS};
use crate::core::types::WorkId;
use crate::process::types::{ItemClass, ItemView, WorkItem};
use std::collections::VecDeque;
use tracing::{debug, trace};

type Level = VecDeque<WorkItem>;

/// A level accepts an item in place when it is empty or holds only that class
#[inline]
fn compatible(level: &Level, class: ItemClass) -> bool {
    level.iter().all(|item| item.class() == class)
}

#[derive(Debug)]
pub struct ReadyStructure {
    levels: VecDeque<Level>,
    /// Next level the promotion step visits
    cursor: usize,
    max_levels: usize,
}

impl ReadyStructure {
    pub fn new() -> Self {
        Self::with_max_levels(DEFAULT_MAX_LEVELS)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        let mut levels = VecDeque::new();
        levels.push_back(Level::new());
        Self {
            levels,
            cursor: 0,
            max_levels: max_levels.max(MIN_LEVELS),
        }
    }

    /// Insert an item according to its class
    ///
    /// Foreground work joins the top level, background work the bottom one.
    /// When that level already holds the other class a new level is opened on
    /// that side, unless the level cap has been reached.
    pub fn admit(&mut self, item: WorkItem) {
        let class = item.class();
        let at_cap = self.levels.len() >= self.max_levels;

        match class {
            ItemClass::Foreground => match self.levels.back_mut() {
                Some(top) if at_cap || compatible(top, class) => top.push_back(item),
                _ => {
                    debug!(id = item.id(), levels = self.levels.len() + 1, "opening new top level");
                    self.levels.push_back(Level::from([item]));
                }
            },
            ItemClass::Background => match self.levels.front_mut() {
                Some(bottom) if at_cap || compatible(bottom, class) => bottom.push_back(item),
                _ => {
                    debug!(id = item.id(), levels = self.levels.len() + 1, "opening new bottom level");
                    self.levels.push_front(Level::from([item]));
                    // Keep the cursor on the level it pointed at
                    self.cursor += 1;
                    self.clamp_cursor();
                }
            },
        }
    }

    /// Pop the front of the most-preferred non-empty level
    pub fn remove_next(&mut self) -> Option<WorkItem> {
        let index = self.levels.iter().rposition(|level| !level.is_empty())?;
        let item = self.levels[index].pop_front()?;
        self.compact();
        Some(item)
    }

    /// Age one item by one level
    ///
    /// Visits levels round-robin. A visit to a lower level moves its front
    /// item to the back of the level above and flags it as promoted; a visit
    /// to the top level does nothing. Never adds levels; returns the promoted
    /// id, if any.
    pub fn promote_step(&mut self) -> Option<WorkId> {
        let len = self.levels.len();
        let index = self.cursor % len;
        self.cursor = (index + 1) % len;

        if index + 1 == len {
            return None;
        }

        let mut item = self.levels[index].pop_front()?;
        item.mark_promoted();
        let id = item.id();
        self.levels[index + 1].push_back(item);
        trace!(id, from = index, to = index + 1, "promoted");

        if self.levels[index].is_empty() {
            self.compact();
        }
        Some(id)
    }

    /// Remove a specific item, searching foreground items before background ones
    pub fn take(&mut self, id: WorkId) -> Option<WorkItem> {
        let (level, slot) = self
            .position(id, ItemClass::Foreground)
            .or_else(|| self.position(id, ItemClass::Background))?;
        let item = self.levels[level].remove(slot)?;
        self.compact();
        Some(item)
    }

    pub fn contains(&self, id: WorkId) -> bool {
        self.levels
            .iter()
            .any(|level| level.iter().any(|item| item.id() == id))
    }

    /// Views of every level, bottom to top
    pub fn snapshot_order(&self) -> Vec<Vec<ItemView>> {
        self.levels
            .iter()
            .map(|level| level.iter().map(WorkItem::view).collect())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.levels.iter().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.iter().all(VecDeque::is_empty)
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    fn position(&self, id: WorkId, class: ItemClass) -> Option<(usize, usize)> {
        self.levels.iter().enumerate().find_map(|(level, items)| {
            items
                .iter()
                .position(|item| item.id() == id && item.class() == class)
                .map(|slot| (level, slot))
        })
    }

    /// Drop empty levels, keeping one level when nothing is left
    fn compact(&mut self) {
        let cursor = self.cursor;
        let mut index = 0;
        let mut dropped = 0;
        let mut dropped_before_cursor = 0;

        self.levels.retain(|level| {
            let keep = !level.is_empty();
            if !keep {
                dropped += 1;
                if index < cursor {
                    dropped_before_cursor += 1;
                }
            }
            index += 1;
            keep
        });

        if self.levels.is_empty() {
            self.levels.push_back(Level::new());
        }

        if dropped > 0 {
            self.cursor = cursor - dropped_before_cursor;
            self.clamp_cursor();
            debug!(dropped, levels = self.levels.len(), "merged empty levels");
        }
    }

    fn clamp_cursor(&mut self) {
        if self.cursor >= self.levels.len() {
            self.cursor = 0;
        }
    }
}

impl Default for ReadyStructure {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::types::Payload;

    fn fg(id: WorkId) -> WorkItem {
        WorkItem::new(id, ItemClass::Foreground, Payload::new("fg"))
    }

    fn bg(id: WorkId) -> WorkItem {
        WorkItem::new(id, ItemClass::Background, Payload::new("bg"))
    }

    fn ids(ready: &ReadyStructure) -> Vec<Vec<WorkId>> {
        ready
            .snapshot_order()
            .into_iter()
            .map(|level| level.into_iter().map(|v| v.id).collect())
            .collect()
    }

    #[test]
    fn test_empty_structure_has_one_level() {
        let mut ready = ReadyStructure::new();
        assert!(ready.is_empty());
        assert_eq!(ready.level_count(), 1);
        assert!(ready.remove_next().is_none());
        assert_eq!(ready.promote_step(), None);
    }

    #[test]
    fn test_foreground_then_background_splits_levels() {
        let mut ready = ReadyStructure::new();
        ready.admit(fg(0));
        ready.admit(bg(1));

        assert_eq!(ids(&ready), vec![vec![1], vec![0]]);
    }

    #[test]
    fn test_compatible_admits_append_in_place() {
        let mut ready = ReadyStructure::new();
        ready.admit(fg(0));
        ready.admit(bg(1));
        ready.admit(bg(2));
        ready.admit(fg(3));
        ready.admit(bg(4));
        ready.admit(fg(5));

        assert_eq!(ids(&ready), vec![vec![1, 2, 4], vec![0, 3, 5]]);
        assert_eq!(ready.len(), 6);
    }

    #[test]
    fn test_background_first_opens_top_level_for_foreground() {
        let mut ready = ReadyStructure::new();
        ready.admit(bg(0));
        ready.admit(fg(1));

        assert_eq!(ids(&ready), vec![vec![0], vec![1]]);
    }

    #[test]
    fn test_remove_next_prefers_top() {
        let mut ready = ReadyStructure::new();
        ready.admit(bg(0));
        ready.admit(fg(1));
        ready.admit(fg(2));

        assert_eq!(ready.remove_next().map(|i| i.id()), Some(1));
        assert_eq!(ready.remove_next().map(|i| i.id()), Some(2));
        assert_eq!(ready.level_count(), 1);
        assert_eq!(ready.remove_next().map(|i| i.id()), Some(0));
        assert!(ready.remove_next().is_none());
        assert_eq!(ready.level_count(), 1);
    }

    #[test]
    fn test_promote_moves_front_item_up_and_flags_it() {
        let mut ready = ReadyStructure::new();
        ready.admit(fg(0));
        ready.admit(bg(1));
        ready.admit(bg(2));

        // Cursor stayed on the old level, which is now the top
        assert_eq!(ready.promote_step(), None);
        assert_eq!(ready.promote_step(), Some(1));
        assert_eq!(ids(&ready), vec![vec![2], vec![0, 1]]);

        let top = ready.snapshot_order().pop().unwrap();
        assert!(!top[0].promoted);
        assert!(top[1].promoted);
    }

    #[test]
    fn test_promote_drains_level_and_merges() {
        let mut ready = ReadyStructure::new();
        ready.admit(fg(0));
        ready.admit(bg(1));

        assert_eq!(ready.promote_step(), None);
        assert_eq!(ready.promote_step(), Some(1));
        assert_eq!(ids(&ready), vec![vec![0, 1]]);
        assert_eq!(ready.level_count(), 1);

        // Single level: nothing left to promote
        assert_eq!(ready.promote_step(), None);
    }

    #[test]
    fn test_foreground_opens_new_top_over_mixed_level() {
        let mut ready = ReadyStructure::new();
        ready.admit(fg(0));
        ready.admit(bg(1));
        ready.admit(bg(2));
        ready.promote_step();
        ready.promote_step(); // 1 joins the top level

        ready.admit(fg(3));
        assert_eq!(ids(&ready), vec![vec![2], vec![0, 1], vec![3]]);
    }

    #[test]
    fn test_level_cap_appends_in_place() {
        let mut ready = ReadyStructure::with_max_levels(1);
        ready.admit(fg(0));
        ready.admit(bg(1));
        ready.admit(fg(2));

        assert_eq!(ids(&ready), vec![vec![0, 1, 2]]);
        assert_eq!(ready.level_count(), 1);
    }

    #[test]
    fn test_take_removes_and_compacts() {
        let mut ready = ReadyStructure::new();
        ready.admit(fg(0));
        ready.admit(bg(1));

        let item = ready.take(1).unwrap();
        assert_eq!(item.class(), ItemClass::Background);
        assert_eq!(ids(&ready), vec![vec![0]]);
        assert!(ready.take(1).is_none());
        assert!(!ready.contains(1));
        assert!(ready.contains(0));
    }

    #[test]
    fn test_round_robin_cursor_visits_every_level() {
        let mut ready = ReadyStructure::new();
        ready.admit(fg(0));
        ready.admit(bg(1));
        ready.admit(bg(2));
        ready.promote_step();
        ready.promote_step();
        ready.admit(fg(3));
        ready.admit(bg(4));
        assert_eq!(ids(&ready), vec![vec![2, 4], vec![0, 1], vec![3]]);

        assert_eq!(ready.promote_step(), Some(0));
        assert_eq!(ready.promote_step(), None); // top
        assert_eq!(ready.promote_step(), Some(2));
        assert_eq!(ready.promote_step(), Some(1));
        assert_eq!(ids(&ready), vec![vec![4], vec![2], vec![3, 0, 1]]);

        assert_eq!(ready.promote_step(), None); // top
        assert_eq!(ready.promote_step(), Some(4));
        assert_eq!(ids(&ready), vec![vec![2, 4], vec![3, 0, 1]]);
    }
}
