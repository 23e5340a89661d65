/*!
 * Process Types
 * Work items and the read-only views handed to collaborators
 */

use crate::core::types::{Ticks, WorkId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Foreground (interactive) or background (detached) work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemClass {
    Foreground,
    Background,
}

impl ItemClass {
    /// Single-letter tag used in reports
    #[inline(always)]
    pub const fn tag(&self) -> char {
        match self {
            Self::Foreground => 'F',
            Self::Background => 'B',
        }
    }

    #[inline(always)]
    pub const fn is_foreground(&self) -> bool {
        matches!(self, Self::Foreground)
    }
}

/// Item lifecycle state as observed through the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
    /// Queued in the ready structure
    Ready,
    /// Counting down in the wait set
    Sleeping,
    /// Dispatched foreground work, executing synchronously
    Running,
    /// Dispatched background work, executing on a worker
    Detached,
}

/// Opaque command description carried by a work item
///
/// The scheduler never looks inside; only the dispatcher interprets it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub command: String,
    pub args: Vec<String>,
}

impl Payload {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.command.is_empty()
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// The schedulable unit
///
/// Class and id are fixed at creation. `promoted` and `remaining_ticks` are
/// only changed by the ready structure and the wait set respectively.
#[derive(Debug)]
pub struct WorkItem {
    id: WorkId,
    class: ItemClass,
    payload: Payload,
    promoted: bool,
    remaining_ticks: Ticks,
}

impl WorkItem {
    pub fn new(id: WorkId, class: ItemClass, payload: Payload) -> Self {
        Self {
            id,
            class,
            payload,
            promoted: false,
            remaining_ticks: 0,
        }
    }

    #[inline]
    pub fn id(&self) -> WorkId {
        self.id
    }

    #[inline]
    pub fn class(&self) -> ItemClass {
        self.class
    }

    #[inline]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    #[inline]
    pub fn promoted(&self) -> bool {
        self.promoted
    }

    #[inline]
    pub fn remaining_ticks(&self) -> Ticks {
        self.remaining_ticks
    }

    pub fn into_payload(self) -> Payload {
        self.payload
    }

    pub fn view(&self) -> ItemView {
        ItemView {
            id: self.id,
            class: self.class,
            promoted: self.promoted,
            remaining_ticks: self.remaining_ticks,
            payload: self.payload.clone(),
        }
    }

    pub(crate) fn mark_promoted(&mut self) {
        self.promoted = true;
    }

    pub(crate) fn set_remaining(&mut self, ticks: Ticks) {
        self.remaining_ticks = ticks;
    }

    /// Count one tick down, returning what is left
    pub(crate) fn tick_down(&mut self) -> Ticks {
        self.remaining_ticks = self.remaining_ticks.saturating_sub(1);
        self.remaining_ticks
    }
}

/// Read-only copy of a work item for reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemView {
    pub id: WorkId,
    pub class: ItemClass,
    pub promoted: bool,
    pub remaining_ticks: Ticks,
    pub payload: Payload,
}

impl fmt::Display for ItemView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}][{}]", self.id, self.class.tag())?;
        if self.promoted {
            f.write_str("[*]")?;
        }
        Ok(())
    }
}
