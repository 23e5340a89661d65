/*!
 * Process Module
 * Work items, scheduling, the periodic monitor and command dispatch
 */

pub mod command;
pub mod dispatcher;
pub mod executor;
pub mod scheduler;
pub mod scheduler_task;
pub mod types;

// Re-export for convenience
pub use command::Command;
pub use dispatcher::{Accepted, Dispatched, Dispatcher};
pub use executor::{BuiltinRunner, PayloadRunner};
pub use scheduler::{
    ReadyStructure, Scheduler, SchedulerStats, Snapshot, TickOutcome, WaitSet,
};
pub use scheduler_task::{MonitorCommand, MonitorTask};
pub use types::{ItemClass, ItemState, ItemView, Payload, WorkItem};
