/*!
 * dqsched
 * Dynamic-queue shell scheduler simulation exposed as a library
 */

pub mod core;
pub mod monitoring;
pub mod process;

// Re-exports
pub use crate::core::{Config, Error, ReportMode, Result, SchedulerError, Ticks, WorkId};
pub use crate::monitoring::{init_tracing, ReportSink};
pub use crate::process::{
    Dispatcher, ItemClass, ItemState, MonitorTask, Payload, ReadyStructure, Scheduler, Snapshot,
    WaitSet, WorkItem,
};
