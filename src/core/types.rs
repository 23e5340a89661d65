/*!
 * Core Types
 * Common types used across the scheduler
 */

use super::errors::SchedulerError;

/// Work item identifier (assigned at submission, never reused)
pub type WorkId = u64;

/// Logical time unit used by sleep countdowns and the periodic heartbeat
pub type Ticks = u32;

/// Result type for core scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;
