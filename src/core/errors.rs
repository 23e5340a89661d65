/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use super::types::{Ticks, WorkId};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Scheduler-related errors with serialization support
///
/// Every variant is raised before any shared structure is touched, so a
/// failed call leaves the scheduler exactly as it found it.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SchedulerError {
    #[error("Work item {0} not found")]
    #[diagnostic(
        code(scheduler::unknown_id),
        help("The item may be sleeping, already dispatched, or never submitted.")
    )]
    UnknownId(WorkId),

    #[error("Invalid sleep duration: {0} ticks")]
    #[diagnostic(
        code(scheduler::invalid_duration),
        help("Sleep durations are counted in ticks and must be at least 1.")
    )]
    InvalidDuration(Ticks),

    #[error("Work item {0} is already sleeping")]
    #[diagnostic(
        code(scheduler::already_sleeping),
        help("Wait for the item to be released before putting it to sleep again.")
    )]
    AlreadySleeping(WorkId),
}

/// Command line parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum CommandError {
    #[error("Empty command")]
    #[diagnostic(code(command::empty), help("Write a command name after the '&' marker."))]
    Empty,

    #[error("Command '{verb}' is missing arguments (usage: {usage})")]
    #[diagnostic(code(command::missing_arguments))]
    MissingArguments { verb: String, usage: &'static str },

    #[error("Command '{verb}' takes no more than {expected} arguments")]
    #[diagnostic(code(command::too_many_arguments))]
    TooManyArguments { verb: String, expected: usize },

    #[error("Invalid number '{value}'")]
    #[diagnostic(
        code(command::invalid_number),
        help("Ids and tick counts are non-negative integers.")
    )]
    InvalidNumber { value: String },

    #[error("Control command '{0}' cannot run in the background")]
    #[diagnostic(
        code(command::not_backgroundable),
        help("Drop the leading '&' marker.")
    )]
    NotBackgroundable(String),
}

/// Payload execution errors
///
/// Collaborator-level faults: the core never inspects payloads, so these are
/// logged by the dispatcher and never reach the scheduler.
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum PayloadError {
    #[error("Unknown command: {0}")]
    #[diagnostic(
        code(payload::unknown_command),
        help("Built-in commands: echo, add, mul, fib, prime, spin.")
    )]
    UnknownCommand(String),

    #[error("{command}: expected {expected}")]
    #[diagnostic(code(payload::missing_argument))]
    MissingArgument {
        command: String,
        expected: &'static str,
    },

    #[error("{command}: invalid argument '{value}'")]
    #[diagnostic(code(payload::invalid_argument))]
    InvalidArgument { command: String, value: String },

    #[error("{command}: input {value} exceeds limit {limit}")]
    #[diagnostic(code(payload::limit_exceeded))]
    LimitExceeded {
        command: String,
        value: u64,
        limit: u64,
    },

    #[error("{0}: arithmetic overflow")]
    #[diagnostic(code(payload::overflow))]
    Overflow(String),
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {key}: {reason}")]
    #[diagnostic(
        code(config::invalid_value),
        help("Unset the variable to fall back to the default.")
    )]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Unified error type with miette diagnostics
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    #[error("Scheduler error: {0}")]
    #[diagnostic(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error("Command error: {0}")]
    #[diagnostic(transparent)]
    Command(#[from] CommandError),

    #[error("Payload error: {0}")]
    #[diagnostic(transparent)]
    Payload(#[from] PayloadError),

    #[error("Configuration error: {0}")]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    #[diagnostic(
        code(dqsched::io_error),
        help("Check that the command script exists and is readable.")
    )]
    Io(#[from] std::io::Error),
}

/// Crate-wide result type
pub type Result<T> = std::result::Result<T, Error>;
