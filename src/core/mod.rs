/*!
 * Core Module
 * Fundamental scheduler types, configuration and error handling
 */

pub mod config;
pub mod errors;
pub mod id;
pub mod limits;
pub mod types;

// Re-export for convenience
pub use config::{Config, ReportMode};
pub use errors::*;
pub use id::{IdGenerator, SequentialGenerator};
pub use types::*;
