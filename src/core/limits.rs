/*!
 * Limits and Defaults
 *
 * Centralized location for scheduler-wide limits, thresholds and defaults.
 */

use std::time::Duration;

// =============================================================================
// READY STRUCTURE
// =============================================================================

/// Default cap on the number of ready levels
/// Beyond this, admits append in place instead of opening a new level
pub const DEFAULT_MAX_LEVELS: usize = 8;

/// A ready structure always keeps at least one level
pub const MIN_LEVELS: usize = 1;

// =============================================================================
// TIMER
// =============================================================================

/// Default period of one logical tick
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(1000);

/// Shortest accepted tick period
pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

/// Default pacing between script lines fed to the dispatcher
pub const DEFAULT_SUBMIT_DELAY: Duration = Duration::ZERO;

// =============================================================================
// BUILT-IN PAYLOADS
// =============================================================================

/// Largest `fib` input whose result fits in a u64
pub const MAX_FIB_INPUT: u64 = 93;

/// Upper bound for the `prime` sieve
pub const MAX_PRIME_INPUT: u64 = 10_000_000;

/// Longest busy-wait accepted by `spin`
pub const MAX_SPIN_MILLIS: u64 = 10_000;
