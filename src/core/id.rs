/*!
 * ID Generation
 * Monotonic work item identifiers
 */

use super::types::WorkId;

/// Generic ID generator interface
pub trait IdGenerator<T> {
    /// Generate next ID
    fn next(&mut self) -> T;

    /// Get the ID the next call will hand out (for debugging)
    fn current(&self) -> T;
}

/// Plain counter for work item IDs
///
/// Lives inside the scheduler's critical section, so no atomics are needed:
/// issuance is serialized with the structures that hold the items.
/// IDs are never recycled.
#[derive(Debug, Clone, Default)]
pub struct SequentialGenerator {
    counter: WorkId,
}

impl SequentialGenerator {
    /// Create new generator starting at given value
    #[inline]
    pub const fn new(start: WorkId) -> Self {
        Self { counter: start }
    }
}

impl IdGenerator<WorkId> for SequentialGenerator {
    #[inline]
    fn next(&mut self) -> WorkId {
        let id = self.counter;
        self.counter += 1;
        id
    }

    #[inline]
    fn current(&self) -> WorkId {
        self.counter
    }
}
