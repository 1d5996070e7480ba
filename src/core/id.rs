//! Entity Id Allocation
//!
//! Units, wrecks and skill effects share one id space per session.

use serde::{Serialize, Deserialize};

/// Identifier of any simulated entity.
pub type EntityId = u32;

/// Monotonic id source owned by a single simulation session.
///
/// A fresh allocator starts at zero, so two sessions built from the same
/// seed hand out identical ids.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct IdAllocator {
    next: EntityId,
}

impl IdAllocator {
    /// Create an allocator whose first id is 0.
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// Issue the next id.
    #[inline]
    pub fn allocate(&mut self) -> EntityId {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Number of ids issued so far.
    pub fn issued(&self) -> u32 {
        self.next
    }
}
