//! Core deterministic primitives.
//!
//! Geometry, seeded randomness, id allocation and state hashing shared by
//! the simulation and the codecs.

pub mod constants;
pub mod point;
pub mod rng;
pub mod id;
pub mod hash;

// Re-export core types
pub use point::Point;
pub use rng::DeterministicRng;
pub use id::{EntityId, IdAllocator};
pub use hash::{StateHash, StateHasher};
