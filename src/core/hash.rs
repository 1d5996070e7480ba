//! State Hashing for Verification
//!
//! Provides deterministic hashing of referee state for:
//! - Replay validation (recorded transcript vs. re-run)
//! - Cross-run determinism checks
//!
//! Floats are hashed by bit pattern, so two states only hash equal when
//! every coordinate is bit-identical.

use sha2::{Sha256, Digest};
use super::point::Point;

/// Hash output type (256 bits / 32 bytes)
pub type StateHash = [u8; 32];

/// Deterministic hasher for referee state.
///
/// Wraps SHA-256 with helpers for the simulation's value types.
/// Order of updates is critical for determinism.
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Create a new hasher with domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for match state.
    pub fn for_match_state() -> Self {
        Self::new(b"MEANMAX_STATE_V1")
    }

    /// Create hasher for frame streams.
    pub fn for_frames() -> Self {
        Self::new(b"MEANMAX_FRAMES_V1")
    }

    /// Update with raw bytes.
    #[inline]
    pub fn update_bytes(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    /// Update with a u32 value (little-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a u64 value (little-endian).
    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with an i32 value (little-endian).
    #[inline]
    pub fn update_i32(&mut self, value: i32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with an f64 by bit pattern.
    #[inline]
    pub fn update_f64(&mut self, value: f64) {
        self.update_u64(value.to_bits());
    }

    /// Update with a point.
    #[inline]
    pub fn update_point(&mut self, value: &Point) {
        self.update_f64(value.x);
        self.update_f64(value.y);
    }

    /// Update with a boolean.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.hasher.update([value as u8]);
    }

    /// Update with a length-prefixed string.
    pub fn update_str(&mut self, value: &str) {
        self.update_u32(value.len() as u32);
        self.update_bytes(value.as_bytes());
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> StateHash {
        self.hasher.finalize().into()
    }
}

/// Hash a sequence of frame lines.
pub fn hash_frame_lines<'a, I>(lines: I) -> StateHash
where
    I: IntoIterator<Item = &'a str>,
{
    let mut hasher = StateHasher::for_frames();
    for line in lines {
        hasher.update_str(line);
    }
    hasher.finalize()
}

// =============================================================================
// TESTS
// =============================================================================
