//! Players
//!
//! Score, rage and the looters a player commands.

use serde::{Serialize, Deserialize};

use crate::core::constants::{LOOTER_COUNT, MAX_RAGE};
use crate::core::id::EntityId;
use crate::game::unit::LooterKind;

/// A pending tanker spawn drawn from the shared pool.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TankerSpawn {
    /// Tanker capacity in [TANKER_MIN_SIZE, TANKER_MAX_SIZE).
    pub size: i32,
    /// Fraction of the player's angular sector, in [0, 1).
    pub angle: f64,
}

/// State of a single player in the match.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Player {
    /// Seat index (0-based).
    pub index: usize,
    /// Water harvested.
    pub score: i32,
    /// Skill resource, in [0, MAX_RAGE].
    pub rage: i32,
    /// Unit ids of the Reaper, Destroyer and Doof, in that order.
    pub looters: [EntityId; LOOTER_COUNT],
    /// Eliminated by a protocol violation or timeout.
    pub dead: bool,
}

impl Player {
    /// Create a player owning the given looters.
    pub fn new(index: usize, looters: [EntityId; LOOTER_COUNT]) -> Self {
        Self {
            index,
            score: 0,
            rage: 0,
            looters,
            dead: false,
        }
    }

    /// Unit id of one of this player's looters.
    #[inline]
    pub fn looter_id(&self, kind: LooterKind) -> EntityId {
        self.looters[kind.index()]
    }

    /// Eliminate the player. Its units stay in the arena.
    pub fn kill(&mut self) {
        self.dead = true;
    }

    /// Add rage, clamped to the cap.
    pub fn gain_rage(&mut self, amount: i32) {
        self.rage = (self.rage + amount).min(MAX_RAGE);
    }
}
