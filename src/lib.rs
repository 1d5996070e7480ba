//! # MeanMax Referee
//!
//! Deterministic physics referee for the three-player MeanMax arena.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    MEANMAX REFEREE                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                 │
//! │  ├── point.rs    - Geometry and rounding                    │
//! │  ├── rng.rs      - Seeded Xorshift128+ PRNG                 │
//! │  ├── id.rs       - Entity id allocation                     │
//! │  └── hash.rs     - State hashing for verification           │
//! │                                                             │
//! │  game/           - Simulation (deterministic)               │
//! │  ├── state.rs    - Match state and map generation           │
//! │  ├── input.rs    - Applying looter commands                 │
//! │  ├── round.rs    - Per-round state transition               │
//! │  ├── collision.rs- Continuous collisions and impulses       │
//! │  ├── skill.rs    - Skills and area effects                  │
//! │  └── replay.rs   - Transcripts and replay                   │
//! │                                                             │
//! │  protocol/       - Text codecs                              │
//! │  ├── command.rs  - Looter command grammar                   │
//! │  ├── view.rs     - Per-player state lines                   │
//! │  └── frame.rs    - Frame replay records                     │
//! │                                                             │
//! │  runner/         - Bot orchestration (async)                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! Everything under `core/`, `game/` and `protocol/` is a pure function of
//! the seed and the players' output lines:
//! - All randomness comes from one seeded Xorshift128+ generator
//! - No system time, no hash-ordered containers
//! - Simultaneous events are totally ordered (collision time, unit index,
//!   skill order, effect id)
//!
//! Replaying a [`MatchTranscript`] reproduces every frame line and the
//! final state hash.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod protocol;
pub mod runner;

// Re-export commonly used types
pub use core::point::Point;
pub use core::rng::DeterministicRng;
pub use game::config::RefereeConfig;
pub use game::replay::{replay_match, MatchTranscript};
pub use game::round::{step, PlayerOutput, RoundResult};
pub use game::state::MatchState;
pub use runner::{BotClient, MatchSession, MatchSummary};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
