//! Game Logic Module
//!
//! All simulation code. Deterministic given a seed and the players' output.
//!
//! ## Module Structure
//!
//! - `config`: Session configuration
//! - `unit`, `wreck`, `player`: Entity model
//! - `skill`: Skill casting and area effects
//! - `collision`: Continuous collision detection and impulses
//! - `state`: Match state, map generation, tanker spawning
//! - `input`: Applying player commands to looters
//! - `round`: The per-round state transition
//! - `replay`: Transcripts and deterministic replay

pub mod config;
pub mod unit;
pub mod wreck;
pub mod player;
pub mod skill;
pub mod collision;
pub mod state;
pub mod input;
pub mod round;
pub mod replay;

// Re-export key types
pub use config::{ConfigError, RefereeConfig};
pub use unit::{Action, Looter, LooterKind, Tanker, Unit, UnitKind};
pub use wreck::Wreck;
pub use player::Player;
pub use skill::{EffectKind, SkillEffect, SkillResult};
pub use state::MatchState;
pub use round::{step, PlayerOutput, RoundResult};
pub use replay::{replay_match, MatchTranscript, ReplayOutcome, TranscriptError};
