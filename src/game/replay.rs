//! Match Transcript & Replay
//!
//! A transcript is everything needed to reproduce a match bit for bit:
//! the config (which carries the seed) and the raw output of every player
//! for every round. Replaying it must yield the same frames and the same
//! state hash as the live run.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::core::hash::{hash_frame_lines, StateHash};
use crate::game::config::{ConfigError, RefereeConfig};
use crate::game::round::{step, PlayerOutput, RoundResult};
use crate::game::state::MatchState;

/// Current transcript format version.
pub const TRANSCRIPT_VERSION: u8 = 1;

/// Recorded match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchTranscript {
    /// Format version.
    pub version: u8,
    /// Session config, seed included.
    pub config: RefereeConfig,
    /// Player outputs, one entry per round, indexed by player.
    pub rounds: Vec<Vec<PlayerOutput>>,
    /// State hash after the last recorded round.
    pub final_state_hash: Option<StateHash>,
}

/// Errors reading or replaying a transcript.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranscriptError {
    /// JSON could not be decoded.
    #[error("transcript decoding failed: {0}")]
    Deserialization(String),
    /// Transcript written by another format version.
    #[error("transcript version mismatch: expected {expected}, got {got}")]
    VersionMismatch {
        /// Version this build reads.
        expected: u8,
        /// Version found.
        got: u8,
    },
    /// Recorded config is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl MatchTranscript {
    /// Start an empty transcript.
    pub fn new(config: RefereeConfig) -> Self {
        Self {
            version: TRANSCRIPT_VERSION,
            config,
            rounds: Vec::new(),
            final_state_hash: None,
        }
    }

    /// Append one round of player outputs.
    pub fn record_round(&mut self, outputs: Vec<PlayerOutput>) {
        self.rounds.push(outputs);
    }

    /// Seal the transcript with the live run's final hash.
    pub fn finalize(&mut self, state_hash: StateHash) {
        self.final_state_hash = Some(state_hash);
    }

    /// Check if transcript is complete.
    pub fn is_complete(&self) -> bool {
        self.final_state_hash.is_some()
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON, rejecting other versions.
    pub fn from_json(json: &str) -> Result<Self, TranscriptError> {
        let transcript: Self = serde_json::from_str(json)
            .map_err(|e| TranscriptError::Deserialization(e.to_string()))?;

        if transcript.version != TRANSCRIPT_VERSION {
            return Err(TranscriptError::VersionMismatch {
                expected: TRANSCRIPT_VERSION,
                got: transcript.version,
            });
        }

        Ok(transcript)
    }
}

/// Result of a replay.
#[derive(Debug)]
pub struct ReplayOutcome {
    /// State after the last replayed round.
    pub state: MatchState,
    /// Every frame line, initial snapshot first.
    pub frames: Vec<String>,
    /// Per-round summaries.
    pub results: Vec<RoundResult>,
    /// Hash of `frames`.
    pub frame_hash: StateHash,
    /// Hash of `state`.
    pub state_hash: StateHash,
}

impl ReplayOutcome {
    /// True if the replay reproduced the recorded final hash.
    ///
    /// A transcript without a recorded hash never matches.
    pub fn matches(&self, transcript: &MatchTranscript) -> bool {
        transcript.final_state_hash == Some(self.state_hash)
    }
}

/// Re-run a transcript from its seed.
///
/// Stops early if the game ends or the config's round cap is reached.
pub fn replay_match(transcript: &MatchTranscript) -> Result<ReplayOutcome, TranscriptError> {
    let mut state = MatchState::new(transcript.config.clone())?;
    let mut frames = state.frames.lines().to_vec();
    let mut results = Vec::with_capacity(transcript.rounds.len());

    for outputs in &transcript.rounds {
        if state.round >= transcript.config.max_rounds {
            break;
        }

        let result = step(&mut state, outputs);
        frames.extend(state.frames.lines().iter().cloned());
        let over = result.game_over;
        results.push(result);
        if over {
            break;
        }
    }

    let frame_hash = hash_frame_lines(frames.iter().map(String::as_str));
    let state_hash = state.compute_hash();
    debug!(rounds = results.len(), state_hash = %hex::encode(state_hash), "Replay finished");

    Ok(ReplayOutcome {
        state,
        frames,
        results,
        frame_hash,
        state_hash,
    })
}
