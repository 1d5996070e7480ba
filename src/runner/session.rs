//! Match Session
//!
//! Drives a referee session against a set of bots. Bots are queried
//! concurrently each round, but their output is applied in player order,
//! so the outcome depends only on what they answered, never on when.

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::core::hash::hash_frame_lines;
use crate::game::config::{ConfigError, RefereeConfig};
use crate::game::replay::MatchTranscript;
use crate::game::round::{is_game_over, step, PlayerOutput, RoundResult};
use crate::game::state::MatchState;
use crate::protocol::view::{input_for_player, view_init_lines};
use crate::runner::bot::BotClient;

/// Errors building a session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Config rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// One bot is needed per player.
    #[error("expected {expected} bots, got {got}")]
    BotCount {
        /// Configured player count.
        expected: usize,
        /// Bots supplied.
        got: usize,
    },
}

/// Final standings of a finished session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    /// Session seed.
    pub seed: u64,
    /// Rounds played.
    pub rounds: u32,
    /// Score per player.
    pub scores: Vec<i32>,
    /// Opponents each player scored at least as much as.
    pub ranking_points: Vec<u32>,
    /// Players eliminated before the end.
    pub eliminated: Vec<usize>,
    /// Whether the game ended before the round cap.
    pub game_over: bool,
    /// Hex state hash at the end.
    pub state_hash: String,
    /// Hex hash of every frame line.
    pub frame_hash: String,
}

/// One referee session and its bots.
pub struct MatchSession {
    state: MatchState,
    bots: Vec<Box<dyn BotClient>>,
    transcript: MatchTranscript,
    frames: Vec<String>,
    results: Vec<RoundResult>,
}

impl MatchSession {
    /// Build a session. `bots[i]` plays seat `i`.
    pub fn new(config: RefereeConfig, bots: Vec<Box<dyn BotClient>>) -> Result<Self, SessionError> {
        config.validate()?;
        if bots.len() != config.player_count {
            return Err(SessionError::BotCount {
                expected: config.player_count,
                got: bots.len(),
            });
        }

        let transcript = MatchTranscript::new(config.clone());
        let state = MatchState::new(config)?;
        let frames = state.frames.lines().to_vec();

        Ok(Self {
            state,
            bots,
            transcript,
            frames,
            results: Vec::new(),
        })
    }

    /// Current referee state.
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// Recorded outputs so far.
    pub fn transcript(&self) -> &MatchTranscript {
        &self.transcript
    }

    /// Every frame line so far, initial snapshot first.
    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    /// Per-round summaries.
    pub fn results(&self) -> &[RoundResult] {
        &self.results
    }

    /// Play until the game ends or the round cap is reached.
    pub async fn run(&mut self) -> MatchSummary {
        let init = view_init_lines(&self.state);
        for bot in &mut self.bots {
            bot.init(&init);
        }

        info!(
            seed = self.state.config.seed,
            players = self.state.player_count(),
            "Match started"
        );

        while self.state.round < self.state.config.max_rounds && !is_game_over(&self.state) {
            self.play_round().await;
        }

        self.transcript.finalize(self.state.compute_hash());
        let summary = self.summary();
        info!(
            rounds = summary.rounds,
            scores = ?summary.scores,
            state_hash = %summary.state_hash,
            "Match finished"
        );
        summary
    }

    /// Collect output from every living bot and play one round.
    pub async fn play_round(&mut self) -> RoundResult {
        let outputs = self.collect_outputs().await;
        let result = step(&mut self.state, &outputs);
        self.frames.extend(self.state.frames.lines().iter().cloned());
        self.transcript.record_round(outputs);
        self.results.push(result.clone());
        result
    }

    async fn collect_outputs(&mut self) -> Vec<PlayerOutput> {
        let budget = self.state.config.response_timeout;
        let round = self.state.round;
        let inputs: Vec<Option<Vec<String>>> = (0..self.state.player_count())
            .map(|p| (!self.state.players[p].dead).then(|| input_for_player(&self.state, p)))
            .collect();

        let pending = self
            .bots
            .iter_mut()
            .zip(inputs)
            .enumerate()
            .map(|(player, (bot, input))| async move {
                let Some(input) = input else {
                    return PlayerOutput::Skipped;
                };

                let answer = timeout(budget, bot.respond(&input)).await;
                match answer {
                    Ok(Ok(lines)) => PlayerOutput::Lines(lines),
                    Ok(Err(err)) => {
                        warn!(player, round, bot = bot.name(), error = %err, "Bot failed");
                        PlayerOutput::Timeout
                    }
                    Err(_) => {
                        warn!(player, round, bot = bot.name(), "Bot response timed out");
                        PlayerOutput::Timeout
                    }
                }
            });

        join_all(pending).await
    }

    /// Standings as of now.
    pub fn summary(&self) -> MatchSummary {
        let scores: Vec<i32> = self.state.players.iter().map(|p| p.score).collect();
        let ranking_points = scores
            .iter()
            .enumerate()
            .map(|(i, own)| {
                scores
                    .iter()
                    .enumerate()
                    .filter(|&(j, other)| j != i && own >= other)
                    .count() as u32
            })
            .collect();

        MatchSummary {
            seed: self.state.config.seed,
            rounds: self.state.round,
            ranking_points,
            eliminated: self
                .state
                .players
                .iter()
                .filter(|p| p.dead)
                .map(|p| p.index)
                .collect(),
            game_over: is_game_over(&self.state),
            state_hash: hex::encode(self.state.compute_hash()),
            frame_hash: hex::encode(hash_frame_lines(self.frames.iter().map(String::as_str))),
            scores,
        }
    }
}
