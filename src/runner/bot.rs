//! Bot Clients
//!
//! A bot receives the viewer init lines once, then one view per round, and
//! answers with one command line per looter. Only in-process bots live
//! here; anything talking to an external process implements the same
//! trait.

use std::collections::VecDeque;
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt};
use thiserror::Error;

use crate::core::constants::*;
use crate::protocol::view::{PlayerView, ViewEntity, ViewParseError};

/// Bot communication failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BotError {
    /// The bot has nothing more to say.
    #[error("bot disconnected")]
    Disconnected,
    /// Reading or writing the bot failed.
    #[error("bot i/o error: {0}")]
    Io(String),
    /// The bot could not make sense of the view it was sent.
    #[error("unreadable view: {0}")]
    BadView(#[from] ViewParseError),
}

/// A player program.
pub trait BotClient: Send {
    /// Display name used in logs.
    fn name(&self) -> &str;

    /// Receive the viewer init lines before the first round.
    fn init(&mut self, _lines: &[String]) {}

    /// Answer one round's view with command lines.
    fn respond<'a>(&'a mut self, input: &'a [String]) -> BoxFuture<'a, Result<Vec<String>, BotError>>;
}

fn wait_lines() -> Vec<String> {
    vec!["WAIT".to_string(); LOOTER_COUNT]
}

/// Always waits.
#[derive(Debug, Default)]
pub struct WaitBot;

impl BotClient for WaitBot {
    fn name(&self) -> &str {
        "wait"
    }

    fn respond<'a>(&'a mut self, _input: &'a [String]) -> BoxFuture<'a, Result<Vec<String>, BotError>> {
        async { Ok::<_, BotError>(wait_lines()) }.boxed()
    }
}

/// Replays canned answers, then disconnects.
#[derive(Debug)]
pub struct ScriptedBot {
    name: String,
    responses: VecDeque<Vec<String>>,
    delay: Option<Duration>,
}

impl ScriptedBot {
    /// Bot answering with `responses` in order.
    pub fn new(name: impl Into<String>, responses: Vec<Vec<String>>) -> Self {
        Self {
            name: name.into(),
            responses: responses.into(),
            delay: None,
        }
    }

    /// Sleep before every answer.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl BotClient for ScriptedBot {
    fn name(&self) -> &str {
        &self.name
    }

    fn respond<'a>(&'a mut self, _input: &'a [String]) -> BoxFuture<'a, Result<Vec<String>, BotError>> {
        async move {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.responses.pop_front().ok_or(BotError::Disconnected)
        }
        .boxed()
    }
}

/// Greedy demo bot, good enough to drive a match.
///
/// The reaper goes for the nearest wreck and the destroyer rams the nearest
/// tanker. The doof waits.
#[derive(Debug)]
pub struct ChaserBot {
    player_count: usize,
}

impl Default for ChaserBot {
    fn default() -> Self {
        Self { player_count: 3 }
    }
}

impl ChaserBot {
    /// Bot for a three-player match until `init` says otherwise.
    pub fn new() -> Self {
        Self::default()
    }

    fn decide(&self, input: &[String]) -> Result<Vec<String>, BotError> {
        let view = PlayerView::parse(input, self.player_count)?;

        let mine = |tag: i32| view.entities.iter().find(|e| e.player == 0 && e.type_tag == tag);
        let nearest = |from: &ViewEntity, wanted: &dyn Fn(&ViewEntity) -> bool| {
            view.entities
                .iter()
                .filter(|&e| wanted(e))
                .min_by_key(|e| distance_sq(from, e))
        };
        let move_to = |target: &ViewEntity| -> String { format!("{} {} {}", target.x, target.y, MAX_THRUST) };

        let reaper = mine(TYPE_REAPER).and_then(|reaper| {
            nearest(reaper, &|e: &ViewEntity| e.type_tag == TYPE_WRECK).map(move_to)
        });

        let destroyer = mine(TYPE_DESTROYER).and_then(|destroyer| {
            nearest(destroyer, &|e: &ViewEntity| e.type_tag == TYPE_TANKER).map(move_to)
        });

        Ok([reaper, destroyer, None]
            .into_iter()
            .map(|line| line.unwrap_or_else(|| "WAIT".to_string()))
            .collect())
    }
}

fn distance_sq(a: &ViewEntity, b: &ViewEntity) -> i64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

impl BotClient for ChaserBot {
    fn name(&self) -> &str {
        "chaser"
    }

    fn init(&mut self, lines: &[String]) {
        if let Some(count) = lines.first().and_then(|l| l.trim().parse().ok()) {
            self.player_count = count;
        }
    }

    fn respond<'a>(&'a mut self, input: &'a [String]) -> BoxFuture<'a, Result<Vec<String>, BotError>> {
        let answer = self.decide(input);
        async move { answer }.boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::config::RefereeConfig;
    use crate::game::state::MatchState;
    use crate::protocol::command::parse_command;
    use crate::protocol::view::input_for_player;

    #[tokio::test]
    async fn test_wait_bot() {
        let mut bot = WaitBot;
        let lines = bot.respond(&[]).await.unwrap();
        assert_eq!(lines, ["WAIT", "WAIT", "WAIT"]);
    }

    #[tokio::test]
    async fn test_scripted_bot_disconnects_when_exhausted() {
        let mut bot = ScriptedBot::new("script", vec![vec!["WAIT".to_string(); 3]]);
        assert!(bot.respond(&[]).await.is_ok());
        assert_eq!(bot.respond(&[]).await, Err(BotError::Disconnected));
    }

    #[tokio::test]
    async fn test_chaser_output_parses() {
        let state = MatchState::new(RefereeConfig::default()).unwrap();
        let mut bot = ChaserBot::new();
        bot.init(&["3".to_string(), "6000".into(), "3000".into(), "3".into()]);

        let lines = bot.respond(&input_for_player(&state, 1)).await.unwrap();
        assert_eq!(lines.len(), LOOTER_COUNT);
        for line in &lines {
            assert!(parse_command(line).is_ok(), "unparsable {line:?}");
        }
        // No wrecks at the start, tankers always exist
        assert_eq!(lines[0], "WAIT");
        assert_ne!(lines[1], "WAIT");
        assert_eq!(lines[2], "WAIT");
    }

    #[tokio::test]
    async fn test_chaser_rejects_garbage() {
        let mut bot = ChaserBot::new();
        let err = bot.respond(&["nope".to_string()]).await.unwrap_err();
        assert!(matches!(err, BotError::BadView(_)));
        assert!(err.to_string().starts_with("unreadable view"));
    }
}
