//! Bot orchestration. The only async code in the crate.

pub mod bot;
pub mod session;

pub use bot::{BotClient, BotError, ChaserBot, ScriptedBot, WaitBot};
pub use session::{MatchSession, MatchSummary, SessionError};
