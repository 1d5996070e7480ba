//! Looter Command Grammar
//!
//! One line per looter per round:
//!
//! ```text
//! WAIT [message]
//! <x> <y> <power> [message]
//! SKILL <x> <y> [message]
//! ```
//!
//! Keywords are case-insensitive. Coordinates are integers of up to nine
//! digits and may be negative; power is a non-negative integer.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use thiserror::Error;

use crate::game::unit::LooterKind;

/// Expected-format hint carried by protocol errors.
pub const EXPECTED: &str = "<x> <y> <power> | SKILL <x> <y> | WAIT";

/// Longest message kept verbatim.
pub const MAX_MESSAGE_LEN: usize = 19;

/// Characters kept when a message is cut.
const TRUNCATED_MESSAGE_LEN: usize = 17;

static WAIT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^WAIT(?:\s+(?P<message>.+))?$").expect("valid WAIT pattern")
});

static MOVE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<x>-?[0-9]{1,9})\s+(?P<y>-?[0-9]{1,9})\s+(?P<power>[0-9]{1,9})(?:\s+(?P<message>.+))?$")
        .expect("valid MOVE pattern")
});

static SKILL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^SKILL\s+(?P<x>-?[0-9]{1,9})\s+(?P<y>-?[0-9]{1,9})(?:\s+(?P<message>.+))?$")
        .expect("valid SKILL pattern")
});

/// A decoded looter command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Do nothing.
    Wait {
        /// Optional truncated message.
        message: Option<String>,
    },
    /// Thrust towards (x, y).
    Move {
        /// Target X.
        x: i32,
        /// Target Y.
        y: i32,
        /// Requested power, not yet clamped.
        power: i32,
        /// Optional truncated message.
        message: Option<String>,
    },
    /// Cast the looter's skill at (x, y).
    Skill {
        /// Target X.
        x: i32,
        /// Target Y.
        y: i32,
        /// Optional truncated message.
        message: Option<String>,
    },
}

/// Unrecoverable player output error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// A line matched none of the command forms.
    #[error("Invalid input. Expected {expected} but found '{line}'")]
    InvalidCommand {
        /// Accepted forms.
        expected: &'static str,
        /// Offending line.
        line: String,
    },

    /// Fewer lines than looters.
    #[error("Missing command for {looter:?}")]
    MissingLine {
        /// Looter left without a command.
        looter: LooterKind,
    },
}

/// Cut a message longer than `MAX_MESSAGE_LEN` characters to 17 plus an ellipsis.
pub fn truncate_message(message: &str) -> String {
    if message.chars().count() > MAX_MESSAGE_LEN {
        let mut cut: String = message.chars().take(TRUNCATED_MESSAGE_LEN).collect();
        cut.push_str("...");
        cut
    } else {
        message.to_string()
    }
}

fn message(caps: &Captures<'_>) -> Option<String> {
    caps.name("message").map(|m| truncate_message(m.as_str()))
}

fn int(caps: &Captures<'_>, name: &str, line: &str) -> Result<i32, ProtocolError> {
    caps.name(name)
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| invalid(line))
}

fn invalid(line: &str) -> ProtocolError {
    ProtocolError::InvalidCommand {
        expected: EXPECTED,
        line: line.to_string(),
    }
}

/// Decode one looter line. Forms are tried in WAIT, move, SKILL order.
pub fn parse_command(line: &str) -> Result<Command, ProtocolError> {
    let line = line.trim_end_matches(['\r', '\n']);

    if let Some(caps) = WAIT_PATTERN.captures(line) {
        return Ok(Command::Wait { message: message(&caps) });
    }

    if let Some(caps) = MOVE_PATTERN.captures(line) {
        return Ok(Command::Move {
            x: int(&caps, "x", line)?,
            y: int(&caps, "y", line)?,
            power: int(&caps, "power", line)?,
            message: message(&caps),
        });
    }

    if let Some(caps) = SKILL_PATTERN.captures(line) {
        return Ok(Command::Skill {
            x: int(&caps, "x", line)?,
            y: int(&caps, "y", line)?,
            message: message(&caps),
        });
    }

    Err(invalid(line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_wait() {
        assert_eq!(parse_command("WAIT"), Ok(Command::Wait { message: None }));
        assert_eq!(
            parse_command("wait  hello there"),
            Ok(Command::Wait { message: Some("hello there".into()) })
        );
    }

    #[test]
    fn test_move() {
        assert_eq!(
            parse_command("-100 2500 300 go"),
            Ok(Command::Move { x: -100, y: 2500, power: 300, message: Some("go".into()) })
        );
        // Power is clamped later, not rejected
        assert_eq!(
            parse_command("0 0 999999999"),
            Ok(Command::Move { x: 0, y: 0, power: 999_999_999, message: None })
        );
    }

    #[test]
    fn test_skill_is_case_insensitive() {
        assert_eq!(
            parse_command("skill 0 -0"),
            Ok(Command::Skill { x: 0, y: 0, message: None })
        );
        assert_eq!(
            parse_command("SKILL 10 20 boom"),
            Ok(Command::Skill { x: 10, y: 20, message: Some("boom".into()) })
        );
    }

    #[test]
    fn test_rejects_malformed() {
        for line in ["foo", "", "1 2", "1 2 -3", "1234567890 0 10", "SKILL 1", "WAITING", " WAIT"] {
            assert!(
                matches!(parse_command(line), Err(ProtocolError::InvalidCommand { .. })),
                "accepted {line:?}"
            );
        }
    }

    #[test]
    fn test_trailing_newline_ignored() {
        assert_eq!(parse_command("WAIT\r\n"), Ok(Command::Wait { message: None }));
    }

    #[test]
    fn test_message_truncation() {
        assert_eq!(truncate_message("exactly-nineteen-ch"), "exactly-nineteen-ch");
        assert_eq!(truncate_message("twenty characters!!!"), "twenty characters...");
        assert_eq!(truncate_message("this one is definitely too long"), "this one is defin...");

        assert_eq!(
            parse_command("WAIT abcdefghijklmnopqrstuvwxyz"),
            Ok(Command::Wait { message: Some("abcdefghijklmnopq...".to_string()) })
        );
    }

    #[test]
    fn test_error_message_names_line() {
        let err = parse_command("foo").unwrap_err();
        assert!(err.to_string().contains("'foo'"));
        assert!(err.to_string().contains(EXPECTED));
    }

    proptest! {
        #[test]
        fn prop_move_integers_survive(
            x in -999_999_999i32..=999_999_999,
            y in -999_999_999i32..=999_999_999,
            power in 0i32..=999_999_999,
        ) {
            let cmd = parse_command(&format!("{x} {y} {power}")).unwrap();
            prop_assert_eq!(cmd, Command::Move { x, y, power, message: None });
        }
    }
}
