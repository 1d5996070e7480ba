//! Per-Player View Lines
//!
//! Encodes what one player sees at the start of a round, and decodes it
//! back for in-process bots.
//!
//! Player indices are remapped so the reader is always 0; the others keep
//! their relative order and neutral entities are -1.

use thiserror::Error;

use crate::core::constants::*;
use crate::core::point::round;
use crate::game::state::MatchState;

/// Remap a player index for `viewer`.
pub fn relative_player(owner: Option<usize>, viewer: usize) -> i64 {
    match owner {
        None => -1,
        Some(owner) if owner == viewer => 0,
        Some(owner) if owner < viewer => owner as i64 + 1,
        Some(owner) => owner as i64,
    }
}

/// Lines sent to `viewer` at the start of a round.
pub fn input_for_player(state: &MatchState, viewer: usize) -> Vec<String> {
    let players = &state.players;
    let mut lines = Vec::new();

    // Own values first, then the others in seat order
    lines.push(players[viewer].score.to_string());
    lines.extend(players.iter().filter(|p| p.index != viewer).map(|p| p.score.to_string()));
    lines.push(players[viewer].rage.to_string());
    lines.extend(players.iter().filter(|p| p.index != viewer).map(|p| p.rage.to_string()));

    let mut entities = Vec::new();
    for unit in &state.units {
        entities.push(format!(
            "{} {} {} {} {} {} {} {} {} {} {}",
            unit.id,
            unit.type_tag(),
            relative_player(unit.owner_index(), viewer),
            unit.mass,
            round(unit.radius),
            round(unit.position.x),
            round(unit.position.y),
            round(unit.vx),
            round(unit.vy),
            unit.extra_input(),
            unit.extra_input2(),
        ));
    }
    for wreck in &state.wrecks {
        entities.push(format!(
            "{} {} -1 -1 {} {} {} 0 0 {} -1",
            wreck.id,
            TYPE_WRECK,
            round(wreck.radius),
            round(wreck.position.x),
            round(wreck.position.y),
            wreck.water,
        ));
    }
    for effect in state.effects.iter() {
        entities.push(format!(
            "{} {} -1 -1 {} {} {} 0 0 {} -1",
            effect.id,
            effect.kind.type_tag(),
            round(effect.radius),
            round(effect.center.x),
            round(effect.center.y),
            effect.duration,
        ));
    }

    lines.push(entities.len().to_string());
    lines.extend(entities);
    lines
}

/// Lines a viewer needs before the first frame.
pub fn view_init_lines(state: &MatchState) -> Vec<String> {
    vec![
        state.player_count().to_string(),
        round(MAP_RADIUS).to_string(),
        round(WATERTOWN_RADIUS).to_string(),
        LOOTER_COUNT.to_string(),
    ]
}

// =============================================================================
// DECODING
// =============================================================================

/// Malformed view input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewParseError {
    /// Input ended early.
    #[error("view truncated: expected line {0}")]
    MissingLine(usize),
    /// A field did not parse.
    #[error("bad field {field} in '{line}'")]
    BadField {
        /// Field name.
        field: &'static str,
        /// Offending line.
        line: String,
    },
}

/// One entity line as a player reads it.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq)]
pub struct ViewEntity {
    pub id: u32,
    pub type_tag: i32,
    /// Owner relative to the reader, -1 when neutral.
    pub player: i64,
    pub mass: f64,
    pub radius: i64,
    pub x: i64,
    pub y: i64,
    pub vx: i64,
    pub vy: i64,
    /// Water held, or remaining effect duration.
    pub extra: i32,
    /// Tanker capacity.
    pub extra2: i32,
}

impl ViewEntity {
    /// Decode an entity line.
    pub fn parse(line: &str) -> Result<Self, ViewParseError> {
        let mut fields = line.split_whitespace();
        let mut next = |field: &'static str| {
            fields.next().ok_or_else(|| ViewParseError::BadField {
                field,
                line: line.to_string(),
            })
        };

        macro_rules! field {
            ($name:literal) => {
                next($name)?.parse().map_err(|_| ViewParseError::BadField {
                    field: $name,
                    line: line.to_string(),
                })?
            };
        }

        Ok(Self {
            id: field!("id"),
            type_tag: field!("type"),
            player: field!("player"),
            mass: field!("mass"),
            radius: field!("radius"),
            x: field!("x"),
            y: field!("y"),
            vx: field!("vx"),
            vy: field!("vy"),
            extra: field!("extra"),
            extra2: field!("extra2"),
        })
    }

    /// True for a looter owned by the reader.
    pub fn is_mine(&self) -> bool {
        self.player == 0 && self.type_tag <= TYPE_DOOF
    }
}

/// A whole round's view, decoded.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerView {
    /// Scores, reader first.
    pub scores: Vec<i32>,
    /// Rages, reader first.
    pub rages: Vec<i32>,
    /// Units, wrecks and effects.
    pub entities: Vec<ViewEntity>,
}

impl PlayerView {
    /// Decode the lines from [`input_for_player`].
    pub fn parse(lines: &[String], player_count: usize) -> Result<Self, ViewParseError> {
        let mut cursor = 0;
        let mut take = || {
            let line = lines.get(cursor).ok_or(ViewParseError::MissingLine(cursor));
            cursor += 1;
            line
        };

        let mut ints = |field: &'static str, count: usize| -> Result<Vec<i32>, ViewParseError> {
            (0..count)
                .map(|_| {
                    let line = take()?;
                    line.trim().parse().map_err(|_| ViewParseError::BadField {
                        field,
                        line: line.clone(),
                    })
                })
                .collect()
        };

        let scores = ints("score", player_count)?;
        let rages = ints("rage", player_count)?;
        let count = ints("count", 1)?[0];

        let entities = (0..count.max(0))
            .map(|_| take().and_then(|line| ViewEntity::parse(line)))
            .collect::<Result<_, _>>()?;

        Ok(Self { scores, rages, entities })
    }
}
