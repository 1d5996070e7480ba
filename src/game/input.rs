//! Player Output Handling
//!
//! Applies one player's three command lines to its looters, in kind
//! order. A malformed or missing line eliminates the player on the spot;
//! lines already applied for earlier looters stay applied.

use tracing::{info, warn};

use crate::core::constants::LOOTER_COUNT;
use crate::core::point::Point;
use crate::game::skill::{cast_skill, SkillReport, SkillResult};
use crate::game::state::MatchState;
use crate::game::unit::{Action, LooterKind};
use crate::protocol::command::{parse_command, Command, ProtocolError};

/// Apply `lines` (one per looter) for `player`.
///
/// On a protocol violation the player is killed before the error is
/// returned. Output from a player that is already dead is ignored.
pub fn handle_player_output(
    state: &mut MatchState,
    player: usize,
    lines: &[String],
) -> Result<(), ProtocolError> {
    if state.players[player].dead {
        return Ok(());
    }

    for kind in LooterKind::ALL {
        let result = lines
            .get(kind.index())
            .ok_or(ProtocolError::MissingLine { looter: kind })
            .and_then(|line| parse_command(line));

        match result {
            Ok(command) => apply_command(state, player, kind, command),
            Err(err) => {
                warn!(player, error = %err, "Protocol violation");
                state.players[player].kill();
                info!(player, reason = %MatchState::death_reason(player), "Player eliminated");
                return Err(err);
            }
        }
    }

    if lines.len() > LOOTER_COUNT {
        warn!(player, extra = lines.len() - LOOTER_COUNT, "Ignoring extra output lines");
    }

    Ok(())
}

fn apply_command(state: &mut MatchState, player: usize, kind: LooterKind, command: Command) {
    let slot = MatchState::looter_slot(player, kind);

    let (attempt, message) = match command {
        Command::Wait { message } => (Action::Wait, message),

        Command::Move { x, y, power, message } => {
            if let Some(looter) = state.units[slot].as_looter_mut() {
                looter.set_wanted_thrust(Point::new(x as f64, y as f64), power);
            }
            (Action::Move, message)
        }

        Command::Skill { x, y, message } => {
            let unit = &state.units[slot];
            let Some(looter) = unit.as_looter() else {
                return;
            };

            if !looter.skill_active {
                // Not a violation, just a wasted turn
                (Action::Wait, message)
            } else {
                let target = Point::new(x as f64, y as f64);
                let cast = cast_skill(
                    &mut state.ids,
                    &mut state.players[player],
                    looter,
                    unit.id,
                    &unit.position,
                    target,
                );

                let result = match cast {
                    Ok(effect) => {
                        state.effects.insert(effect);
                        SkillResult::Ok
                    }
                    Err(err) => err.into(),
                };

                if let Some(looter) = state.units[slot].as_looter_mut() {
                    looter.skill_report = Some(SkillReport { target, result });
                }
                (Action::Skill, message)
            }
        }
    };

    if let Some(looter) = state.units[slot].as_looter_mut() {
        looter.attempt = Some(attempt);
        looter.message = message;
    }
}
