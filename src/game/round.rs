//! Round Driver
//!
//! The per-round state transition. Order matters for determinism:
//!
//! 1. `prepare`: clear looter transients and the frame buffer
//! 2. player output is applied (player index, then looter kind)
//! 3. `play_round`:
//!    - skill effects, in (order, id) order
//!    - tanker autopilot, then looter thrust
//!    - collision sub-stepping until the round's time is spent
//!    - tanker water pickup / despawn, snapshot, replacements
//!    - wreck harvesting
//!    - rounding and friction
//!    - rage, mass restoration, effect expiry

use serde::{Serialize, Deserialize};
use tracing::{debug, info, warn};
#[cfg(feature = "debug-tracing")]
use tracing::trace;

use crate::core::constants::*;
use crate::core::point::{round, Point};
use crate::game::collision::{
    bounce_border, bounce_units, destroyed_tanker, next_collision, pair_mut, Collision, Contact,
};
use crate::game::input::handle_player_output;
use crate::game::state::MatchState;
use crate::game::unit::LooterKind;
use crate::game::wreck::Wreck;

/// What one player produced for a round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerOutput {
    /// Raw command lines.
    Lines(Vec<String>),
    /// Nothing arrived within the response budget.
    Timeout,
    /// Input was not collected (player already dead).
    Skipped,
}

/// Summary of a played round.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    /// Round number just played (0-based).
    pub round: u32,
    /// Collisions resolved.
    pub collisions: u32,
    /// Tankers destroyed by Destroyers.
    pub tankers_destroyed: u32,
    /// Full tankers that left the map.
    pub tankers_despawned: u32,
    /// Water taken from wrecks.
    pub water_harvested: u32,
    /// Players eliminated while applying output.
    pub eliminated: Vec<usize>,
    /// Whether the game is over after this round.
    pub game_over: bool,
}

/// Clear per-round looter fields and the frame buffer.
pub fn prepare(state: &mut MatchState) {
    state.frames.clear();
    for unit in &mut state.units {
        if let Some(looter) = unit.as_looter_mut() {
            looter.reset();
        }
    }
}

/// Run one whole round from the players' outputs.
///
/// `outputs` is indexed by player. Missing entries count as skipped.
pub fn step(state: &mut MatchState, outputs: &[PlayerOutput]) -> RoundResult {
    prepare(state);

    let mut eliminated = Vec::new();
    for player in 0..state.player_count() {
        if state.players[player].dead {
            continue;
        }

        match outputs.get(player) {
            Some(PlayerOutput::Lines(lines)) => {
                if handle_player_output(state, player, lines).is_err() {
                    eliminated.push(player);
                }
            }
            Some(PlayerOutput::Timeout) => {
                warn!(player, round = state.round, "Player timed out");
                state.players[player].kill();
                info!(player, reason = %MatchState::death_reason(player), "Player eliminated");
                eliminated.push(player);
            }
            Some(PlayerOutput::Skipped) | None => {}
        }
    }

    let mut result = play_round(state);
    result.eliminated = eliminated;
    result
}

/// Simulate one round with commands already applied.
pub fn play_round(state: &mut MatchState) -> RoundResult {
    let mut result = RoundResult {
        round: state.round,
        ..RoundResult::default()
    };

    state.effects.apply_all(&mut state.units);

    for unit in &mut state.units {
        unit.tanker_autopilot();
    }

    // Looters come first in player then kind order
    for unit in &mut state.units {
        if let Some(thrust) = unit.as_looter().and_then(|l| l.wanted_thrust) {
            unit.thrust(&thrust.target, thrust.power);
        }
    }

    run_collisions(state, &mut result);
    update_tankers(state, &mut result);
    harvest_wrecks(state, &mut result);

    state.adjust_all();

    for player in 0..state.player_count() {
        let rage = state.looter(player, LooterKind::Doof).rage_output();
        state.players[player].gain_rage(rage);
    }

    for unit in &mut state.units {
        while unit.mass >= REAPER_SKILL_MASS_BONUS {
            unit.mass -= REAPER_SKILL_MASS_BONUS;
        }
    }

    for effect in state.effects.remove_expired() {
        state.frames.add_dead(&effect);
    }

    state.round += 1;
    result.game_over = is_game_over(state);

    debug!(
        round = result.round,
        collisions = result.collisions,
        destroyed = result.tankers_destroyed,
        despawned = result.tankers_despawned,
        harvested = result.water_harvested,
        "Round played"
    );

    if result.game_over {
        info!(round = result.round, scores = ?scores(state), "Game over");
    }

    result
}

/// Event-driven integration: stop at each contact, resolve it, rescan.
fn run_collisions(state: &mut MatchState, result: &mut RoundResult) {
    let mut t = 0.0;
    let mut collision = next_collision(&state.units);

    while collision.t + t <= 1.0 {
        let delta = collision.t;
        for unit in &mut state.units {
            unit.advance(delta);
        }
        t += delta;

        state.frames.new_frame(t);
        play_collision(state, collision, result);
        result.collisions += 1;

        collision = next_collision(&state.units);
    }

    let delta = 1.0 - t;
    for unit in &mut state.units {
        unit.advance(delta);
    }
}

fn play_collision(state: &mut MatchState, collision: Collision, result: &mut RoundResult) {
    #[cfg(feature = "debug-tracing")]
    trace!(t = collision.t, contact = ?collision.contact, "Collision");

    match collision.contact {
        Contact::None => {}

        Contact::Border(i) => {
            state.frames.add(&state.units[i]);
            let _impulse = bounce_border(&mut state.units[i]);
        }

        Contact::Units(a, b) => {
            if let Some(dead) = destroyed_tanker(&state.units, a, b) {
                let tanker = state.units.remove(dead);
                state.frames.add_dead(&tanker);
                result.tankers_destroyed += 1;

                if let Some(cargo) = tanker.as_tanker() {
                    state.dead_tankers.push(cargo.owner);

                    // No wreck when the centre is outside the map
                    if tanker.position.distance_to_origin() < MAP_RADIUS {
                        let position = Point::new(
                            round(tanker.position.x) as f64,
                            round(tanker.position.y) as f64,
                        );
                        let wreck = Wreck::new(state.ids.allocate(), position, cargo.water, tanker.radius);
                        state.frames.add(&wreck);
                        state.wrecks.push(wreck);
                    }

                    info!(tanker = tanker.id, water = cargo.water, "Tanker destroyed");
                }
            } else {
                state.frames.add(&state.units[a]);
                state.frames.add(&state.units[b]);
                let (ua, ub) = pair_mut(&mut state.units, a, b);
                let _impulse = bounce_units(ua, ub);
            }
        }
    }
}

/// Water pickup in watertown; full tankers past the spawn ring leave and
/// every tanker lost this round is replaced.
fn update_tankers(state: &mut MatchState, result: &mut RoundResult) {
    let mut leaving = Vec::new();

    for unit in &mut state.units {
        let distance = unit.position.distance_to_origin();
        let radius = unit.radius;
        let Some(tanker) = unit.as_tanker_mut() else {
            continue;
        };

        let full = tanker.is_full();
        if distance <= WATERTOWN_RADIUS && !full {
            tanker.water += 1;
            unit.mass += TANKER_MASS_BY_WATER;
        } else if distance >= TANKER_SPAWN_RADIUS + radius && full {
            leaving.push(unit.id);
        }
    }

    state.frames.new_frame(1.0);
    state.snapshot();

    for id in leaving {
        if let Some(index) = state.units.iter().position(|u| u.id == id) {
            let tanker = state.units.remove(index);
            state.frames.add_dead(&tanker);
            if let Some(cargo) = tanker.as_tanker() {
                state.dead_tankers.push(cargo.owner);
            }
            result.tankers_despawned += 1;
        }
    }

    for owner in std::mem::take(&mut state.dead_tankers) {
        state.spawn_tanker(owner);
    }
}

/// Each alive player's Reaper takes one water from every wreck it sits on,
/// unless it is inside a Doof zone.
fn harvest_wrecks(state: &mut MatchState, result: &mut RoundResult) {
    let MatchState { wrecks, players, units, effects, frames, .. } = state;

    wrecks.retain_mut(|wreck| {
        for player in players.iter_mut().filter(|p| !p.dead) {
            let reaper = &units[MatchState::looter_slot(player.index, LooterKind::Reaper)];
            if wreck.in_harvest_range(&reaper.position)
                && !effects.suppresses(&reaper.position, reaper.radius)
            {
                player.score += 1;
                wreck.drain();
                result.water_harvested += 1;
            }
        }

        if wreck.is_depleted() {
            frames.add_dead(&*wreck);
            false
        } else {
            true
        }
    });
}

/// End condition, checked after every round.
pub fn is_game_over(state: &MatchState) -> bool {
    if state.players.iter().any(|p| p.score >= WIN_SCORE) {
        return true;
    }

    let alive: Vec<_> = state.alive_players().collect();
    match alive.as_slice() {
        [] => true,
        [survivor] => state
            .players
            .iter()
            .filter(|p| p.index != survivor.index)
            .all(|p| p.score < survivor.score),
        _ => false,
    }
}

fn scores(state: &MatchState) -> Vec<i32> {
    state.players.iter().map(|p| p.score).collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hash::hash_frame_lines;
    use crate::game::config::RefereeConfig;
    use crate::game::skill::{EffectKind, SkillEffect, SkillResult};
    use crate::game::unit::Unit;

    fn state() -> MatchState {
        MatchState::new(RefereeConfig::default()).unwrap()
    }

    fn all_wait(state: &MatchState) -> Vec<PlayerOutput> {
        (0..state.player_count())
            .map(|_| PlayerOutput::Lines(vec!["WAIT".into(); LOOTER_COUNT]))
            .collect()
    }

    /// Remove every tanker so none can interfere.
    fn clear_tankers(state: &mut MatchState) {
        state.units.retain(|u| u.as_tanker().is_none());
    }

    /// Put every looter on a fixed grid: reapers on the x axis 2000 apart,
    /// destroyers and doofs well clear above and below.
    fn line_up_looters(state: &mut MatchState) {
        for player in 0..state.player_count() {
            let x = (player as f64 - 1.0) * 2000.0;
            for (kind, y) in [(LooterKind::Reaper, 0.0), (LooterKind::Destroyer, 4000.0), (LooterKind::Doof, -4000.0)] {
                let unit = &mut state.units[MatchState::looter_slot(player, kind)];
                unit.position = Point::new(x, y);
                unit.vx = 0.0;
                unit.vy = 0.0;
            }
        }
    }

    #[test]
    fn test_wait_round_leaves_looters_in_place() {
        let mut state = state();
        let before: Vec<_> = (0..state.player_count() * LOOTER_COUNT)
            .map(|i| state.units[i].position)
            .collect();

        let outputs = all_wait(&state);
        let result = step(&mut state, &outputs);

        assert_eq!(result.round, 0);
        assert_eq!(state.round, 1);
        for (i, position) in before.iter().enumerate() {
            assert_eq!(&state.units[i].position, position, "looter slot {i} moved");
            assert_eq!(state.units[i].speed(), 0.0);
        }
    }

    #[test]
    fn test_skill_without_rage_adds_no_effect() {
        let mut state = state();
        let mut outputs = all_wait(&state);
        outputs[0] = PlayerOutput::Lines(vec!["SKILL 0 0".into(), "WAIT".into(), "WAIT".into()]);

        step(&mut state, &outputs);

        let reaper = state.looter(0, LooterKind::Reaper).as_looter().unwrap();
        assert_eq!(reaper.skill_report.map(|r| r.result.as_str()), Some("no rage"));
        assert!(state.effects.is_empty());
        assert_eq!(reaper.skill_report.map(|r| r.result), Some(SkillResult::NoRage));
    }

    #[test]
    fn test_violation_kills_and_skips_next_round() {
        let mut state = state();
        let mut outputs = all_wait(&state);
        outputs[1] = PlayerOutput::Lines(vec!["foo".into(), "WAIT".into(), "WAIT".into()]);

        let result = step(&mut state, &outputs);
        assert_eq!(result.eliminated, vec![1]);
        assert!(state.players[1].dead);

        // Next round: a move for the dead player is never applied
        let mut outputs = all_wait(&state);
        outputs[1] = PlayerOutput::Lines(vec!["0 0 300".into(), "WAIT".into(), "WAIT".into()]);
        prepare(&mut state);
        let result = step(&mut state, &outputs);
        assert!(result.eliminated.is_empty());
        let reaper = state.looter(1, LooterKind::Reaper).as_looter().unwrap();
        assert!(reaper.attempt.is_none());
        assert!(reaper.wanted_thrust.is_none());
    }

    #[test]
    fn test_timeout_kills() {
        let mut state = state();
        let mut outputs = all_wait(&state);
        outputs[2] = PlayerOutput::Timeout;
        let result = step(&mut state, &outputs);
        assert_eq!(result.eliminated, vec![2]);
        assert!(state.players[2].dead);
    }

    #[test]
    fn test_determinism() {
        let run = || {
            let mut state = MatchState::new(RefereeConfig::with_seed(77)).unwrap();
            let mut frames = state.frames.lines().to_vec();
            for round in 0..30 {
                let outputs: Vec<_> = (0..state.player_count())
                    .map(|p| {
                        let x = (round * 373 + p * 1111) % 4000;
                        PlayerOutput::Lines(vec![
                            format!("{x} -{x} 300"),
                            format!("-{x} {x} 300 go"),
                            "SKILL 0 0".to_string(),
                        ])
                    })
                    .collect();
                step(&mut state, &outputs);
                frames.extend(state.frames.lines().iter().cloned());
            }
            let scores: Vec<_> = state.players.iter().map(|p| p.score).collect();
            (hash_frame_lines(frames.iter().map(String::as_str)), scores, state.compute_hash())
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn test_full_tanker_far_away_is_replaced() {
        let mut state = state();
        let per_player = state.tankers_per_player as usize;

        // Push one tanker of player 0 far out and fill it
        let index = state
            .units
            .iter()
            .position(|u| u.as_tanker().is_some_and(|t| t.owner == 0))
            .unwrap();
        let old_id = state.units[index].id;
        let unit = &mut state.units[index];
        unit.position = Point::new(TANKER_SPAWN_RADIUS + unit.radius + 3000.0, 0.0);
        unit.vx = 0.0;
        unit.vy = 0.0;
        if let Some(t) = unit.as_tanker_mut() {
            t.water = t.size;
        }

        let outputs = all_wait(&state);
        let result = step(&mut state, &outputs);

        assert_eq!(result.tankers_despawned, 1);
        assert!(state.unit(old_id).is_none());
        assert_eq!(state.tanker_count_for(0), per_player);
        assert!(state.frames.lines().iter().any(|l| l.starts_with(&format!("{old_id}@")) && l.ends_with(" d")));
    }

    #[test]
    fn test_tanker_fills_in_watertown() {
        let mut state = state();
        clear_tankers(&mut state);
        // Any watertown spot clear of every looter
        let spot = (-10..=10)
            .flat_map(|i| (-10..=10).map(move |j| Point::new(i as f64 * 250.0, j as f64 * 250.0)))
            .filter(|p| p.distance_to_origin() <= 2500.0)
            .find(|p| state.units.iter().all(|u| u.position.distance(p) > 1200.0))
            .unwrap();

        let mut tanker = Unit::tanker(state.ids.allocate(), 5, 0);
        tanker.position = spot;
        state.units.push(tanker);

        play_round(&mut state);
        let tanker = state.tankers().next().unwrap();
        assert_eq!(tanker.extra_input(), 2);
        assert_eq!(tanker.mass, TANKER_EMPTY_MASS + 2.0 * TANKER_MASS_BY_WATER);
    }

    #[test]
    fn test_destroyer_kills_tanker_and_leaves_wreck() {
        let mut state = state();
        clear_tankers(&mut state);

        // Move every looter out of the way except player 0's destroyer
        for (i, unit) in state.units.iter_mut().enumerate() {
            let angle = i as f64;
            unit.position = Point::new(5000.0 * angle.cos(), 5000.0 * angle.sin());
        }
        let destroyer = MatchState::looter_slot(0, LooterKind::Destroyer);
        state.units[destroyer].position = Point::new(-1000.0, 0.0);
        state.units[destroyer].vx = 600.0;

        // Contact after 500 / 600 of the round
        let mut tanker = Unit::tanker(state.ids.allocate(), 4, 1);
        let tanker_id = tanker.id;
        tanker.position = Point::new(500.0, 0.0);
        state.units.push(tanker);
        let per_player_before = state.tanker_count_for(1);

        let result = play_round(&mut state);

        assert_eq!(result.tankers_destroyed, 1);
        assert!(state.unit(tanker_id).is_none());
        assert_eq!(state.wrecks.len(), 1);
        assert_eq!(state.wrecks[0].water, TANKER_EMPTY_WATER);
        assert_eq!(state.wrecks[0].radius, 600.0);
        assert_eq!(state.wrecks[0].position, Point::new(500.0, 0.0));
        // Replacement spawned for the tanker's owner
        assert_eq!(state.tanker_count_for(1), per_player_before);
    }

    #[test]
    fn test_wreck_harvest() {
        let mut state = state();
        clear_tankers(&mut state);

        let reaper0 = state.looter(0, LooterKind::Reaper).position;
        let id = state.ids.allocate();
        state.wrecks.push(Wreck::new(id, reaper0, 3, 700.0));

        play_round(&mut state);

        assert_eq!(state.players[0].score, 1);
        assert_eq!(state.wrecks[0].water, 2);
        assert_eq!(state.players[1].score, 0);
    }

    #[test]
    fn test_wreck_depletes_and_is_removed() {
        let mut state = state();
        clear_tankers(&mut state);

        let reaper0 = state.looter(0, LooterKind::Reaper).position;
        let id = state.ids.allocate();
        state.wrecks.push(Wreck::new(id, reaper0, 1, 700.0));

        play_round(&mut state);

        assert!(state.wrecks.is_empty());
        // Never described before, so the dead marker carries the full form
        let prefix = format!("{id}@0 ");
        assert!(state.frames.lines().iter().any(|l| l.starts_with(&prefix) && l.ends_with(" d")));
    }

    #[test]
    fn test_dead_player_does_not_harvest() {
        let mut state = state();
        clear_tankers(&mut state);
        state.players[0].kill();

        let reaper0 = state.looter(0, LooterKind::Reaper).position;
        let id = state.ids.allocate();
        state.wrecks.push(Wreck::new(id, reaper0, 3, 700.0));

        play_round(&mut state);
        assert_eq!(state.players[0].score, 0);
        assert_eq!(state.wrecks[0].water, 3);
    }

    #[test]
    fn test_doof_zone_blocks_harvest() {
        let mut state = state();
        clear_tankers(&mut state);

        let reaper0 = state.looter(0, LooterKind::Reaper).position;
        let id = state.ids.allocate();
        state.wrecks.push(Wreck::new(id, reaper0, 3, 700.0));
        let effect_id = state.ids.allocate();
        state.effects.insert(SkillEffect::new(effect_id, EffectKind::Doof, reaper0, 0));

        play_round(&mut state);
        assert_eq!(state.players[0].score, 0);
        assert_eq!(state.wrecks[0].water, 3);
    }

    #[test]
    fn test_wreck_drains_once_per_eligible_harvester() {
        let mut state = state();
        clear_tankers(&mut state);
        line_up_looters(&mut state);

        // Every reaper is in range; player 1 is dead and player 2 sits in a Doof zone
        let id = state.ids.allocate();
        state.wrecks.push(Wreck::new(id, Point::ORIGIN, 5, 3000.0));
        state.players[1].kill();
        let reaper2 = state.looter(2, LooterKind::Reaper).position;
        let effect_id = state.ids.allocate();
        state.effects.insert(SkillEffect::new(effect_id, EffectKind::Doof, reaper2, 0));

        let result = play_round(&mut state);

        let scores: Vec<i32> = state.players.iter().map(|p| p.score).collect();
        assert_eq!(scores, vec![1, 0, 0]);
        assert_eq!(state.wrecks[0].water, 4);
        assert_eq!(result.water_harvested, 1);
    }

    #[test]
    fn test_shallow_wreck_serves_every_harvester_then_goes() {
        let mut state = state();
        clear_tankers(&mut state);
        line_up_looters(&mut state);

        // Reapers of players 0 and 1 are in range, player 2 is not
        let id = state.ids.allocate();
        state.wrecks.push(Wreck::new(id, Point::new(-1000.0, 0.0), 1, 1200.0));

        let result = play_round(&mut state);

        let scores: Vec<i32> = state.players.iter().map(|p| p.score).collect();
        assert_eq!(scores, vec![1, 1, 0]);
        assert_eq!(result.water_harvested, 2);
        assert!(state.wrecks.is_empty());
        let prefix = format!("{id}@");
        assert!(state.frames.lines().iter().any(|l| l.starts_with(&prefix) && l.ends_with(" d")));
    }

    #[test]
    fn test_effect_order_and_expiry() {
        let mut state = state();
        clear_tankers(&mut state);

        // Destroyer grenade (order 2) gets the lower id, Reaper (order 0) the higher one
        let slot = MatchState::looter_slot(0, LooterKind::Doof);
        let center = state.units[slot].position;
        let far = Point::new(center.x + 900.0, center.y);
        state.effects.insert(SkillEffect::new(1000, EffectKind::Destroyer, far, 0));
        state.effects.insert(SkillEffect::new(1001, EffectKind::Reaper, center, 0));

        let order: Vec<_> = state.effects.iter().map(|e| e.id).collect();
        assert_eq!(order, vec![1001, 1000]);

        play_round(&mut state);

        // The grenade lasts one round, the Reaper zone three
        let remaining: Vec<_> = state.effects.iter().map(|e| e.id).collect();
        assert_eq!(remaining, vec![1001]);
        assert!(state.frames.lines().iter().any(|l| l.starts_with("1000 ") && l.ends_with(" d")));
        // Heavy while inside the Reaper zone: the grenade barely moved it
        assert!(state.units[slot].speed() < 100.0);
        // Bonus mass was restored at round end
        assert_eq!(state.units[slot].mass, DOOF_MASS);
    }

    #[test]
    fn test_rage_from_doof_speed() {
        let mut state = state();
        clear_tankers(&mut state);
        let slot = MatchState::looter_slot(1, LooterKind::Doof);
        // Aim along the radius towards the centre so nothing is in the way
        let p = state.units[slot].position;
        let d = p.distance_to_origin();
        state.units[slot].vx = -p.x / d * 500.0;
        state.units[slot].vy = -p.y / d * 500.0;

        play_round(&mut state);
        let doof = state.looter(1, LooterKind::Doof);
        assert!(doof.speed() > 0.0);
        assert_eq!(state.players[1].rage, doof.rage_output());
        assert_eq!(state.players[0].rage, 0);
    }

    #[test]
    fn test_game_over_predicate() {
        let mut state = state();
        assert!(!is_game_over(&state));

        state.players[1].score = WIN_SCORE;
        assert!(is_game_over(&state));
        state.players[1].score = 5;

        state.players[0].kill();
        state.players[2].kill();
        // Survivor leads
        assert!(is_game_over(&state));

        // Survivor trails a dead player
        state.players[0].score = 10;
        assert!(!is_game_over(&state));

        state.players[1].kill();
        assert!(is_game_over(&state));
    }
}
