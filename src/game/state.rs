//! Match State
//!
//! Everything one referee session owns: units, wrecks, active effects,
//! players, the shared tanker-spawn pool and the frame recorder.
//!
//! Looters are created first and never removed, so they always occupy the
//! first `player_count * LOOTER_COUNT` unit slots, grouped by player in
//! kind order. Tankers follow in spawn order.

use std::collections::VecDeque;
use std::f64::consts::PI;
use tracing::{debug, warn};

use crate::core::constants::*;
use crate::core::hash::{StateHash, StateHasher};
use crate::core::id::{EntityId, IdAllocator};
use crate::core::point::Point;
use crate::core::rng::DeterministicRng;
use crate::game::config::{ConfigError, RefereeConfig};
use crate::game::player::{Player, TankerSpawn};
use crate::game::skill::EffectQueue;
use crate::game::unit::{LooterKind, Unit, UnitKind};
use crate::game::wreck::Wreck;
use crate::protocol::frame::FrameRecorder;

/// Complete state of a referee session.
#[derive(Clone, Debug)]
pub struct MatchState {
    /// Session configuration.
    pub config: RefereeConfig,
    /// Map-generation RNG.
    pub rng: DeterministicRng,
    /// Id counter shared by units, wrecks and effects.
    pub ids: IdAllocator,
    /// Looters then tankers, in creation order.
    pub units: Vec<Unit>,
    /// Harvestable wrecks.
    pub wrecks: Vec<Wreck>,
    /// Active skill effects.
    pub effects: EffectQueue,
    /// Players by seat index.
    pub players: Vec<Player>,
    /// Pending tanker descriptors, shared by every player.
    pub spawn_pool: VecDeque<TankerSpawn>,
    /// Tankers per player chosen at construction.
    pub tankers_per_player: u32,
    /// Owners of tankers removed this round, awaiting replacement.
    pub dead_tankers: Vec<usize>,
    /// Frame records of the current round.
    pub frames: FrameRecorder,
    /// Rounds played so far.
    pub round: u32,
}

impl MatchState {
    /// Build a session: generate the map, place looters and starting tankers.
    pub fn new(config: RefereeConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = DeterministicRng::new(config.seed);
        let tankers_per_player = TANKERS_BY_PLAYER_MIN
            + rng.next_int(TANKERS_BY_PLAYER_MAX - TANKERS_BY_PLAYER_MIN + 1);

        let spawn_pool = (0..TANKER_SPAWN_POOL)
            .map(|_| TankerSpawn {
                size: TANKER_MIN_SIZE + rng.next_int((TANKER_MAX_SIZE - TANKER_MIN_SIZE) as u32) as i32,
                angle: rng.next_double(),
            })
            .collect();

        let mut ids = IdAllocator::new();
        let mut units = Vec::new();
        let mut players = Vec::with_capacity(config.player_count);
        for index in 0..config.player_count {
            let mut looters = [0; LOOTER_COUNT];
            for kind in LooterKind::ALL {
                let id = ids.allocate();
                looters[kind.index()] = id;
                units.push(Unit::looter(id, kind, index, Point::ORIGIN));
            }
            players.push(Player::new(index, looters));
        }

        let mut state = Self {
            config,
            rng,
            ids,
            units,
            wrecks: Vec::new(),
            effects: EffectQueue::new(),
            players,
            spawn_pool,
            tankers_per_player,
            dead_tankers: Vec::new(),
            frames: FrameRecorder::new(),
            round: 0,
        };

        state.place_looters();

        for _ in 0..tankers_per_player {
            for player in 0..state.player_count() {
                state.spawn_tanker(player);
            }
        }

        state.adjust_all();
        state.frames.new_frame(1.0);
        state.snapshot();

        debug!(
            seed = state.config.seed,
            players = state.player_count(),
            tankers_per_player,
            "Session initialized"
        );

        Ok(state)
    }

    /// Rotationally symmetric looter placement, retried until nothing overlaps.
    fn place_looters(&mut self) {
        let player_count = self.player_count();
        let sector = PI * 2.0 / player_count as f64;

        let mut finished = false;
        while !finished {
            finished = true;

            for kind in LooterKind::ALL {
                if !finished {
                    break;
                }

                let distance = self.rng.next_double() * (MAP_RADIUS - LOOTER_RADIUS);
                let angle = self.rng.next_double();

                for player in 0..player_count {
                    let looter_angle = (player as f64 + angle) * sector;
                    let slot = Self::looter_slot(player, kind);
                    self.units[slot]
                        .position
                        .set(looter_angle.cos() * distance, looter_angle.sin() * distance);

                    if self.overlaps_any(slot) {
                        finished = false;
                        for looter in &mut self.units[..player_count * LOOTER_COUNT] {
                            looter.position.set(0.0, 0.0);
                        }
                        break;
                    }
                }
            }
        }
    }

    fn overlaps_any(&self, slot: usize) -> bool {
        let unit = &self.units[slot];
        self.units
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != slot)
            .any(|(_, u)| unit.position.distance(&u.position) <= unit.radius + u.radius)
    }

    /// Spawn one tanker for `player` from the shared pool.
    ///
    /// Returns the new tanker's id, or `None` once the pool is exhausted.
    pub fn spawn_tanker(&mut self, player: usize) -> Option<EntityId> {
        let Some(spawn) = self.spawn_pool.pop_front() else {
            warn!(player, "Tanker spawn pool exhausted");
            return None;
        };

        let angle = (player as f64 + spawn.angle) * PI * 2.0 / self.player_count() as f64;
        let (sin, cos) = angle.sin_cos();

        let mut tanker = Unit::tanker(self.ids.allocate(), spawn.size, player);
        let mut distance = TANKER_SPAWN_RADIUS + tanker.radius;

        loop {
            tanker.position.set(cos * distance, sin * distance);
            let safe = self
                .units
                .iter()
                .all(|u| tanker.position.distance(&u.position) > tanker.radius + u.radius);
            distance += TANKER_MIN_RADIUS;
            if safe {
                break;
            }
        }

        tanker.thrust(&Point::ORIGIN, TANKER_START_THRUST);

        let id = tanker.id;
        self.units.push(tanker);
        Some(id)
    }

    // =========================================================================
    // LOOKUPS
    // =========================================================================

    /// Number of seats.
    #[inline]
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Unit slot of a player's looter.
    #[inline]
    pub fn looter_slot(player: usize, kind: LooterKind) -> usize {
        player * LOOTER_COUNT + kind.index()
    }

    /// A player's looter unit.
    pub fn looter(&self, player: usize, kind: LooterKind) -> &Unit {
        &self.units[Self::looter_slot(player, kind)]
    }

    /// Any unit by id.
    pub fn unit(&self, id: EntityId) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == id)
    }

    /// Tankers currently in play.
    pub fn tankers(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter().filter(|u| matches!(u.kind, UnitKind::Tanker(_)))
    }

    /// Tankers in play whose replacement goes to `player`.
    pub fn tanker_count_for(&self, player: usize) -> usize {
        self.tankers()
            .filter(|u| u.as_tanker().is_some_and(|t| t.owner == player))
            .count()
    }

    /// Players still sending commands.
    pub fn alive_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| !p.dead)
    }

    // =========================================================================
    // SHARED STEPS
    // =========================================================================

    /// Round positions and velocities; apply friction outside Doof zones.
    pub fn adjust_all(&mut self) {
        let effects = &self.effects;
        for unit in &mut self.units {
            let suppressed = effects.suppresses(&unit.position, unit.radius);
            unit.adjust(suppressed);
        }
    }

    /// Full state record: looters, tankers, wrecks, effects.
    pub fn snapshot(&mut self) {
        let Self { frames, units, wrecks, effects, .. } = self;

        for unit in units.iter().filter(|u| u.as_looter().is_some()) {
            frames.add(unit);
        }
        for unit in units.iter().filter(|u| u.as_tanker().is_some()) {
            frames.add(unit);
        }
        for wreck in wrecks.iter() {
            frames.add(wreck);
        }
        for effect in effects.iter() {
            frames.add(effect);
        }
    }

    /// Viewer-facing reason for a player's elimination.
    pub fn death_reason(player: usize) -> String {
        format!("${player}: Eliminated!")
    }

    /// Compute hash of current state for verification.
    pub fn compute_hash(&self) -> StateHash {
        let mut hasher = StateHasher::for_match_state();

        hasher.update_u32(self.round);
        hasher.update_u64(self.config.seed);
        let [s0, s1] = self.rng.state();
        hasher.update_u64(s0);
        hasher.update_u64(s1);
        hasher.update_u32(self.ids.issued());

        for unit in &self.units {
            hasher.update_u32(unit.id);
            hasher.update_i32(unit.type_tag());
            hasher.update_point(&unit.position);
            hasher.update_f64(unit.vx);
            hasher.update_f64(unit.vy);
            hasher.update_f64(unit.radius);
            hasher.update_f64(unit.mass);
            hasher.update_i32(unit.extra_input());
            hasher.update_i32(unit.extra_input2());
        }

        for wreck in &self.wrecks {
            hasher.update_u32(wreck.id);
            hasher.update_point(&wreck.position);
            hasher.update_f64(wreck.radius);
            hasher.update_i32(wreck.water);
        }

        for effect in self.effects.iter() {
            hasher.update_u32(effect.id);
            hasher.update_i32(effect.kind.type_tag());
            hasher.update_point(&effect.center);
            hasher.update_i32(effect.duration);
            hasher.update_u32(effect.looter_id);
        }

        for player in &self.players {
            hasher.update_i32(player.score);
            hasher.update_i32(player.rage);
            hasher.update_bool(player.dead);
        }

        hasher.update_u32(self.spawn_pool.len() as u32);
        hasher.finalize()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn state(seed: u64) -> MatchState {
        MatchState::new(RefereeConfig::with_seed(seed)).unwrap()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = RefereeConfig { player_count: 0, ..RefereeConfig::default() };
        assert!(MatchState::new(config).is_err());
    }

    #[test]
    fn test_initial_layout() {
        let state = state(1);
        let looters = state.player_count() * LOOTER_COUNT;
        let tankers = state.player_count() * state.tankers_per_player as usize;

        assert!((1..=3).contains(&state.tankers_per_player));
        assert_eq!(state.units.len(), looters + tankers);
        assert_eq!(state.spawn_pool.len(), TANKER_SPAWN_POOL - tankers);

        // Ids are handed out in creation order starting from zero
        for (i, unit) in state.units.iter().enumerate() {
            assert_eq!(unit.id, i as EntityId);
        }

        for player in 0..state.player_count() {
            for kind in LooterKind::ALL {
                let unit = state.looter(player, kind);
                assert!(unit.is_looter_kind(kind));
                assert_eq!(unit.owner_index(), Some(player));
                assert_eq!(state.players[player].looter_id(kind), unit.id);
            }
            assert_eq!(state.tanker_count_for(player), state.tankers_per_player as usize);
        }
    }

    #[test]
    fn test_no_initial_overlap() {
        for seed in [1, 2, 3, 42, 1234] {
            let state = state(seed);
            for (i, a) in state.units.iter().enumerate() {
                for b in &state.units[i + 1..] {
                    // Rounding may shave a unit or so off the spawn margin
                    assert!(
                        a.position.distance(&b.position) > a.radius + b.radius - 2.0,
                        "seed {seed}: {} overlaps {}",
                        a.id,
                        b.id
                    );
                }
            }
        }
    }

    #[test]
    fn test_looters_are_rotationally_symmetric() {
        let state = state(7);
        for kind in LooterKind::ALL {
            let d0 = state.looter(0, kind).position.distance_to_origin();
            for player in 1..state.player_count() {
                let d = state.looter(player, kind).position.distance_to_origin();
                assert!((d - d0).abs() <= 1.5, "rounded radii differ for {kind:?}");
            }
        }
    }

    #[test]
    fn test_tankers_start_outside_and_head_inward() {
        let state = state(5);
        for tanker in state.tankers() {
            let distance = tanker.position.distance_to_origin();
            assert!(distance >= TANKER_SPAWN_RADIUS + tanker.radius - 1.0);
            // Velocity points towards the centre
            let dot = tanker.position.x * tanker.vx + tanker.position.y * tanker.vy;
            assert!(dot < 0.0);
        }
    }

    #[test]
    fn test_initial_frame_is_full_snapshot() {
        let state = state(1);
        let lines = state.frames.lines();
        assert_eq!(lines[0], "#1.00000");
        assert_eq!(lines.len(), 1 + state.units.len());
        // Looters carry their owner on first sighting
        assert_eq!(lines[1].split(' ').count(), 8);
    }

    #[test]
    fn test_same_seed_same_state() {
        assert_eq!(state(9).compute_hash(), state(9).compute_hash());
        assert_ne!(state(9).compute_hash(), state(10).compute_hash());
    }

    #[test]
    fn test_spawn_pool_exhaustion() {
        let mut state = state(1);
        state.spawn_pool.clear();
        assert_eq!(state.spawn_tanker(0), None);
    }

    #[test]
    fn test_death_reason() {
        assert_eq!(MatchState::death_reason(2), "$2: Eliminated!");
    }
}
