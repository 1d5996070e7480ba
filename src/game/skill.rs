//! Looter Skills
//!
//! Each looter kind casts a timed area effect:
//! - Reaper: units inside gain mass
//! - Destroyer: units inside are pushed away from the centre
//! - Doof: no direct physics; units inside skip friction and cannot harvest
//!
//! Active effects are kept sorted by (order, id) and applied once per
//! round in that order.

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::constants::*;
use crate::core::id::{EntityId, IdAllocator};
use crate::core::point::Point;
use crate::game::player::Player;
use crate::game::unit::{Looter, LooterKind, Unit};

// =============================================================================
// RESULTS
// =============================================================================

/// Why a cast was refused.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SkillError {
    /// The player cannot afford the skill.
    #[error("Not enough rage: have {rage}, need {cost}")]
    InsufficientRage {
        /// Rage available.
        rage: i32,
        /// Rage required.
        cost: i32,
    },

    /// The target is beyond the looter's skill range.
    #[error("Target out of range: {distance:.1} > {range:.1}")]
    OutOfRange {
        /// Distance from the looter to the target.
        distance: f64,
        /// Maximum allowed.
        range: f64,
    },
}

/// Status code reported to the caster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum SkillResult {
    /// Effect created.
    Ok = 0,
    /// Not enough rage.
    NoRage = 1,
    /// Target too far.
    TooFar = 2,
}

impl SkillResult {
    /// Numeric result code.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Human-readable result.
    pub fn as_str(self) -> &'static str {
        match self {
            SkillResult::Ok => "ok",
            SkillResult::NoRage => "no rage",
            SkillResult::TooFar => "too far",
        }
    }
}

impl From<SkillError> for SkillResult {
    fn from(err: SkillError) -> Self {
        match err {
            SkillError::InsufficientRage { .. } => SkillResult::NoRage,
            SkillError::OutOfRange { .. } => SkillResult::TooFar,
        }
    }
}

/// Outcome of a cast, kept on the looter until the next round.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkillReport {
    /// Requested target.
    pub target: Point,
    /// What happened.
    pub result: SkillResult,
}

// =============================================================================
// EFFECTS
// =============================================================================

/// Which looter produced an effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    /// Mass bonus zone.
    Reaper,
    /// Knockback grenade.
    Destroyer,
    /// Friction and harvest suppression zone.
    Doof,
}

impl EffectKind {
    /// Effect produced by a looter kind.
    pub fn for_looter(kind: LooterKind) -> Self {
        match kind {
            LooterKind::Reaper => EffectKind::Reaper,
            LooterKind::Destroyer => EffectKind::Destroyer,
            LooterKind::Doof => EffectKind::Doof,
        }
    }

    /// Wire type tag.
    pub fn type_tag(self) -> i32 {
        match self {
            EffectKind::Reaper => TYPE_REAPER_SKILL_EFFECT,
            EffectKind::Destroyer => TYPE_DESTROYER_SKILL_EFFECT,
            EffectKind::Doof => TYPE_DOOF_SKILL_EFFECT,
        }
    }

    fn radius(self) -> f64 {
        match self {
            EffectKind::Reaper => REAPER_SKILL_RADIUS,
            EffectKind::Destroyer => DESTROYER_SKILL_RADIUS,
            EffectKind::Doof => DOOF_SKILL_RADIUS,
        }
    }

    fn duration(self) -> i32 {
        match self {
            EffectKind::Reaper => REAPER_SKILL_DURATION,
            EffectKind::Destroyer => DESTROYER_SKILL_DURATION,
            EffectKind::Doof => DOOF_SKILL_DURATION,
        }
    }

    fn order(self) -> i32 {
        match self {
            EffectKind::Reaper => REAPER_SKILL_ORDER,
            EffectKind::Destroyer => DESTROYER_SKILL_ORDER,
            EffectKind::Doof => DOOF_SKILL_ORDER,
        }
    }
}

/// A timed area effect.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SkillEffect {
    /// Session-unique id.
    pub id: EntityId,
    /// Behavior.
    pub kind: EffectKind,
    /// Centre of the area.
    pub center: Point,
    /// Area radius.
    pub radius: f64,
    /// Rounds left; decremented before each application.
    pub duration: i32,
    /// Application rank (lower first).
    pub order: i32,
    /// Looter that cast it.
    pub looter_id: EntityId,
}

impl SkillEffect {
    /// Create an effect with its kind's radius, duration and order.
    pub fn new(id: EntityId, kind: EffectKind, center: Point, looter_id: EntityId) -> Self {
        Self {
            id,
            kind,
            center,
            radius: kind.radius(),
            duration: kind.duration(),
            order: kind.order(),
            looter_id,
        }
    }

    /// Total order key.
    #[inline]
    pub fn sort_key(&self) -> (i32, EntityId) {
        (self.order, self.id)
    }

    /// Whether a unit's circle touches the area.
    #[inline]
    pub fn covers(&self, unit: &Unit) -> bool {
        self.center.is_in_range(&unit.position, self.radius + unit.radius)
    }

    /// Tick down the duration, then act on every covered unit.
    pub fn apply(&mut self, units: &mut [Unit]) {
        self.duration -= 1;

        for unit in units.iter_mut().filter(|u| self.covers(u)) {
            match self.kind {
                EffectKind::Reaper => unit.mass += REAPER_SKILL_MASS_BONUS,
                EffectKind::Destroyer => unit.thrust(&self.center, -DESTROYER_NITRO_GRENADE_POWER),
                EffectKind::Doof => {}
            }
        }
    }

    /// Effects are removed once their duration runs out.
    #[inline]
    pub fn is_expired(&self) -> bool {
        self.duration <= 0
    }
}

// =============================================================================
// EFFECT QUEUE
// =============================================================================

/// Active effects in (order, id) order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EffectQueue {
    effects: Vec<SkillEffect>,
}

impl EffectQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert keeping the (order, id) ordering.
    pub fn insert(&mut self, effect: SkillEffect) {
        let key = effect.sort_key();
        let at = self.effects.partition_point(|e| e.sort_key() < key);
        self.effects.insert(at, effect);
    }

    /// Effects in application order.
    pub fn iter(&self) -> impl Iterator<Item = &SkillEffect> {
        self.effects.iter()
    }

    /// Number of active effects.
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Whether no effect is active.
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Apply every effect once, in order.
    pub fn apply_all(&mut self, units: &mut [Unit]) {
        for effect in &mut self.effects {
            effect.apply(units);
        }
    }

    /// Whether a circle lies inside any Doof zone.
    pub fn suppresses(&self, position: &Point, radius: f64) -> bool {
        self.effects.iter().any(|e| {
            e.kind == EffectKind::Doof && e.center.is_in_range(position, e.radius + radius)
        })
    }

    /// Remove expired effects, returning them in order.
    pub fn remove_expired(&mut self) -> Vec<SkillEffect> {
        let (expired, alive): (Vec<_>, Vec<_>) =
            self.effects.drain(..).partition(SkillEffect::is_expired);
        self.effects = alive;
        expired
    }
}

// =============================================================================
// CASTING
// =============================================================================

/// Cast a looter's skill from `origin` at `target`, paying from `player`'s rage.
///
/// Checks rage before range. On success the cost is deducted and a new
/// effect is returned for the caller to queue.
pub fn cast_skill(
    ids: &mut IdAllocator,
    player: &mut Player,
    looter: &Looter,
    caster_id: EntityId,
    origin: &Point,
    target: Point,
) -> Result<SkillEffect, SkillError> {
    if player.rage < looter.skill_cost {
        return Err(SkillError::InsufficientRage {
            rage: player.rage,
            cost: looter.skill_cost,
        });
    }

    let distance = origin.distance(&target);
    if distance > looter.skill_range {
        return Err(SkillError::OutOfRange {
            distance,
            range: looter.skill_range,
        });
    }

    player.rage -= looter.skill_cost;
    Ok(SkillEffect::new(
        ids.allocate(),
        EffectKind::for_looter(looter.kind),
        target,
        caster_id,
    ))
}

// =============================================================================
// TESTS
// =============================================================================
