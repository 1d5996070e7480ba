//! Units
//!
//! Every moving circle in the arena is a [`Unit`]. Kind-specific data
//! (looter controls, tanker cargo) lives in the closed [`UnitKind`] enum
//! and behavior is dispatched with exhaustive matches.

use serde::{Serialize, Deserialize};

use crate::core::constants::*;
use crate::core::id::EntityId;
use crate::core::point::{round, Point};
use crate::game::skill::SkillReport;

// =============================================================================
// LOOTER KIND
// =============================================================================

/// The three player-controlled unit kinds, in command order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum LooterKind {
    /// Harvests wrecks; skill adds mass in an area.
    Reaper = 0,
    /// Destroys light tankers; skill pushes units away.
    Destroyer = 1,
    /// Generates rage; skill suppresses friction and harvesting.
    Doof = 2,
}

impl LooterKind {
    /// All kinds in command-line order.
    pub const ALL: [LooterKind; LOOTER_COUNT] = [
        LooterKind::Reaper,
        LooterKind::Destroyer,
        LooterKind::Doof,
    ];

    /// Slot of this kind within a player's looters.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Wire type tag.
    pub fn type_tag(self) -> i32 {
        match self {
            LooterKind::Reaper => TYPE_REAPER,
            LooterKind::Destroyer => TYPE_DESTROYER,
            LooterKind::Doof => TYPE_DOOF,
        }
    }

    /// Base mass.
    pub fn mass(self) -> f64 {
        match self {
            LooterKind::Reaper => REAPER_MASS,
            LooterKind::Destroyer => DESTROYER_MASS,
            LooterKind::Doof => DOOF_MASS,
        }
    }

    /// Friction coefficient.
    pub fn friction(self) -> f64 {
        match self {
            LooterKind::Reaper => REAPER_FRICTION,
            LooterKind::Destroyer => DESTROYER_FRICTION,
            LooterKind::Doof => DOOF_FRICTION,
        }
    }

    /// Rage spent per cast.
    pub fn skill_cost(self) -> i32 {
        match self {
            LooterKind::Reaper => REAPER_SKILL_COST,
            LooterKind::Destroyer => DESTROYER_SKILL_COST,
            LooterKind::Doof => DOOF_SKILL_COST,
        }
    }

    /// Maximum cast distance.
    pub fn skill_range(self) -> f64 {
        match self {
            LooterKind::Reaper => REAPER_SKILL_RANGE,
            LooterKind::Destroyer => DESTROYER_SKILL_RANGE,
            LooterKind::Doof => DOOF_SKILL_RANGE,
        }
    }
}

// =============================================================================
// LOOTER STATE
// =============================================================================

/// What a looter tried to do this round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Cast its skill.
    Skill,
    /// Thrust towards a target.
    Move,
    /// Do nothing.
    Wait,
}

/// A commanded thrust, applied during the round.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Thrust {
    /// Point to accelerate towards.
    pub target: Point,
    /// Power, already clamped to [0, MAX_THRUST].
    pub power: i32,
}

/// Player-controlled state of a looter.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Looter {
    /// Which looter this is.
    pub kind: LooterKind,
    /// Index of the owning player.
    pub owner: usize,
    /// Rage spent per cast.
    pub skill_cost: i32,
    /// Maximum cast distance.
    pub skill_range: f64,
    /// Whether SKILL commands are honored (otherwise treated as WAIT).
    pub skill_active: bool,

    // Per-round transient fields, cleared by `reset`.
    /// Thrust to apply this round.
    pub wanted_thrust: Option<Thrust>,
    /// Last action attempted.
    pub attempt: Option<Action>,
    /// Outcome of this round's skill cast.
    pub skill_report: Option<SkillReport>,
    /// Message attached to the command.
    pub message: Option<String>,
}

impl Looter {
    /// Create a looter with the kind's default skill parameters.
    pub fn new(kind: LooterKind, owner: usize) -> Self {
        Self {
            kind,
            owner,
            skill_cost: kind.skill_cost(),
            skill_range: kind.skill_range(),
            skill_active: true,
            wanted_thrust: None,
            attempt: None,
            skill_report: None,
            message: None,
        }
    }

    /// Record a thrust command, clamping power into [0, MAX_THRUST].
    pub fn set_wanted_thrust(&mut self, target: Point, power: i32) {
        self.wanted_thrust = Some(Thrust {
            target,
            power: power.clamp(0, MAX_THRUST),
        });
    }

    /// Clear the per-round fields.
    pub fn reset(&mut self) {
        self.wanted_thrust = None;
        self.attempt = None;
        self.skill_report = None;
        self.message = None;
    }
}

// =============================================================================
// TANKER STATE
// =============================================================================

/// Neutral water carrier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tanker {
    /// Water carried.
    pub water: i32,
    /// Capacity.
    pub size: i32,
    /// Player whose spawn queue replaces this tanker.
    pub owner: usize,
}

impl Tanker {
    /// Full tankers head back out of the map.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.water >= self.size
    }
}

// =============================================================================
// UNIT
// =============================================================================

/// Kind-specific part of a unit.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum UnitKind {
    /// Player-controlled looter.
    Looter(Looter),
    /// Neutral tanker.
    Tanker(Tanker),
}

/// A physical circle with velocity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Unit {
    /// Session-unique id.
    pub id: EntityId,
    /// Kind-specific data.
    pub kind: UnitKind,
    /// Centre position.
    pub position: Point,
    /// Velocity X.
    pub vx: f64,
    /// Velocity Y.
    pub vy: f64,
    /// Collision radius (> 0).
    pub radius: f64,
    /// Mass (> 0).
    pub mass: f64,
    /// Fraction of velocity lost per round.
    pub friction: f64,
}

impl Unit {
    /// Create a stationary looter.
    pub fn looter(id: EntityId, kind: LooterKind, owner: usize, position: Point) -> Self {
        Self {
            id,
            kind: UnitKind::Looter(Looter::new(kind, owner)),
            position,
            vx: 0.0,
            vy: 0.0,
            radius: LOOTER_RADIUS,
            mass: kind.mass(),
            friction: kind.friction(),
        }
    }

    /// Create an empty tanker at the origin.
    pub fn tanker(id: EntityId, size: i32, owner: usize) -> Self {
        let water = TANKER_EMPTY_WATER;
        Self {
            id,
            kind: UnitKind::Tanker(Tanker { water, size, owner }),
            position: Point::ORIGIN,
            vx: 0.0,
            vy: 0.0,
            radius: TANKER_RADIUS_BASE + TANKER_RADIUS_BY_SIZE * size as f64,
            mass: TANKER_EMPTY_MASS + TANKER_MASS_BY_WATER * water as f64,
            friction: TANKER_FRICTION,
        }
    }

    /// Wire type tag.
    pub fn type_tag(&self) -> i32 {
        match &self.kind {
            UnitKind::Looter(looter) => looter.kind.type_tag(),
            UnitKind::Tanker(_) => TYPE_TANKER,
        }
    }

    /// Owning player for looters; tankers are neutral.
    pub fn owner_index(&self) -> Option<usize> {
        match &self.kind {
            UnitKind::Looter(looter) => Some(looter.owner),
            UnitKind::Tanker(_) => None,
        }
    }

    /// Looter data, if this is a looter.
    pub fn as_looter(&self) -> Option<&Looter> {
        match &self.kind {
            UnitKind::Looter(looter) => Some(looter),
            UnitKind::Tanker(_) => None,
        }
    }

    /// Mutable looter data, if this is a looter.
    pub fn as_looter_mut(&mut self) -> Option<&mut Looter> {
        match &mut self.kind {
            UnitKind::Looter(looter) => Some(looter),
            UnitKind::Tanker(_) => None,
        }
    }

    /// Tanker data, if this is a tanker.
    pub fn as_tanker(&self) -> Option<&Tanker> {
        match &self.kind {
            UnitKind::Tanker(tanker) => Some(tanker),
            UnitKind::Looter(_) => None,
        }
    }

    /// Mutable tanker data, if this is a tanker.
    pub fn as_tanker_mut(&mut self) -> Option<&mut Tanker> {
        match &mut self.kind {
            UnitKind::Tanker(tanker) => Some(tanker),
            UnitKind::Looter(_) => None,
        }
    }

    /// True for a looter of the given kind.
    pub fn is_looter_kind(&self, kind: LooterKind) -> bool {
        self.as_looter().is_some_and(|l| l.kind == kind)
    }

    /// Integrate position over `t` of a round.
    #[inline]
    pub fn advance(&mut self, t: f64) {
        self.position.move_by(self.vx * t, self.vy * t);
    }

    /// Current speed.
    #[inline]
    pub fn speed(&self) -> f64 {
        (self.vx * self.vx + self.vy * self.vy).sqrt()
    }

    /// Accelerate towards `target` by `power / mass`.
    ///
    /// Negative power pushes away. Skipped when already at the target.
    pub fn thrust(&mut self, target: &Point, power: i32) {
        let distance = self.position.distance(target);
        if distance.abs() <= EPSILON {
            return;
        }

        let coef = (power as f64 / self.mass) / distance;
        self.vx += (target.x - self.position.x) * coef;
        self.vy += (target.y - self.position.y) * coef;
    }

    /// End-of-round rounding and friction.
    ///
    /// Units inside a Doof zone keep their full velocity.
    pub fn adjust(&mut self, suppressed: bool) {
        self.position.x = round(self.position.x) as f64;
        self.position.y = round(self.position.y) as f64;

        let keep = if suppressed { 1.0 } else { 1.0 - self.friction };
        self.vx = round(self.vx * keep) as f64;
        self.vy = round(self.vy * keep) as f64;
    }

    /// Tanker autopilot: head for watertown until full, then leave.
    pub fn tanker_autopilot(&mut self) {
        let full = match &self.kind {
            UnitKind::Tanker(tanker) => tanker.is_full(),
            UnitKind::Looter(_) => return,
        };

        if full {
            self.thrust(&Point::ORIGIN, -TANKER_THRUST);
        } else if self.position.distance_to_origin() > WATERTOWN_RADIUS {
            self.thrust(&Point::ORIGIN, TANKER_THRUST);
        }
    }

    /// Rage produced by a Doof moving at its current speed.
    pub fn rage_output(&self) -> i32 {
        (self.speed() * DOOF_RAGE_COEF).floor() as i32
    }

    /// First extra field of the per-player state line.
    pub fn extra_input(&self) -> i32 {
        self.as_tanker().map_or(-1, |t| t.water)
    }

    /// Second extra field of the per-player state line.
    pub fn extra_input2(&self) -> i32 {
        self.as_tanker().map_or(-1, |t| t.size)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looter_defaults() {
        let unit = Unit::looter(0, LooterKind::Destroyer, 1, Point::new(10.0, 0.0));
        assert_eq!(unit.mass, DESTROYER_MASS);
        assert_eq!(unit.radius, LOOTER_RADIUS);
        assert_eq!(unit.type_tag(), TYPE_DESTROYER);
        assert_eq!(unit.owner_index(), Some(1));
        assert_eq!(unit.as_looter().map(|l| l.skill_cost), Some(DESTROYER_SKILL_COST));
    }

    #[test]
    fn test_tanker_defaults() {
        let unit = Unit::tanker(3, 6, 2);
        assert_eq!(unit.radius, 700.0);
        assert_eq!(unit.mass, 3.0);
        assert_eq!(unit.owner_index(), None);
        assert_eq!(unit.extra_input(), 1);
        assert_eq!(unit.extra_input2(), 6);
        assert!(!unit.as_tanker().is_some_and(Tanker::is_full));
    }

    #[test]
    fn test_thrust_scales_by_mass() {
        let mut unit = Unit::looter(0, LooterKind::Reaper, 0, Point::ORIGIN);
        unit.thrust(&Point::new(1000.0, 0.0), 100);
        assert!((unit.vx - 200.0).abs() < 1e-9);
        assert_eq!(unit.vy, 0.0);
    }

    #[test]
    fn test_thrust_on_target_is_noop() {
        let mut unit = Unit::looter(0, LooterKind::Doof, 0, Point::new(5.0, 5.0));
        unit.thrust(&Point::new(5.0, 5.0), 300);
        assert_eq!(unit.speed(), 0.0);
    }

    #[test]
    fn test_wanted_thrust_clamped() {
        let mut looter = Looter::new(LooterKind::Reaper, 0);
        looter.set_wanted_thrust(Point::ORIGIN, 5000);
        assert_eq!(looter.wanted_thrust.map(|t| t.power), Some(MAX_THRUST));
        looter.set_wanted_thrust(Point::ORIGIN, -3);
        assert_eq!(looter.wanted_thrust.map(|t| t.power), Some(0));

        looter.reset();
        assert!(looter.wanted_thrust.is_none());
    }

    #[test]
    fn test_adjust_applies_friction_unless_suppressed() {
        let mut unit = Unit::looter(0, LooterKind::Reaper, 0, Point::new(1.4, -2.6));
        unit.vx = 100.0;
        unit.vy = -50.0;

        let mut suppressed = unit.clone();
        unit.adjust(false);
        suppressed.adjust(true);

        assert_eq!(unit.position, Point::new(1.0, -3.0));
        assert_eq!(unit.vx, 80.0);
        assert_eq!(unit.vy, -40.0);
        assert_eq!(suppressed.vx, 100.0);
        assert_eq!(suppressed.vy, -50.0);
    }

    #[test]
    fn test_tanker_autopilot() {
        let mut tanker = Unit::tanker(0, 4, 0);
        tanker.position = Point::new(5000.0, 0.0);
        tanker.tanker_autopilot();
        assert!(tanker.vx < 0.0, "empty tanker heads inward");

        let mut full = Unit::tanker(1, 4, 0);
        full.position = Point::new(5000.0, 0.0);
        if let Some(t) = full.as_tanker_mut() {
            t.water = 4;
        }
        full.tanker_autopilot();
        assert!(full.vx > 0.0, "full tanker heads outward");

        let mut parked = Unit::tanker(2, 4, 0);
        parked.position = Point::new(1000.0, 0.0);
        parked.tanker_autopilot();
        assert_eq!(parked.speed(), 0.0);
    }

    #[test]
    fn test_rage_output_floors() {
        let mut doof = Unit::looter(0, LooterKind::Doof, 0, Point::ORIGIN);
        doof.vx = 300.0;
        doof.vy = 400.0;
        assert_eq!(doof.rage_output(), 5);
        doof.vx = 99.0;
        doof.vy = 0.0;
        assert_eq!(doof.rage_output(), 0);
    }
}
