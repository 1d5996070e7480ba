//! Referee Tuning Constants
//!
//! Every physical and rules constant of the arena lives here so the
//! simulation modules share one source of truth.

// =============================================================================
// MAP
// =============================================================================

/// Radius of the playable disc, centred on the origin.
pub const MAP_RADIUS: f64 = 6000.0;

/// Radius of the central watertown zone where tankers fill up.
pub const WATERTOWN_RADIUS: f64 = 3000.0;

/// Number of looters each player controls (Reaper, Destroyer, Doof).
pub const LOOTER_COUNT: usize = 3;

/// Minimum tankers per player chosen at session start.
pub const TANKERS_BY_PLAYER_MIN: u32 = 1;

/// Maximum tankers per player chosen at session start.
pub const TANKERS_BY_PLAYER_MAX: u32 = 3;

/// Size of the shared tanker-spawn pool generated at session start.
pub const TANKER_SPAWN_POOL: usize = 500;

// =============================================================================
// TANKERS
// =============================================================================

/// Autopilot thrust power.
pub const TANKER_THRUST: i32 = 500;
/// Mass of an empty tanker.
pub const TANKER_EMPTY_MASS: f64 = 2.5;
/// Mass added per water unit carried.
pub const TANKER_MASS_BY_WATER: f64 = 0.5;
/// Tanker friction coefficient.
pub const TANKER_FRICTION: f64 = 0.40;
/// Tanker radius before size is added.
pub const TANKER_RADIUS_BASE: f64 = 400.0;
/// Radius added per size unit.
pub const TANKER_RADIUS_BY_SIZE: f64 = 50.0;
/// Water a freshly spawned tanker carries.
pub const TANKER_EMPTY_WATER: i32 = 1;
/// Smallest tanker size (inclusive).
pub const TANKER_MIN_SIZE: i32 = 4;
/// Largest tanker size (exclusive).
pub const TANKER_MAX_SIZE: i32 = 10;
/// Radius of the smallest possible tanker.
pub const TANKER_MIN_RADIUS: f64 = TANKER_RADIUS_BASE + TANKER_RADIUS_BY_SIZE * TANKER_MIN_SIZE as f64;
/// Radius of the spawn ring tankers enter from and leave through.
pub const TANKER_SPAWN_RADIUS: f64 = 8000.0;
/// Thrust applied once when a tanker spawns.
pub const TANKER_START_THRUST: i32 = 2000;

// =============================================================================
// PLAYERS
// =============================================================================

/// Maximum thrust a looter may command.
pub const MAX_THRUST: i32 = 300;
/// Rage cap.
pub const MAX_RAGE: i32 = 300;
/// Score that ends the game immediately.
pub const WIN_SCORE: i32 = 50;

/// Radius shared by all looters.
pub const LOOTER_RADIUS: f64 = 400.0;

pub const REAPER_MASS: f64 = 0.5;
pub const REAPER_FRICTION: f64 = 0.20;
pub const REAPER_SKILL_DURATION: i32 = 3;
pub const REAPER_SKILL_COST: i32 = 30;
pub const REAPER_SKILL_ORDER: i32 = 0;
pub const REAPER_SKILL_RANGE: f64 = 2000.0;
pub const REAPER_SKILL_RADIUS: f64 = 1000.0;
/// Mass granted by a Reaper effect; also the Destroyer kill threshold.
pub const REAPER_SKILL_MASS_BONUS: f64 = 10.0;

pub const DESTROYER_MASS: f64 = 1.5;
pub const DESTROYER_FRICTION: f64 = 0.30;
pub const DESTROYER_SKILL_DURATION: i32 = 1;
pub const DESTROYER_SKILL_COST: i32 = 60;
pub const DESTROYER_SKILL_ORDER: i32 = 2;
pub const DESTROYER_SKILL_RANGE: f64 = 2000.0;
pub const DESTROYER_SKILL_RADIUS: f64 = 1000.0;
/// Outward thrust applied by a Destroyer grenade.
pub const DESTROYER_NITRO_GRENADE_POWER: i32 = 1000;

pub const DOOF_MASS: f64 = 1.0;
pub const DOOF_FRICTION: f64 = 0.25;
/// Rage gained per unit of Doof speed.
pub const DOOF_RAGE_COEF: f64 = 1.0 / 100.0;
pub const DOOF_SKILL_DURATION: i32 = 3;
pub const DOOF_SKILL_COST: i32 = 30;
pub const DOOF_SKILL_ORDER: i32 = 1;
pub const DOOF_SKILL_RANGE: f64 = 2000.0;
pub const DOOF_SKILL_RADIUS: f64 = 1000.0;

// =============================================================================
// TYPE TAGS (wire values)
// =============================================================================

pub const TYPE_REAPER: i32 = 0;
pub const TYPE_DESTROYER: i32 = 1;
pub const TYPE_DOOF: i32 = 2;
pub const TYPE_TANKER: i32 = 3;
pub const TYPE_WRECK: i32 = 4;
pub const TYPE_REAPER_SKILL_EFFECT: i32 = 5;
pub const TYPE_DOOF_SKILL_EFFECT: i32 = 6;
pub const TYPE_DESTROYER_SKILL_EFFECT: i32 = 7;

// =============================================================================
// PHYSICS
// =============================================================================

/// Threshold below which divisions are suppressed.
pub const EPSILON: f64 = 0.00001;
/// Smallest non-negligible bounce impulse.
pub const MIN_IMPULSE: f64 = 30.0;
/// Fraction of the impulse re-applied after the inelastic step.
pub const IMPULSE_COEFF: f64 = 0.5;
/// Collision time used for "no collision this round".
pub const NO_COLLISION_TIME: f64 = 1.0 + EPSILON;
