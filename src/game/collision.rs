//! Collision Detection and Response
//!
//! Continuous detection: every unit moves in a straight line for the rest
//! of the round, so contact times are roots of a quadratic. The round
//! driver asks for the single earliest contact, advances everything to it,
//! resolves it, and asks again.

use crate::core::constants::*;
use crate::core::point::Point;
use crate::game::unit::{LooterKind, Unit};

/// What touched what.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Contact {
    /// Nothing within the round.
    None,
    /// Unit at this index reaches the map border.
    Border(usize),
    /// Units at these indices touch.
    Units(usize, usize),
}

/// A contact and the fraction of the round at which it happens.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Collision {
    /// Time from now, in rounds.
    pub t: f64,
    /// Participants.
    pub contact: Contact,
}

impl Collision {
    /// Sentinel: later than any time left in the round.
    pub const NONE: Collision = Collision {
        t: NO_COLLISION_TIME,
        contact: Contact::None,
    };

    fn border(t: f64, index: usize) -> Self {
        Self { t, contact: Contact::Border(index) }
    }

    fn units(t: f64, a: usize, b: usize) -> Self {
        Self { t, contact: Contact::Units(a, b) }
    }
}

// =============================================================================
// DETECTION
// =============================================================================

/// Earliest time `unit` reaches the map border.
///
/// Tankers may leave the map and never collide with it.
pub fn border_collision(unit: &Unit, index: usize) -> Collision {
    if unit.as_tanker().is_some() {
        return Collision::NONE;
    }

    // Already touching
    if unit.position.distance_to_origin() + unit.radius >= MAP_RADIUS {
        return Collision::border(0.0, index);
    }

    if unit.vx == 0.0 && unit.vy == 0.0 {
        return Collision::NONE;
    }

    let (x, y) = (unit.position.x, unit.position.y);
    let a = unit.vx * unit.vx + unit.vy * unit.vy;
    if a <= 0.0 {
        return Collision::NONE;
    }

    let inner = MAP_RADIUS - unit.radius;
    let b = 2.0 * (x * unit.vx + y * unit.vy);
    let c = x * x + y * y - inner * inner;
    let delta = b * b - 4.0 * a * c;
    if delta <= 0.0 {
        return Collision::NONE;
    }

    // The unit is inside, so the exit is the larger root.
    let t = (-b + delta.sqrt()) / (2.0 * a);
    if t <= 0.0 {
        return Collision::NONE;
    }

    Collision::border(t, index)
}

/// Earliest time units `a` and `b` touch.
pub fn unit_collision(a: &Unit, ia: usize, b: &Unit, ib: usize) -> Collision {
    // Already overlapping
    if a.position.distance(&b.position) <= a.radius + b.radius {
        return Collision::units(0.0, ia, ib);
    }

    if a.vx == 0.0 && a.vy == 0.0 && b.vx == 0.0 && b.vy == 0.0 {
        return Collision::NONE;
    }

    // Frame where b is stationary at the origin
    let x = a.position.x - b.position.x;
    let y = a.position.y - b.position.y;
    let r = a.radius + b.radius;
    let vx = a.vx - b.vx;
    let vy = a.vy - b.vy;

    let qa = vx * vx + vy * vy;
    if qa <= 0.0 {
        return Collision::NONE;
    }

    let qb = 2.0 * (x * vx + y * vy);
    let qc = x * x + y * y - r * r;
    let delta = qb * qb - 4.0 * qa * qc;
    if delta < 0.0 {
        return Collision::NONE;
    }

    let t = (-qb - delta.sqrt()) / (2.0 * qa);
    if t <= 0.0 {
        return Collision::NONE;
    }

    Collision::units(t, ia, ib)
}

/// Scan every unit against the border and every later unit.
///
/// Ties keep the first contact found in scan order.
pub fn next_collision(units: &[Unit]) -> Collision {
    let mut result = Collision::NONE;

    for (i, unit) in units.iter().enumerate() {
        let collision = border_collision(unit, i);
        if collision.t < result.t {
            result = collision;
        }

        for (j, other) in units.iter().enumerate().skip(i + 1) {
            let collision = unit_collision(unit, i, other, j);
            if collision.t < result.t {
                result = collision;
            }
        }
    }

    result
}

/// Index of the tanker a Destroyer contact destroys, if any.
///
/// A tanker is only destroyed while lighter than the Reaper mass bonus.
pub fn destroyed_tanker(units: &[Unit], a: usize, b: usize) -> Option<usize> {
    let kills = |hunter: &Unit, prey: &Unit| {
        hunter.is_looter_kind(LooterKind::Destroyer)
            && prey.as_tanker().is_some()
            && prey.mass < REAPER_SKILL_MASS_BONUS
    };

    if kills(&units[a], &units[b]) {
        Some(b)
    } else if kills(&units[b], &units[a]) {
        Some(a)
    } else {
        None
    }
}

// =============================================================================
// RESPONSE
// =============================================================================

/// Scale a non-negligible impulse up to `MIN_IMPULSE`.
fn clamp_impulse(fx: f64, fy: f64) -> (f64, f64) {
    let impulse = (fx * fx + fy * fy).sqrt();
    let coeff = if impulse > EPSILON && impulse < MIN_IMPULSE {
        MIN_IMPULSE / impulse
    } else {
        1.0
    };
    (fx * coeff, fy * coeff)
}

/// Resolve a contact between two units.
///
/// First a fully inelastic exchange along the line of centres, then the
/// same impulse again scaled by `IMPULSE_COEFF` (and clamped up to
/// `MIN_IMPULSE`). Overlapping units are pushed apart afterwards.
/// Returns the magnitude of the second impulse, zero when the centres
/// coincide and no line of centres exists.
pub fn bounce_units(a: &mut Unit, b: &mut Unit) -> f64 {
    let mcoeff = (a.mass + b.mass) / (a.mass * b.mass);
    let nx = a.position.x - b.position.x;
    let ny = a.position.y - b.position.y;
    let nxnysquare = nx * nx + ny * ny;
    if nxnysquare <= EPSILON {
        return 0.0;
    }
    let dvx = a.vx - b.vx;
    let dvy = a.vy - b.vy;
    let product = (nx * dvx + ny * dvy) / (nxnysquare * mcoeff);
    let fx = nx * product;
    let fy = ny * product;
    let m1c = 1.0 / a.mass;
    let m2c = 1.0 / b.mass;

    a.vx -= fx * m1c;
    a.vy -= fy * m1c;
    b.vx += fx * m2c;
    b.vy += fy * m2c;

    let (fx, fy) = clamp_impulse(fx * IMPULSE_COEFF, fy * IMPULSE_COEFF);

    a.vx -= fx * m1c;
    a.vy -= fy * m1c;
    b.vx += fx * m2c;
    b.vy += fy * m2c;

    let diff = (a.position.distance(&b.position) - a.radius - b.radius) / 2.0;
    if diff <= 0.0 {
        let b_pos = b.position;
        a.position.move_toward(&b_pos, diff - EPSILON);
        let a_pos = a.position;
        b.position.move_toward(&a_pos, diff - EPSILON);
    }

    (fx * fx + fy * fy).sqrt()
}

/// Resolve a contact with the map border (an infinitely heavy wall).
///
/// Returns the magnitude of the second impulse. A unit sitting on the
/// centre has no normal and is left alone.
pub fn bounce_border(unit: &mut Unit) -> f64 {
    let mcoeff = 1.0 / unit.mass;
    let (x, y) = (unit.position.x, unit.position.y);
    let nxnysquare = x * x + y * y;
    if nxnysquare <= EPSILON {
        return 0.0;
    }
    let product = (x * unit.vx + y * unit.vy) / (nxnysquare * mcoeff);
    let fx = x * product;
    let fy = y * product;

    unit.vx -= fx * mcoeff;
    unit.vy -= fy * mcoeff;

    let (fx, fy) = clamp_impulse(fx * IMPULSE_COEFF, fy * IMPULSE_COEFF);
    unit.vx -= fx * mcoeff;
    unit.vy -= fy * mcoeff;

    let diff = unit.position.distance_to_origin() + unit.radius - MAP_RADIUS;
    if diff >= 0.0 {
        // Still outside, pull back in
        unit.position.move_toward(&Point::ORIGIN, diff + EPSILON);
    }

    (fx * fx + fy * fy).sqrt()
}

/// Borrow two distinct units mutably.
pub fn pair_mut(units: &mut [Unit], i: usize, j: usize) -> (&mut Unit, &mut Unit) {
    assert_ne!(i, j, "a unit cannot collide with itself");
    if i < j {
        let (left, right) = units.split_at_mut(j);
        (&mut left[i], &mut right[0])
    } else {
        let (left, right) = units.split_at_mut(i);
        (&mut right[0], &mut left[j])
    }
}

// =============================================================================
// TESTS
// =============================================================================
