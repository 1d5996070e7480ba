//! 2D Point
//!
//! Double-precision point used for positions and skill targets.
//! Equality compares bit patterns and is only meant for deduplication;
//! geometric tests always go through `distance`.

use std::fmt;
use std::hash::{Hash, Hasher};
use serde::{Serialize, Deserialize};

use super::constants::EPSILON;

/// A point (or displacement) in the arena plane.
#[derive(Clone, Copy, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// The map centre (watertown).
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new point.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Distance to the map centre.
    #[inline]
    pub fn distance_to_origin(&self) -> f64 {
        self.distance(&Self::ORIGIN)
    }

    /// Teleport to absolute coordinates.
    #[inline]
    pub fn set(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    /// Translate in place.
    #[inline]
    pub fn move_by(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    /// Move `distance` along the direction towards `target`.
    ///
    /// A negative distance moves away. Does nothing when the two points
    /// are closer than `EPSILON`, since the direction is undefined.
    pub fn move_toward(&mut self, target: &Point, distance: f64) {
        let d = self.distance(target);
        if d < EPSILON {
            return;
        }

        let coef = distance / d;
        self.x += (target.x - self.x) * coef;
        self.y += (target.y - self.y) * coef;
    }

    /// True when `other` is a different point object within `range`.
    ///
    /// Identity is by reference, so a point is never in range of itself.
    #[inline]
    pub fn is_in_range(&self, other: &Point, range: f64) -> bool {
        !std::ptr::eq(self, other) && self.distance(other) <= range
    }
}

/// Round to the nearest integer, halves away from zero.
#[inline]
pub fn round(value: f64) -> i64 {
    value.round() as i64
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.x.to_bits() == other.x.to_bits() && self.y.to_bits() == other.y.to_bits()
    }
}

impl Eq for Point {}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.x.to_bits().hash(state);
        self.y.to_bits().hash(state);
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Point({:.3}, {:.3})", self.x, self.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", round(self.x), round(self.y))
    }
}

// =============================================================================
// TESTS
// =============================================================================
