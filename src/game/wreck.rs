//! Wrecks
//!
//! Remains of a destroyed tanker. Reapers parked inside harvest one water
//! per round for their player.

use serde::{Serialize, Deserialize};

use crate::core::id::EntityId;
use crate::core::point::Point;

/// Harvestable water left where a tanker died.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Wreck {
    /// Session-unique id.
    pub id: EntityId,
    /// Centre (rounded tanker position).
    pub position: Point,
    /// Harvest radius (the dead tanker's radius).
    pub radius: f64,
    /// Water left.
    pub water: i32,
}

impl Wreck {
    /// Create a wreck.
    pub fn new(id: EntityId, position: Point, water: i32, radius: f64) -> Self {
        Self { id, position, radius, water }
    }

    /// Whether a reaper centred at `reaper` can harvest this wreck.
    #[inline]
    pub fn in_harvest_range(&self, reaper: &Point) -> bool {
        self.position.is_in_range(reaper, self.radius)
    }

    /// Take one water unit. Returns whether any water remains.
    pub fn drain(&mut self) -> bool {
        self.water -= 1;
        self.water > 0
    }

    /// A wreck with no water left is removed.
    #[inline]
    pub fn is_depleted(&self) -> bool {
        self.water <= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harvest_range_is_inclusive() {
        let wreck = Wreck::new(0, Point::new(0.0, 0.0), 3, 600.0);
        assert!(wreck.in_harvest_range(&Point::new(600.0, 0.0)));
        assert!(!wreck.in_harvest_range(&Point::new(600.5, 0.0)));
    }

    #[test]
    fn test_drain_until_depleted() {
        let mut wreck = Wreck::new(0, Point::ORIGIN, 2, 500.0);
        assert!(wreck.drain());
        assert!(!wreck.is_depleted());
        assert!(!wreck.drain());
        assert!(wreck.is_depleted());
    }
}
