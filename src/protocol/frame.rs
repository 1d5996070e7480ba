//! Frame Replay Records
//!
//! Append-only text records a viewer uses to replay a round:
//! timestamp markers, full descriptors for entities seen for the first
//! time, short deltas for entities already known, and dead markers.
//!
//! The first-seen set lives here, not on the entities, so the simulation
//! state stays free of serialization concerns.

use std::collections::BTreeSet;

use crate::core::id::EntityId;
use crate::core::point::round;
use crate::core::constants::TYPE_WRECK;
use crate::game::skill::SkillEffect;
use crate::game::unit::{Unit, UnitKind};
use crate::game::wreck::Wreck;

/// Something that appears in the frame stream.
pub trait Describe {
    /// Id used for the first-seen set.
    fn frame_id(&self) -> EntityId;

    /// Short form, written once the entity is known.
    fn delta_descriptor(&self) -> String;

    /// Long form with static fields, written on first sighting.
    fn full_descriptor(&self) -> String;
}

impl Describe for Unit {
    fn frame_id(&self) -> EntityId {
        self.id
    }

    fn delta_descriptor(&self) -> String {
        let key = match &self.kind {
            UnitKind::Tanker(tanker) => format!("{}@{}", self.id, tanker.water),
            UnitKind::Looter(_) => self.id.to_string(),
        };
        format!(
            "{} {} {} {} {}",
            key,
            round(self.position.x),
            round(self.position.y),
            round(self.vx),
            round(self.vy),
        )
    }

    fn full_descriptor(&self) -> String {
        let mut line = format!(
            "{} {} {}",
            self.delta_descriptor(),
            self.type_tag(),
            round(self.radius),
        );
        if let Some(owner) = self.owner_index() {
            line.push_str(&format!(" {owner}"));
        }
        line
    }
}

impl Describe for Wreck {
    fn frame_id(&self) -> EntityId {
        self.id
    }

    fn delta_descriptor(&self) -> String {
        format!("{}@{}", self.id, self.water)
    }

    fn full_descriptor(&self) -> String {
        format!(
            "{} {} {} 0 0 {} {}",
            self.delta_descriptor(),
            round(self.position.x),
            round(self.position.y),
            TYPE_WRECK,
            round(self.radius),
        )
    }
}

impl Describe for SkillEffect {
    fn frame_id(&self) -> EntityId {
        self.id
    }

    fn delta_descriptor(&self) -> String {
        self.id.to_string()
    }

    fn full_descriptor(&self) -> String {
        format!(
            "{} {} {} {} 0 {} {}",
            self.id,
            round(self.center.x),
            round(self.center.y),
            self.looter_id,
            self.kind.type_tag(),
            round(self.radius),
        )
    }
}

/// Collects the frame lines of the current round.
#[derive(Clone, Debug, Default)]
pub struct FrameRecorder {
    lines: Vec<String>,
    seen: BTreeSet<EntityId>,
}

impl FrameRecorder {
    /// Create an empty recorder with nothing seen yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a sub-frame at time `t` within the round.
    pub fn new_frame(&mut self, t: f64) {
        self.lines.push(format!("#{t:.5}"));
    }

    /// Record an entity's current state.
    pub fn add<D: Describe>(&mut self, entity: &D) {
        let line = self.describe(entity);
        self.lines.push(line);
    }

    /// Record an entity leaving the simulation.
    pub fn add_dead<D: Describe>(&mut self, entity: &D) {
        let line = self.describe(entity);
        self.lines.push(format!("{line} d"));
    }

    fn describe<D: Describe>(&mut self, entity: &D) -> String {
        if self.seen.insert(entity.frame_id()) {
            entity.full_descriptor()
        } else {
            entity.delta_descriptor()
        }
    }

    /// Lines recorded since the last `clear`.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Drop the current lines. The first-seen set is kept.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Whether an entity has been described before.
    pub fn is_known(&self, id: EntityId) -> bool {
        self.seen.contains(&id)
    }
}
