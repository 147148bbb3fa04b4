//! Simulation state of a single party member.
use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::direction::Direction;
use crate::stats::{CharacterKey, CharacterStats};

/// Stable handle for a party member.
///
/// Ids are assigned when a member joins and are never reused by the same
/// controller, so presentation handles stay valid across leader rotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberId(pub u32);

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "member#{}", self.0)
    }
}

/// Whether a member is walking, and in which direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionState {
    /// Standing still on the idle frame.
    #[default]
    Idle,
    /// Playing the walk cycle for the given direction.
    Walking(Direction),
}

/// One character in the party.
#[derive(Debug, Clone, PartialEq)]
pub struct PartyMember {
    /// Stable handle.
    pub id: MemberId,
    /// Character this member was created from.
    pub key: CharacterKey,
    /// Current stats.
    pub stats: CharacterStats,
    /// World position in pixels; y grows downwards.
    pub position: Vec2,
    /// Velocity in pixels per second.
    pub velocity: Vec2,
    /// Direction the sprite faces.
    pub facing: Direction,
    /// Animation state last pushed to the presentation layer.
    pub motion: MotionState,
    /// Draw order within the party's depth band.
    pub depth: f32,
}

impl PartyMember {
    /// Creates an idle member at `position`.
    #[must_use]
    pub const fn new(
        id: MemberId,
        key: CharacterKey,
        stats: CharacterStats,
        position: Vec2,
    ) -> Self {
        Self {
            id,
            key,
            stats,
            position,
            velocity: Vec2::ZERO,
            facing: Direction::Down,
            motion: MotionState::Idle,
            depth: 0.0,
        }
    }

    /// Whether the member has a non-zero velocity.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.velocity != Vec2::ZERO
    }

    /// Advances the position by `velocity * dt_secs`.
    pub fn integrate(&mut self, dt_secs: f32) {
        self.position += self.velocity * dt_secs;
    }

    /// Like [`integrate`](Self::integrate), but stops on `target` instead of
    /// stepping past it.
    pub fn integrate_towards(&mut self, target: Vec2, dt_secs: f32) {
        let step = self.velocity.length() * dt_secs;
        if step >= self.position.distance(target) {
            self.position = target;
        } else {
            self.integrate(dt_secs);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::StatTable;
    use approx::assert_relative_eq;

    fn member() -> PartyMember {
        let key = CharacterKey::from("wren");
        let stats = StatTable::builtin().get(&key).cloned().expect("wren present");
        PartyMember::new(MemberId(7), key, stats, Vec2::new(10.0, 20.0))
    }

    #[test]
    fn new_member_is_idle() {
        let member = member();
        assert!(!member.is_moving());
        assert_eq!(member.motion, MotionState::Idle);
        assert_eq!(member.facing, Direction::Down);
    }

    #[test]
    fn integrate_applies_velocity() {
        let mut member = member();
        member.velocity = Vec2::new(60.0, -30.0);
        member.integrate(0.5);
        assert_relative_eq!(member.position.x, 40.0);
        assert_relative_eq!(member.position.y, 5.0);
    }

    #[rstest::rstest]
    #[case::short_step(0.05, Vec2::new(15.0, 20.0))]
    #[case::overshooting_step(0.5, Vec2::new(18.0, 20.0))]
    fn integrate_towards_stops_on_target(#[case] dt: f32, #[case] expected: Vec2) {
        let mut member = member();
        member.velocity = Vec2::new(100.0, 0.0);
        member.integrate_towards(Vec2::new(18.0, 20.0), dt);
        assert_relative_eq!(member.position.x, expected.x);
        assert_relative_eq!(member.position.y, expected.y);
    }

    #[test]
    fn id_display_is_readable() {
        assert_eq!(MemberId(3).to_string(), "member#3");
    }
}
