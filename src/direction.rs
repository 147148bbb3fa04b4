//! Facing directions and the walk animation keys derived from them.
use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the four directions a character sprite can face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Towards the top of the screen (negative y).
    Up,
    /// Towards the bottom of the screen (positive y).
    #[default]
    Down,
    /// Towards negative x.
    Left,
    /// Towards positive x.
    Right,
}

impl Direction {
    /// All directions, in the order sprite sheets lay out their walk rows.
    pub const ALL: [Self; 4] = [Self::Down, Self::Left, Self::Right, Self::Up];

    /// Lowercase name used in animation keys and configuration files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name of an animation registered with the presentation layer.
///
/// Walk animations are keyed `walk-<direction>`.
///
/// # Examples
///
/// ```
/// use cortege::{AnimationKey, Direction};
/// assert_eq!(AnimationKey::walk(Direction::Left).as_str(), "walk-left");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnimationKey(String);

impl AnimationKey {
    /// Key of the walk cycle for `facing`.
    #[must_use]
    pub fn walk(facing: Direction) -> Self {
        Self(format!("walk-{facing}"))
    }

    /// Borrow the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The direction encoded in a walk key, if this is one.
    #[must_use]
    pub fn walk_direction(&self) -> Option<Direction> {
        let name = self.0.strip_prefix("walk-")?;
        Direction::ALL.into_iter().find(|dir| dir.as_str() == name)
    }
}

impl fmt::Display for AnimationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Direction::Up, "walk-up")]
    #[case(Direction::Down, "walk-down")]
    #[case(Direction::Left, "walk-left")]
    #[case(Direction::Right, "walk-right")]
    fn walk_keys_follow_naming_scheme(#[case] facing: Direction, #[case] expected: &str) {
        let key = AnimationKey::walk(facing);
        assert_eq!(key.as_str(), expected);
        assert_eq!(key.walk_direction(), Some(facing));
    }

    #[test]
    fn direction_deserialises_from_lowercase() {
        let dir: Direction = serde_json::from_str("\"left\"").expect("valid direction");
        assert_eq!(dir, Direction::Left);
    }

    #[test]
    fn non_walk_key_has_no_direction() {
        let key = AnimationKey("idle".to_owned());
        assert_eq!(key.walk_direction(), None);
    }
}
