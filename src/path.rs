//! Bounded history of leader positions sampled by followers.
//!
//! The path is stored newest-first: index 0 is the most recent sample.
//! Followers read nodes at fixed offsets from the head, so a longer path
//! means followers trail further behind. Growth is capped with hysteresis:
//! the path is allowed to reach `growth * members` nodes and is then cut back
//! to `retain * members` in a single step, which keeps truncation rare.

use std::collections::VecDeque;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::direction::Direction;

/// One historical sample of the leader's position and facing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathNode {
    /// World x coordinate in pixels.
    pub x: f32,
    /// World y coordinate in pixels; grows downwards.
    pub y: f32,
    /// Direction the leader faced when the sample was taken.
    pub facing: Direction,
}

impl PathNode {
    /// Creates a node.
    #[must_use]
    pub const fn new(x: f32, y: f32, facing: Direction) -> Self {
        Self { x, y, facing }
    }

    /// The node's position as a vector.
    #[must_use]
    pub const fn position(&self) -> glam::Vec2 {
        glam::Vec2::new(self.x, self.y)
    }
}

/// Thresholds controlling when the path grows and when it is cut back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathPolicy {
    /// Minimum per-axis displacement from the head for a new node.
    pub jitter_threshold: f32,
    /// Nodes per member allowed before truncation.
    pub growth_factor: usize,
    /// Nodes per member kept after truncation.
    pub retain_factor: usize,
}

impl Default for PathPolicy {
    fn default() -> Self {
        Self {
            jitter_threshold: crate::JITTER_THRESHOLD,
            growth_factor: crate::PATH_GROWTH_FACTOR,
            retain_factor: crate::PATH_RETAIN_FACTOR,
        }
    }
}

/// Newest-first trail of [`PathNode`]s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrailPath {
    nodes: VecDeque<PathNode>,
}

impl TrailPath {
    /// Creates an empty path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a path holding a single seed node.
    #[must_use]
    pub fn seeded(node: PathNode) -> Self {
        let mut nodes = VecDeque::new();
        nodes.push_front(node);
        Self { nodes }
    }

    /// Records a leader sample.
    ///
    /// The node is added only when it differs from the current head by more
    /// than the jitter threshold on either axis, or when the path is empty.
    /// Afterwards the path is truncated to `retain_factor * member_count`
    /// nodes if it exceeds `growth_factor * member_count`.
    ///
    /// Returns `true` when a node was added.
    ///
    /// # Examples
    ///
    /// ```
    /// use cortege::{Direction, PathPolicy, TrailPath};
    /// let mut path = TrailPath::new();
    /// let policy = PathPolicy::default();
    /// assert!(path.record(100.0, 100.0, Direction::Down, 1, &policy));
    /// // Within the jitter threshold: ignored.
    /// assert!(!path.record(102.0, 98.0, Direction::Down, 1, &policy));
    /// assert_eq!(path.len(), 1);
    /// ```
    pub fn record(
        &mut self,
        x: f32,
        y: f32,
        facing: Direction,
        member_count: usize,
        policy: &PathPolicy,
    ) -> bool {
        if let Some(head) = self.nodes.front() {
            let moved_x = (x - head.x).abs() > policy.jitter_threshold;
            let moved_y = (y - head.y).abs() > policy.jitter_threshold;
            if !(moved_x || moved_y) {
                return false;
            }
        }
        self.nodes.push_front(PathNode::new(x, y, facing));

        let limit = policy.growth_factor.saturating_mul(member_count);
        if self.nodes.len() > limit {
            let keep = policy.retain_factor.saturating_mul(member_count);
            debug!(
                "trail path truncated from {} to {keep} nodes",
                self.nodes.len()
            );
            self.nodes.truncate(keep);
        }
        true
    }

    /// The node `index` samples behind the head, if recorded.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&PathNode> {
        self.nodes.get(index)
    }

    /// The most recent node.
    #[must_use]
    pub fn head(&self) -> Option<&PathNode> {
        self.nodes.front()
    }

    /// The oldest node still kept.
    #[must_use]
    pub fn tail(&self) -> Option<&PathNode> {
        self.nodes.back()
    }

    /// Number of recorded nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no node has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates newest-first.
    pub fn iter(&self) -> impl Iterator<Item = &PathNode> {
        self.nodes.iter()
    }

    /// Discards all history and restarts from `node`.
    ///
    /// Used when the whole party is relocated so stale history does not drag
    /// followers back to where the old formation used to be.
    pub fn reset_to(&mut self, node: PathNode) {
        self.nodes.clear();
        self.nodes.push_front(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn policy() -> PathPolicy {
        PathPolicy::default()
    }

    #[rstest]
    fn empty_path_records_first_sample(policy: PathPolicy) {
        let mut path = TrailPath::new();
        assert!(path.record(100.0, 100.0, Direction::Down, 1, &policy));
        let nodes: Vec<_> = path.iter().copied().collect();
        assert_eq!(nodes, vec![PathNode::new(100.0, 100.0, Direction::Down)]);
    }

    #[rstest]
    #[case(3.0, 0.0)]
    #[case(0.0, -3.0)]
    #[case(-2.5, 2.9)]
    #[case(0.0, 0.0)]
    fn jitter_does_not_grow_path(policy: PathPolicy, #[case] dx: f32, #[case] dy: f32) {
        let mut path = TrailPath::seeded(PathNode::new(10.0, 10.0, Direction::Up));
        assert!(!path.record(10.0 + dx, 10.0 + dy, Direction::Left, 2, &policy));
        assert_eq!(path.len(), 1);
    }

    #[rstest]
    #[case(3.5, 0.0)]
    #[case(0.0, -4.0)]
    fn movement_beyond_threshold_prepends(policy: PathPolicy, #[case] dx: f32, #[case] dy: f32) {
        let mut path = TrailPath::seeded(PathNode::new(10.0, 10.0, Direction::Up));
        assert!(path.record(10.0 + dx, 10.0 + dy, Direction::Right, 2, &policy));
        assert_eq!(path.len(), 2);
        let head = path.head().expect("head exists");
        assert_eq!(head.facing, Direction::Right);
        assert!((head.x - (10.0 + dx)).abs() < f32::EPSILON);
    }

    #[rstest]
    #[case(1)]
    #[case(3)]
    #[case(5)]
    fn growth_is_capped_with_hysteresis(policy: PathPolicy, #[case] members: usize) {
        let mut path = TrailPath::new();
        let cap = policy.growth_factor * members;
        let mut x = 0.0;
        for _ in 0..cap {
            x += 4.0;
            path.record(x, 0.0, Direction::Right, members, &policy);
        }
        assert_eq!(path.len(), cap);

        x += 4.0;
        path.record(x, 0.0, Direction::Right, members, &policy);
        assert_eq!(path.len(), policy.retain_factor * members);
        let head = path.head().expect("head exists");
        assert!((head.x - x).abs() < f32::EPSILON, "newest node survives");
    }

    #[rstest]
    fn reset_discards_history(policy: PathPolicy) {
        let mut path = TrailPath::new();
        for step in 0..5_u8 {
            path.record(f32::from(step) * 5.0, 0.0, Direction::Right, 1, &policy);
        }
        path.reset_to(PathNode::new(-7.0, 3.0, Direction::Up));
        assert_eq!(path.len(), 1);
        assert_eq!(path.head(), Some(&PathNode::new(-7.0, 3.0, Direction::Up)));
    }
}
