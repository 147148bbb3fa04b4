//! Default tuning constants for party movement.
//!
//! These values seed [`crate::config::PartyConfig::default`]. Every one of
//! them can be overridden from the JSON configuration file.

/// Path-index spacing between consecutive followers' sampling targets.
pub const NODE_OFFSET: usize = 5;
/// Distance in pixels below which a follower stops walking.
pub const IDLE_ZONE: f32 = 3.0;
/// Distance in pixels beyond which a follower snaps onto its target.
pub const TELEPORT_DISTANCE: f32 = 30.0;
/// Leader movement smaller than this on both axes is not recorded.
pub const JITTER_THRESHOLD: f32 = 3.0;
/// The path is truncated once it holds more than this many nodes per member.
pub const PATH_GROWTH_FACTOR: usize = 35;
/// Nodes per member kept after a truncation.
pub const PATH_RETAIN_FACTOR: usize = 20;
/// Leader walking speed in pixels per second.
pub const FREE_ROAM_SPEED: f32 = 80.0;
/// Followers walk slightly faster than the leader so the straight-line chase
/// keeps pace with the leader's actual path length.
pub const FOLLOWER_SPEED_MULTIPLIER: f32 = 1.1535;
/// Window after a leader change during which further changes are ignored.
pub const LEADER_CHANGE_COOLDOWN_MS: u64 = 500;
/// Lowest depth of the band shared by party sprites.
pub const BASE_DEPTH: f32 = 1.0;
