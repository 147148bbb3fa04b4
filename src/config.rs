//! Party tuning loaded from JSON.
//!
//! Every field is optional in the file; missing fields take the defaults in
//! [`crate::constants`]. A loaded configuration is validated before use so
//! the controller can rely on, for example, a non-zero node offset.
//!
//! ```json
//! {
//!   "node_offset": 6,
//!   "teleport_distance": 48.0,
//!   "controls": { "change_leader": ["KeyQ"] }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::input::Controls;
use crate::path::PathPolicy;
use crate::{
    BASE_DEPTH, FOLLOWER_SPEED_MULTIPLIER, FREE_ROAM_SPEED, IDLE_ZONE, JITTER_THRESHOLD,
    LEADER_CHANGE_COOLDOWN_MS, NODE_OFFSET, PATH_GROWTH_FACTOR, PATH_RETAIN_FACTOR,
    TELEPORT_DISTANCE,
};

/// Failure to load a [`PartyConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The document is not valid JSON or has the wrong shape.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// File that was parsed, or `<inline>` for string input.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
    /// The values parse but cannot drive the controller.
    #[error("invalid party configuration: {0}")]
    Invalid(String),
}

/// Tuning for path recording, follower movement and leader changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartyConfig {
    /// Path-index spacing between consecutive followers' targets.
    pub node_offset: usize,
    /// Followers closer than this to their target stop.
    pub idle_zone: f32,
    /// Followers further than this from their target snap onto it.
    pub teleport_distance: f32,
    /// Minimum per-axis leader movement recorded on the path.
    pub jitter_threshold: f32,
    /// Path nodes per member allowed before truncation.
    pub path_growth_factor: usize,
    /// Path nodes per member kept after truncation.
    pub path_retain_factor: usize,
    /// Leader speed in pixels per second.
    pub free_roam_speed: f32,
    /// Follower speed relative to [`Self::free_roam_speed`].
    pub follower_speed_multiplier: f32,
    /// Lockout after a leader change, in milliseconds.
    pub leader_change_cooldown_ms: u64,
    /// Lowest depth of the party's draw-order band.
    pub base_depth: f32,
    /// Keybinding scheme.
    pub controls: Controls,
}

impl Default for PartyConfig {
    fn default() -> Self {
        Self {
            node_offset: NODE_OFFSET,
            idle_zone: IDLE_ZONE,
            teleport_distance: TELEPORT_DISTANCE,
            jitter_threshold: JITTER_THRESHOLD,
            path_growth_factor: PATH_GROWTH_FACTOR,
            path_retain_factor: PATH_RETAIN_FACTOR,
            free_roam_speed: FREE_ROAM_SPEED,
            follower_speed_multiplier: FOLLOWER_SPEED_MULTIPLIER,
            leader_change_cooldown_ms: LEADER_CHANGE_COOLDOWN_MS,
            base_depth: BASE_DEPTH,
            controls: Controls::default(),
        }
    }
}

impl PartyConfig {
    /// Parses and validates a configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] when [`Self::validate`] rejects the values.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read, otherwise
    /// as [`Self::from_json_str`].
    pub fn load(file: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = file.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        log::info!("loaded party configuration from {}", path.display());
        Ok(config)
    }

    /// Checks the values the controller relies on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_owned()));
        if self.node_offset == 0 {
            return invalid("node_offset must be at least 1");
        }
        if !(self.idle_zone.is_finite() && self.idle_zone >= 0.0) {
            return invalid("idle_zone must be a non-negative number");
        }
        if !(self.teleport_distance.is_finite() && self.teleport_distance > self.idle_zone) {
            return invalid("teleport_distance must exceed idle_zone");
        }
        if !(self.jitter_threshold.is_finite() && self.jitter_threshold >= 0.0) {
            return invalid("jitter_threshold must be a non-negative number");
        }
        if self.path_retain_factor == 0 || self.path_retain_factor >= self.path_growth_factor {
            return invalid("path_retain_factor must be positive and below path_growth_factor");
        }
        if !(self.free_roam_speed.is_finite() && self.free_roam_speed > 0.0) {
            return invalid("free_roam_speed must be positive");
        }
        if !(self.follower_speed_multiplier.is_finite() && self.follower_speed_multiplier > 0.0) {
            return invalid("follower_speed_multiplier must be positive");
        }
        if !self.base_depth.is_finite() {
            return invalid("base_depth must be finite");
        }
        Ok(())
    }

    /// Path recording thresholds derived from this configuration.
    #[must_use]
    pub const fn path_policy(&self) -> PathPolicy {
        PathPolicy {
            jitter_threshold: self.jitter_threshold,
            growth_factor: self.path_growth_factor,
            retain_factor: self.path_retain_factor,
        }
    }

    /// Follower chase speed in pixels per second.
    #[must_use]
    pub fn follower_speed(&self) -> f32 {
        self.free_roam_speed * self.follower_speed_multiplier
    }

    /// Leader change lockout as a duration.
    #[must_use]
    pub const fn leader_change_cooldown(&self) -> Duration {
        crate::numeric::millis(self.leader_change_cooldown_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Action;
    use rstest::rstest;

    #[test]
    fn defaults_are_valid() {
        let config = PartyConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.node_offset, 5);
        assert_eq!(config.leader_change_cooldown(), Duration::from_millis(500));
    }

    #[test]
    fn partial_document_keeps_defaults() {
        let config = PartyConfig::from_json_str(
            r#"{ "node_offset": 8, "controls": { "change_leader": ["KeyQ"] } }"#,
        )
        .expect("valid config");
        assert_eq!(config.node_offset, 8);
        assert!((config.idle_zone - IDLE_ZONE).abs() < f32::EPSILON);
        assert_eq!(config.controls.keys_for(Action::ChangeLeader), ["KeyQ".to_owned()]);
        assert!(config.controls.keys_for(Action::WalkUp).is_empty());
    }

    #[rstest]
    #[case::zero_offset(r#"{ "node_offset": 0 }"#)]
    #[case::negative_idle(r#"{ "idle_zone": -1.0 }"#)]
    #[case::teleport_inside_idle(r#"{ "idle_zone": 10.0, "teleport_distance": 5.0 }"#)]
    #[case::retain_not_below_growth(r#"{ "path_growth_factor": 20, "path_retain_factor": 20 }"#)]
    #[case::zero_speed(r#"{ "free_roam_speed": 0.0 }"#)]
    fn invalid_values_are_rejected(#[case] json: &str) {
        let err = PartyConfig::from_json_str(json).expect_err("config should be rejected");
        assert!(matches!(err, ConfigError::Invalid(_)), "got {err:?}");
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = PartyConfig::from_json_str("{ node_offset: ").expect_err("malformed");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = PartyConfig::load("/nonexistent/cortege/party.json").expect_err("missing");
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("party.json"));
    }

    #[test]
    fn follower_speed_applies_multiplier() {
        let config = PartyConfig::default();
        assert!((config.follower_speed() - 80.0 * 1.1535).abs() < 1e-4);
    }
}
