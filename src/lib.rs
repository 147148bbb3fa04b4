#![cfg_attr(docsrs, feature(doc_cfg))]
//! Party movement for a top-down role-playing game.
//!
//! The [`PartyController`] turns leader input into a trailing formation:
//! followers walk the leader's recorded path at fixed offsets, snap back when
//! they fall too far behind, and are depth-sorted by screen height. The
//! controller is engine-agnostic; [`PartyPlugin`] wires it into Bevy.
pub mod config;
pub mod constants;
pub mod controller;
pub mod direction;
pub mod error;
pub mod events;
pub mod input;
pub mod logging;
pub mod member;
pub mod numeric;
pub mod path;
pub mod plugin;
pub mod presenter;
pub mod stats;
pub use constants::*;

// Re-export commonly used items
pub use config::{ConfigError, PartyConfig};
pub use controller::PartyController;
pub use direction::{AnimationKey, Direction};
pub use error::PartyError;
pub use events::{CompositionChanged, LeaderChanged, PartyEvents, Topic};
pub use input::{facing_for, leader_velocity, Action, Controls, InputSnapshot, KeySource, PressedKeys};
pub use logging::init as init_logging;
pub use member::{MemberId, MotionState, PartyMember};
pub use path::{PathNode, PathPolicy, TrailPath};
pub use plugin::{
    CameraFocus, MemberSprite, PartyCompositionChanged, PartyLeaderChanged, PartyPlugin,
    PartySetupError, PartyState, SpriteMotion,
};
pub use presenter::{CommandQueue, Presenter, SpriteCommand};
pub use stats::{CharacterKey, CharacterStats, StatTable};

pub mod prelude {
    //! Prelude exports used in documentation examples.
    //!
    //! ```rust,no_run
    //! use cortege::prelude::*;
    //! ```

    pub use crate::CharacterKey;
    pub use crate::CommandQueue;
    pub use crate::Direction;
    pub use crate::InputSnapshot;
    pub use crate::PartyConfig;
    pub use crate::PartyController;
    pub use crate::PartyEvents;
    pub use crate::PartyPlugin;
    pub use crate::StatTable;
    pub use glam::Vec2;
}
