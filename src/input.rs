//! Keybinding scheme and leader input.
//!
//! Named actions are bound to one or more key names. Each tick the
//! controller polls a [`KeySource`] through [`Controls::snapshot`] and turns
//! the resulting [`InputSnapshot`] into a leader velocity and facing.
//!
//! Lookups never fail: an action without bindings, or a binding naming a key
//! the source does not know, is read as "not pressed" and warned about once
//! per action.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use glam::Vec2;
use hashbrown::{HashMap, HashSet};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::direction::Direction;

/// Actions the party controller reads from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Move the leader up the screen.
    WalkUp,
    /// Move the leader down the screen.
    WalkDown,
    /// Move the leader left.
    WalkLeft,
    /// Move the leader right.
    WalkRight,
    /// Rotate the party so the next member leads.
    ChangeLeader,
}

impl Action {
    /// Every action, in a stable order.
    pub const ALL: [Self; 5] = [
        Self::WalkUp,
        Self::WalkDown,
        Self::WalkLeft,
        Self::WalkRight,
        Self::ChangeLeader,
    ];
}

impl Action {
    const fn bit(self) -> u8 {
        match self {
            Self::WalkUp => 1,
            Self::WalkDown => 1 << 1,
            Self::WalkLeft => 1 << 2,
            Self::WalkRight => 1 << 3,
            Self::ChangeLeader => 1 << 4,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::WalkUp => "walk up",
            Self::WalkDown => "walk down",
            Self::WalkLeft => "walk left",
            Self::WalkRight => "walk right",
            Self::ChangeLeader => "change leader",
        };
        f.write_str(name)
    }
}

/// Polling access to the state of named keys.
pub trait KeySource {
    /// Whether `key` is held down, or `None` if the name is not recognised.
    fn key_state(&self, key: &str) -> Option<bool>;
}

/// A fixed set of held keys. Every key name is recognised.
///
/// Useful for scripted input and headless runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PressedKeys(HashSet<String>);

impl PressedKeys {
    /// Creates a set from key names.
    #[must_use]
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(keys.into_iter().map(Into::into).collect())
    }

    /// Marks `key` as held.
    pub fn press(&mut self, key: impl Into<String>) {
        self.0.insert(key.into());
    }

    /// Marks `key` as released.
    pub fn release(&mut self, key: &str) {
        self.0.remove(key);
    }
}

impl KeySource for PressedKeys {
    fn key_state(&self, key: &str) -> Option<bool> {
        Some(self.0.contains(key))
    }
}

/// Action states sampled once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[expect(
    clippy::struct_excessive_bools,
    reason = "One flag per polled action keeps the snapshot trivially copyable."
)]
pub struct InputSnapshot {
    /// Walk up held.
    pub up: bool,
    /// Walk down held.
    pub down: bool,
    /// Walk left held.
    pub left: bool,
    /// Walk right held.
    pub right: bool,
    /// Change leader held.
    pub change_leader: bool,
}

/// Mapping from actions to key names.
///
/// Key names follow the engine's physical key naming (`KeyW`, `ArrowUp`,
/// `Tab`, ...). Several keys may trigger the same action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Controls {
    bindings: HashMap<Action, Vec<String>>,
    #[serde(skip)]
    warned: WarnedActions,
}

/// Actions a binding problem has already been logged for.
///
/// Lives inside [`Controls`] so polling through `&self` stays lock-free.
/// Clones carry the current record; equality ignores it.
#[derive(Debug, Default)]
struct WarnedActions(AtomicU8);

impl WarnedActions {
    /// Marks `action` and reports whether it was unmarked before.
    fn first_time(&self, action: Action) -> bool {
        let bit = action.bit();
        (self.0.fetch_or(bit, Ordering::Relaxed) & bit) == 0
    }
}

impl Clone for WarnedActions {
    fn clone(&self) -> Self {
        Self(AtomicU8::new(self.0.load(Ordering::Relaxed)))
    }
}

impl PartialEq for WarnedActions {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for WarnedActions {}

impl Default for Controls {
    fn default() -> Self {
        let mut controls = Self::unbound();
        controls.bind(Action::WalkUp, ["KeyW", "ArrowUp"]);
        controls.bind(Action::WalkDown, ["KeyS", "ArrowDown"]);
        controls.bind(Action::WalkLeft, ["KeyA", "ArrowLeft"]);
        controls.bind(Action::WalkRight, ["KeyD", "ArrowRight"]);
        controls.bind(Action::ChangeLeader, ["Tab"]);
        controls
    }
}

impl Controls {
    /// A scheme with no bindings at all.
    #[must_use]
    pub fn unbound() -> Self {
        Self {
            bindings: HashMap::new(),
            warned: WarnedActions::default(),
        }
    }

    /// Replaces the keys bound to `action`.
    pub fn bind<I, S>(&mut self, action: Action, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bindings
            .insert(action, keys.into_iter().map(Into::into).collect());
    }

    /// Removes every key bound to `action`.
    pub fn unbind(&mut self, action: Action) {
        self.bindings.remove(&action);
    }

    /// Keys bound to `action`; empty when unbound.
    #[must_use]
    pub fn keys_for(&self, action: Action) -> &[String] {
        self.bindings.get(&action).map(Vec::as_slice).unwrap_or_default()
    }

    /// Actions that have no key bound.
    #[must_use]
    pub fn missing_actions(&self) -> Vec<Action> {
        Action::ALL
            .into_iter()
            .filter(|action| self.keys_for(*action).is_empty())
            .collect()
    }

    /// Warns once about every unbound action and every key name `source`
    /// does not recognise. Intended to be called when a scheme is loaded.
    pub fn report_problems(&self, source: &impl KeySource) {
        for action in Action::ALL {
            let keys = self.keys_for(action);
            let unknown: Vec<&String> = keys
                .iter()
                .filter(|key| source.key_state(key).is_none())
                .collect();
            if (keys.is_empty() || !unknown.is_empty()) && self.warned.first_time(action) {
                if keys.is_empty() {
                    warn!("no key bound to action '{action}'; it will never trigger");
                }
                for key in unknown {
                    warn!("key '{key}' bound to '{action}' is not a known key name");
                }
            }
        }
    }

    /// Whether any key bound to `action` is held.
    #[must_use]
    pub fn is_active(&self, action: Action, source: &impl KeySource) -> bool {
        let Some(keys) = self.bindings.get(&action) else {
            if self.warned.first_time(action) {
                warn!("no key bound to action '{action}'; treating as released");
            }
            return false;
        };
        keys.iter().any(|key| {
            source.key_state(key).unwrap_or_else(|| {
                if self.warned.first_time(action) {
                    warn!("unknown key '{key}' for action '{action}'; treating as released");
                }
                false
            })
        })
    }

    /// Polls every action once.
    #[must_use]
    pub fn snapshot(&self, source: &impl KeySource) -> InputSnapshot {
        InputSnapshot {
            up: self.is_active(Action::WalkUp, source),
            down: self.is_active(Action::WalkDown, source),
            left: self.is_active(Action::WalkLeft, source),
            right: self.is_active(Action::WalkRight, source),
            change_leader: self.is_active(Action::ChangeLeader, source),
        }
    }
}

/// Maps a negative/positive key pair to an axis value.
const fn axis(neg: bool, pos: bool) -> f32 {
    match (neg, pos) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => 0.0,
    }
}

/// Leader velocity for the held directions at `speed` pixels per second.
///
/// Opposing keys cancel. The direction is normalised before scaling so a
/// diagonal is exactly as fast as a single axis. Up is negative y.
///
/// # Examples
///
/// ```
/// use cortege::{leader_velocity, InputSnapshot};
/// let diagonal = InputSnapshot { up: true, right: true, ..Default::default() };
/// let v = leader_velocity(diagonal, 80.0);
/// assert!((v.length() - 80.0).abs() < 1e-3);
/// assert!(v.x > 0.0 && v.y < 0.0);
/// ```
#[must_use]
pub fn leader_velocity(input: InputSnapshot, speed: f32) -> Vec2 {
    let raw = Vec2::new(axis(input.left, input.right), axis(input.up, input.down));
    raw.normalize_or_zero() * speed
}

/// Facing implied by the held directions.
///
/// Horizontal movement wins on diagonals. Returns `None` when the input does
/// not move the leader.
#[must_use]
pub fn facing_for(input: InputSnapshot) -> Option<Direction> {
    let x = axis(input.left, input.right);
    let y = axis(input.up, input.down);
    if x < 0.0 {
        Some(Direction::Left)
    } else if x > 0.0 {
        Some(Direction::Right)
    } else if y < 0.0 {
        Some(Direction::Up)
    } else if y > 0.0 {
        Some(Direction::Down)
    } else {
        None
    }
}
