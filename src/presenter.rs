//! Boundary between party simulation and the sprites that show it.
//!
//! The controller owns positions, facing and depth. Everything the engine
//! needs to mirror that state goes through [`Presenter`], so the controller
//! runs unchanged in tests and in the game.

use glam::Vec2;
use hashbrown::HashMap;

use crate::direction::AnimationKey;
use crate::member::MemberId;
use crate::stats::CharacterKey;

/// Sink for presentation updates issued by the party controller.
#[cfg_attr(test, mockall::automock)]
pub trait Presenter {
    /// A member joined; create its sprite and collision body.
    fn spawn(&mut self, id: MemberId, key: &CharacterKey, position: Vec2);
    /// A member left; destroy its sprite.
    fn despawn(&mut self, id: MemberId);
    /// Move the sprite to `position` immediately.
    fn place(&mut self, id: MemberId, position: Vec2);
    /// Set the sprite's velocity in pixels per second.
    fn set_velocity(&mut self, id: MemberId, velocity: Vec2);
    /// The animation currently playing on the sprite, if any.
    fn current_animation(&self, id: MemberId) -> Option<AnimationKey>;
    /// Start playing `key` from its first frame.
    fn play_animation(&mut self, id: MemberId, key: AnimationKey);
    /// Stop the current animation and show the idle frame.
    fn stop_animation(&mut self, id: MemberId);
    /// Set the sprite's draw order.
    fn set_depth(&mut self, id: MemberId, depth: f32);
    /// Make the camera track this member.
    fn follow(&mut self, id: MemberId);
}

/// A single presentation update.
#[derive(Debug, Clone, PartialEq)]
pub enum SpriteCommand {
    /// See [`Presenter::spawn`].
    Spawn {
        /// Member handle.
        id: MemberId,
        /// Character whose sprite sheet to use.
        key: CharacterKey,
        /// Initial position.
        position: Vec2,
    },
    /// See [`Presenter::despawn`].
    Despawn(MemberId),
    /// See [`Presenter::place`].
    Place(MemberId, Vec2),
    /// See [`Presenter::set_velocity`].
    Velocity(MemberId, Vec2),
    /// See [`Presenter::play_animation`].
    Play(MemberId, AnimationKey),
    /// See [`Presenter::stop_animation`].
    Stop(MemberId),
    /// See [`Presenter::set_depth`].
    Depth(MemberId, f32),
    /// See [`Presenter::follow`].
    Follow(MemberId),
}

/// [`Presenter`] that buffers commands for the engine to apply later.
///
/// It also remembers which animation each member is playing so the
/// controller's "is this already playing?" checks are answered without a
/// round trip to the engine.
///
/// The buffer is unbounded. Whoever owns the queue must [`drain`] it once
/// per frame; the Bevy plugin does so in its apply system.
///
/// [`drain`]: CommandQueue::drain
#[derive(Debug, Default)]
pub struct CommandQueue {
    commands: Vec<SpriteCommand>,
    playing: HashMap<MemberId, AnimationKey>,
}

impl CommandQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns the buffered commands in issue order.
    pub fn drain(&mut self) -> std::vec::Drain<'_, SpriteCommand> {
        self.commands.drain(..)
    }

    /// Buffered commands, oldest first.
    #[must_use]
    pub fn pending(&self) -> &[SpriteCommand] {
        &self.commands
    }

    /// Whether nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Presenter for CommandQueue {
    fn spawn(&mut self, id: MemberId, key: &CharacterKey, position: Vec2) {
        self.commands.push(SpriteCommand::Spawn {
            id,
            key: key.clone(),
            position,
        });
    }

    fn despawn(&mut self, id: MemberId) {
        self.playing.remove(&id);
        self.commands.push(SpriteCommand::Despawn(id));
    }

    fn place(&mut self, id: MemberId, position: Vec2) {
        self.commands.push(SpriteCommand::Place(id, position));
    }

    fn set_velocity(&mut self, id: MemberId, velocity: Vec2) {
        self.commands.push(SpriteCommand::Velocity(id, velocity));
    }

    fn current_animation(&self, id: MemberId) -> Option<AnimationKey> {
        self.playing.get(&id).cloned()
    }

    fn play_animation(&mut self, id: MemberId, key: AnimationKey) {
        self.playing.insert(id, key.clone());
        self.commands.push(SpriteCommand::Play(id, key));
    }

    fn stop_animation(&mut self, id: MemberId) {
        self.playing.remove(&id);
        self.commands.push(SpriteCommand::Stop(id));
    }

    fn set_depth(&mut self, id: MemberId, depth: f32) {
        self.commands.push(SpriteCommand::Depth(id, depth));
    }

    fn follow(&mut self, id: MemberId) {
        self.commands.push(SpriteCommand::Follow(id));
    }
}
