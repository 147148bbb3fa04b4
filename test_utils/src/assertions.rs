//! Assertions shared by integration tests.

use approx::relative_eq;
use cortege::{CommandQueue, MemberId, PartyController, SpriteCommand};
use glam::Vec2;

/// Assert that two vectors agree within `epsilon` on both axes.
///
/// # Panics
/// Panics with both vectors in the message when they differ.
pub fn assert_vec2_near(actual: Vec2, expected: Vec2, epsilon: f32) {
    assert!(
        relative_eq!(actual.x, expected.x, epsilon = epsilon)
            && relative_eq!(actual.y, expected.y, epsilon = epsilon),
        "expected {expected}, got {actual} (epsilon {epsilon})"
    );
}

/// Pending sprite commands addressed to `id`, oldest first.
#[must_use]
pub fn commands_for(party: &PartyController<CommandQueue>, id: MemberId) -> Vec<SpriteCommand> {
    party
        .presenter()
        .pending()
        .iter()
        .filter(|command| target_of(command) == id)
        .cloned()
        .collect()
}

const fn target_of(command: &SpriteCommand) -> MemberId {
    match command {
        SpriteCommand::Spawn { id, .. }
        | SpriteCommand::Despawn(id)
        | SpriteCommand::Place(id, _)
        | SpriteCommand::Velocity(id, _)
        | SpriteCommand::Play(id, _)
        | SpriteCommand::Stop(id)
        | SpriteCommand::Depth(id, _)
        | SpriteCommand::Follow(id) => *id,
    }
}
