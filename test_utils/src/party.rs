//! Party fixtures.

use std::time::Duration;

use cortege::{
    CharacterKey, CommandQueue, InputSnapshot, PartyConfig, PartyController, PartyEvents,
    StatTable,
};
use glam::Vec2;

/// One frame at 60 Hz, rounded down to whole milliseconds.
pub const FRAME: Duration = Duration::from_millis(16);

/// Builds a party from builtin characters, the first one leading, at the
/// origin.
///
/// # Panics
/// Panics if a name is not in [`StatTable::builtin`] or `names` is empty.
///
/// # Examples
/// ```
/// let party = test_utils::party_of(&["ardent", "wren"]);
/// assert_eq!(party.member_count(), 2);
/// ```
#[must_use]
pub fn party_of(names: &[&str]) -> PartyController<CommandQueue> {
    party_with(PartyConfig::default(), names, Vec2::ZERO)
}

/// Like [`party_of`] with explicit tuning and spawn point.
///
/// # Panics
/// Panics if a name is unknown or `names` is empty.
#[must_use]
pub fn party_with(config: PartyConfig, names: &[&str], spawn: Vec2) -> PartyController<CommandQueue> {
    let (leader, followers) = names
        .split_first()
        .unwrap_or_else(|| panic!("a party needs at least one member"));
    let mut party = PartyController::new(
        config,
        StatTable::builtin(),
        CommandQueue::new(),
        PartyEvents::new(),
        &CharacterKey::from(*leader),
        spawn,
    )
    .unwrap_or_else(|e| panic!("failed to form party: {e}"));
    for name in followers {
        party
            .add_member(&CharacterKey::from(*name), None)
            .unwrap_or_else(|e| panic!("failed to add {name}: {e}"));
    }
    party
}

/// Ticks `party` for `frames` frames of [`FRAME`] with `input` held,
/// starting the clock at `start`. Returns the time after the last frame.
///
/// The command queue is drained before every frame, as the engine would, so
/// only the last frame's commands remain pending.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use cortege::{InputSnapshot, MemberId, SpriteCommand};
///
/// let mut party = test_utils::party_of(&["ardent"]);
/// let right = InputSnapshot { right: true, ..Default::default() };
/// test_utils::drive(&mut party, right, 600, Duration::ZERO);
/// let places = party
///     .presenter()
///     .pending()
///     .iter()
///     .filter(|c| matches!(c, SpriteCommand::Place(MemberId(0), _)))
///     .count();
/// assert_eq!(places, 1);
/// ```
pub fn drive(
    party: &mut PartyController<CommandQueue>,
    input: InputSnapshot,
    frames: u32,
    start: Duration,
) -> Duration {
    let mut now = start;
    for _ in 0..frames {
        party.presenter_mut().drain().for_each(drop);
        party.tick(input, FRAME, now);
        now += FRAME;
    }
    now
}
