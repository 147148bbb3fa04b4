//! Utility helpers for tests.
//!
//! Fixtures build parties on a [`CommandQueue`] presenter so tests can
//! inspect the issued sprite commands; [`held!`] builds input snapshots.

pub mod assertions;
pub mod party;

pub use assertions::{assert_vec2_near, commands_for};
pub use party::{drive, party_of, party_with, FRAME};

/// Builds an [`cortege::InputSnapshot`] with the named fields pressed.
///
/// # Examples
/// ```
/// use test_utils::held;
/// let input = held!(up, right);
/// assert!(input.up && input.right && !input.down);
/// assert!(!held!().change_leader);
/// ```
#[macro_export]
macro_rules! held {
    ($($field:ident),* $(,)?) => {
        $crate::__input_snapshot! { $($field: true),* }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __input_snapshot {
    ($($field:ident: $value:expr),*) => {
        ::cortege::InputSnapshot {
            $($field: $value,)*
            ..::core::default::Default::default()
        }
    };
}
