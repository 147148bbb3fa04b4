//! Errors returned by party membership operations.
use thiserror::Error;

use crate::stats::CharacterKey;

/// Failure of an add or remove request.
///
/// Per-tick movement never fails; only explicit membership changes can be
/// refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PartyError {
    /// No stats were supplied and the key is not in the stat table.
    #[error("unknown character '{0}'")]
    UnknownCharacter(CharacterKey),
    /// The requested party slot does not exist.
    #[error("member index {index} out of range for party of {len}")]
    MemberIndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Party size at the time of the request.
        len: usize,
    },
    /// Removing the member would leave the party without a leader.
    #[error("cannot remove the last party member")]
    LastMember,
}
