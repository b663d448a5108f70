//! Errors reported by session construction and the participation ledger.

use crate::player::PlayerId;

/// Errors that can occur while building a session or updating its ledger.
///
/// An infeasible round (not enough players to fill a court) is *not* an error: the
/// scheduler simply returns fewer matches, possibly none.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("a session needs at least {min} players, got {got}")]
    RosterTooSmall { min: usize, got: usize },

    #[error("rosters are limited to {max} players ({limited_by}), got {got}")]
    RosterTooLarge {
        limited_by: &'static str,
        max: usize,
        got: usize,
    },

    #[error("player {id} appears more than once in the roster")]
    DuplicatePlayer { id: PlayerId },

    #[error("invalid number of courts: {got} ({reason})")]
    InvalidCourtCount { got: usize, reason: &'static str },

    #[error("ledger inconsistency for player {id}: {reason}")]
    LedgerInconsistency { id: PlayerId, reason: String },

    #[error("invalid match: {reason}")]
    InvalidMatch { reason: String },

    #[error("player {id} is not part of this session")]
    UnknownPlayer { id: PlayerId },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let err = ScheduleError::RosterTooSmall { min: 4, got: 3 };
        assert_eq!(err.to_string(), "a session needs at least 4 players, got 3");

        let err = ScheduleError::InvalidCourtCount {
            got: 0,
            reason: "at least one court is required",
        };
        assert_eq!(
            err.to_string(),
            "invalid number of courts: 0 (at least one court is required)"
        );
    }
}
