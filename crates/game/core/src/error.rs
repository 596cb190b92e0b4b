//! Error taxonomy for the game lifecycle.
//!
//! Every rejection raised by [`crate::registry::GameRegistry`] is a
//! [`GameError`]. Checks run before any state write, so an error always means
//! the registry is unchanged.
//!
//! # Design Principles
//!
//! - **Typed rejections**: one variant per guard, carrying the ids involved
//! - **Severity Classification**: caller mistakes vs. capability failures
//! - **Stable codes**: [`GameError::error_code`] is safe to match on in tooling

use crate::confidential::BackendError;
use crate::game::{GameId, MoveSlot};
use crate::identity::PlayerId;

/// Severity level of an error, used for categorization and logging.
///
/// - **Validation**: the caller asked for an illegal transition; retrying the
///   same request will fail the same way
/// - **Internal**: the confidential capability or the oracle misbehaved
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Invalid request, should not retry without changes.
    Validation,

    /// Unexpected failure outside the caller's control.
    ///
    /// Examples: backend lost a ciphertext, oracle delivered a value outside
    /// the selector range.
    Internal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    /// Returns true if this error indicates a bug or an external failure.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Errors surfaced by registry operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("invalid game mode {0}")]
    InvalidMode(u8),

    #[error("game {0} not found")]
    GameNotFound(GameId),

    #[error("player {player} cannot join their own game {game_id}")]
    CannotJoinOwnGame { game_id: GameId, player: PlayerId },

    #[error("game {0} is single-player and cannot be joined")]
    CannotJoinSinglePlayerGame(GameId),

    #[error("game {0} already has two players")]
    GameAlreadyFull(GameId),

    #[error("player {player} is not a participant of game {game_id}")]
    NotAParticipant { game_id: GameId, player: PlayerId },

    #[error("{slot} already submitted for game {game_id}")]
    MoveAlreadySubmitted { game_id: GameId, slot: MoveSlot },

    #[error("game {0} is finished or awaiting resolution")]
    GameFinished(GameId),

    #[error("game {0} is waiting for moves")]
    MovesNotReady(GameId),

    #[error("reserved identity {0} cannot act as a player")]
    ReservedIdentity(PlayerId),

    #[error("move value {0} is outside rock(1), paper(2), scissors(3)")]
    InvalidMove(u8),

    #[error("decrypted selector {selector} for game {game_id} is not a valid outcome")]
    InvalidSelector { game_id: GameId, selector: u8 },

    #[error("confidential backend failure: {0}")]
    Backend(#[from] BackendError),
}

impl GameError {
    /// Returns the severity level of this error.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidSelector { .. } | Self::Backend(_) => ErrorSeverity::Internal,
            _ => ErrorSeverity::Validation,
        }
    }

    /// Returns a static identifier for this error variant.
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidMode(_) => "INVALID_MODE",
            Self::GameNotFound(_) => "GAME_NOT_FOUND",
            Self::CannotJoinOwnGame { .. } => "CANNOT_JOIN_OWN_GAME",
            Self::CannotJoinSinglePlayerGame(_) => "CANNOT_JOIN_SINGLE_PLAYER_GAME",
            Self::GameAlreadyFull(_) => "GAME_ALREADY_FULL",
            Self::NotAParticipant { .. } => "NOT_A_PARTICIPANT",
            Self::MoveAlreadySubmitted { .. } => "MOVE_ALREADY_SUBMITTED",
            Self::GameFinished(_) => "GAME_FINISHED",
            Self::MovesNotReady(_) => "MOVES_NOT_READY",
            Self::ReservedIdentity(_) => "RESERVED_IDENTITY",
            Self::InvalidMove(_) => "INVALID_MOVE",
            Self::InvalidSelector { .. } => "INVALID_SELECTOR",
            Self::Backend(_) => "BACKEND_FAILURE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_failures_are_internal() {
        let err = GameError::Backend(BackendError::UnknownHandle(7));
        assert!(err.severity().is_internal());
        assert_eq!(err.error_code(), "BACKEND_FAILURE");

        let err = GameError::MovesNotReady(GameId(3));
        assert_eq!(err.severity(), ErrorSeverity::Validation);
        assert_eq!(err.to_string(), "game 3 is waiting for moves");
    }
}
