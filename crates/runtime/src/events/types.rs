//! Event types for different topics.

use janken_core::{GameId, GameMode, MoveSlot, PlayerId, WinnerSelector};
use serde::{Deserialize, Serialize};

use crate::oracle::RequestId;

/// Events related to game setup and move submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleEvent {
    /// A game was created; carries the id clients need for every later call
    GameCreated {
        game_id: GameId,
        mode: GameMode,
        player1: PlayerId,
    },

    /// Second seat of a two-player game was taken
    PlayerJoined { game_id: GameId, player2: PlayerId },

    /// A confidential move was recorded
    MoveSubmitted {
        game_id: GameId,
        player: PlayerId,
        slot: MoveSlot,
        /// The CPU answered in the same submission
        cpu_moved: bool,
    },
}

/// Events related to the decryption round-trip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionEvent {
    /// Selector computed and handed to the decryption oracle
    ResolutionRequested {
        game_id: GameId,
        request_id: RequestId,
    },

    /// Winner committed; zero-sentinel for a draw
    GameFinished {
        game_id: GameId,
        selector: WinnerSelector,
        winner: PlayerId,
    },

    /// The oracle reported a failure; the game stays resolving
    DecryptionFailed {
        game_id: GameId,
        request_id: RequestId,
        error: String,
    },
}
