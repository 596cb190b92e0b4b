//! Game rules and confidential resolution for rock-paper-scissors.
//!
//! `janken-core` defines the canonical rules (moves, modes, lifecycle) and the
//! state machine that resolves a game over confidential values. All mutation
//! of game records flows through [`registry::GameRegistry`]; the confidential
//! arithmetic is consumed through the [`confidential::ConfidentialBackend`]
//! capability so the rules never observe a plaintext move.
pub mod confidential;
pub mod error;
pub mod game;
pub mod identity;
pub mod moves;
pub mod outcome;
pub mod registry;
pub mod resolution;

pub use confidential::{
    BackendError, CipherHandle, ConfidentialBackend, EncryptedBool, EncryptedMove, EncryptedU8,
    MockBackend,
};
pub use error::{ErrorSeverity, GameError};
pub use game::{Game, GameId, GameMode, GameStatus, MoveSlot};
pub use identity::{ParsePlayerIdError, PlayerId};
pub use moves::Move;
pub use outcome::{GameResult, WinnerSelector};
pub use registry::{GameRegistry, ResolutionOutcome, ResolutionRequest, SubmitReceipt};
pub use resolution::winner_selector;
