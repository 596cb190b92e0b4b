//! Unified error types surfaced by the runtime API.
//!
//! Wraps registry rejections, capability failures, and worker coordination
//! failures so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use janken_core::{BackendError, GameError, GameId};

use crate::oracle::RequestId;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Game(#[from] GameError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("registry worker command channel closed")]
    CommandChannelClosed,

    #[error("registry worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("game {0} has no outstanding decryption request")]
    NoPendingResolution(GameId),

    #[error("decryption answer {request_id} for game {game_id} is not the outstanding request")]
    StaleDecryption {
        game_id: GameId,
        request_id: RequestId,
    },

        #[error("decryption oracle queue closed")]
    OracleChannelClosed,

    #[error("event stream closed before the game finished")]
    EventStreamClosed,

    #[error("worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("runtime requires a confidential backend before building")]
    MissingBackend,

    #[error("runtime requires a decryption oracle before building")]
    MissingOracle,
}

impl RuntimeError {
    /// Registry rejection carried by this error, if any.
    pub fn game_error(&self) -> Option<&GameError> {
        match self {
            Self::Game(err) => Some(err),
            _ => None,
        }
    }
}
