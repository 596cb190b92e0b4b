//! Decryption oracle boundary.
//!
//! The registry never decrypts. When a game is ready to resolve, the
//! encrypted selector is wrapped in a [`DecryptionRequest`] and handed to a
//! [`DecryptionOracle`]. Its answer comes back later as a separate callback
//! command, correlated by request id. Oracles may be slow, may answer games out
//! of order, and may never answer at all.
mod mock;

pub use mock::MockDecryptionOracle;

use std::fmt;

use async_trait::async_trait;
use janken_core::{BackendError, EncryptedU8, GameId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sequence number of a decryption request, unique per runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// A selector waiting to be decrypted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecryptionRequest {
    pub request_id: RequestId,
    pub game_id: GameId,
    pub ciphertext: EncryptedU8,
}

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Service that turns a ciphertext into its plaintext, eventually.
///
/// Implementations:
/// - [`MockDecryptionOracle`] for tests and local play
/// - relayers to a real threshold-decryption network
#[async_trait]
pub trait DecryptionOracle: Send + Sync {
    /// Decrypts the request's ciphertext.
    ///
    /// Returning never (a pending future) is allowed and models an oracle that
    /// drops the request; the game then stays resolving.
    async fn decrypt(&self, request: &DecryptionRequest) -> Result<u8, OracleError>;
}
