//! Confidential value capability.
//!
//! The rules never see plaintext moves. They hold opaque ciphertext handles
//! and ask a [`ConfidentialBackend`] to combine them homomorphically. The
//! backend may be a real FHE coprocessor or the trusted-execution
//! [`MockBackend`] used by tests and the local client.
//!
//! Decryption is deliberately absent from this trait: plaintexts only come
//! back through an asynchronous decryption oracle owned by the runtime.
mod mock;

pub use mock::MockBackend;

use crate::moves::Move;

/// Opaque reference to a ciphertext held by a backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CipherHandle(pub u64);

/// Encrypted 8-bit unsigned integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncryptedU8(pub CipherHandle);

/// Encrypted boolean.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncryptedBool(pub CipherHandle);

/// Encrypted value known to hold rock(1), paper(2) or scissors(3).
///
/// Only [`ConfidentialBackend::encrypt_move`] and
/// [`ConfidentialBackend::random_move`] construct it, so a submitted slot can
/// never hold anything else. It serializes for snapshots but never
/// deserializes, since a handle read back from the wire could point at any
/// ciphertext:
///
/// ```compile_fail
/// let forged: janken_core::EncryptedMove = serde_json::from_str("0").unwrap();
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EncryptedMove(EncryptedU8);

impl EncryptedMove {
    pub fn ciphertext(&self) -> &EncryptedU8 {
        &self.0
    }
}

/// Failures raised by a confidential backend.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("unknown ciphertext handle {0}")]
    UnknownHandle(u64),

    #[error("random bound must be non-zero")]
    EmptyRange,

    #[error("backend state lock was poisoned")]
    LockPoisoned,

    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// Homomorphic operations the resolution engine is built from.
///
/// Every method consumes and produces ciphertext handles; none reveals a
/// plaintext to the caller.
pub trait ConfidentialBackend: Send + Sync {
    /// Encrypts a plaintext (client input or trivial constant).
    fn encrypt_u8(&self, value: u8) -> Result<EncryptedU8, BackendError>;

    /// `lhs == rhs`
    fn eq(&self, lhs: &EncryptedU8, rhs: &EncryptedU8) -> Result<EncryptedBool, BackendError>;

    /// `lhs == rhs` against a plaintext scalar.
    fn eq_scalar(&self, lhs: &EncryptedU8, rhs: u8) -> Result<EncryptedBool, BackendError>;

    fn and(&self, lhs: &EncryptedBool, rhs: &EncryptedBool)
    -> Result<EncryptedBool, BackendError>;

    fn or(&self, lhs: &EncryptedBool, rhs: &EncryptedBool) -> Result<EncryptedBool, BackendError>;

    /// `if cond { if_true } else { if_false }` without revealing `cond`.
    fn select(
        &self,
        cond: &EncryptedBool,
        if_true: &EncryptedU8,
        if_false: &EncryptedU8,
    ) -> Result<EncryptedU8, BackendError>;

    /// Wrapping `lhs + rhs` against a plaintext scalar.
    fn add_scalar(&self, lhs: &EncryptedU8, rhs: u8) -> Result<EncryptedU8, BackendError>;

    /// Encrypted value drawn uniformly from `0..bound`.
    fn random_below(&self, bound: u8) -> Result<EncryptedU8, BackendError>;

    /// Encrypts a client move.
    fn encrypt_move(&self, mv: Move) -> Result<EncryptedMove, BackendError> {
        self.encrypt_u8(mv.value()).map(EncryptedMove)
    }

    /// Draws a confidential move uniformly over rock, paper and scissors.
    ///
    /// The draw never reads any other ciphertext, so it cannot depend on or
    /// leak the opponent's move.
    fn random_move(&self) -> Result<EncryptedMove, BackendError> {
        let offset = self.random_below(3)?;
        self.add_scalar(&offset, Move::Rock.value())
            .map(EncryptedMove)
    }
}
