//! Trusted-execution mock of the confidential capability.
//!
//! Ciphertexts are indices into a private table. Homomorphic operations are
//! evaluated inside the backend, so holders of a handle still learn nothing
//! from it. [`MockBackend::reveal`] is the decryption key: only a decryption
//! oracle should call it.
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{BackendError, CipherHandle, ConfidentialBackend, EncryptedBool, EncryptedU8};

struct MockState {
    values: Vec<u8>,
    /// Stands in for the coprocessor's encrypted randomness; seeded so runs
    /// are reproducible.
    rng: StdRng,
}

/// In-process confidential backend for tests and local play.
pub struct MockBackend {
    state: Mutex<MockState>,
}

impl MockBackend {
    pub fn new(seed: u64) -> Self {
        Self {
            state: Mutex::new(MockState {
                values: Vec::new(),
                rng: StdRng::seed_from_u64(seed),
            }),
        }
    }

    /// Decrypts a ciphertext. Reserved for the decryption oracle.
    pub fn reveal(&self, ciphertext: &EncryptedU8) -> Result<u8, BackendError> {
        self.read(ciphertext.0)
    }

    fn read(&self, handle: CipherHandle) -> Result<u8, BackendError> {
        let state = self.state.lock().map_err(|_| BackendError::LockPoisoned)?;
        usize::try_from(handle.0)
            .ok()
            .and_then(|index| state.values.get(index).copied())
            .ok_or(BackendError::UnknownHandle(handle.0))
    }

    fn alloc(&self, value: u8) -> Result<CipherHandle, BackendError> {
        let mut state = self.state.lock().map_err(|_| BackendError::LockPoisoned)?;
        let handle = CipherHandle(state.values.len() as u64);
        state.values.push(value);
        Ok(handle)
    }

    fn alloc_bool(&self, value: bool) -> Result<EncryptedBool, BackendError> {
        self.alloc(u8::from(value)).map(EncryptedBool)
    }

    fn read_bool(&self, value: &EncryptedBool) -> Result<bool, BackendError> {
        self.read(value.0).map(|raw| raw != 0)
    }
}

impl ConfidentialBackend for MockBackend {
    fn encrypt_u8(&self, value: u8) -> Result<EncryptedU8, BackendError> {
        self.alloc(value).map(EncryptedU8)
    }

    fn eq(&self, lhs: &EncryptedU8, rhs: &EncryptedU8) -> Result<EncryptedBool, BackendError> {
        let equal = self.read(lhs.0)? == self.read(rhs.0)?;
        self.alloc_bool(equal)
    }

    fn eq_scalar(&self, lhs: &EncryptedU8, rhs: u8) -> Result<EncryptedBool, BackendError> {
        let equal = self.read(lhs.0)? == rhs;
        self.alloc_bool(equal)
    }

    fn and(
        &self,
        lhs: &EncryptedBool,
        rhs: &EncryptedBool,
    ) -> Result<EncryptedBool, BackendError> {
        let value = self.read_bool(lhs)? && self.read_bool(rhs)?;
        self.alloc_bool(value)
    }

    fn or(&self, lhs: &EncryptedBool, rhs: &EncryptedBool) -> Result<EncryptedBool, BackendError> {
        let value = self.read_bool(lhs)? || self.read_bool(rhs)?;
        self.alloc_bool(value)
    }

    fn select(
        &self,
        cond: &EncryptedBool,
        if_true: &EncryptedU8,
        if_false: &EncryptedU8,
    ) -> Result<EncryptedU8, BackendError> {
        let value = if self.read_bool(cond)? {
            self.read(if_true.0)?
        } else {
            self.read(if_false.0)?
        };
        self.alloc(value).map(EncryptedU8)
    }

    fn add_scalar(&self, lhs: &EncryptedU8, rhs: u8) -> Result<EncryptedU8, BackendError> {
        let value = self.read(lhs.0)?.wrapping_add(rhs);
        self.alloc(value).map(EncryptedU8)
    }

    fn random_below(&self, bound: u8) -> Result<EncryptedU8, BackendError> {
        if bound == 0 {
            return Err(BackendError::EmptyRange);
        }
        let value = {
            let mut state = self.state.lock().map_err(|_| BackendError::LockPoisoned)?;
            state.rng.gen_range(0..bound)
        };
        self.alloc(value).map(EncryptedU8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::Move;

    #[test]
    fn homomorphic_ops_follow_plaintext_semantics() {
        let backend = MockBackend::new(1);
        let two = backend.encrypt_u8(2).unwrap();
        let three = backend.encrypt_u8(3).unwrap();

        let equal = backend.eq(&two, &three).unwrap();
        let is_two = backend.eq_scalar(&two, 2).unwrap();
        let either = backend.or(&equal, &is_two).unwrap();
        let both = backend.and(&equal, &is_two).unwrap();

        let picked = backend.select(&either, &two, &three).unwrap();
        assert_eq!(backend.reveal(&picked).unwrap(), 2);
        let picked = backend.select(&both, &two, &three).unwrap();
        assert_eq!(backend.reveal(&picked).unwrap(), 3);

        let sum = backend.add_scalar(&three, 250).unwrap();
        assert_eq!(backend.reveal(&sum).unwrap(), 253);
    }

    #[test]
    fn random_moves_are_valid_and_vary() {
        let backend = MockBackend::new(0x5eed);
        let mut seen = [false; 3];
        for _ in 0..60 {
            let mv = backend.random_move().unwrap();
            let value = backend.reveal(mv.ciphertext()).unwrap();
            let mv = Move::try_from(value).expect("random move out of range");
            seen[(mv.value() - 1) as usize] = true;
        }
        assert_eq!(seen, [true; 3]);
    }

    #[test]
    fn same_seed_draws_the_same_moves() {
        let draw = |seed| {
            let backend = MockBackend::new(seed);
            (0..16)
                .map(|_| {
                    let mv = backend.random_move().unwrap();
                    backend.reveal(mv.ciphertext()).unwrap()
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(draw(7), draw(7));
        assert_ne!(draw(7), draw(8));
    }

    #[test]
    fn unknown_handles_are_rejected() {
        let backend = MockBackend::new(1);
        let forged = EncryptedU8(CipherHandle(99));
        assert_eq!(
            backend.reveal(&forged),
            Err(BackendError::UnknownHandle(99))
        );
        assert_eq!(backend.random_below(0), Err(BackendError::EmptyRange));
    }
}
