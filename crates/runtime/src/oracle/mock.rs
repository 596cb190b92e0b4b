//! Decryption oracle backed by the mock backend's key table.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use janken_core::MockBackend;

use super::{DecryptionOracle, DecryptionRequest, OracleError};

/// Answers requests by revealing ciphertexts of a shared [`MockBackend`].
pub struct MockDecryptionOracle {
    backend: Arc<MockBackend>,
    delay: Duration,
}

impl MockDecryptionOracle {
    pub fn new(backend: Arc<MockBackend>) -> Self {
        Self {
            backend,
            delay: Duration::ZERO,
        }
    }

    /// Adds latency before every answer.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl DecryptionOracle for MockDecryptionOracle {
    async fn decrypt(&self, request: &DecryptionRequest) -> Result<u8, OracleError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.backend.reveal(&request.ciphertext)?)
    }
}
