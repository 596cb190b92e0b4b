//! High-level runtime orchestrator.
//!
//! The runtime owns background workers, wires up command, oracle, and event
//! channels, and exposes a builder-based API for clients to drive games.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use janken_core::{ConfidentialBackend, MockBackend};

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::config::RuntimeConfig;
use crate::events::{Event, EventBus, Topic};
use crate::oracle::{DecryptionOracle, DecryptionRequest, MockDecryptionOracle};
use crate::workers::{Command, OracleWorker, RegistryWorker};

/// Main runtime that orchestrates the game registry
///
/// Design: Runtime owns workers and coordinates execution.
/// [`RuntimeHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    // Shared handle (can be cloned for clients)
    handle: RuntimeHandle,

    // Background workers
    registry_worker_handle: JoinHandle<()>,
    oracle_worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Build a runtime over [`MockBackend`] and [`MockDecryptionOracle`].
    ///
    /// The backend is seeded from `config.backend_seed`, or randomly when
    /// unset. The oracle answers after `config.oracle_delay`.
    pub async fn mock(config: RuntimeConfig) -> Result<Self> {
        let seed = config.backend_seed.unwrap_or_else(rand::random);
        let backend = Arc::new(MockBackend::new(seed));
        let oracle =
            MockDecryptionOracle::new(Arc::clone(&backend)).with_delay(config.oracle_delay);

        Self::builder()
            .config(config)
            .backend(backend)
            .oracle(oracle)
            .build()
            .await
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Subscribe to events from a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.handle.subscribe(topic)
    }

    /// Shutdown the runtime gracefully
    ///
    /// Workers stop once every [`RuntimeHandle`] clone has been dropped, so
    /// callers must release their handles first. Decryptions still waiting
    /// on the oracle are abandoned.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);

        self.registry_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)?;
        self.oracle_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)?;

        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    backend: Option<Arc<dyn ConfidentialBackend>>,
    oracle: Option<Arc<dyn DecryptionOracle>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            backend: None,
            oracle: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the required confidential backend
    pub fn backend(mut self, backend: Arc<dyn ConfidentialBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set the required decryption oracle
    pub fn oracle(mut self, oracle: impl DecryptionOracle + 'static) -> Self {
        self.oracle = Some(Arc::new(oracle));
        self
    }

    /// Build the runtime and spawn its workers
    pub async fn build(self) -> Result<Runtime> {
        let backend = self.backend.ok_or(RuntimeError::MissingBackend)?;
        let oracle = self.oracle.ok_or(RuntimeError::MissingOracle)?;

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let (oracle_tx, oracle_rx) =
            mpsc::channel::<DecryptionRequest>(self.config.oracle_buffer_size);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);

        let oracle_worker = OracleWorker::new(
            oracle,
            oracle_rx,
            command_tx.downgrade(),
            event_bus.clone(),
        );
        let registry_worker = RegistryWorker::new(
            Arc::clone(&backend),
            command_rx,
            oracle_tx,
            event_bus.clone(),
        );

        let handle = RuntimeHandle::new(command_tx, event_bus, backend);

        let registry_worker_handle = tokio::spawn(async move {
            registry_worker.run().await;
        });
        let oracle_worker_handle = tokio::spawn(async move {
            oracle_worker.run().await;
        });

        Ok(Runtime {
            handle,
            registry_worker_handle,
            oracle_worker_handle,
        })
    }
}
