//! Runtime orchestration for confidential rock-paper-scissors.
//!
//! This crate wires the registry, the confidential backend, and a decryption
//! oracle into a cohesive async API. Consumers embed [`Runtime`] and drive
//! games through the cloneable [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - [`oracle`] defines the decryption oracle boundary and its mock
//! - [`config`] loads runtime configuration from the environment
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod config;
pub mod events;
pub mod oracle;
pub mod runtime;

mod workers;

pub use api::{Result, RuntimeError, RuntimeHandle};
pub use config::RuntimeConfig;
pub use events::{Event, EventBus, LifecycleEvent, ResolutionEvent, Topic};
pub use oracle::{DecryptionOracle, DecryptionRequest, MockDecryptionOracle, OracleError, RequestId};
pub use runtime::{Runtime, RuntimeBuilder};
