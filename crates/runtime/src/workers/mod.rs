//! Worker tasks that back the runtime orchestration.
//!
//! The registry worker owns every game and serializes all mutation, while the
//! oracle worker carries decryption requests to the oracle and their answers
//! back to the registry as callback commands.

mod oracle;
mod registry;

pub use oracle::OracleWorker;
pub use registry::{Command, RegistryWorker};
