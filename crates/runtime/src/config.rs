//! Runtime configuration structures and loaders.
use std::env;
use std::time::Duration;

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// Capacity of the registry worker's command queue.
    pub command_buffer_size: usize,
    /// Capacity of each event topic.
    pub event_buffer_size: usize,
    /// Capacity of the decryption request queue.
    pub oracle_buffer_size: usize,
    /// Artificial latency of the mock decryption oracle.
    pub oracle_delay: Duration,
    /// Seed of the mock backend; random when unset.
    pub backend_seed: Option<u64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            command_buffer_size: 32,
            event_buffer_size: 100,
            oracle_buffer_size: 32,
            oracle_delay: Duration::ZERO,
            backend_seed: None,
        }
    }
}

impl RuntimeConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `JANKEN_COMMAND_BUFFER` - Registry command queue size (default: 32)
    /// - `JANKEN_EVENT_BUFFER` - Per-topic event capacity (default: 100)
    /// - `JANKEN_ORACLE_BUFFER` - Decryption request queue size (default: 32)
    /// - `JANKEN_ORACLE_DELAY_MS` - Mock oracle latency in ms (default: 0)
    /// - `JANKEN_BACKEND_SEED` - Mock backend seed (default: random)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(size) = read_env::<usize>("JANKEN_COMMAND_BUFFER") {
            config.command_buffer_size = size.max(1);
        }
        if let Some(size) = read_env::<usize>("JANKEN_EVENT_BUFFER") {
            config.event_buffer_size = size.max(1);
        }
        if let Some(size) = read_env::<usize>("JANKEN_ORACLE_BUFFER") {
            config.oracle_buffer_size = size.max(1);
        }
        if let Some(ms) = read_env::<u64>("JANKEN_ORACLE_DELAY_MS") {
            config.oracle_delay = Duration::from_millis(ms);
        }
        config.backend_seed = read_env::<u64>("JANKEN_BACKEND_SEED");

        config
    }

    pub fn with_backend_seed(mut self, seed: u64) -> Self {
        self.backend_seed = Some(seed);
        self
    }

    pub fn with_oracle_delay(mut self, delay: Duration) -> Self {
        self.oracle_delay = delay;
        self
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
