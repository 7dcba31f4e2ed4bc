use std::time::Duration;

use anyhow::{ensure, Result};
use common::{Config, ConfigLoader};
use serde::{Deserialize, Serialize};

/// How UCI engine processes are located, configured and pooled.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UciOptions {
    /// Explicit engine binary. When unset the engine is searched for.
    pub engine_path: Option<String>,
    pub threads: usize,
    pub hash_mb: usize,
    pub pool_size: usize,
    pub handshake_timeout_ms: u64,
}

impl Default for UciOptions {
    fn default() -> Self {
        Self {
            engine_path: None,
            threads: 2,
            hash_mb: 64,
            pool_size: 2,
            handshake_timeout_ms: 10_000,
        }
    }
}

impl UciOptions {
    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.pool_size > 0, "pool_size must be at least 1");
        ensure!(self.threads > 0, "threads must be at least 1");
        ensure!(self.hash_mb > 0, "hash_mb must be at least 1");

        Ok(())
    }
}

impl Config for UciOptions {
    fn load(config: &ConfigLoader) -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            engine_path: config
                .get("engine_path")
                .and_then(|v| v.as_string())
                .filter(|p| !p.is_empty()),
            threads: config
                .get("threads")
                .and_then(|v| v.as_usize())
                .unwrap_or(defaults.threads),
            hash_mb: config
                .get("hash_mb")
                .and_then(|v| v.as_usize())
                .unwrap_or(defaults.hash_mb),
            pool_size: config
                .get("pool_size")
                .and_then(|v| v.as_usize())
                .unwrap_or(defaults.pool_size),
            handshake_timeout_ms: config
                .get("handshake_timeout_ms")
                .and_then(|v| v.as_u64())
                .unwrap_or(defaults.handshake_timeout_ms),
        })
    }
}
