//! Tracing subscriber setup for embedding applications and tests.

use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{Result, StoreError};

/// Installs a global `fmt` subscriber filtered by `filter`,
/// e.g. `"chunkgraph=debug"`.
pub fn init_logging(filter: &str) -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_new(filter)
                .map_err(|e| StoreError::Config(format!("invalid log filter: {e}")))?,
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|_| StoreError::Config("logging already initialized".into()))
}
