use std::path::Path;

use anyhow::Result;
use tempfile::TempDir;

use crate::{
    contracts,
    runtime::{Address, Registry, Runtime, RuntimeConfig, Storage},
};

pub fn account(seed: &str) -> Address {
    Address::from_seed(seed)
}

pub async fn new_runtime() -> Result<Runtime> {
    new_runtime_with(contracts::native(), RuntimeConfig::default()).await
}

pub async fn new_runtime_with(registry: Registry, config: RuntimeConfig) -> Result<Runtime> {
    Ok(Runtime::new(Storage::in_memory().await?, registry, config))
}

pub async fn open_runtime(path: &Path) -> Result<Runtime> {
    Ok(Runtime::new(
        Storage::open(path).await?,
        contracts::native(),
        RuntimeConfig::default(),
    ))
}

/// Runtime backed by a database file in a fresh temporary directory. The
/// directory is removed when the returned guard is dropped.
pub async fn new_file_runtime() -> Result<(TempDir, Runtime)> {
    let dir = TempDir::new()?;
    let runtime = open_runtime(&dir.path().join("state.db")).await?;
    Ok((dir, runtime))
}
