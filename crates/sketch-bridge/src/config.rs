//! Bridge configuration, built once at startup and never mutated.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// File extension of Processing sketch sources.
pub const DEFAULT_SOURCE_EXTENSION: &str = "pde";

/// How long `run` waits for the runner before assuming it is up.
pub const DEFAULT_LAUNCH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    pub sketch_root: PathBuf,
    pub runner_path: PathBuf,
    pub source_extension: String,
    pub launch_timeout: Duration,
}

impl BridgeConfig {
    pub fn new(sketch_root: impl Into<PathBuf>, runner_path: impl Into<PathBuf>) -> Self {
        Self {
            sketch_root: sketch_root.into(),
            runner_path: runner_path.into(),
            source_extension: DEFAULT_SOURCE_EXTENSION.to_string(),
            launch_timeout: DEFAULT_LAUNCH_TIMEOUT,
        }
    }

    pub fn with_launch_timeout(mut self, timeout: Duration) -> Self {
        self.launch_timeout = timeout;
        self
    }
}
