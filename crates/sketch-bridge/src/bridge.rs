//! The four sketch operations over a configured root and runner.

use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::config::BridgeConfig;
use crate::launcher::RunnerLauncher;
use crate::store::SketchStore;
use crate::types::{LaunchOutcome, SketchError, SketchResult};

/// Stateless façade combining the sketch store and the runner launcher.
///
/// Every call re-reads the file system; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct SketchBridge {
    config: BridgeConfig,
    store: SketchStore,
    launcher: RunnerLauncher,
}

impl SketchBridge {
    pub fn new(config: BridgeConfig) -> Self {
        let store = SketchStore::from_config(&config);
        let launcher = RunnerLauncher::new(&config.runner_path, config.launch_timeout);
        Self {
            config,
            store,
            launcher,
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn store(&self) -> &SketchStore {
        &self.store
    }

    /// Launch a sketch with the runner.
    ///
    /// The runner check comes first so a misconfigured runner is reported
    /// whether or not the sketch exists.
    pub async fn run(
        &self,
        sketch_name: &str,
        params: &Map<String, Value>,
    ) -> SketchResult<LaunchOutcome> {
        let sketch_path = self.store.sketch_dir(sketch_name)?;

        if !self.config.runner_path.exists() {
            tracing::warn!("Runner missing: {}", self.config.runner_path.display());
            return Err(SketchError::RunnerMissing(self.config.runner_path.clone()));
        }
        if !sketch_path.exists() {
            tracing::warn!("Run requested for missing sketch {sketch_name}");
            return Err(SketchError::SketchNotFound {
                name: sketch_name.to_string(),
                root: self.config.sketch_root.clone(),
            });
        }

        let outcome = self.launcher.launch(&sketch_path, params).await;
        tracing::info!("Sketch {sketch_name} launch: {outcome:?}");
        Ok(outcome)
    }

    /// Runnable sketch names, sorted.
    pub fn list(&self) -> SketchResult<Vec<String>> {
        let names = self.store.list()?;
        tracing::debug!("Found {} sketches in {}", names.len(), self.store.root().display());
        Ok(names)
    }

    /// Create (or overwrite) a sketch. Returns the sketch directory.
    pub fn create(&self, sketch_name: &str, code: &str) -> SketchResult<PathBuf> {
        let dir = self.store.create(sketch_name, code)?;
        tracing::info!("Created sketch {sketch_name} at {}", dir.display());
        Ok(dir)
    }

    /// Replace an existing sketch's source, keeping one backup. Returns the source path.
    pub fn update(&self, sketch_name: &str, code: &str) -> SketchResult<PathBuf> {
        let source = self.store.update(sketch_name, code)?;
        tracing::info!("Updated sketch {sketch_name}");
        Ok(source)
    }

    pub fn read(&self, sketch_name: &str) -> SketchResult<String> {
        self.store.read(sketch_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn bridge(dir: &tempfile::TempDir, runner: impl Into<PathBuf>) -> SketchBridge {
        SketchBridge::new(
            BridgeConfig::new(dir.path().join("sketches"), runner)
                .with_launch_timeout(Duration::from_millis(500)),
        )
    }

    #[tokio::test]
    async fn test_run_missing_runner_wins() {
        let dir = tempfile::tempdir().unwrap();
        let b = bridge(&dir, dir.path().join("no-runner"));

        let err = b.run("ghost", &Map::new()).await.unwrap_err();
        assert!(matches!(err, SketchError::RunnerMissing(_)));

        b.create("real", "x").unwrap();
        let err = b.run("real", &Map::new()).await.unwrap_err();
        assert!(matches!(err, SketchError::RunnerMissing(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_missing_sketch_spawns_nothing() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("spawned");
        let runner = dir.path().join("runner.sh");
        std::fs::write(&runner, format!("#!/bin/sh\ntouch '{}'\n", marker.display())).unwrap();
        std::fs::set_permissions(&runner, std::fs::Permissions::from_mode(0o755)).unwrap();

        let b = bridge(&dir, &runner);
        let err = b.run("ghost", &Map::new()).await.unwrap_err();
        assert!(matches!(err, SketchError::SketchNotFound { .. }));
        assert!(!marker.exists());

        b.create("demo", "x").unwrap();
        let outcome = b.run("demo", &Map::new()).await.unwrap();
        assert_eq!(outcome, LaunchOutcome::Started);
        assert!(marker.exists());
    }

    #[tokio::test]
    async fn test_run_rejects_bad_name() {
        let dir = tempfile::tempdir().unwrap();
        let b = bridge(&dir, "/bin/sh");
        let err = b.run("../etc", &Map::new()).await.unwrap_err();
        assert!(matches!(err, SketchError::InvalidName(_)));
    }

    #[test]
    fn test_end_to_end_files() {
        let dir = tempfile::tempdir().unwrap();
        let b = bridge(&dir, "/bin/true");

        b.create("demo", "line(0,0,10,10);").unwrap();
        assert!(b.list().unwrap().contains(&"demo".to_string()));

        b.update("demo", "ellipse(5,5,4,4);").unwrap();
        assert_eq!(b.read("demo").unwrap(), "ellipse(5,5,4,4);");
        assert_eq!(b.store().read_backup("demo").unwrap(), "line(0,0,10,10);");
    }
}
