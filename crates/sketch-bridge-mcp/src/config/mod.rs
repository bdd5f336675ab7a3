//! Configuration loading and resolution.
//!
//! Each input resolves as: explicit CLI value, then environment variable,
//! then a platform default.

use std::path::PathBuf;
use std::time::Duration;

use sketch_bridge::{BridgeConfig, DEFAULT_LAUNCH_TIMEOUT};

pub const SKETCH_ROOT_ENV: &str = "SKETCH_ROOT";
pub const SKETCH_RUNNER_ENV: &str = "SKETCH_RUNNER";
pub const RUN_TIMEOUT_ENV: &str = "SKETCH_RUN_TIMEOUT_SECS";

#[cfg(windows)]
const RUNNER_BINARY: &str = "processing-java.exe";
#[cfg(not(windows))]
const RUNNER_BINARY: &str = "processing-java";

fn home_dir() -> String {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string())
}

/// Resolve the sketch root directory.
pub fn resolve_sketch_root(explicit: Option<&str>) -> PathBuf {
    if let Some(path) = explicit {
        return PathBuf::from(path);
    }

    if let Ok(env_path) = std::env::var(SKETCH_ROOT_ENV) {
        return PathBuf::from(env_path);
    }

    PathBuf::from(home_dir()).join("sketchbook")
}

/// Resolve the runner executable path.
pub fn resolve_runner_path(explicit: Option<&str>) -> PathBuf {
    if let Some(path) = explicit {
        return PathBuf::from(path);
    }

    if let Ok(env_path) = std::env::var(SKETCH_RUNNER_ENV) {
        return PathBuf::from(env_path);
    }

    find_on_path(RUNNER_BINARY).unwrap_or_else(|| PathBuf::from("/usr/local/bin").join(RUNNER_BINARY))
}

/// Resolve the launch timeout. Unparseable env values fall back to the default.
pub fn resolve_launch_timeout(explicit: Option<u64>) -> Duration {
    if let Some(secs) = explicit {
        return Duration::from_secs(secs);
    }

    match std::env::var(RUN_TIMEOUT_ENV) {
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(secs) => Duration::from_secs(secs),
            Err(_) => {
                tracing::warn!("Ignoring invalid {RUN_TIMEOUT_ENV}={raw:?}");
                DEFAULT_LAUNCH_TIMEOUT
            }
        },
        Err(_) => DEFAULT_LAUNCH_TIMEOUT,
    }
}

fn find_on_path(binary: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(binary))
        .find(|candidate| candidate.is_file())
}

/// Build the bridge configuration from optional CLI overrides.
pub fn resolve_bridge_config(
    sketch_root: Option<&str>,
    runner: Option<&str>,
    timeout_secs: Option<u64>,
) -> BridgeConfig {
    BridgeConfig::new(resolve_sketch_root(sketch_root), resolve_runner_path(runner))
        .with_launch_timeout(resolve_launch_timeout(timeout_secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_values_win() {
        let config = resolve_bridge_config(Some("/my/sketches"), Some("/opt/pj"), Some(9));
        assert_eq!(config.sketch_root, PathBuf::from("/my/sketches"));
        assert_eq!(config.runner_path, PathBuf::from("/opt/pj"));
        assert_eq!(config.launch_timeout, Duration::from_secs(9));
    }

    // Only test in this crate that touches the timeout variable.
    #[test]
    fn test_timeout_env_parsing() {
        std::env::set_var(RUN_TIMEOUT_ENV, "soon");
        assert_eq!(resolve_launch_timeout(None), DEFAULT_LAUNCH_TIMEOUT);

        std::env::set_var(RUN_TIMEOUT_ENV, " 3 ");
        assert_eq!(resolve_launch_timeout(None), Duration::from_secs(3));
        assert_eq!(resolve_launch_timeout(Some(7)), Duration::from_secs(7));

        std::env::set_var(RUN_TIMEOUT_ENV, "-1");
        assert_eq!(resolve_launch_timeout(None), DEFAULT_LAUNCH_TIMEOUT);

        std::env::remove_var(RUN_TIMEOUT_ENV);
        assert_eq!(resolve_launch_timeout(None), DEFAULT_LAUNCH_TIMEOUT);
    }

    #[test]
    fn test_find_on_path_missing() {
        assert!(find_on_path("surely-no-such-binary-xyz").is_none());
    }
}
