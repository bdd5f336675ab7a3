//! Launching the external sketch runner (`processing-java` or compatible).

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use serde_json::{Map, Value};
use tokio::io::AsyncReadExt;
use tokio::process::{ChildStderr, ChildStdout, Command};

use crate::types::LaunchOutcome;

/// Flag naming the sketch directory.
const SKETCH_FLAG: &str = "--sketch=";
/// Flag asking the runner to build and run.
const RUN_FLAG: &str = "--run";
/// Flag carrying user parameters as JSON.
const ARGS_FLAG: &str = "--args=";

/// Build the runner argument list (without the executable itself).
pub fn runner_args(sketch_path: &Path, params: &Map<String, Value>) -> Vec<String> {
    let mut args = vec![
        format!("{SKETCH_FLAG}{}", sketch_path.display()),
        RUN_FLAG.to_string(),
    ];
    if !params.is_empty() {
        args.push(format!("{ARGS_FLAG}{}", Value::Object(params.clone())));
    }
    args
}

/// Spawns the runner and classifies its early behaviour.
#[derive(Debug, Clone)]
pub struct RunnerLauncher {
    runner: PathBuf,
    timeout: Duration,
}

impl RunnerLauncher {
    pub fn new(runner: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            runner: runner.into(),
            timeout,
        }
    }

    /// Spawn the runner for `sketch_path` and wait at most the launch timeout.
    ///
    /// The child is never killed. If it is still running when the timeout
    /// elapses it is handed to a background task that keeps its output pipes
    /// drained and reaps it on exit, and the launch counts as started.
    pub async fn launch(&self, sketch_path: &Path, params: &Map<String, Value>) -> LaunchOutcome {
        let args = runner_args(sketch_path, params);
        tracing::debug!("Launching {} {}", self.runner.display(), args.join(" "));

        let child = Command::new(&self.runner)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();

        let mut child = match child {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!("Failed to spawn runner {}: {e}", self.runner.display());
                return LaunchOutcome::FailedToStart(e.to_string());
            }
        };
        let pid = child.id();

        // Readers own the pipes, so they stay open for as long as the runner writes.
        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(discard_stdout(stdout));
        }
        let stderr_reader = child.stderr.take().map(|stderr| tokio::spawn(capture_stderr(stderr)));

        let waited = {
            let child = &mut child;
            tokio::time::timeout(self.timeout, async move {
                let status = child.wait().await?;
                let stderr = match stderr_reader {
                    Some(reader) => reader.await.map_err(std::io::Error::other)??,
                    None => Vec::new(),
                };
                Ok::<_, std::io::Error>((status, stderr))
            })
            .await
        };

        match waited {
            Ok(Ok((status, stderr))) => {
                if stderr.is_empty() {
                    tracing::info!("Runner exited with {status} and no error output");
                    LaunchOutcome::Started
                } else {
                    tracing::warn!("Runner wrote {} bytes to stderr", stderr.len());
                    LaunchOutcome::StartedWithWarning(String::from_utf8_lossy(&stderr).into_owned())
                }
            }
            Ok(Err(e)) => {
                tracing::warn!("Failed to wait for runner: {e}");
                LaunchOutcome::FailedToStart(e.to_string())
            }
            Err(_) => {
                tracing::info!(
                    "Runner (pid {:?}) still running after {:?}, leaving it up",
                    pid,
                    self.timeout
                );
                tokio::spawn(async move {
                    match child.wait().await {
                        Ok(status) => tracing::debug!("Runner (pid {pid:?}) exited with {status}"),
                        Err(e) => tracing::warn!("Lost track of runner (pid {pid:?}): {e}"),
                    }
                });
                LaunchOutcome::Started
            }
        }
    }
}

/// Most stderr kept for a launch report. Later output is read and dropped.
const STDERR_CAPTURE_LIMIT: usize = 64 * 1024;

async fn discard_stdout(mut stdout: ChildStdout) {
    if let Err(e) = tokio::io::copy(&mut stdout, &mut tokio::io::sink()).await {
        tracing::debug!("Runner stdout closed: {e}");
    }
}

async fn capture_stderr(mut stderr: ChildStderr) -> std::io::Result<Vec<u8>> {
    let mut captured = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = stderr.read(&mut buf).await?;
        if n == 0 {
            return Ok(captured);
        }
        let room = STDERR_CAPTURE_LIMIT.saturating_sub(captured.len());
        captured.extend_from_slice(&buf[..n.min(room)]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_args_without_params() {
        let args = runner_args(Path::new("/sk/demo"), &Map::new());
        assert_eq!(args, vec!["--sketch=/sk/demo", "--run"]);
    }

    #[test]
    fn test_args_with_params() {
        let params = json!({ "speed": 3, "title": "hi" });
        let args = runner_args(Path::new("/sk/demo"), params.as_object().unwrap());
        assert_eq!(args.len(), 3);
        let payload = args[2].strip_prefix("--args=").unwrap();
        let parsed: Value = serde_json::from_str(payload).unwrap();
        assert_eq!(parsed, params);
    }

    #[tokio::test]
    async fn test_missing_binary_fails_to_start() {
        let launcher = RunnerLauncher::new("/definitely/not/a/runner", Duration::from_secs(1));
        let outcome = launcher.launch(Path::new("/tmp"), &Map::new()).await;
        assert!(matches!(outcome, LaunchOutcome::FailedToStart(_)));
    }

    #[cfg(unix)]
    fn script(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.path().join("runner.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_quiet_exit_is_started() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = RunnerLauncher::new(script(&dir, "echo hello"), Duration::from_secs(5));
        let outcome = launcher.launch(dir.path(), &Map::new()).await;
        assert_eq!(outcome, LaunchOutcome::Started);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stderr_is_surfaced() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = RunnerLauncher::new(
            script(&dir, "echo 'syntax error on line 3' >&2; exit 1"),
            Duration::from_secs(5),
        );
        let outcome = launcher.launch(dir.path(), &Map::new()).await;
        assert_eq!(
            outcome,
            LaunchOutcome::StartedWithWarning("syntax error on line 3\n".to_string())
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_long_running_counts_as_started() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = RunnerLauncher::new(
            script(&dir, "exec sleep 3"),
            Duration::from_millis(200),
        );
        let started = std::time::Instant::now();
        let outcome = launcher.launch(dir.path(), &Map::new()).await;
        assert_eq!(outcome, LaunchOutcome::Started);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_runner_outlives_launch_and_keeps_writing() {
        let dir = tempfile::tempdir().unwrap();
        let alive = dir.path().join("alive");
        let runner = script(
            &dir,
            &format!(
                "sleep 1; echo frame-1; echo frame-2 >&2; touch '{}'",
                alive.display()
            ),
        );
        let launcher = RunnerLauncher::new(runner, Duration::from_millis(200));

        let outcome = launcher.launch(dir.path(), &Map::new()).await;
        assert_eq!(outcome, LaunchOutcome::Started);
        assert!(!alive.exists());

        // Writing to either pipe after the timeout must not kill the runner.
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(alive.exists(), "runner died after launch returned");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stderr_capture_is_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = RunnerLauncher::new(
            script(&dir, "head -c 200000 /dev/zero | tr '\\0' x >&2"),
            Duration::from_secs(5),
        );
        let outcome = launcher.launch(dir.path(), &Map::new()).await;
        let LaunchOutcome::StartedWithWarning(text) = outcome else {
            panic!("expected stderr warning, got {outcome:?}");
        };
        assert_eq!(text.len(), STDERR_CAPTURE_LIMIT);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_runner_receives_flags() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("argv.txt");
        let runner = script(&dir, &format!("printf '%s\\n' \"$@\" > '{}'", out.display()));
        let launcher = RunnerLauncher::new(runner, Duration::from_secs(5));
        let params = json!({ "n": 1 });
        launcher
            .launch(Path::new("/sk/demo"), params.as_object().unwrap())
            .await;
        let argv = std::fs::read_to_string(out).unwrap();
        assert_eq!(argv, "--sketch=/sk/demo\n--run\n--args={\"n\":1}\n");
    }
}
