//! Shell test command runner

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::utils::format_duration;

/// Result of running a test command
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    /// Exit code, -1 when killed or terminated by a signal
    pub exit_code: i32,

    pub stdout: String,

    pub stderr: String,

    /// Wall clock time the command was started
    pub started_at: DateTime<Utc>,

    pub duration: Duration,

    pub timed_out: bool,
}

impl CommandOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0 && !self.timed_out
    }

    /// Combined output for error reports
    pub fn output(&self) -> String {
        match (self.stdout.trim().is_empty(), self.stderr.trim().is_empty()) {
            (true, true) => String::new(),
            (false, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => format!("{}\n{}", self.stdout, self.stderr),
        }
    }
}

/// Runs the project's test command through the shell
#[derive(Debug, Clone)]
pub struct TestRunner {
    /// Command line passed to the shell
    pub command: String,

    /// Working directory of the command
    pub cwd: PathBuf,

    /// Kill the command after this long
    pub timeout: Duration,
}

impl TestRunner {
    pub fn new(command: impl Into<String>, cwd: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            cwd: cwd.into(),
            timeout,
        }
    }

    fn shell_command(&self) -> Command {
        #[cfg(windows)]
        let mut command = {
            let mut command = Command::new("cmd");
            command.arg("/C").arg(&self.command);
            command
        };
        #[cfg(not(windows))]
        let mut command = {
            let mut command = Command::new("sh");
            command.arg("-c").arg(&self.command);
            command
        };
        command
            .current_dir(&self.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    /// Run the command once
    ///
    /// A non-zero exit code is reported in the outcome; only a failure to
    /// start the shell is an error.
    pub async fn run(&self) -> Result<CommandOutcome> {
        debug!("Running test command in {:?}: {}", self.cwd, self.command);
        let started_at = Utc::now();
        let start = Instant::now();

        let mut child = self
            .shell_command()
            .spawn()
            .with_context(|| format!("Failed to run test command: {}", self.command))?;

        let mut stdout_pipe = child.stdout.take().context("Test command stdout missing")?;
        let mut stderr_pipe = child.stderr.take().context("Test command stderr missing")?;
        let stdout_task = tokio::spawn(async move {
            let mut buffer = Vec::new();
            let _ = stdout_pipe.read_to_end(&mut buffer).await;
            String::from_utf8_lossy(&buffer).into_owned()
        });
        let stderr_task = tokio::spawn(async move {
            let mut buffer = Vec::new();
            let _ = stderr_pipe.read_to_end(&mut buffer).await;
            String::from_utf8_lossy(&buffer).into_owned()
        });

        match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(status) => {
                let status = status.context("Failed to wait for test command")?;
                let stdout = stdout_task.await.unwrap_or_default();
                let stderr = stderr_task.await.unwrap_or_default();
                let outcome = CommandOutcome {
                    exit_code: status.code().unwrap_or(-1),
                    stdout,
                    stderr,
                    started_at,
                    duration: start.elapsed(),
                    timed_out: false,
                };
                debug!(
                    "Test command exited with {} after {}",
                    outcome.exit_code,
                    format_duration(outcome.duration)
                );
                Ok(outcome)
            }
            Err(_) => {
                warn!(
                    "Test command timed out after {:?}: {}",
                    self.timeout, self.command
                );
                let _ = child.kill().await;
                stdout_task.abort();
                stderr_task.abort();
                Ok(CommandOutcome {
                    exit_code: -1,
                    stdout: String::new(),
                    stderr: "Command timed out".to_string(),
                    started_at,
                    duration: start.elapsed(),
                    timed_out: true,
                })
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn runner(command: &str, cwd: &std::path::Path) -> TestRunner {
        TestRunner::new(command, cwd, Duration::from_secs(10))
    }

    #[tokio::test]
    async fn test_captures_output_and_exit_code() {
        let temp_dir = TempDir::new().unwrap();
        let outcome = runner("echo out; echo err >&2; exit 3", temp_dir.path())
            .run()
            .await
            .unwrap();

        assert_eq!(outcome.exit_code, 3);
        assert_eq!(outcome.stdout.trim(), "out");
        assert_eq!(outcome.stderr.trim(), "err");
        assert!(!outcome.success());
        assert!(!outcome.timed_out);
        assert_eq!(outcome.output(), "out\n\nerr\n");
    }

    #[tokio::test]
    async fn test_honours_working_directory() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("marker.txt"), "here").unwrap();

        let outcome = runner("cat marker.txt", temp_dir.path()).run().await.unwrap();
        assert!(outcome.success());
        assert_eq!(outcome.stdout, "here");
    }

    #[tokio::test]
    async fn test_kills_on_timeout() {
        let temp_dir = TempDir::new().unwrap();
        let runner = TestRunner::new("sleep 5", temp_dir.path(), Duration::from_millis(200));

        let outcome = runner.run().await.unwrap();
        assert!(outcome.timed_out);
        assert_eq!(outcome.exit_code, -1);
        assert_eq!(outcome.stderr, "Command timed out");
        assert!(outcome.duration < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_missing_directory_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");
        assert!(runner("true", &missing).run().await.is_err());
    }
}
