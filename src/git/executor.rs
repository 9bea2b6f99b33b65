//! Running the system `git` binary.
//!
//! Every invocation goes through an argument vector handed straight to the
//! process; nothing is ever parsed by a shell.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::GitError;

/// Captured result of one git invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl GitOutput {
    /// Successful output with the given stdout and nothing on stderr.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Trait for executing git commands.
///
/// This abstraction allows mocking the git subprocess in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GitExecutor: Send + Sync {
    /// Run `git <args>` inside `workdir` and capture its output.
    ///
    /// A non-zero exit is not an error at this level; callers decide how to
    /// interpret the captured output.
    async fn run(&self, workdir: &Path, args: &[String]) -> Result<GitOutput, GitError>;
}

/// Executor backed by the `git` binary found on `PATH`.
#[derive(Debug, Clone, Default)]
pub struct SystemGit;

impl SystemGit {
    /// Check that git is installed and return an executor for it.
    ///
    /// Uses the `which` crate for cross-platform executable detection.
    pub fn locate() -> Result<Self, GitError> {
        which::which("git").map_err(|_| GitError::NotInstalled)?;
        Ok(SystemGit)
    }
}

#[async_trait]
impl GitExecutor for SystemGit {
    async fn run(&self, workdir: &Path, args: &[String]) -> Result<GitOutput, GitError> {
        debug!(workdir = %workdir.display(), "git {}", args.join(" "));

        let output = Command::new("git")
            .args(args)
            .current_dir(workdir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(GitError::SpawnFailed)?;

        Ok(GitOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Render an argument vector for error messages and logs.
pub(crate) fn display_args(args: &[String]) -> String {
    args.join(" ")
}
