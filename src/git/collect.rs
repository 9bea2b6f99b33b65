//! Collecting pending changes with `git status` and `git diff`.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use tracing::debug;

use crate::error::{ConfigError, GitError};
use crate::git::executor::{GitExecutor, GitOutput, display_args};
use crate::git::workspace::Workspace;

/// Which changes the diff describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DiffScope {
    /// Changes staged in the index (`git diff --cached`).
    #[default]
    Staged,
    /// All tracked changes since the last commit (`git diff HEAD`).
    Head,
}

impl DiffScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiffScope::Staged => "staged",
            DiffScope::Head => "head",
        }
    }

    /// Arguments for the diff command of this scope.
    pub fn diff_args(&self) -> Vec<String> {
        let target = match self {
            DiffScope::Staged => "--cached",
            DiffScope::Head => "HEAD",
        };
        ["diff", target, "--no-color", "--no-ext-diff"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}

impl fmt::Display for DiffScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiffScope {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "staged" | "cached" => Ok(DiffScope::Staged),
            "head" => Ok(DiffScope::Head),
            _ => Err(ConfigError::InvalidValue {
                key: "scope",
                value: s.to_string(),
                expected: "one of: staged, head",
            }),
        }
    }
}

/// Pending changes of a working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    /// Porcelain status lines (`git status --porcelain`).
    pub status: String,
    /// Raw diff text for the configured scope.
    pub diff: String,
    pub scope: DiffScope,
}

impl ChangeSet {
    /// True when the diff has no content worth describing.
    pub fn is_empty(&self) -> bool {
        self.diff.trim().is_empty()
    }

    /// Number of entries `git status` reported.
    pub fn status_entries(&self) -> usize {
        self.status.lines().filter(|l| !l.trim().is_empty()).count()
    }
}

/// Run `git status` and then the scope's diff command in the workspace.
///
/// Either command exiting non-zero or writing to stderr is a failure; the raw
/// stderr text is carried in the error.
pub async fn collect_changes(
    git: &dyn GitExecutor,
    workspace: &Workspace,
    scope: DiffScope,
) -> Result<ChangeSet, GitError> {
    let status_args = vec!["status".to_string(), "--porcelain".to_string()];
    let status = run_checked(git, workspace, &status_args).await?;

    let diff_args = scope.diff_args();
    let diff = run_checked(git, workspace, &diff_args).await?;

    let changes = ChangeSet {
        status: status.stdout,
        diff: diff.stdout,
        scope,
    };

    debug!(
        scope = %scope,
        status_entries = changes.status_entries(),
        diff_len = changes.diff.len(),
        "Collected changes"
    );

    Ok(changes)
}

async fn run_checked(
    git: &dyn GitExecutor,
    workspace: &Workspace,
    args: &[String],
) -> Result<GitOutput, GitError> {
    let output = git.run(&workspace.dir, args).await?;
    let stderr = output.stderr.trim();

    if !output.success() {
        return Err(GitError::NonZeroExit {
            command: display_args(args),
            code: output.code,
            stderr: stderr.to_string(),
        });
    }

    if !stderr.is_empty() {
        return Err(GitError::UnexpectedStderr {
            command: display_args(args),
            stderr: stderr.to_string(),
        });
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::executor::MockGitExecutor;
    use std::path::{Path, PathBuf};

    fn workspace() -> Workspace {
        Workspace {
            root: PathBuf::from("/repo"),
            dir: PathBuf::from("/repo/src"),
        }
    }

    #[test]
    fn test_diff_args_per_scope() {
        assert_eq!(
            DiffScope::Staged.diff_args(),
            vec!["diff", "--cached", "--no-color", "--no-ext-diff"]
        );
        assert_eq!(
            DiffScope::Head.diff_args(),
            vec!["diff", "HEAD", "--no-color", "--no-ext-diff"]
        );
    }

    #[test]
    fn test_scope_from_str() {
        assert_eq!("staged".parse::<DiffScope>().unwrap(), DiffScope::Staged);
        assert_eq!("cached".parse::<DiffScope>().unwrap(), DiffScope::Staged);
        assert_eq!(" HEAD ".parse::<DiffScope>().unwrap(), DiffScope::Head);
        assert!("everything".parse::<DiffScope>().is_err());
    }

    #[test]
    fn test_default_scope_is_staged() {
        assert_eq!(DiffScope::default(), DiffScope::Staged);
    }

    #[test]
    fn test_change_set_whitespace_diff_is_empty() {
        let changes = ChangeSet {
            status: " M a.txt\n?? b.txt\n".to_string(),
            diff: "  \n\t\n".to_string(),
            scope: DiffScope::Staged,
        };
        assert!(changes.is_empty());
        assert_eq!(changes.status_entries(), 2);
    }

    #[tokio::test]
    async fn test_collect_runs_status_then_diff_in_workdir() {
        let mut mock = MockGitExecutor::new();
        let mut seq = mockall::Sequence::new();

        mock.expect_run()
            .withf(|dir, args| dir == Path::new("/repo/src") && args[0] == "status")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(GitOutput::ok("M  x\n")));
        mock.expect_run()
            .withf(|_, args| args == DiffScope::Staged.diff_args().as_slice())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(GitOutput::ok("diff --git a/x b/x\n+foo\n")));

        let changes = collect_changes(&mock, &workspace(), DiffScope::Staged)
            .await
            .unwrap();
        assert_eq!(changes.diff, "diff --git a/x b/x\n+foo\n");
        assert_eq!(changes.status, "M  x\n");
        assert!(!changes.is_empty());
    }

    #[tokio::test]
    async fn test_collect_non_zero_status_aborts_before_diff() {
        let mut mock = MockGitExecutor::new();
        mock.expect_run().times(1).returning(|_, _| {
            Ok(GitOutput {
                code: Some(128),
                stdout: String::new(),
                stderr: "fatal: not a git repository\n".to_string(),
            })
        });

        let result = collect_changes(&mock, &workspace(), DiffScope::Staged).await;
        match result {
            Err(GitError::NonZeroExit { command, code, stderr }) => {
                assert_eq!(command, "status --porcelain");
                assert_eq!(code, Some(128));
                assert_eq!(stderr, "fatal: not a git repository");
            }
            other => panic!("Expected NonZeroExit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_collect_stderr_on_success_is_an_error() {
        let mut mock = MockGitExecutor::new();
        mock.expect_run()
            .withf(|_, args| args[0] == "status")
            .returning(|_, _| Ok(GitOutput::ok("")));
        mock.expect_run()
            .withf(|_, args| args[0] == "diff")
            .returning(|_, _| {
                Ok(GitOutput {
                    code: Some(0),
                    stdout: "diff --git a/x b/x\n".to_string(),
                    stderr: "warning: unable to access '.gitattributes'\n".to_string(),
                })
            });

        let result = collect_changes(&mock, &workspace(), DiffScope::Head).await;
        assert!(matches!(
            result,
            Err(GitError::UnexpectedStderr { ref command, .. }) if command == "diff HEAD --no-color --no-ext-diff"
        ));
    }

    #[tokio::test]
    async fn test_collect_propagates_spawn_failure() {
        let mut mock = MockGitExecutor::new();
        mock.expect_run().returning(|_, _| {
            Err(GitError::SpawnFailed(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "git",
            )))
        });

        let result = collect_changes(&mock, &workspace(), DiffScope::Staged).await;
        assert!(matches!(result, Err(GitError::SpawnFailed(_))));
    }
}
