//! Creating the commit with `git commit`.

use tracing::debug;

use crate::error::GitError;
use crate::git::collect::DiffScope;
use crate::git::executor::{GitExecutor, display_args};
use crate::git::workspace::Workspace;
use crate::message::CommitMessage;

/// Build the argument vector for committing `message`.
///
/// The message is one element of the vector and is never re-parsed, so quotes,
/// backticks and `$(...)` reach git untouched. `--cleanup=verbatim` keeps git
/// from stripping lines that start with `#`. In `Head` scope `--all` commits
/// the tracked changes the diff described.
pub fn commit_args(message: &CommitMessage, scope: DiffScope) -> Vec<String> {
    let mut args = vec!["commit".to_string(), "--cleanup=verbatim".to_string()];
    if scope == DiffScope::Head {
        args.push("--all".to_string());
    }
    args.push("-m".to_string());
    args.push(message.as_str().to_string());
    args
}

/// Commit the pending changes in the workspace with `message`.
pub async fn commit_changes(
    git: &dyn GitExecutor,
    workspace: &Workspace,
    message: &CommitMessage,
    scope: DiffScope,
) -> Result<(), GitError> {
    let args = commit_args(message, scope);
    let output = git.run(&workspace.dir, &args).await?;

    if !output.success() {
        // "nothing to commit" goes to stdout
        let detail = if output.stderr.trim().is_empty() {
            output.stdout.trim()
        } else {
            output.stderr.trim()
        };
        return Err(GitError::NonZeroExit {
            command: display_args(&args[..args.len() - 1]) + " <message>",
            code: output.code,
            stderr: detail.to_string(),
        });
    }

    debug!("Commit created: {}", output.stdout.lines().next().unwrap_or_default());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::executor::{GitOutput, MockGitExecutor};
    use std::path::PathBuf;

    fn workspace() -> Workspace {
        Workspace {
            root: PathBuf::from("/repo"),
            dir: PathBuf::from("/repo"),
        }
    }

    fn message(text: &str) -> CommitMessage {
        CommitMessage::finalize(text).unwrap()
    }

    #[test]
    fn test_commit_args_staged() {
        let args = commit_args(&message("Add foo to x"), DiffScope::Staged);
        assert_eq!(args, vec!["commit", "--cleanup=verbatim", "-m", "Add foo to x"]);
    }

    #[test]
    fn test_commit_args_head_commits_all_tracked() {
        let args = commit_args(&message("Fix parser"), DiffScope::Head);
        assert_eq!(
            args,
            vec!["commit", "--cleanup=verbatim", "--all", "-m", "Fix parser"]
        );
    }

    #[test]
    fn test_commit_args_keep_shell_metacharacters_in_one_argument() {
        let text = r#"Fix "quoted" `whoami` $(rm -rf /) && echo; done"#;
        let args = commit_args(&message(text), DiffScope::Staged);
        assert_eq!(args.last().unwrap(), text);
        assert_eq!(args.len(), 4);
    }

    #[tokio::test]
    async fn test_commit_passes_message_as_single_argument() {
        let mut mock = MockGitExecutor::new();
        mock.expect_run()
            .withf(|_, args| args.last().map(String::as_str) == Some("Say \"hi\""))
            .times(1)
            .returning(|_, _| Ok(GitOutput::ok("[main abc1234] Say \"hi\"\n")));

        let result = commit_changes(&mock, &workspace(), &message("Say \"hi\""), DiffScope::Staged).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_commit_failure_reports_stdout_when_stderr_empty() {
        let mut mock = MockGitExecutor::new();
        mock.expect_run().returning(|_, _| {
            Ok(GitOutput {
                code: Some(1),
                stdout: "nothing to commit, working tree clean\n".to_string(),
                stderr: String::new(),
            })
        });

        let err = commit_changes(&mock, &workspace(), &message("Add foo"), DiffScope::Staged)
            .await
            .unwrap_err();
        match err {
            GitError::NonZeroExit { command, code, stderr } => {
                assert_eq!(command, "commit --cleanup=verbatim -m <message>");
                assert_eq!(code, Some(1));
                assert_eq!(stderr, "nothing to commit, working tree clean");
            }
            other => panic!("Expected NonZeroExit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_commit_failure_prefers_stderr() {
        let mut mock = MockGitExecutor::new();
        mock.expect_run().returning(|_, _| {
            Ok(GitOutput {
                code: Some(128),
                stdout: "ignored\n".to_string(),
                stderr: "fatal: unable to auto-detect email address\n".to_string(),
            })
        });

        let err = commit_changes(&mock, &workspace(), &message("Add foo"), DiffScope::Staged)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("unable to auto-detect email address"));
    }
}
