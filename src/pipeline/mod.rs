//! The diff → message → commit state machine.
//!
//! ```text
//! Idle → CollectingDiff → NoChanges | DiffError | DiffReady
//! DiffReady → GeneratingMessage → GenerationError | MessageReady
//! MessageReady → Committing → CommitError | Committed
//! ```
//!
//! Transitions only move forward, every error state is terminal, and each
//! invocation starts again from `Idle`. In dry-run mode `MessageReady` ends
//! the run as `Drafted`.

pub mod lock;

use std::fmt;

use tracing::{debug, info};

use crate::error::PipelineError;
use crate::git::{ChangeSet, DiffScope, GitExecutor, Workspace, collect_changes, commit_changes};
use crate::llm::TextGenerator;
use crate::message::{CommitMessage, build_commit_prompt};
use crate::notify::{Notice, Notifier};

pub use lock::WorkdirLocks;

/// Named pipeline stages, including the transient ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    CollectingDiff,
    DiffReady,
    GeneratingMessage,
    MessageReady,
    Committing,
    NoChanges,
    Committed,
    Drafted,
    DiffError,
    GenerationError,
    CommitError,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Pipeline state with the data each stage carries forward.
#[derive(Debug)]
pub enum PipelineState {
    Idle,
    DiffReady(ChangeSet),
    MessageReady(CommitMessage),
    /// Nothing to describe. `unstaged_changes` is set when the staged scope
    /// found nothing but `git status` still lists changes.
    NoChanges { unstaged_changes: bool },
    Committed(CommitMessage),
    Drafted(CommitMessage),
    Failed(PipelineError),
}

impl PipelineState {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineState::Idle => Stage::Idle,
            PipelineState::DiffReady(_) => Stage::DiffReady,
            PipelineState::MessageReady(_) => Stage::MessageReady,
            PipelineState::NoChanges { .. } => Stage::NoChanges,
            PipelineState::Committed(_) => Stage::Committed,
            PipelineState::Drafted(_) => Stage::Drafted,
            PipelineState::Failed(err) => match err {
                PipelineError::WorkspaceMissing { .. } | PipelineError::DiffCommandFailed(_) => {
                    Stage::DiffError
                }
                PipelineError::CredentialMissing(_)
                | PipelineError::GenerationRequestFailed(_)
                | PipelineError::GenerationResponseInvalid(_) => Stage::GenerationError,
                PipelineError::CommitCommandFailed(_) => Stage::CommitError,
            },
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            PipelineState::Idle | PipelineState::DiffReady(_) | PipelineState::MessageReady(_)
        )
    }

    /// The single notification for a terminal state.
    pub fn notice(&self) -> Option<Notice> {
        match self {
            PipelineState::Committed(message) => {
                Some(Notice::info(format!("Commit created: {message}")))
            }
            PipelineState::Drafted(message) => Some(Notice::info(format!(
                "Generated commit message (not committed): {message}"
            ))),
            PipelineState::NoChanges { unstaged_changes: false } => {
                Some(Notice::warning("Nothing to commit: no pending changes"))
            }
            PipelineState::NoChanges { unstaged_changes: true } => Some(Notice::warning(
                "Nothing to commit: no staged changes (stage files with `git add` or use --scope head)",
            )),
            PipelineState::Failed(err) => Some(Notice::error(err.to_string())),
            PipelineState::Idle | PipelineState::DiffReady(_) | PipelineState::MessageReady(_) => {
                None
            }
        }
    }

    /// Process exit code for the standalone tool.
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineState::Failed(_) => 1,
            _ => 0,
        }
    }
}

/// Per-invocation options.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    pub scope: DiffScope,
    /// Stop at `MessageReady` instead of committing.
    pub dry_run: bool,
}

/// One invocation's collaborators.
pub struct Pipeline {
    git: Box<dyn GitExecutor>,
    generator: Box<dyn TextGenerator>,
    workspace: Workspace,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(
        git: Box<dyn GitExecutor>,
        generator: Box<dyn TextGenerator>,
        workspace: Workspace,
        options: PipelineOptions,
    ) -> Self {
        Self {
            git,
            generator,
            workspace,
            options,
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// `Idle → CollectingDiff → NoChanges | DiffReady | DiffError`
    pub async fn collect(&self) -> PipelineState {
        let scope = self.options.scope;
        match collect_changes(self.git.as_ref(), &self.workspace, scope).await {
            Ok(changes) if changes.is_empty() => PipelineState::NoChanges {
                unstaged_changes: scope == DiffScope::Staged && changes.status_entries() > 0,
            },
            Ok(changes) => PipelineState::DiffReady(changes),
            Err(e) => PipelineState::Failed(PipelineError::DiffCommandFailed(e)),
        }
    }

    /// `DiffReady → GeneratingMessage → MessageReady | GenerationError`
    pub async fn generate(&self, changes: &ChangeSet) -> PipelineState {
        let prompt = build_commit_prompt(&changes.diff);
        debug!("Commit prompt length: {} chars", prompt.len());

        let result = self
            .generator
            .generate(&prompt)
            .await
            .and_then(|raw| CommitMessage::finalize(&raw));

        match result {
            Ok(message) => PipelineState::MessageReady(message),
            Err(e) => PipelineState::Failed(e.into()),
        }
    }

    /// `MessageReady → Committing → Committed | CommitError`
    pub async fn commit(&self, message: CommitMessage) -> PipelineState {
        match commit_changes(self.git.as_ref(), &self.workspace, &message, self.options.scope).await
        {
            Ok(()) => PipelineState::Committed(message),
            Err(e) => PipelineState::Failed(PipelineError::CommitCommandFailed(e)),
        }
    }

    /// The transient stage the transition leaving `state` passes through.
    ///
    /// `None` for terminal states and for the dry-run `MessageReady → Drafted`
    /// edge, which does no work.
    pub fn transient_stage(&self, state: &PipelineState) -> Option<Stage> {
        match state {
            PipelineState::Idle => Some(Stage::CollectingDiff),
            PipelineState::DiffReady(_) => Some(Stage::GeneratingMessage),
            PipelineState::MessageReady(_) if !self.options.dry_run => Some(Stage::Committing),
            _ => None,
        }
    }

    /// Apply the transition leaving `state`. Terminal states are returned as-is.
    pub async fn step(&self, state: PipelineState) -> PipelineState {
        match state {
            PipelineState::Idle => self.collect().await,
            PipelineState::DiffReady(changes) => self.generate(&changes).await,
            PipelineState::MessageReady(message) if self.options.dry_run => {
                PipelineState::Drafted(message)
            }
            PipelineState::MessageReady(message) => self.commit(message).await,
            terminal => terminal,
        }
    }

    /// Drive a fresh invocation from `Idle` to a terminal state.
    ///
    /// Holds the working tree's lock for the whole run, so invocations on the
    /// same repository in this process never interleave.
    pub async fn run(&self) -> PipelineState {
        let _guard = WorkdirLocks::global().acquire(&self.workspace.root).await;

        let mut state = PipelineState::Idle;
        while !state.is_terminal() {
            let from = state.stage();
            if let Some(stage) = self.transient_stage(&state) {
                info!(from = %from, stage = %stage, "Entering stage");
            }
            state = self.step(state).await;
            info!(from = %from, to = %state.stage(), "Pipeline transition");
        }
        state
    }
}

/// Run the pipeline and emit exactly one notice for its terminal state.
pub async fn run_and_notify(pipeline: &Pipeline, notifier: &dyn Notifier) -> PipelineState {
    let state = pipeline.run().await;
    if let Some(notice) = state.notice() {
        notifier.notify(&notice);
    }
    state
}
