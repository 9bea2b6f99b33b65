//! commitai - generate a commit message for pending git changes and commit them.
//!
//! # Overview
//!
//! commitai collects the working tree's diff, asks a text-generation endpoint
//! for a one-line commit message, truncates it to 72 characters, and commits
//! with it. Each run is a small state machine (see [`pipeline`]) that ends in
//! exactly one user notification.

pub mod config;
pub mod error;
pub mod git;
pub mod llm;
pub mod message;
pub mod notify;
pub mod pipeline;

// Re-export commonly used types
pub use config::{ApiKey, Config, GeneratorConfig, Overrides};
pub use error::{ConfigError, GenerationError, GitError, PipelineError};
pub use git::{ChangeSet, DiffScope, GitExecutor, SystemGit, Workspace};
pub use llm::{ProviderKind, TextGenerator, build_generator};
pub use message::{CommitMessage, MAX_MESSAGE_CHARS};
pub use notify::{ConsoleNotifier, Notice, Notifier, Severity};
pub use pipeline::{Pipeline, PipelineOptions, PipelineState, Stage, run_and_notify};
