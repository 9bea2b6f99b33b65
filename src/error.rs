//! Error types for commitai modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from running the git binary.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("git executable not found on PATH. Install git and try again")]
    NotInstalled,

    #[error("Failed to spawn git process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("`git {command}` exited with {}: {stderr}",
             .code.map_or("unknown status".to_string(), |c| format!("code {c}")))]
    NonZeroExit {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("`git {command}` reported an error: {stderr}")]
    UnexpectedStderr { command: String, stderr: String },
}

/// Errors from a text-generation provider.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("API key not found. Set COMMITAI_API_KEY (or {hint}) or add api_key to the config file")]
    CredentialMissing { hint: &'static str },

    #[error("request to generation endpoint failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("generation endpoint timed out after {0} seconds")]
    Timeout(u64),

    #[error("generation endpoint returned {status} {reason}{}",
             .detail.as_ref().map_or(String::new(), |d| format!(": {d}")))]
    HttpStatus {
        status: u16,
        reason: String,
        detail: Option<String>,
    },

    #[error("generation endpoint reported error{}: {message}",
             .code.as_ref().map_or(String::new(), |c| format!(" {c}")))]
    Api { code: Option<String>, message: String },

    #[error("invalid response format: {0}")]
    InvalidResponse(String),

    #[error("all retry attempts failed: {0}")]
    RetriesExhausted(#[source] Box<GenerationError>),
}

impl GenerationError {
    /// Whether another attempt could plausibly succeed.
    ///
    /// Only transport-level failures qualify; an HTTP status or an API error
    /// object is an answer from the server and is reported as-is.
    pub fn is_transient(&self) -> bool {
        matches!(self, GenerationError::Transport(_) | GenerationError::Timeout(_))
    }
}

/// Errors from loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value '{value}' for {key}: expected {expected}")]
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Terminal failure of one pipeline invocation.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("No git workspace available{}",
             .path.as_ref().map_or(String::new(), |p| format!(" at {}", p.display())))]
    WorkspaceMissing { path: Option<PathBuf> },

    #[error("Failed to collect changes: {0}")]
    DiffCommandFailed(#[source] GitError),

    #[error("{0}")]
    CredentialMissing(#[source] GenerationError),

    #[error("Generation request failed: {0}")]
    GenerationRequestFailed(#[source] GenerationError),

    #[error("Generation failed: {0}")]
    GenerationResponseInvalid(#[source] GenerationError),

    #[error("Failed to create commit: {0}")]
    CommitCommandFailed(#[source] GitError),
}

impl From<GenerationError> for PipelineError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::CredentialMissing { .. } => PipelineError::CredentialMissing(err),
            GenerationError::InvalidResponse(_) => PipelineError::GenerationResponseInvalid(err),
            other => PipelineError::GenerationRequestFailed(other),
        }
    }
}
