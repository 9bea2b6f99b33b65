//! Layered configuration: defaults, config file, environment, CLI flags.
//!
//! Precedence, lowest to highest:
//! 1. Built-in defaults
//! 2. TOML config file (`.commitai.toml` at the repository root, or `--config`)
//! 3. Environment variables (`COMMITAI_*`, provider key variables)
//! 4. Command-line flags (applied by the binary via [`Overrides`])

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::error::ConfigError;
use crate::git::{DiffScope, Workspace};
use crate::llm::{DEFAULT_MAX_ATTEMPTS, ProviderKind};

/// Config file looked up at the repository root.
pub const CONFIG_FILE_NAME: &str = ".commitai.toml";

/// Default timeout for one generation request.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

const API_KEY_ENV_VAR: &str = "COMMITAI_API_KEY";
const PROVIDER_ENV_VAR: &str = "COMMITAI_PROVIDER";
const MODEL_ENV_VAR: &str = "COMMITAI_MODEL";
const ENDPOINT_ENV_VAR: &str = "COMMITAI_ENDPOINT";
const TIMEOUT_ENV_VAR: &str = "COMMITAI_TIMEOUT";
const SCOPE_ENV_VAR: &str = "COMMITAI_SCOPE";

/// Secret for the generation endpoint. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a key; blank values count as absent.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Settings for constructing a [`TextGenerator`](crate::llm::TextGenerator).
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub provider: ProviderKind,
    pub model: String,
    pub endpoint: String,
    pub api_key: Option<ApiKey>,
    pub timeout: Duration,
    pub max_attempts: u32,
}

impl GeneratorConfig {
    /// Defaults for `provider`, without a credential.
    pub fn for_provider(provider: ProviderKind) -> Self {
        Self {
            provider,
            model: provider.default_model().to_string(),
            endpoint: provider.default_endpoint().to_string(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Resolved configuration for one invocation.
#[derive(Debug, Clone)]
pub struct Config {
    pub scope: DiffScope,
    pub generator: GeneratorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scope: DiffScope::default(),
            generator: GeneratorConfig::for_provider(ProviderKind::default()),
        }
    }
}

/// Shape of the TOML config file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub provider: Option<ProviderKind>,
    pub model: Option<String>,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_attempts: Option<u32>,
    pub scope: Option<DiffScope>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::ParseFailed {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config_path: Option<PathBuf>,
    pub provider: Option<ProviderKind>,
    pub model: Option<String>,
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
    pub scope: Option<DiffScope>,
}

impl Config {
    /// Resolve configuration for `workspace`.
    ///
    /// An explicit `--config` path must exist; the default
    /// `<root>/.commitai.toml` is optional.
    pub fn load(workspace: &Workspace, overrides: &Overrides) -> Result<Self, ConfigError> {
        let (path, required) = match &overrides.config_path {
            Some(p) => (p.clone(), true),
            None => (workspace.root.join(CONFIG_FILE_NAME), false),
        };

        let file = if required || path.is_file() {
            let file = FileConfig::load(&path)?;
            if file.api_key.is_some() && workspace.is_tracked(&path) {
                warn!(
                    "{} holds api_key but is tracked by git; move the key to {} or untrack the file",
                    path.display(),
                    API_KEY_ENV_VAR
                );
            }
            file
        } else {
            FileConfig::default()
        };

        Self::resolve(file, overrides)
    }

    /// Merge a parsed file, the process environment, and CLI overrides.
    pub fn resolve(file: FileConfig, overrides: &Overrides) -> Result<Self, ConfigError> {
        let provider = match overrides.provider {
            Some(p) => p,
            None => match env_value(PROVIDER_ENV_VAR) {
                Some(v) => v.parse()?,
                None => file.provider.unwrap_or_default(),
            },
        };

        let mut generator = GeneratorConfig::for_provider(provider);

        if let Some(model) = overrides
            .model
            .clone()
            .or_else(|| env_value(MODEL_ENV_VAR))
            .or(file.model)
        {
            generator.model = model;
        }

        if let Some(endpoint) = overrides
            .endpoint
            .clone()
            .or_else(|| env_value(ENDPOINT_ENV_VAR))
            .or(file.endpoint)
        {
            generator.endpoint = endpoint;
        }

        let mut timeout_secs = file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if let Some(secs) = env_timeout() {
            timeout_secs = secs;
        }
        if let Some(secs) = overrides.timeout_secs {
            timeout_secs = secs;
        }
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timeout",
                value: "0".to_string(),
                expected: "a positive number of seconds",
            });
        }
        generator.timeout = Duration::from_secs(timeout_secs);

        if let Some(attempts) = file.max_attempts {
            if attempts == 0 {
                return Err(ConfigError::InvalidValue {
                    key: "max_attempts",
                    value: "0".to_string(),
                    expected: "at least 1",
                });
            }
            generator.max_attempts = attempts;
        }

        generator.api_key = env_value(API_KEY_ENV_VAR)
            .or_else(|| env_value(provider.credential_env()))
            .or(file.api_key)
            .and_then(ApiKey::new);

        let scope = match overrides.scope {
            Some(s) => s,
            None => match env_value(SCOPE_ENV_VAR) {
                Some(v) => v.parse()?,
                None => file.scope.unwrap_or_default(),
            },
        };

        Ok(Self { scope, generator })
    }
}

/// Read a non-empty environment variable.
fn env_value(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Read the timeout override.
///
/// Logs a warning and ignores the variable if it is not a whole number of
/// seconds.
fn env_timeout() -> Option<u64> {
    let value = env_value(TIMEOUT_ENV_VAR)?;
    match value.trim().parse::<u64>() {
        Ok(secs) => Some(secs),
        Err(_) => {
            warn!("Invalid {} value '{}', ignoring it", TIMEOUT_ENV_VAR, value);
            None
        }
    }
}
