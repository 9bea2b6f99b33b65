//! Provider selection and the generator interface.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::GeneratorConfig;
use crate::error::{ConfigError, GenerationError};
use crate::llm::gemini::GeminiGenerator;
use crate::llm::http::HttpEndpoint;
use crate::llm::openai::OpenAiGenerator;
use crate::llm::palm::PalmGenerator;
use crate::llm::retry::Retrying;

/// A remote text-generation capability.
///
/// Implementations own their endpoint schema; callers only see
/// `prompt -> text | error`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send `prompt` and return the raw generated text.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Supported endpoint schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Legacy PaLM `generateText` (v1beta2).
    Palm,
    /// Gemini `generateContent` (v1beta).
    #[default]
    Gemini,
    /// OpenAI-compatible chat completions.
    #[value(name = "openai")]
    #[serde(rename = "openai")]
    OpenAi,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Palm => "palm",
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAi => "openai",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Palm => "text-bison-001",
            ProviderKind::Gemini => "gemini-2.0-flash",
            ProviderKind::OpenAi => "gpt-4o-mini",
        }
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            ProviderKind::Palm | ProviderKind::Gemini => {
                "https://generativelanguage.googleapis.com"
            }
            ProviderKind::OpenAi => "https://api.openai.com",
        }
    }

    /// Conventional environment variable holding this provider's key.
    pub fn credential_env(&self) -> &'static str {
        match self {
            ProviderKind::Palm | ProviderKind::Gemini => "GOOGLE_API_KEY",
            ProviderKind::OpenAi => "OPENAI_API_KEY",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "palm" => Ok(ProviderKind::Palm),
            "gemini" => Ok(ProviderKind::Gemini),
            "openai" => Ok(ProviderKind::OpenAi),
            _ => Err(ConfigError::InvalidValue {
                key: "provider",
                value: s.to_string(),
                expected: "one of: palm, gemini, openai",
            }),
        }
    }
}

/// Build the configured generator, wrapped with transport retries.
pub fn build_generator(config: &GeneratorConfig) -> Result<Box<dyn TextGenerator>, ConfigError> {
    let client = reqwest::Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(ConfigError::HttpClient)?;

    let endpoint = HttpEndpoint::new(client, config);
    let inner: Box<dyn TextGenerator> = match config.provider {
        ProviderKind::Palm => Box::new(PalmGenerator::new(endpoint)),
        ProviderKind::Gemini => Box::new(GeminiGenerator::new(endpoint)),
        ProviderKind::OpenAi => Box::new(OpenAiGenerator::new(endpoint)),
    };

    Ok(Box::new(Retrying::new(inner, config.max_attempts)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_provider_is_gemini() {
        assert_eq!(ProviderKind::default(), ProviderKind::Gemini);
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("PaLM".parse::<ProviderKind>().unwrap(), ProviderKind::Palm);
        assert_eq!("openai".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        let err = "bard".parse::<ProviderKind>().unwrap_err();
        assert!(err.to_string().contains("palm, gemini, openai"));
    }

    #[test]
    fn test_google_schemas_share_credential_and_host() {
        assert_eq!(ProviderKind::Palm.credential_env(), "GOOGLE_API_KEY");
        assert_eq!(ProviderKind::Gemini.credential_env(), "GOOGLE_API_KEY");
        assert_eq!(
            ProviderKind::Palm.default_endpoint(),
            ProviderKind::Gemini.default_endpoint()
        );
        assert_eq!(ProviderKind::OpenAi.credential_env(), "OPENAI_API_KEY");
    }

    #[test]
    fn test_provider_deserializes_lowercase_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            provider: ProviderKind,
        }
        let parsed: Wrapper = toml::from_str(r#"provider = "openai""#).unwrap();
        assert_eq!(parsed.provider, ProviderKind::OpenAi);
    }
}
