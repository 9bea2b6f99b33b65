//! Shared HTTP plumbing for JSON generation endpoints.

use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::config::{ApiKey, GeneratorConfig};
use crate::error::GenerationError;

/// Connection details shared by every provider.
pub(crate) struct HttpEndpoint {
    pub(crate) client: Client,
    base_url: String,
    pub(crate) model: String,
    api_key: Option<ApiKey>,
    timeout_secs: u64,
    credential_hint: &'static str,
}

impl HttpEndpoint {
    pub(crate) fn new(client: Client, config: &GeneratorConfig) -> Self {
        Self {
            client,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            timeout_secs: config.timeout.as_secs(),
            credential_hint: config.provider.credential_env(),
        }
    }

    /// Join `path` onto the base URL.
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// The credential, or `CredentialMissing` before any request is built.
    pub(crate) fn api_key(&self) -> Result<&ApiKey, GenerationError> {
        self.api_key
            .as_ref()
            .ok_or(GenerationError::CredentialMissing {
                hint: self.credential_hint,
            })
    }

    /// Send a prepared request and decode a successful JSON body into `T`.
    ///
    /// - transport failures map to `Transport` (or `Timeout`)
    /// - non-2xx maps to `HttpStatus`, with the API error message if present
    /// - a 2xx body carrying an `error` object maps to `Api`
    /// - anything that does not decode maps to `InvalidResponse`
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, GenerationError> {
        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        debug!(status = status.as_u16(), body_len = body.len(), "Generation endpoint responded");

        if !status.is_success() {
            return Err(GenerationError::HttpStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown Status").to_string(),
                detail: parse_api_error(&body).map(|e| e.message),
            });
        }

        let value: Value = serde_json::from_str(&body).map_err(|e| {
            GenerationError::InvalidResponse(format!("response is not valid JSON: {e}"))
        })?;

        if let Some(err) = api_error_from_value(&value) {
            return Err(GenerationError::Api {
                code: err.code,
                message: err.message,
            });
        }

        serde_json::from_value(value).map_err(|e| {
            GenerationError::InvalidResponse(format!("unexpected response shape: {e}"))
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> GenerationError {
        if err.is_timeout() {
            GenerationError::Timeout(self.timeout_secs)
        } else {
            GenerationError::Transport(err)
        }
    }
}

/// Error object returned by the endpoint, normalized across schemas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ApiErrorBody {
    pub(crate) code: Option<String>,
    pub(crate) message: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: Option<Value>,
}

/// Parse `{"error": {"message": ..., "code": ...}}` out of a body.
///
/// Google returns numeric codes, OpenAI string codes; both are kept as text.
pub(crate) fn parse_api_error(body: &str) -> Option<ApiErrorBody> {
    serde_json::from_str::<Value>(body)
        .ok()
        .as_ref()
        .and_then(api_error_from_value)
}

fn api_error_from_value(value: &Value) -> Option<ApiErrorBody> {
    if !value.get("error").is_some_and(Value::is_object) {
        return None;
    }
    let envelope: ErrorEnvelope = serde_json::from_value(value.clone()).ok()?;
    let code = match envelope.error.code {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };
    Some(ApiErrorBody {
        code,
        message: envelope.error.message,
    })
}
