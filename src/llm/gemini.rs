//! Gemini `generateContent` endpoint (v1beta).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::llm::http::HttpEndpoint;
use crate::llm::provider::TextGenerator;

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

pub struct GeminiGenerator {
    endpoint: HttpEndpoint,
}

impl GeminiGenerator {
    pub(crate) fn new(endpoint: HttpEndpoint) -> Self {
        Self { endpoint }
    }

    fn path(&self) -> String {
        let model = self.endpoint.model.trim_start_matches("models/");
        format!("v1beta/models/{model}:generateContent")
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let key = self.endpoint.api_key()?;

        let request = self
            .endpoint
            .client
            .post(self.endpoint.url(&self.path()))
            .header("x-goog-api-key", key.expose())
            .json(&GenerateContentRequest {
                contents: vec![Content {
                    parts: vec![Part { text: prompt }],
                }],
            });

        let response: GenerateContentResponse = self.endpoint.send_json(request).await?;
        extract_text(response)
    }
}

/// Concatenate the text parts of the first candidate.
fn extract_text(response: GenerateContentResponse) -> Result<String, GenerationError> {
    let blocked = response
        .prompt_feedback
        .and_then(|f| f.block_reason);

    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = blocked.map_or(String::new(), |r| format!(" (prompt blocked: {r})"));
        return Err(GenerationError::InvalidResponse(format!(
            "response contained no candidates{reason}"
        )));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        let reason = candidate
            .finish_reason
            .map_or(String::new(), |r| format!(" (finish reason: {r})"));
        return Err(GenerationError::InvalidResponse(format!(
            "candidate contained no text{reason}"
        )));
    }

    Ok(text)
}
