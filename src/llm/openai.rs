//! OpenAI-compatible chat completions endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::llm::http::HttpEndpoint;
use crate::llm::provider::TextGenerator;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

pub struct OpenAiGenerator {
    endpoint: HttpEndpoint,
}

impl OpenAiGenerator {
    pub(crate) fn new(endpoint: HttpEndpoint) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let key = self.endpoint.api_key()?;

        let request = self
            .endpoint
            .client
            .post(self.endpoint.url("v1/chat/completions"))
            .bearer_auth(key.expose())
            .json(&ChatRequest {
                model: &self.endpoint.model,
                messages: vec![ChatMessage {
                    role: "user",
                    content: prompt,
                }],
            });

        let response: ChatResponse = self.endpoint.send_json(request).await?;
        extract_content(response)
    }
}

fn extract_content(response: ChatResponse) -> Result<String, GenerationError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| {
            GenerationError::InvalidResponse("response contained no message content".to_string())
        })
}
