//! PaLM `generateText` endpoint (v1beta2).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::llm::http::HttpEndpoint;
use crate::llm::provider::TextGenerator;

#[derive(Serialize)]
struct GenerateTextRequest<'a> {
    prompt: TextPrompt<'a>,
}

#[derive(Serialize)]
struct TextPrompt<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateTextResponse {
    #[serde(default)]
    candidates: Vec<TextCandidate>,
}

#[derive(Debug, Deserialize)]
struct TextCandidate {
    output: Option<String>,
}

pub struct PalmGenerator {
    endpoint: HttpEndpoint,
}

impl PalmGenerator {
    pub(crate) fn new(endpoint: HttpEndpoint) -> Self {
        Self { endpoint }
    }

    fn path(&self) -> String {
        let model = self.endpoint.model.trim_start_matches("models/");
        format!("v1beta2/models/{model}:generateText")
    }
}

#[async_trait]
impl TextGenerator for PalmGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let key = self.endpoint.api_key()?;

        let request = self
            .endpoint
            .client
            .post(self.endpoint.url(&self.path()))
            .header("x-goog-api-key", key.expose())
            .json(&GenerateTextRequest {
                prompt: TextPrompt { text: prompt },
            });

        let response: GenerateTextResponse = self.endpoint.send_json(request).await?;
        extract_output(response)
    }
}

fn extract_output(response: GenerateTextResponse) -> Result<String, GenerationError> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.output)
        .ok_or_else(|| {
            GenerationError::InvalidResponse("response contained no candidate output".to_string())
        })
}
