//! Google Gemini provider.
//!
//! Auth resolution order: explicit key from config, then `GEMINI_API_KEY`,
//! then `GOOGLE_API_KEY`. Multimodal turns send the image as an
//! `inline_data` part; flows that expect structured output set
//! `response_mime_type: application/json` in the generation config.

use super::http_client::build_provider_client;
use super::traits::Provider;
use super::types::GenerateRequest;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const MAX_OUTPUT_TOKENS: u32 = 8192;

pub struct GeminiProvider {
    api_key: Option<String>,
    base_url: String,
    client: Client,
}

// ─── Wire types ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
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

impl Part {
    fn text(text: String) -> Self {
        Self {
            text: Some(text),
            inline_data: None,
        }
    }

    fn inline_data(mime_type: String, data: String) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData { mime_type, data }),
        }
    }
}

// ─── Provider ───────────────────────────────────────────────────────────────

impl GeminiProvider {
    /// Create a new Gemini provider, resolving the API key from config or
    /// the environment.
    pub fn new(api_key: Option<&str>) -> Self {
        let resolved_key = api_key
            .map(String::from)
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok());

        Self {
            api_key: resolved_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: build_provider_client(),
        }
    }

    /// Override the API base URL (integration tests point this at a mock).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn api_key(&self) -> anyhow::Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "Gemini API key not found. Options:\n\
                 1. Set GEMINI_API_KEY env var\n\
                 2. Get an API key from https://aistudio.google.com/app/apikey\n\
                 3. Add api_key to ~/.nexa/config.toml"
            )
        })
    }

    fn build_request(request: &GenerateRequest) -> GenerateContentRequest {
        let mut parts = vec![Part::text(request.prompt.clone())];
        if let Some(ref image) = request.image {
            parts.push(Part::inline_data(
                image.media_type.clone(),
                image.data.clone(),
            ));
        }

        let system_instruction = request.system.as_ref().map(|sys| Content {
            role: None,
            parts: vec![Part::text(sys.clone())],
        });

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            system_instruction,
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: MAX_OUTPUT_TOKENS,
                response_mime_type: request.json_output.then_some("application/json"),
            },
        }
    }

    fn model_path(model: &str) -> String {
        if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{model}")
        }
    }

    /// Keep upstream error bodies short and free of echoed credentials.
    fn sanitize_api_error(&self, error_text: &str) -> String {
        let mut text = error_text.to_string();
        if let Some(ref key) = self.api_key {
            text = text.replace(key, "***");
        }
        if text.len() > 300 {
            text.truncate(300);
            text.push('…');
        }
        text
    }

    fn extract_text(result: &GenerateContentResponse) -> anyhow::Result<String> {
        let text = result
            .candidates
            .as_ref()
            .and_then(|c| c.first())
            .map(|candidate| {
                let mut out = String::new();
                for part in &candidate.content.parts {
                    if let Some(t) = &part.text {
                        if !out.is_empty() {
                            out.push('\n');
                        }
                        out.push_str(t);
                    }
                }
                out
            })
            .unwrap_or_default();

        if text.is_empty() {
            anyhow::bail!("No response from Gemini");
        }

        Ok(text)
    }
}

impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn generate<'a>(
        &'a self,
        request: &'a GenerateRequest,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        Box::pin(async move {
            let api_key = self.api_key()?;
            let url = format!(
                "{}/{}:generateContent?key={}",
                self.base_url,
                Self::model_path(&request.model),
                api_key
            );

            let body = Self::build_request(request);
            let response = self.client.post(url).json(&body).send().await?;

            if !response.status().is_success() {
                let status = response.status();
                let error_text = response.text().await.unwrap_or_default();
                let sanitized = self.sanitize_api_error(&error_text);
                anyhow::bail!("Gemini API error ({status}): {sanitized}");
            }

            let result: GenerateContentResponse = response.json().await?;
            Self::extract_text(&result)
        })
    }
}
