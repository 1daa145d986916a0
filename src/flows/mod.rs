//! Generative flows: one named operation per capability, each a typed input
//! (validated before any network call), a prompt template, and a typed output
//! schema (validated after JSON decoding).
//!
//! Prompts are configuration data, not logic: every flow module holds its
//! template string and serde schema side by side, and the shared invoker
//! below does the actual provider round trip. No retries, no caching — each
//! call regenerates content.

pub mod chat;
pub mod design;
pub mod materials;
pub mod palettes;
pub mod planning;

use crate::error::{GenerationError, NexaError, Result};
use crate::llm::{GenerateRequest, ImagePart, Provider};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tera::Tera;

pub use chat::{ChatAnswer, ChatQuery, ImageChatQuery};
pub use design::{DesignQuery, DesignSuggestions};
pub use materials::{Faq, Material, MaterialQuery, MaterialRecommendations};
pub use palettes::{Color, Palette, PaletteRequest, PaletteSet};
pub use planning::{PlanningIdeas, PlanningRequest};

/// Invokes generative flows against a single provider + model + temperature.
///
/// This is the only component that talks to the `Provider`; everything above
/// it (orchestration action, gateway, CLI) works with typed flow inputs and
/// outputs.
pub struct FlowInvoker {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f64,
}

impl FlowInvoker {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, temperature: f64) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
        }
    }

    pub async fn chat_text(&self, input: &ChatQuery) -> Result<ChatAnswer> {
        input.validate()?;
        let prompt = render_prompt(chat::CHAT_TEXT_TEMPLATE, input)?;
        self.invoke_json(prompt, None).await
    }

    pub async fn chat_with_image(&self, input: &ImageChatQuery) -> Result<ChatAnswer> {
        let image = input.validate()?;
        let prompt = render_prompt(chat::CHAT_IMAGE_TEMPLATE, input)?;
        self.invoke_json(prompt, Some(image)).await
    }

    pub async fn design_suggestions(&self, input: &DesignQuery) -> Result<DesignSuggestions> {
        let image = input.validate()?;
        let prompt = render_prompt(design::DESIGN_TEMPLATE, input)?;
        self.invoke_json(prompt, Some(image)).await
    }

    pub async fn recommend_materials(
        &self,
        input: &MaterialQuery,
    ) -> Result<MaterialRecommendations> {
        input.validate()?;
        let prompt = render_prompt(materials::MATERIALS_TEMPLATE, input)?;
        let output: MaterialRecommendations = self.invoke_json(prompt, None).await?;
        output.validate()?;
        Ok(output)
    }

    pub async fn generate_palette(&self, input: &PaletteRequest) -> Result<PaletteSet> {
        input.validate()?;
        let prompt = render_prompt(palettes::PALETTE_TEMPLATE, input)?;
        let output: PaletteSet = self.invoke_json(prompt, None).await?;
        output.validate(input.number_of_colors)?;
        Ok(output)
    }

    pub async fn planning_ideas(&self, input: &PlanningRequest) -> Result<PlanningIdeas> {
        input.validate()?;
        let prompt = render_prompt(planning::PLANNING_TEMPLATE, input)?;
        self.invoke_json(prompt, None).await
    }

    /// One provider round trip with JSON output requested, decoded into the
    /// flow's output schema.
    async fn invoke_json<T: DeserializeOwned>(
        &self,
        prompt: String,
        image: Option<ImagePart>,
    ) -> Result<T> {
        let mut request =
            GenerateRequest::text(prompt, self.model.clone(), self.temperature).expecting_json();
        if let Some(image) = image {
            request = request.with_image(image);
        }

        let text = self.provider.generate(&request).await.map_err(|e| {
            NexaError::Generation(GenerationError::Upstream {
                provider: self.provider.name().to_string(),
                message: e.to_string(),
            })
        })?;

        let payload = extract_json(&text);
        serde_json::from_str(payload)
            .map_err(|e| NexaError::Generation(GenerationError::InvalidOutput(e.to_string())))
    }
}

/// Render a flow prompt template against its serializable input.
fn render_prompt(template: &str, input: &impl Serialize) -> Result<String> {
    let context = tera::Context::from_serialize(input)
        .map_err(|e| NexaError::Other(anyhow::anyhow!("prompt context: {e}")))?;
    Tera::one_off(template, &context, false)
        .map_err(|e| NexaError::Other(anyhow::anyhow!("prompt render: {e}")))
}

/// Strip markdown code fences some models wrap around JSON output.
fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}
