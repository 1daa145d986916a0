use crate::error::ValidationError;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

/// Inlined base64 image payload, decoded from a `data:` URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePart {
    pub media_type: String,
    pub data: String,
}

impl ImagePart {
    /// Parse a `data:<mime>;base64,<data>` URI.
    ///
    /// The payload must decode as base64; anything else is rejected before a
    /// byte reaches the provider.
    pub fn from_data_uri(uri: &str) -> Result<Self, ValidationError> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| ValidationError::DataUri("missing data: prefix".into()))?;

        let (media_type, payload) = rest
            .split_once(";base64,")
            .ok_or_else(|| ValidationError::DataUri("missing ;base64, separator".into()))?;

        if media_type.is_empty() || !media_type.contains('/') {
            return Err(ValidationError::DataUri(format!(
                "malformed media type: {media_type:?}"
            )));
        }

        BASE64
            .decode(payload)
            .map_err(|e| ValidationError::DataUri(format!("payload is not base64: {e}")))?;

        Ok(Self {
            media_type: media_type.to_string(),
            data: payload.to_string(),
        })
    }
}

/// One request to a generative model provider.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub system: Option<String>,
    pub prompt: String,
    pub image: Option<ImagePart>,
    /// Ask the provider to constrain output to a single JSON document.
    pub json_output: bool,
    pub model: String,
    pub temperature: f64,
}

impl GenerateRequest {
    pub fn text(prompt: impl Into<String>, model: impl Into<String>, temperature: f64) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            image: None,
            json_output: false,
            model: model.into(),
            temperature,
        }
    }

    pub fn with_image(mut self, image: ImagePart) -> Self {
        self.image = Some(image);
        self
    }

    pub fn expecting_json(mut self) -> Self {
        self.json_output = true;
        self
    }
}
