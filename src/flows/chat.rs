//! Chat flows: text-only assistance and image+text turns.

use crate::error::ValidationError;
use crate::llm::ImagePart;
use serde::{Deserialize, Serialize};

pub(super) const CHAT_TEXT_TEMPLATE: &str = "\
You are a helpful AI chatbot assistant that answers questions related to home \
construction, materials, design, and budgeting. Use your knowledge to provide \
informative and helpful answers to the user's query.

User Query: {{ query }}

Respond with a single JSON object of the form {\"answer\": \"<your answer>\"}.";

pub(super) const CHAT_IMAGE_TEMPLATE: &str = "\
You are a helpful AI chatbot assistant named Nexa that answers questions \
related to home construction, materials, design, and budgeting. Use your \
knowledge to provide informative and helpful answers to the user's query. If \
an image is provided, analyze it and incorporate it into your answer. Start \
your response by introducing yourself as Nexa.

User Query: {{ query | default(value=\"\") }}

Respond with a single JSON object of the form {\"answer\": \"<your answer>\"}.";

/// Input for the text-only chat flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatQuery {
    pub query: String,
}

impl ChatQuery {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.query.trim().is_empty() {
            return Err(ValidationError::Empty { field: "query" });
        }
        Ok(())
    }
}

/// Input for the image chat flow. The query is optional; the image is not.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageChatQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub photo_data_uri: String,
}

impl ImageChatQuery {
    /// Validate and decode the data URI into an inline image part.
    pub fn validate(&self) -> Result<ImagePart, ValidationError> {
        ImagePart::from_data_uri(&self.photo_data_uri)
    }
}

/// Output shared by both chat flows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatAnswer {
    pub answer: String,
}

#[cfg(test)]
mod tests {
    use super::{ChatQuery, ImageChatQuery};

    #[test]
    fn chat_query_rejects_whitespace_only() {
        assert!(ChatQuery { query: "  ".into() }.validate().is_err());
        assert!(ChatQuery { query: "tiles".into() }.validate().is_ok());
    }

    #[test]
    fn image_query_decodes_data_uri() {
        let input = ImageChatQuery {
            query: None,
            photo_data_uri: "data:image/png;base64,aGVsbG8=".into(),
        };
        let part = input.validate().unwrap();
        assert_eq!(part.media_type, "image/png");
    }

    #[test]
    fn image_query_rejects_plain_url() {
        let input = ImageChatQuery {
            query: Some("hi".into()),
            photo_data_uri: "https://example.com/a.png".into(),
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn image_query_deserializes_camel_case() {
        let input: ImageChatQuery = serde_json::from_str(
            r#"{"query": "hi", "photoDataUri": "data:image/png;base64,aGVsbG8="}"#,
        )
        .unwrap();
        assert_eq!(input.query.as_deref(), Some("hi"));
    }
}
