//! Image-based design suggestions: one uploaded photo in, three suggestion
//! sections out.

use crate::error::ValidationError;
use crate::llm::ImagePart;
use serde::{Deserialize, Serialize};

pub(super) const DESIGN_TEMPLATE: &str = "\
You are a helpful AI assistant that provides design, elevation, and color \
suggestions for home projects based on user-uploaded images of existing homes \
or design styles.

Analyze the provided image and offer creative and practical suggestions for \
design, elevation, and color schemes. Focus on extracting key elements and \
features from the image that can be adapted and incorporated into new home \
designs.

Respond with a single JSON object of the form:
{\"designSuggestions\": \"<specific design ideas inspired by the image>\", \
\"elevationSuggestions\": \"<elevation features and styles based on the image>\", \
\"colorSuggestions\": \"<color palettes and combinations that complement the design>\"}";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignQuery {
    pub photo_data_uri: String,
}

impl DesignQuery {
    pub fn validate(&self) -> Result<ImagePart, ValidationError> {
        ImagePart::from_data_uri(&self.photo_data_uri)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignSuggestions {
    pub design_suggestions: String,
    pub elevation_suggestions: String,
    pub color_suggestions: String,
}

#[cfg(test)]
mod tests {
    use super::{DesignQuery, DesignSuggestions};

    #[test]
    fn output_deserializes_camel_case() {
        let output: DesignSuggestions = serde_json::from_str(
            r#"{"designSuggestions": "d", "elevationSuggestions": "e", "colorSuggestions": "c"}"#,
        )
        .unwrap();
        assert_eq!(output.elevation_suggestions, "e");
    }

    #[test]
    fn query_requires_data_uri() {
        let bad = DesignQuery {
            photo_data_uri: "nope".into(),
        };
        assert!(bad.validate().is_err());
    }
}
