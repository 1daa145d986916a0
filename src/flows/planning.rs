//! Elevation ideas and smart planning suggestions from free-form preferences.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

pub(super) const PLANNING_TEMPLATE: &str = "\
You are an AI assistant specializing in generating elevation ideas and smart \
planning suggestions for home construction based on user preferences.

User Preferences: {{ preferences }}

Generate elevation ideas and smart planning suggestions based on the provided \
user preferences.

Respond with a single JSON object of the form:
{\"elevationIdeas\": \"<generated elevation ideas>\", \
\"planningSuggestions\": \"<smart planning suggestions>\"}";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningRequest {
    pub preferences: String,
}

impl PlanningRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.preferences.trim().is_empty() {
            return Err(ValidationError::Empty {
                field: "preferences",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningIdeas {
    pub elevation_ideas: String,
    pub planning_suggestions: String,
}

#[cfg(test)]
mod tests {
    use super::{PlanningIdeas, PlanningRequest};

    #[test]
    fn empty_preferences_are_rejected() {
        assert!(
            PlanningRequest {
                preferences: " ".into()
            }
            .validate()
            .is_err()
        );
    }

    #[test]
    fn output_deserializes_camel_case() {
        let ideas: PlanningIdeas = serde_json::from_str(
            r#"{"elevationIdeas": "sloped roof", "planningSuggestions": "vastu-aligned entry"}"#,
        )
        .unwrap();
        assert_eq!(ideas.elevation_ideas, "sloped roof");
    }
}
