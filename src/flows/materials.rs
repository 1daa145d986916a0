//! Construction material recommendations for a named category.

use crate::error::{GenerationError, ValidationError};
use serde::{Deserialize, Serialize};

pub(super) const MATERIALS_TEMPLATE: &str = "\
You are an expert in construction materials. Based on the category provided, \
recommend 2-3 relevant construction materials. For each material, provide all \
the details as specified below.

Category: {{ category }}

Generate detailed recommendations including name, rating (1 to 5, floats \
allowed), tags, description, price range in INR (Indian Rupees), durability, \
a list of 2-3 popular brands, whether it's budget-friendly, pros, cons, \
warranty, usage tips, and 2-3 frequently asked questions with answers.

Respond with a single JSON object of the form:
{\"recommendations\": [{\"name\": string, \"rating\": number, \"tags\": \
[string], \"description\": string, \"priceRange\": string, \"durability\": \
string, \"brands\": [string], \"budgetFriendly\": boolean, \"pros\": string, \
\"cons\": string, \"warranty\": string, \"usageTips\": string, \"faqs\": \
[{\"question\": string, \"answer\": string}]}]}";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialQuery {
    /// e.g. "Foundation & Structure", "Walls & Roofing", "Waterproofing",
    /// "Electrical & Plumbing", "Paint & Finishing".
    pub category: String,
}

impl MaterialQuery {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.category.trim().is_empty() {
            return Err(ValidationError::Empty { field: "category" });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub name: String,
    pub rating: f64,
    pub tags: Vec<String>,
    pub description: String,
    pub price_range: String,
    pub durability: String,
    pub brands: Vec<String>,
    pub budget_friendly: bool,
    pub pros: String,
    pub cons: String,
    pub warranty: String,
    pub usage_tips: String,
    pub faqs: Vec<Faq>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialRecommendations {
    pub recommendations: Vec<Material>,
}

impl MaterialRecommendations {
    /// Reject schema-shaped output with out-of-contract values.
    pub fn validate(&self) -> Result<(), GenerationError> {
        for material in &self.recommendations {
            if !(1.0..=5.0).contains(&material.rating) {
                return Err(GenerationError::InvalidOutput(format!(
                    "material {:?} has rating {} outside 1.0-5.0",
                    material.name, material.rating
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{MaterialQuery, MaterialRecommendations};

    fn recommendations_json(rating: f64) -> String {
        format!(
            r#"{{"recommendations": [{{"name": "M25 Grade Concrete", "rating": {rating},
                "tags": ["Foundation", "Columns"], "description": "High-strength mix.",
                "priceRange": "₹4,500-5,200/cubic meter", "durability": "25+ years",
                "brands": ["UltraTech", "ACC"], "budgetFriendly": false,
                "pros": "Strong", "cons": "Needs curing", "warranty": "N/A",
                "usageTips": "Cure for 28 days.",
                "faqs": [{{"question": "Is it waterproof?", "answer": "Add admixture."}}]}}]}}"#
        )
    }

    #[test]
    fn valid_recommendations_pass() {
        let output: MaterialRecommendations =
            serde_json::from_str(&recommendations_json(4.5)).unwrap();
        assert!(output.validate().is_ok());
        assert_eq!(output.recommendations[0].brands.len(), 2);
    }

    #[test]
    fn out_of_range_rating_is_rejected() {
        let output: MaterialRecommendations =
            serde_json::from_str(&recommendations_json(6.0)).unwrap();
        assert!(output.validate().is_err());
    }

    #[test]
    fn empty_category_is_rejected() {
        assert!(
            MaterialQuery {
                category: String::new()
            }
            .validate()
            .is_err()
        );
    }
}
