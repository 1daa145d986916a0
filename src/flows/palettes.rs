//! Color palette generation with HEX/RGB codes for a design scheme.

use crate::error::{GenerationError, ValidationError};
use serde::{Deserialize, Serialize};

pub const MIN_COLORS: u8 = 3;
pub const MAX_COLORS: u8 = 8;
pub const DEFAULT_COLORS: u8 = 5;

pub(super) const PALETTE_TEMPLATE: &str = "\
You are a professional color palette generator for home designs.

Based on the design scheme provided by the user, generate 3 distinct color \
palettes. Each palette should have a name, a description, and an array of \
colors with the specified number of colors. Each color should have a name, \
HEX code, RGB code, and a suggested use (e.g., Walls, Ceiling, Accent). Make \
sure to generate real and valid HEX and RGB codes. The RGB code should be in \
the format \"rgb(red, green, blue)\" where red, green, and blue are integers \
between 0 and 255. Make sure each palette is visually appealing and suitable \
for the specified design scheme.

Design Scheme: {{ designScheme }}
Number of Colors in each palette: {{ numberOfColors }}

Respond with a single JSON object of the form:
{\"palettes\": [{\"paletteName\": string, \"description\": string, \"colors\": \
[{\"name\": string, \"hex\": string, \"rgb\": string, \"suggestedUse\": string}]}]}";

fn default_colors() -> u8 {
    DEFAULT_COLORS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaletteRequest {
    /// e.g. "modern", "minimalist", "Scandinavian".
    pub design_scheme: String,
    #[serde(default = "default_colors")]
    pub number_of_colors: u8,
}

impl PaletteRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.design_scheme.trim().is_empty() {
            return Err(ValidationError::Empty {
                field: "design_scheme",
            });
        }
        if !(MIN_COLORS..=MAX_COLORS).contains(&self.number_of_colors) {
            return Err(ValidationError::OutOfRange {
                field: "number_of_colors",
                min: i64::from(MIN_COLORS),
                max: i64::from(MAX_COLORS),
                value: i64::from(self.number_of_colors),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Color {
    pub name: String,
    pub hex: String,
    pub rgb: String,
    pub suggested_use: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Palette {
    pub palette_name: String,
    pub description: String,
    pub colors: Vec<Color>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaletteSet {
    pub palettes: Vec<Palette>,
}

/// Accepts "#RRGGBB" or "RRGGBB" with exactly six hex digits.
fn is_valid_hex(hex: &str) -> bool {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    digits.len() == 6 && digits.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Accepts "rgb(r, g, b)" with each component an integer in [0, 255].
fn is_valid_rgb(rgb: &str) -> bool {
    let Some(inner) = rgb
        .strip_prefix("rgb(")
        .and_then(|rest| rest.strip_suffix(')'))
    else {
        return false;
    };
    let components: Vec<_> = inner.split(',').map(str::trim).collect();
    components.len() == 3 && components.iter().all(|c| c.parse::<u8>().is_ok())
}

impl PaletteSet {
    /// Reject schema-shaped output that breaks the palette contract: at least
    /// one palette, exactly the requested color count per palette, and valid
    /// HEX/RGB codes throughout.
    pub fn validate(&self, number_of_colors: u8) -> Result<(), GenerationError> {
        if self.palettes.is_empty() {
            return Err(GenerationError::InvalidOutput(
                "no palettes generated".into(),
            ));
        }
        for palette in &self.palettes {
            if palette.colors.len() != usize::from(number_of_colors) {
                return Err(GenerationError::InvalidOutput(format!(
                    "palette {:?} has {} colors, expected {number_of_colors}",
                    palette.palette_name,
                    palette.colors.len()
                )));
            }
            for color in &palette.colors {
                if !is_valid_hex(&color.hex) {
                    return Err(GenerationError::InvalidOutput(format!(
                        "color {:?} has invalid hex {:?}",
                        color.name, color.hex
                    )));
                }
                if !is_valid_rgb(&color.rgb) {
                    return Err(GenerationError::InvalidOutput(format!(
                        "color {:?} has invalid rgb {:?}",
                        color.name, color.rgb
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{PaletteRequest, PaletteSet, is_valid_hex, is_valid_rgb};

    fn palette_json(colors: &[(&str, &str)]) -> String {
        let colors: Vec<String> = colors
            .iter()
            .map(|(hex, rgb)| {
                format!(
                    r#"{{"name": "c", "hex": "{hex}", "rgb": "{rgb}", "suggestedUse": "Walls"}}"#
                )
            })
            .collect();
        format!(
            r#"{{"palettes": [{{"paletteName": "Calm", "description": "d", "colors": [{}]}}]}}"#,
            colors.join(",")
        )
    }

    #[test]
    fn hex_validation() {
        assert!(is_valid_hex("#A1B2C3"));
        assert!(is_valid_hex("a1b2c3"));
        assert!(!is_valid_hex("#A1B2C"));
        assert!(!is_valid_hex("#A1B2CG"));
        assert!(!is_valid_hex(""));
    }

    #[test]
    fn rgb_validation() {
        assert!(is_valid_rgb("rgb(0, 128, 255)"));
        assert!(is_valid_rgb("rgb(1,2,3)"));
        assert!(!is_valid_rgb("rgb(256, 0, 0)"));
        assert!(!is_valid_rgb("rgb(-1, 0, 0)"));
        assert!(!is_valid_rgb("rgba(0, 0, 0, 1)"));
        assert!(!is_valid_rgb("rgb(0, 0)"));
    }

    #[test]
    fn request_bounds_are_enforced() {
        let mut request = PaletteRequest {
            design_scheme: "modern".into(),
            number_of_colors: 5,
        };
        assert!(request.validate().is_ok());
        request.number_of_colors = 2;
        assert!(request.validate().is_err());
        request.number_of_colors = 9;
        assert!(request.validate().is_err());
    }

    #[test]
    fn number_of_colors_defaults_to_five() {
        let request: PaletteRequest =
            serde_json::from_str(r#"{"designScheme": "modern"}"#).unwrap();
        assert_eq!(request.number_of_colors, 5);
    }

    #[test]
    fn palette_with_exact_count_and_valid_codes_passes() {
        let json = palette_json(&[("#101010", "rgb(16, 16, 16)"), ("#FAFAFA", "rgb(250, 250, 250)")]);
        let set: PaletteSet = serde_json::from_str(&json).unwrap();
        assert!(set.validate(2).is_ok());
    }

    #[test]
    fn wrong_color_count_is_rejected() {
        let json = palette_json(&[("#101010", "rgb(16, 16, 16)")]);
        let set: PaletteSet = serde_json::from_str(&json).unwrap();
        assert!(set.validate(5).is_err());
    }

    #[test]
    fn invalid_codes_are_rejected() {
        let bad_hex = palette_json(&[("#XYZXYZ", "rgb(0, 0, 0)")]);
        let set: PaletteSet = serde_json::from_str(&bad_hex).unwrap();
        assert!(set.validate(1).is_err());

        let bad_rgb = palette_json(&[("#000000", "rgb(999, 0, 0)")]);
        let set: PaletteSet = serde_json::from_str(&bad_rgb).unwrap();
        assert!(set.validate(1).is_err());
    }

    #[test]
    fn empty_palette_set_is_rejected() {
        let set: PaletteSet = serde_json::from_str(r#"{"palettes": []}"#).unwrap();
        assert!(set.validate(5).is_err());
    }
}
