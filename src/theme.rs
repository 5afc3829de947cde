use serde::{Deserialize, Serialize};

/// Non-category styling: fonts, lines, backgrounds. Category fill colors live
/// in [`crate::palette`] and are fixed policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub sub_font_size: f32,
    pub title_font_size: f32,
    pub legend_font_size: f32,
    pub text_color: String,
    pub entity_text_color: String,
    pub line_color: String,
    pub box_border_color: String,
    pub glyph_color: String,
    pub legend_background: String,
    pub background: String,
}

impl Theme {
    /// The look of the original hierarchy sheets: Arial, grey hairlines,
    /// white canvas.
    pub fn classic() -> Self {
        Self {
            font_family: "Arial, Helvetica, sans-serif".to_string(),
            font_size: 10.0,
            sub_font_size: 9.0,
            title_font_size: 14.0,
            legend_font_size: 9.0,
            text_color: "#000000".to_string(),
            entity_text_color: "#FFFFFF".to_string(),
            line_color: "#666666".to_string(),
            box_border_color: "#666666".to_string(),
            glyph_color: "#666666".to_string(),
            legend_background: "#F0F0F0".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
