use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Canvas bounds. Box size and row pitch are fixed constants in
/// [`crate::layout`], deliberately not configurable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub min_canvas_width: f32,
    pub max_canvas_width: f32,
    pub min_canvas_height: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_canvas_width: 600.0,
            max_canvas_width: 1000.0,
            min_canvas_height: 200.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutOverrides>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    text_color: Option<String>,
    line_color: Option<String>,
    legend_background: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutOverrides {
    min_canvas_width: Option<f32>,
    max_canvas_width: Option<f32>,
    min_canvas_height: Option<f32>,
}

/// Loads the optional `-c` config file. JSON5 is accepted so hand-written
/// configs may carry comments and trailing commas.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = json5::from_str(&contents)?;

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.legend_background {
            config.theme.legend_background = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.min_canvas_width {
            config.layout.min_canvas_width = v;
        }
        if let Some(v) = layout.max_canvas_width {
            config.layout.max_canvas_width = v;
        }
        if let Some(v) = layout.min_canvas_height {
            config.layout.min_canvas_height = v;
        }
    }

    Ok(config)
}
