use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{Error, Result};

/// How the label box behind each node's text is filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorMode {
    #[default]
    Uniform,
    ByLabels,
}

/// Styling for one render. Lengths are in input coordinate units; the
/// canvas maps one unit to `scale` output pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub margin: f64,
    pub scale: f64,
    pub font_family: String,

    pub node_radius: f64,
    pub node_fill_color: Color,
    pub node_edge_color: Color,
    pub node_label_color: Color,
    pub node_text_color: Color,
    pub node_font_size: f64,

    pub property_label_color: Color,
    pub property_text_color: Color,
    pub property_font_size: f64,
    pub property_offset: f64,

    pub relationship_line_color: Color,
    pub relationship_text_color: Color,
    pub relationship_label_background: Color,
    pub relationship_font_size: f64,
    pub relationship_line_width: f64,
    pub arrow_shrink: f64,
    pub arrow_head_size: f64,

    pub color_mode: ColorMode,
    pub palette: Vec<Color>,
}

const TAB10: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            margin: 50.0,
            scale: 1.0,
            font_family: "sans-serif".to_string(),

            node_radius: 30.0,
            node_fill_color: Color::builtin("white"),
            node_edge_color: Color::builtin("black"),
            node_label_color: Color::builtin("blue"),
            node_text_color: Color::builtin("white"),
            node_font_size: 11.0,

            property_label_color: Color::builtin("grey"),
            property_text_color: Color::builtin("white"),
            property_font_size: 10.0,
            property_offset: 50.0,

            relationship_line_color: Color::builtin("black"),
            relationship_text_color: Color::builtin("black"),
            relationship_label_background: Color::builtin("white"),
            relationship_font_size: 11.0,
            relationship_line_width: 1.0,
            arrow_shrink: 30.0,
            arrow_head_size: 10.0,

            color_mode: ColorMode::Uniform,
            palette: TAB10.into_iter().map(Color::builtin).collect(),
        }
    }
}

impl RenderConfig {
    pub fn from_toml(content: &str, path: &Path) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects sizes that would produce a negative, empty or non-finite image.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("scale", self.scale),
            ("node_radius", self.node_radius),
            ("node_font_size", self.node_font_size),
            ("property_font_size", self.property_font_size),
            ("relationship_font_size", self.relationship_font_size),
            ("relationship_line_width", self.relationship_line_width),
            ("arrow_head_size", self.arrow_head_size),
        ];
        let non_negative = [
            ("margin", self.margin),
            ("arrow_shrink", self.arrow_shrink),
            ("property_offset", self.property_offset),
        ];

        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidStyle {
                    field,
                    value,
                    requirement: "a finite number greater than zero",
                });
            }
        }
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::InvalidStyle {
                    field,
                    value,
                    requirement: "a finite number, zero or greater",
                });
            }
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content, path)
    }
}
