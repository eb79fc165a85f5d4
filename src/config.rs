//! Configuration of the geometry creator
//!
//! Loaded from JSON; every field has a default so an empty object is a
//! valid configuration.

use crate::style::{parse_color_str, ThemePriorities};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeometryCreatorConfig {
    /// Priority tables of the active theme
    pub theme: Option<ThemePriorities>,
    /// `None` means enabled
    pub enable_mixed_lod: Option<bool>,
    /// Color of the ground plane, any CSS-like color string
    pub clear_color: String,
    /// Longest edge, in degrees of arc, of ground plane triangles on the globe
    pub spherical_subdivision_angle_deg: f64,
    /// Levels of the ground plane LOD mesh
    pub mixed_lod_levels: u32,
    pub default_text_distance_scale: f64,
}

impl Default for GeometryCreatorConfig {
    fn default() -> Self {
        Self {
            theme: None,
            enable_mixed_lod: None,
            clear_color: "#ffffff".to_string(),
            spherical_subdivision_angle_deg: 10.0,
            mixed_lod_levels: 4,
            default_text_distance_scale: crate::text::DEFAULT_TEXT_DISTANCE_SCALE,
        }
    }
}

impl GeometryCreatorConfig {
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let config = serde_json::from_str(json).context("Failed to parse geometry creator config")?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json_str(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Clear color as RGBA; unparsable strings fall back to white
    pub fn clear_color_rgba(&self) -> [f32; 4] {
        parse_color_str(&self.clear_color).unwrap_or_else(|| {
            tracing::warn!(color = %self.clear_color, "invalid clear color, using white");
            [1.0, 1.0, 1.0, 1.0]
        })
    }
}
