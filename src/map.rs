//! View state the pipeline reads while building a tile

use crate::config::GeometryCreatorConfig;
use crate::style::{MapEnv, ThemePriorities};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct MapContext {
    pub zoom_level: f64,
    pub min_zoom_level: f64,
    pub max_zoom_level: f64,
    /// Global style environment, parent of every per-tile environment
    pub env: Arc<MapEnv>,
    pub clear_color: [f32; 4],
    /// `None` means enabled
    pub enable_mixed_lod: Option<bool>,
    pub theme: Option<ThemePriorities>,
}

impl MapContext {
    pub fn new(zoom_level: f64) -> Self {
        Self {
            zoom_level,
            min_zoom_level: 1.0,
            max_zoom_level: 20.0,
            env: Arc::new(MapEnv::new()),
            clear_color: [1.0, 1.0, 1.0, 1.0],
            enable_mixed_lod: None,
            theme: None,
        }
    }

    pub fn from_config(zoom_level: f64, config: &GeometryCreatorConfig) -> Self {
        Self {
            clear_color: config.clear_color_rgba(),
            enable_mixed_lod: config.enable_mixed_lod,
            theme: config.theme.clone(),
            ..Self::new(zoom_level)
        }
    }

    pub fn mixed_lod_enabled(&self) -> bool {
        self.enable_mixed_lod.unwrap_or(true)
    }

    pub fn discrete_zoom_level(&self) -> f64 {
        self.zoom_level.floor()
    }

    /// `$zoom` pinned to the integer zoom level, chained to the map env
    pub fn discrete_zoom_env(&self) -> MapEnv {
        MapEnv::with_zoom(self.discrete_zoom_level(), Some(self.env.clone()))
    }
}
