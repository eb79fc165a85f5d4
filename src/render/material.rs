//! Materials resolved from techniques

use crate::style::MapEnv;
use crate::tile::TechniqueRef;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MaterialKind {
    MeshBasic,
    MeshStandard,
    SolidLine,
    DashedLine,
    Points,
    Edges,
    Terrain,
}

/// Distance fade shared by all faded materials
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FadingParameters {
    pub fade_near: f64,
    pub fade_far: f64,
}

/// Fading of extruded volumes and their edges
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolygonFadingParameters {
    pub color: [f32; 4],
    pub color_mix: f64,
    pub line_fade_near: f64,
    pub line_fade_far: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub kind: MaterialKind,
    pub color: [f32; 4],
    pub opacity: f32,
    pub transparent: bool,
    pub depth_write: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fading: Option<FadingParameters>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polygon_fading: Option<PolygonFadingParameters>,
    pub visible: bool,
}

impl Material {
    pub fn new(kind: MaterialKind, color: [f32; 4]) -> Self {
        Self {
            kind,
            color,
            opacity: 1.0,
            transparent: false,
            depth_write: true,
            line_width: None,
            size: None,
            fading: None,
            polygon_fading: None,
            visible: true,
        }
    }

    /// Material of `kind` with the technique's color, opacity, transparency
    /// and fading evaluated in `env`
    pub fn from_technique(kind: MaterialKind, technique: &TechniqueRef<'_>, env: &MapEnv) -> Self {
        let color = technique.color("color", env).unwrap_or([1.0, 1.0, 1.0, 1.0]);
        let mut material = Self::new(kind, color);

        let opacity = technique.number("opacity", env).unwrap_or(1.0).clamp(0.0, 1.0) as f32;
        material.opacity = opacity * color[3];
        material.transparent =
            technique.boolean("transparent", env).unwrap_or(false) || material.opacity < 1.0;
        material.depth_write =
            technique.boolean("depthTest", env).unwrap_or(true) && !material.transparent;
        material.fading = fading_of(technique, env);
        material
    }
}

/// Fade distances, present only when the technique defines both ends
pub fn fading_of(technique: &TechniqueRef<'_>, env: &MapEnv) -> Option<FadingParameters> {
    let fade_near = technique.fade_near(env)?;
    let fade_far = technique.fade_far(env)?;
    (fade_far > 0.0).then_some(FadingParameters { fade_near, fade_far })
}
