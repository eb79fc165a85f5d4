//! Techniques with their dynamic properties compiled

use super::colors::parse_color;
use super::expressions::{Expr, MapEnv};
use crate::decoded::Technique;
use indexmap::IndexMap;
use serde_json::Value;

/// Compiled form of one technique, built once per tile build
#[derive(Debug, Clone, Default)]
pub struct CompiledTechnique {
    pub priority: Option<Expr>,
    pub render_order: Option<Expr>,
    pub secondary_render_order: Option<Expr>,
    pub fade_near: Option<Expr>,
    pub fade_far: Option<Expr>,
    pub attributes: IndexMap<String, Expr>,
}

/// Values resolved before compilation; they take the place of the technique's own
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolvedOrdering<'a> {
    pub priority: Option<&'a Value>,
    pub render_order: Option<&'a Value>,
    pub secondary_render_order: Option<&'a Value>,
}

impl CompiledTechnique {
    /// Compile every dynamic property. Malformed expressions are reported and
    /// treated as absent so one bad property does not drop the technique.
    pub fn compile(technique: &Technique, ordering: ResolvedOrdering<'_>) -> Self {
        let compile = |name: &str, value: Option<&Value>| {
            value.and_then(|value| match Expr::compile(value) {
                Ok(expr) => Some(expr),
                Err(err) => {
                    tracing::warn!(
                        technique = ?technique.name,
                        property = name,
                        error = %err,
                        "ignoring malformed style expression"
                    );
                    None
                }
            })
        };

        let attributes = technique
            .attributes
            .iter()
            .filter_map(|(name, value)| {
                compile(name.as_str(), Some(value)).map(|expr| (name.clone(), expr))
            })
            .collect();

        Self {
            priority: compile("priority", ordering.priority),
            render_order: compile("renderOrder", ordering.render_order),
            secondary_render_order: compile(
                "secondaryRenderOrder",
                ordering.secondary_render_order,
            ),
            fade_near: compile("fadeNear", technique.fade_near.as_ref()),
            fade_far: compile("fadeFar", technique.fade_far.as_ref()),
            attributes,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&Expr> {
        self.attributes.get(name)
    }

    pub fn number(&self, name: &str, env: &MapEnv) -> Option<f64> {
        self.attribute(name)?.evaluate_number(env)
    }

    pub fn boolean(&self, name: &str, env: &MapEnv) -> Option<bool> {
        self.attribute(name)?.evaluate_bool(env)
    }

    pub fn string(&self, name: &str, env: &MapEnv) -> Option<String> {
        self.attribute(name)?.evaluate_string(env)
    }

    pub fn color(&self, name: &str, env: &MapEnv) -> Option<[f32; 4]> {
        parse_color(&self.attribute(name)?.evaluate(env))
    }

    pub fn render_order(&self, env: &MapEnv) -> f64 {
        self.render_order
            .as_ref()
            .and_then(|expr| expr.evaluate_number(env))
            .unwrap_or(0.0)
    }

    /// Secondary render order, falling back to the primary one
    pub fn secondary_render_order(&self, env: &MapEnv) -> f64 {
        self.secondary_render_order
            .as_ref()
            .and_then(|expr| expr.evaluate_number(env))
            .unwrap_or_else(|| self.render_order(env))
    }
}
