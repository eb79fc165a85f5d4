//! Theme priority tables applied to a tile's techniques

use crate::decoded::DecodedTile;
use crate::tile::TileBuildState;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Spacing between consecutive render order slots
pub const RENDER_ORDER_STEP: f64 = 10.0;

/// One entry of the theme's ordered style priority list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StylePriority {
    /// Style set the category belongs to
    pub group: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl StylePriority {
    pub fn new(group: &str, category: Option<&str>) -> Self {
        Self { group: group.to_string(), category: category.map(str::to_string) }
    }
}

/// Priority tables of a theme; both are optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemePriorities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priorities: Option<Vec<StylePriority>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_priorities: Option<Vec<String>>,
}

impl ThemePriorities {
    /// Render order of `(style_set, category)`, by position in the table
    fn render_order_of(&self, style_set: &str, category: &str) -> Option<f64> {
        let priorities = self.priorities.as_ref()?;
        let index = priorities
            .iter()
            .position(|entry| {
                entry.group == style_set && entry.category.as_deref() == Some(category)
            })?;
        Some((index + 1) as f64 * RENDER_ORDER_STEP)
    }

    /// Label priority of `category`; earlier entries win
    fn label_priority_of(&self, category: &str) -> Option<f64> {
        let labels = self.label_priorities.as_ref()?;
        let index = labels.iter().position(|entry| entry == category)?;
        Some((labels.len() - index) as f64)
    }
}

/// Overwrites priority and render orders of techniques whose categories
/// appear in the theme tables. Anything missing leaves the technique as is.
pub fn process_priorities(
    decoded: &DecodedTile,
    state: &mut TileBuildState,
    theme: Option<&ThemePriorities>,
) {
    let Some(theme) = theme else {
        return;
    };

    for (index, technique) in decoded.techniques.iter().enumerate() {
        let Some(technique_state) = state.technique_mut(index) else {
            continue;
        };

        if technique.name.is_label() {
            if let Some(priority) =
                technique.category_name().and_then(|c| theme.label_priority_of(c))
            {
                technique_state.priority = Some(Value::from(priority));
            }
            continue;
        }

        let Some(style_set) = technique.style_set.as_deref() else {
            continue;
        };

        if let Some(order) = technique
            .category_name()
            .and_then(|c| theme.render_order_of(style_set, c))
        {
            technique_state.render_order = Some(Value::from(order));
        }

        if let Some(order) = technique
            .secondary_category_name()
            .and_then(|c| theme.render_order_of(style_set, c))
        {
            technique_state.secondary_render_order = Some(Value::from(order));
        }
    }
}
