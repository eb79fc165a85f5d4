//! Text styles resolved per technique and shared by all labels of a tile

use crate::style::MapEnv;
use crate::text::{HorizontalAlignment, TextLayoutStyle, TextRenderStyle, VerticalAlignment};
use crate::tile::TechniqueRef;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct TextStyleCache {
    render_styles: HashMap<usize, Arc<TextRenderStyle>>,
    layout_styles: HashMap<usize, Arc<TextLayoutStyle>>,
}

impl TextStyleCache {
    pub fn get_render_style(
        &mut self,
        technique: &TechniqueRef<'_>,
        env: &MapEnv,
    ) -> Arc<TextRenderStyle> {
        self.render_styles
            .entry(technique.index)
            .or_insert_with(|| Arc::new(render_style(technique, env)))
            .clone()
    }

    pub fn get_layout_style(
        &mut self,
        technique: &TechniqueRef<'_>,
        env: &MapEnv,
    ) -> Arc<TextLayoutStyle> {
        self.layout_styles
            .entry(technique.index)
            .or_insert_with(|| Arc::new(layout_style(technique, env)))
            .clone()
    }

    pub fn clear(&mut self) {
        self.render_styles.clear();
        self.layout_styles.clear();
    }
}

fn render_style(technique: &TechniqueRef<'_>, env: &MapEnv) -> TextRenderStyle {
    let defaults = TextRenderStyle::default();
    TextRenderStyle {
        font_size: technique.number("size", env).unwrap_or(defaults.font_size),
        color: technique.color("color", env).unwrap_or(defaults.color),
        background_color: technique.color("backgroundColor", env),
        opacity: technique.number("opacity", env).unwrap_or(defaults.opacity),
        font_name: technique.string("fontName", env),
    }
}

fn layout_style(technique: &TechniqueRef<'_>, env: &MapEnv) -> TextLayoutStyle {
    let defaults = TextLayoutStyle::default();
    TextLayoutStyle {
        horizontal_alignment: technique
            .string("hAlignment", env)
            .and_then(|name| HorizontalAlignment::parse(&name))
            .unwrap_or(defaults.horizontal_alignment),
        vertical_alignment: technique
            .string("vAlignment", env)
            .and_then(|name| VerticalAlignment::parse(&name))
            .unwrap_or(defaults.vertical_alignment),
        tracking: technique.number("tracking", env).unwrap_or(defaults.tracking),
        max_lines: technique
            .number("maxLines", env)
            .filter(|lines| *lines >= 1.0)
            .map(|lines| lines as u32),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::compiled;
    use serde_json::json;

    #[test]
    fn test_styles_are_shared_per_technique() {
        let (decoded, state) = compiled(json!([{
            "name": "text",
            "size": ["step", ["zoom"], 12, 10, 18],
            "color": "#ff0000",
            "hAlignment": "Left",
            "maxLines": 2
        }]));
        let technique = TechniqueRef::resolve(&decoded, &state, 0).unwrap();
        let mut cache = TextStyleCache::default();

        let env = MapEnv::with_zoom(11.0, None);
        let first = cache.get_render_style(&technique, &env);
        assert_eq!(first.font_size, 18.0);
        assert_eq!(first.color, [1.0, 0.0, 0.0, 1.0]);

        // Memoized: a later zoom does not change the cached style
        let low = MapEnv::with_zoom(5.0, None);
        assert!(Arc::ptr_eq(&first, &cache.get_render_style(&technique, &low)));

        let layout = cache.get_layout_style(&technique, &env);
        assert_eq!(layout.horizontal_alignment, HorizontalAlignment::Left);
        assert_eq!(layout.max_lines, Some(2));
    }
}
