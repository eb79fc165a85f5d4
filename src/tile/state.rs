//! Per-tile annotations of a shared decoded tile
//!
//! The decoded tile is immutable and may back several tiles (one per world
//! copy). Everything the pipeline resolves while building geometry lives in
//! this side-table instead, indexed like the decoded tile's techniques and
//! groups.

use crate::decoded::{DecodedTile, GeometryKindSet, Technique, TechniqueName};
use crate::style::{CompiledTechnique, MapEnv, ResolvedOrdering};
use serde_json::Value;

#[derive(Debug, Clone, Default)]
pub struct TechniqueState {
    /// `None` until kind filtering ran, then fixed for this build state
    pub enabled: Option<bool>,
    pub kind: Option<GeometryKindSet>,
    pub priority: Option<Value>,
    pub render_order: Option<Value>,
    pub secondary_render_order: Option<Value>,
    pub compiled: Option<CompiledTechnique>,
}

impl TechniqueState {
    fn new(technique: &Technique) -> Self {
        Self {
            enabled: None,
            kind: technique.kind.clone(),
            priority: technique.priority.clone(),
            render_order: technique.render_order.clone(),
            secondary_render_order: technique.secondary_render_order.clone(),
            compiled: None,
        }
    }

    pub fn ordering(&self) -> ResolvedOrdering<'_> {
        ResolvedOrdering {
            priority: self.priority.as_ref(),
            render_order: self.render_order.as_ref(),
            secondary_render_order: self.secondary_render_order.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GroupState {
    /// Tile offsets that already turned this group into objects
    pub created_offsets: Vec<i32>,
}

impl GroupState {
    pub fn is_created_for(&self, offset: i32) -> bool {
        self.created_offsets.contains(&offset)
    }

    pub fn mark_created(&mut self, offset: i32) {
        if !self.is_created_for(offset) {
            self.created_offsets.push(offset);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TileBuildState {
    techniques: Vec<TechniqueState>,
    /// One entry per geometry, one state per group
    groups: Vec<Vec<GroupState>>,
}

impl TileBuildState {
    pub fn new(decoded: &DecodedTile) -> Self {
        Self {
            techniques: decoded.techniques.iter().map(TechniqueState::new).collect(),
            groups: decoded
                .geometries
                .iter()
                .map(|geometry| vec![GroupState::default(); geometry.groups.len()])
                .collect(),
        }
    }

    pub fn technique_count(&self) -> usize {
        self.techniques.len()
    }

    pub fn technique(&self, index: usize) -> Option<&TechniqueState> {
        self.techniques.get(index)
    }

    pub fn technique_mut(&mut self, index: usize) -> Option<&mut TechniqueState> {
        self.techniques.get_mut(index)
    }

    pub fn techniques_mut(&mut self) -> impl Iterator<Item = &mut TechniqueState> {
        self.techniques.iter_mut()
    }

    pub fn group(&self, geometry: usize, group: usize) -> Option<&GroupState> {
        self.groups.get(geometry)?.get(group)
    }

    pub fn group_mut(&mut self, geometry: usize, group: usize) -> Option<&mut GroupState> {
        self.groups.get_mut(geometry)?.get_mut(group)
    }

    pub fn reset_created_offsets(&mut self) {
        for group in self.groups.iter_mut().flatten() {
            group.created_offsets.clear();
        }
    }
}

/// A technique together with its per-tile state
#[derive(Debug, Clone, Copy)]
pub struct TechniqueRef<'a> {
    pub index: usize,
    pub technique: &'a Technique,
    pub state: &'a TechniqueState,
}

impl<'a> TechniqueRef<'a> {
    /// Looks up technique `index`, `None` when the tile does not define it
    pub fn resolve(
        decoded: &'a DecodedTile,
        state: &'a TileBuildState,
        index: usize,
    ) -> Option<Self> {
        Some(Self {
            index,
            technique: decoded.techniques.get(index)?,
            state: state.technique(index)?,
        })
    }

    pub fn name(&self) -> TechniqueName {
        self.technique.name
    }

    /// Only an explicit `false` disables a technique
    pub fn is_enabled(&self) -> bool {
        self.state.enabled != Some(false)
    }

    pub fn kind(&self) -> Option<&'a GeometryKindSet> {
        self.state.kind.as_ref()
    }

    pub fn compiled(&self) -> Option<&'a CompiledTechnique> {
        self.state.compiled.as_ref()
    }

    pub fn number(&self, name: &str, env: &MapEnv) -> Option<f64> {
        self.compiled()?.number(name, env)
    }

    pub fn color(&self, name: &str, env: &MapEnv) -> Option<[f32; 4]> {
        self.compiled()?.color(name, env)
    }

    pub fn boolean(&self, name: &str, env: &MapEnv) -> Option<bool> {
        self.compiled()?.boolean(name, env)
    }

    pub fn string(&self, name: &str, env: &MapEnv) -> Option<String> {
        self.compiled()?.string(name, env)
    }

    pub fn render_order(&self, env: &MapEnv) -> f64 {
        self.compiled().map(|c| c.render_order(env)).unwrap_or(0.0)
    }

    pub fn secondary_render_order(&self, env: &MapEnv) -> f64 {
        self.compiled()
            .map(|c| c.secondary_render_order(env))
            .unwrap_or(0.0)
    }

    pub fn priority(&self, env: &MapEnv) -> Option<f64> {
        self.compiled()?.priority.as_ref()?.evaluate_number(env)
    }

    pub fn fade_near(&self, env: &MapEnv) -> Option<f64> {
        self.compiled()?.fade_near.as_ref()?.evaluate_number(env)
    }

    pub fn fade_far(&self, env: &MapEnv) -> Option<f64> {
        self.compiled()?.fade_far.as_ref()?.evaluate_number(env)
    }
}

/// Predicate deciding which techniques a pass should consider
pub type TechniqueFilter<'f> = dyn Fn(&TechniqueRef<'_>) -> bool + 'f;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoded::{Geometry, Group};

    #[test]
    fn test_state_mirrors_decoded_layout() {
        let mut decoded = DecodedTile::default();
        decoded.techniques.push(Technique::new(TechniqueName::Fill));
        decoded.geometries.push(Geometry {
            groups: vec![Group::new(0, 3, 0), Group::new(3, 3, 0)],
            ..Default::default()
        });

        let mut state = TileBuildState::new(&decoded);
        assert_eq!(state.technique_count(), 1);
        assert!(state.group(0, 1).is_some());
        assert!(state.group(0, 2).is_none());

        let group = state.group_mut(0, 1).unwrap();
        group.mark_created(0);
        group.mark_created(0);
        assert_eq!(group.created_offsets, vec![0]);

        state.reset_created_offsets();
        assert!(!state.group(0, 1).unwrap().is_created_for(0));
    }

    #[test]
    fn test_unset_enabled_counts_as_enabled() {
        let mut decoded = DecodedTile::default();
        decoded.techniques.push(Technique::new(TechniqueName::Text));
        let mut state = TileBuildState::new(&decoded);

        let technique = TechniqueRef::resolve(&decoded, &state, 0).unwrap();
        assert!(technique.is_enabled());
        assert!(TechniqueRef::resolve(&decoded, &state, 1).is_none());

        state.technique_mut(0).unwrap().enabled = Some(false);
        assert!(!TechniqueRef::resolve(&decoded, &state, 0).unwrap().is_enabled());
    }
}
