//! Per-view visibility state layered over a [`RenderModel`]
//!
//! Nothing here touches the scene's buffers. Visibility is keyed by part id,
//! so the same state can be applied to a model rebuilt by a reload.

use std::collections::HashSet;

use crate::scene::{NodeId, Part, RenderModel};

/// Which edge overlays are drawn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EdgeVisibility {
    /// No edges
    None,
    /// Sharp edges only
    #[default]
    Sharp,
    /// Sharp and smooth edges
    All,
}

impl EdgeVisibility {
    /// Whether sharp edge nodes are shown
    pub fn shows_sharp(&self) -> bool {
        !matches!(self, EdgeVisibility::None)
    }

    /// Whether smooth edge nodes are shown
    pub fn shows_smooth(&self) -> bool {
        matches!(self, EdgeVisibility::All)
    }
}

/// Hidden and isolated parts of one view
///
/// # Example
///
/// ```
/// use threemf_scene::view::PartVisibility;
///
/// let mut visibility = PartVisibility::new();
/// visibility.hide("bracket");
/// assert!(visibility.is_hidden("bracket"));
///
/// visibility.isolate("lid");
/// assert!(visibility.is_visible("lid"));
/// assert!(!visibility.is_visible("base"));
///
/// visibility.clear_isolation();
/// assert!(visibility.is_visible("base"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartVisibility {
    hidden: HashSet<String>,
    isolated: Option<String>,
}

impl PartVisibility {
    /// Every part visible
    pub fn new() -> Self {
        Self::default()
    }

    /// Hide a part
    pub fn hide(&mut self, id: &str) {
        self.hidden.insert(id.to_string());
    }

    /// Unhide a part
    pub fn show(&mut self, id: &str) {
        self.hidden.remove(id);
    }

    /// Flip a part between hidden and shown
    pub fn toggle(&mut self, id: &str) {
        if !self.hidden.remove(id) {
            self.hidden.insert(id.to_string());
        }
    }

    /// Whether the part has been hidden explicitly
    pub fn is_hidden(&self, id: &str) -> bool {
        self.hidden.contains(id)
    }

    /// Whether the part is drawn
    ///
    /// While a part is isolated, only that part is drawn, and only if it is
    /// not hidden itself.
    pub fn is_visible(&self, id: &str) -> bool {
        !self.is_hidden(id) && self.isolated.as_deref().is_none_or(|isolated| isolated == id)
    }

    /// Draw only the given part
    pub fn isolate(&mut self, id: &str) {
        self.hidden.remove(id);
        self.isolated = Some(id.to_string());
    }

    /// Stop isolating a part
    pub fn clear_isolation(&mut self) {
        self.isolated = None;
    }

    /// The isolated part, if any
    pub fn isolated(&self) -> Option<&str> {
        self.isolated.as_deref()
    }

    /// Number of visible and not visible parts
    pub fn counts(&self, parts: &[Part]) -> (usize, usize) {
        let visible = parts.iter().filter(|part| self.is_visible(&part.id)).count();
        (visible, parts.len() - visible)
    }

    /// Forget state for parts that no longer exist
    ///
    /// Parts new to `parts` start out visible.
    pub fn retain_parts(&mut self, parts: &[Part]) {
        let ids: HashSet<&str> = parts.iter().map(|part| part.id.as_str()).collect();
        self.hidden.retain(|id| ids.contains(id.as_str()));
        if self
            .isolated
            .as_deref()
            .is_some_and(|isolated| !ids.contains(isolated))
        {
            self.isolated = None;
        }
    }

    /// Visibility of every part's model and edge nodes
    pub fn node_visibility(
        &self,
        model: &RenderModel,
        edges: EdgeVisibility,
    ) -> Vec<(NodeId, bool)> {
        let mut nodes = Vec::with_capacity(model.parts().len() * 3);
        for part in model.parts() {
            let visible = self.is_visible(&part.id);
            nodes.push((part.nodes.model, visible));
            if let Some(sharp) = part.nodes.sharp_edges {
                nodes.push((sharp, visible && edges.shows_sharp()));
            }
            if let Some(smooth) = part.nodes.smooth_edges {
                nodes.push((smooth, visible && edges.shows_smooth()));
            }
        }
        nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use crate::model::{BuildItem, Mesh, Model, Object, Triangle, Vertex};
    use crate::scene::build_render_model;

    fn two_part_model() -> RenderModel {
        let mut mesh = Mesh::new();
        mesh.vertices = vec![
            Vertex::new(0.0, 0.0, 0.0),
            Vertex::new(1.0, 0.0, 0.0),
            Vertex::new(0.0, 1.0, 0.0),
        ];
        mesh.triangles.push(Triangle::new(0, 1, 2));

        let mut model = Model::new();
        model.resources.objects.push(Object::new(1, mesh));
        for part_number in ["a", "b"] {
            let mut item = BuildItem::new(1);
            item.part_number = Some(part_number.to_string());
            model.build.items.push(item);
        }
        build_render_model(&model, &SceneConfig::default()).unwrap()
    }

    #[test]
    fn test_edge_visibility_levels() {
        assert_eq!(EdgeVisibility::default(), EdgeVisibility::Sharp);
        assert!(!EdgeVisibility::None.shows_sharp());
        assert!(EdgeVisibility::Sharp.shows_sharp());
        assert!(!EdgeVisibility::Sharp.shows_smooth());
        assert!(EdgeVisibility::All.shows_smooth());
    }

    #[test]
    fn test_toggle_and_counts() {
        let model = two_part_model();
        let mut visibility = PartVisibility::new();
        assert_eq!(visibility.counts(model.parts()), (2, 0));

        visibility.toggle("a");
        assert_eq!(visibility.counts(model.parts()), (1, 1));
        visibility.toggle("a");
        assert!(!visibility.is_hidden("a"));
    }

    #[test]
    fn test_retain_parts_drops_unknown_ids() {
        let model = two_part_model();
        let mut visibility = PartVisibility::new();
        visibility.hide("a");
        visibility.hide("gone");
        visibility.isolate("removed");

        visibility.retain_parts(model.parts());
        assert!(visibility.is_hidden("a"));
        assert!(!visibility.is_hidden("gone"));
        assert_eq!(visibility.isolated(), None);
    }

    #[test]
    fn test_node_visibility() {
        let model = two_part_model();
        let mut visibility = PartVisibility::new();
        visibility.hide("b");

        let nodes = visibility.node_visibility(&model, EdgeVisibility::Sharp);
        let a = &model.parts()[0].nodes;
        let b = &model.parts()[1].nodes;
        assert!(nodes.contains(&(a.model, true)));
        assert!(nodes.contains(&(a.sharp_edges.unwrap(), true)));
        assert!(nodes.contains(&(a.smooth_edges.unwrap(), false)));
        assert!(nodes.contains(&(b.model, false)));
        assert!(nodes.contains(&(b.sharp_edges.unwrap(), false)));
    }
}
