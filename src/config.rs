//! Scene building configuration

/// How edges with exactly one adjacent triangle are classified
///
/// Such edges lie on the boundary of an open mesh. Drawing them as smooth
/// keeps open surfaces quiet; drawing them as sharp outlines their rims.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BoundaryEdgePolicy {
    /// Boundary edges join the smooth edge list
    #[default]
    Smooth,
    /// Boundary edges join the sharp edge list
    Sharp,
}

/// Configuration for building a render model
///
/// # Example
///
/// ```
/// use threemf_scene::{BoundaryEdgePolicy, SceneConfig};
///
/// let config = SceneConfig::new()
///     .with_boundary_edges(BoundaryEdgePolicy::Sharp)
///     .with_edge_overlays(false);
///
/// assert_eq!(config.boundary_edges(), BoundaryEdgePolicy::Sharp);
/// assert!(!config.edge_overlays());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneConfig {
    boundary_edges: BoundaryEdgePolicy,
    edge_overlays: bool,
    specular_glossiness: bool,
    parallel: bool,
}

impl SceneConfig {
    /// Create the default configuration
    ///
    /// Boundary edges are smooth, solid parts get edge overlays, only
    /// metallic/roughness display properties produce PBR materials, and
    /// distinct meshes are built in parallel when the `parallel` feature is
    /// enabled.
    pub fn new() -> Self {
        Self {
            boundary_edges: BoundaryEdgePolicy::Smooth,
            edge_overlays: true,
            specular_glossiness: false,
            parallel: true,
        }
    }

    /// Set the classification of single-face edges
    pub fn with_boundary_edges(mut self, policy: BoundaryEdgePolicy) -> Self {
        self.boundary_edges = policy;
        self
    }

    /// Enable or disable sharp/smooth edge line nodes for solid parts
    pub fn with_edge_overlays(mut self, enabled: bool) -> Self {
        self.edge_overlays = enabled;
        self
    }

    /// Resolve specular/glossiness display properties into PBR materials
    ///
    /// When disabled, triangles referencing them are drawn with flat colors.
    pub fn with_specular_glossiness(mut self, enabled: bool) -> Self {
        self.specular_glossiness = enabled;
        self
    }

    /// Build distinct meshes concurrently
    ///
    /// Has no effect without the `parallel` feature. The output is identical
    /// either way.
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    /// Classification of single-face edges
    pub fn boundary_edges(&self) -> BoundaryEdgePolicy {
        self.boundary_edges
    }

    /// Whether solid parts get edge line nodes
    pub fn edge_overlays(&self) -> bool {
        self.edge_overlays
    }

    /// Whether specular/glossiness display properties produce PBR materials
    pub fn specular_glossiness(&self) -> bool {
        self.specular_glossiness
    }

    /// Whether distinct meshes are built concurrently
    pub fn parallel(&self) -> bool {
        self.parallel
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SceneConfig::default();
        assert_eq!(config.boundary_edges(), BoundaryEdgePolicy::Smooth);
        assert!(config.edge_overlays());
        assert!(!config.specular_glossiness());
        assert!(config.parallel());
    }

    #[test]
    fn test_builder_chain() {
        let config = SceneConfig::new()
            .with_specular_glossiness(true)
            .with_parallel(false);
        assert!(config.specular_glossiness());
        assert!(!config.parallel());
        assert_eq!(config.boundary_edges(), BoundaryEdgePolicy::Smooth);
    }
}
