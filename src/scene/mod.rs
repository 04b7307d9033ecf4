//! Render scene built from a 3MF model
//!
//! A [`RenderModel`] is a tree of nodes stored in an arena. Each build item
//! becomes a [`Part`] with a container node, a node holding the item's
//! geometry and, for solid parts, nodes drawing sharp and smooth edges.
//! Geometry and edge buffers live in their own arenas and are shared by
//! every node that shows the same mesh in the same property context.

mod assembler;
mod bounds;
mod edges;
mod geometry;
mod resolver;
mod resources;

use std::collections::BTreeMap;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use nalgebra::{Matrix4, Point3};

use crate::model::{Mesh, Metadata, MetadataName, PartSemantic};

pub use assembler::build_render_model;
pub use bounds::BoundingBox;
pub use edges::{
    CREASE_ANGLE_DEGREES, EdgeAdjacency, EdgeClass, EdgeGeometry, EdgeSegments,
    extract_edge_segments, face_normal,
};
pub use geometry::{
    DEFAULT_MATERIAL_NAME, GeometryElement, LightingModel, MaterialKey, RenderGeometry,
    RenderMaterial, TransparencyMode, build_geometry,
};
pub use resolver::{
    Material, MaterialResolver, PbrMaterial, TriangleProperties, resolve_triangle_properties,
};
pub use resources::{Resource, ResourceTable};

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) u32);

        impl $name {
            /// Position in the owning arena
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

arena_id!(
    /// Handle of a node in a [`RenderModel`]
    NodeId
);
arena_id!(
    /// Handle of a geometry buffer in a [`RenderModel`]
    GeometryId
);
arena_id!(
    /// Handle of an edge buffer in a [`RenderModel`]
    EdgeSetId
);

/// What a node draws
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeContent {
    /// Nothing; the node only groups and transforms its children
    Empty,
    /// Triangle geometry
    Geometry(GeometryId),
    /// One class of edge lines
    Edges {
        /// The edge buffers
        edges: EdgeSetId,
        /// Which segments to draw
        class: EdgeClass,
    },
}

/// A node of the scene tree
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Display name
    pub name: String,
    /// Transform relative to the parent node
    pub transform: Matrix4<f64>,
    /// What the node draws
    pub content: NodeContent,
    /// Child nodes in order
    pub children: Vec<NodeId>,
}

impl Node {
    pub(crate) fn new(name: impl Into<String>, content: NodeContent) -> Self {
        Self {
            name: name.into(),
            transform: Matrix4::identity(),
            content,
            children: Vec::new(),
        }
    }
}

/// Vertex and triangle counts of source meshes
///
/// Counts are taken from the model before transparency filtering and add up
/// across components and parts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Statistics {
    /// Number of vertices
    pub vertex_count: usize,
    /// Number of triangles
    pub triangle_count: usize,
}

impl Statistics {
    /// Counts of a single mesh
    pub fn of_mesh(mesh: &Mesh) -> Self {
        Self {
            vertex_count: mesh.vertices.len(),
            triangle_count: mesh.triangles.len(),
        }
    }
}

impl Add for Statistics {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            vertex_count: self.vertex_count + other.vertex_count,
            triangle_count: self.triangle_count + other.triangle_count,
        }
    }
}

impl AddAssign for Statistics {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sum for Statistics {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Nodes belonging to one part
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartNodes {
    /// Container carrying the build item transform
    pub container: NodeId,
    /// Node holding the part's triangle geometry
    pub model: NodeId,
    /// Sharp edge lines, for solid parts with edge overlays
    pub sharp_edges: Option<NodeId>,
    /// Smooth edge lines, for solid parts with edge overlays
    pub smooth_edges: Option<NodeId>,
}

/// A build item as placed in the scene
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    /// Stable identifier: the item's part number, or a generated UUID
    pub id: String,
    /// Name of the referenced object
    pub name: Option<String>,
    /// Role of the part
    pub semantic: PartSemantic,
    /// Counts over every mesh of the part
    pub statistics: Statistics,
    /// The part's nodes
    pub nodes: PartNodes,
}

impl Part {
    /// Name for display, `"Object"` when the object is unnamed
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Object")
    }
}

/// A 3MF model ready for rendering
#[derive(Debug, Clone)]
pub struct RenderModel {
    pub(crate) root: NodeId,
    pub(crate) nodes: Vec<Node>,
    pub(crate) geometries: Vec<RenderGeometry>,
    pub(crate) edge_sets: Vec<EdgeGeometry>,
    pub(crate) parts: Vec<Part>,
    pub(crate) metadata: Vec<Metadata>,
}

impl RenderModel {
    /// The root container, scaled to millimeters
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Node by handle
    ///
    /// # Panics
    ///
    /// Panics if the handle belongs to another model.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// All nodes; handles index into this slice
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Geometry by handle
    ///
    /// # Panics
    ///
    /// Panics if the handle belongs to another model.
    pub fn geometry(&self, id: GeometryId) -> &RenderGeometry {
        &self.geometries[id.index()]
    }

    /// All distinct geometries
    pub fn geometries(&self) -> &[RenderGeometry] {
        &self.geometries
    }

    /// Edge buffers by handle
    ///
    /// # Panics
    ///
    /// Panics if the handle belongs to another model.
    pub fn edge_set(&self, id: EdgeSetId) -> &EdgeGeometry {
        &self.edge_sets[id.index()]
    }

    /// All distinct edge buffers
    pub fn edge_sets(&self) -> &[EdgeGeometry] {
        &self.edge_sets
    }

    /// Parts in build order
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Part by id
    pub fn part(&self, id: &str) -> Option<&Part> {
        self.parts.iter().find(|part| part.id == id)
    }

    /// Package metadata in document order
    pub fn metadata(&self) -> &[Metadata] {
        &self.metadata
    }

    /// Metadata values grouped by name
    ///
    /// Well-known names come first in their conventional order, then custom
    /// names alphabetically. Values keep document order.
    pub fn metadata_groups(&self) -> Vec<(MetadataName, Vec<&str>)> {
        let mut groups: BTreeMap<&MetadataName, Vec<&str>> = BTreeMap::new();
        for entry in &self.metadata {
            groups.entry(&entry.name).or_default().push(&entry.value);
        }
        groups
            .into_iter()
            .map(|(name, values)| (name.clone(), values))
            .collect()
    }

    /// Counts summed over all parts
    pub fn statistics(&self) -> Statistics {
        self.parts.iter().map(|part| part.statistics).sum()
    }

    /// World-space bounds of all triangle geometry, in millimeters
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.subtree_bounds(self.root, &Matrix4::identity())
    }

    /// World-space bounds of one part's triangle geometry, in millimeters
    pub fn part_bounding_box(&self, part: &Part) -> Option<BoundingBox> {
        let root_transform = self.node(self.root).transform;
        self.subtree_bounds(part.nodes.container, &root_transform)
    }

    fn subtree_bounds(&self, id: NodeId, parent: &Matrix4<f64>) -> Option<BoundingBox> {
        let node = self.nodes.get(id.index())?;
        let world = parent * node.transform;

        let own = match node.content {
            NodeContent::Geometry(geometry) => self
                .geometries
                .get(geometry.index())
                .and_then(|geometry| {
                    BoundingBox::from_points(geometry.positions.iter().map(|p| {
                        Point3::new(f64::from(p.x), f64::from(p.y), f64::from(p.z))
                    }))
                })
                .map(|bounds| bounds.transformed(&world)),
            _ => None,
        };

        node.children
            .iter()
            .filter_map(|child| self.subtree_bounds(*child, &world))
            .fold(own, |acc, bounds| {
                Some(acc.map_or(bounds, |acc| acc.union(&bounds)))
            })
    }
}
