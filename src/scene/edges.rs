//! Classification of mesh edges into sharp creases and smooth seams

use std::collections::BTreeMap;

use nalgebra::{Point3, Vector3};

use crate::config::BoundaryEdgePolicy;
use crate::model::{Mesh, Vertex};

/// Dihedral angle above which an edge shared by two faces is sharp
pub const CREASE_ANGLE_DEGREES: f64 = 30.0;

/// Class of an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeClass {
    /// Crease or outline
    Sharp,
    /// Seam between faces that continue each other
    Smooth,
}

/// Map from each undirected edge to the faces that use it
#[derive(Debug, Clone, Default)]
pub struct EdgeAdjacency {
    edges: BTreeMap<(usize, usize), Vec<usize>>,
}

impl EdgeAdjacency {
    /// Collect the faces of every edge, keyed by `(min, max)` vertex index
    pub fn build(mesh: &Mesh) -> Self {
        let mut edges: BTreeMap<(usize, usize), Vec<usize>> = BTreeMap::new();

        for (face, triangle) in mesh.triangles.iter().enumerate() {
            let [a, b, c] = triangle.vertices();
            for (from, to) in [(a, b), (b, c), (c, a)] {
                edges
                    .entry((from.min(to), from.max(to)))
                    .or_default()
                    .push(face);
            }
        }

        Self { edges }
    }

    /// Edges in ascending vertex order with their adjacent faces
    pub fn iter(&self) -> impl Iterator<Item = (&(usize, usize), &Vec<usize>)> {
        self.edges.iter()
    }

    /// Number of distinct edges
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether the mesh has no edges
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

fn point(vertex: &Vertex) -> Point3<f64> {
    Point3::new(vertex.x, vertex.y, vertex.z)
}

/// Unit normal of a face, or `None` for a degenerate face
pub fn face_normal(mesh: &Mesh, face: usize) -> Option<Vector3<f64>> {
    let [a, b, c] = mesh.triangles.get(face)?.vertices();
    let v1 = point(mesh.vertices.get(a)?);
    let v2 = point(mesh.vertices.get(b)?);
    let v3 = point(mesh.vertices.get(c)?);
    (v2 - v1).cross(&(v3 - v1)).try_normalize(f64::EPSILON)
}

/// Edge index pairs of a mesh split by class
///
/// Pairs index into the mesh's own vertex list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeSegments {
    /// Sharp edges as consecutive index pairs
    pub sharp: Vec<u32>,
    /// Smooth edges as consecutive index pairs
    pub smooth: Vec<u32>,
    /// Edges shared by three or more faces, left out of both lists
    pub non_manifold_edges: usize,
}

/// Classify every edge of a mesh
///
/// An edge between two faces is sharp when their normals differ by more than
/// [`CREASE_ANGLE_DEGREES`]. When either face is degenerate the edge is
/// smooth. Boundary edges follow `boundary_policy`.
///
/// # Example
///
/// ```
/// use threemf_scene::BoundaryEdgePolicy;
/// use threemf_scene::model::{Mesh, Triangle, Vertex};
/// use threemf_scene::scene::extract_edge_segments;
///
/// let mut mesh = Mesh::new();
/// mesh.vertices = vec![
///     Vertex::new(0.0, 0.0, 0.0),
///     Vertex::new(1.0, 0.0, 0.0),
///     Vertex::new(0.0, 1.0, 0.0),
/// ];
/// mesh.triangles.push(Triangle::new(0, 1, 2));
///
/// let segments = extract_edge_segments(&mesh, BoundaryEdgePolicy::Smooth);
/// assert_eq!(segments.smooth, vec![0, 1, 0, 2, 1, 2]);
/// assert!(segments.sharp.is_empty());
/// ```
pub fn extract_edge_segments(mesh: &Mesh, boundary_policy: BoundaryEdgePolicy) -> EdgeSegments {
    let adjacency = EdgeAdjacency::build(mesh);
    let threshold = CREASE_ANGLE_DEGREES.to_radians().cos();
    let mut segments = EdgeSegments::default();

    for (&(a, b), faces) in adjacency.iter() {
        let class = match faces.as_slice() {
            [_] => match boundary_policy {
                BoundaryEdgePolicy::Smooth => EdgeClass::Smooth,
                BoundaryEdgePolicy::Sharp => EdgeClass::Sharp,
            },
            [f1, f2] => match (face_normal(mesh, *f1), face_normal(mesh, *f2)) {
                (Some(n1), Some(n2)) if n1.dot(&n2) < threshold => EdgeClass::Sharp,
                _ => EdgeClass::Smooth,
            },
            _ => {
                segments.non_manifold_edges += 1;
                continue;
            }
        };

        let target = match class {
            EdgeClass::Sharp => &mut segments.sharp,
            EdgeClass::Smooth => &mut segments.smooth,
        };
        target.push(a as u32);
        target.push(b as u32);
    }

    if segments.non_manifold_edges > 0 {
        log::warn!(
            "Mesh has {} non-manifold edges, omitted from edge overlays",
            segments.non_manifold_edges
        );
    }
    log::debug!(
        "Classified {} edges: {} sharp, {} smooth",
        adjacency.len(),
        segments.sharp.len() / 2,
        segments.smooth.len() / 2
    );

    segments
}

/// Edge line buffers for one mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeGeometry {
    /// The mesh's vertex positions in model units
    pub positions: Vec<Point3<f32>>,
    /// Classified index pairs into `positions`
    pub segments: EdgeSegments,
}

impl EdgeGeometry {
    /// Classify a mesh's edges and copy its vertex positions
    pub fn build(mesh: &Mesh, boundary_policy: BoundaryEdgePolicy) -> Self {
        Self {
            positions: mesh
                .vertices
                .iter()
                .map(|v| Point3::new(v.x as f32, v.y as f32, v.z as f32))
                .collect(),
            segments: extract_edge_segments(mesh, boundary_policy),
        }
    }
}
