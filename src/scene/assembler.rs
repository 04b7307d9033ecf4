//! Assembly of the render scene from a parsed model
//!
//! Building happens in three steps. A sequential walk over the build items
//! and their component trees creates every node and records which meshes
//! need geometry or edge buffers. The distinct requests are then built,
//! concurrently when enabled, and finally stored in the model's arenas in
//! request order, so the result does not depend on scheduling.

use indexmap::IndexMap;
use nalgebra::Matrix4;

use crate::config::SceneConfig;
use crate::error::{Error, Result};
use crate::model::{
    Component, Mesh, Model, Object, ObjectContent, PartSemantic, PartialPropertyReference,
    ResourceId,
};

use super::edges::{EdgeClass, EdgeGeometry};
use super::geometry::{RenderGeometry, build_geometry};
use super::resolver::MaterialResolver;
use super::resources::ResourceTable;
use super::{
    EdgeSetId, GeometryId, Node, NodeContent, NodeId, Part, PartNodes, RenderModel, Statistics,
};

const ROOT_NAME: &str = "Model root";
const SHARP_EDGES_NAME: &str = "Sharp edges";
const SMOOTH_EDGES_NAME: &str = "Smooth edges";

type GeometryKey = (ResourceId, PartialPropertyReference);

/// Nodes created for one object instance
struct BuiltNode {
    model: NodeId,
    sharp: Option<NodeId>,
    smooth: Option<NodeId>,
    statistics: Statistics,
}

struct Assembler<'a> {
    table: &'a ResourceTable<'a>,
    config: &'a SceneConfig,
    nodes: Vec<Node>,
    geometry_requests: IndexMap<GeometryKey, &'a Mesh>,
    edge_requests: IndexMap<ResourceId, &'a Mesh>,
}

fn object_label(object: &Object) -> String {
    match &object.name {
        Some(name) => format!("Object id {} \"{}\"", object.id, name),
        None => format!("Object id {}", object.id),
    }
}

impl<'a> Assembler<'a> {
    fn new(table: &'a ResourceTable<'a>, config: &'a SceneConfig) -> Self {
        Self {
            table,
            config,
            nodes: Vec::new(),
            geometry_requests: IndexMap::new(),
            edge_requests: IndexMap::new(),
        }
    }

    fn add_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    fn wants_edges(&self, semantic: PartSemantic) -> bool {
        semantic == PartSemantic::Solid && self.config.edge_overlays()
    }

    /// Create the nodes for one object and everything it references
    ///
    /// `path` holds the objects currently being built, outermost first.
    fn build_node(
        &mut self,
        object: &'a Object,
        semantic: PartSemantic,
        inherited: PartialPropertyReference,
        path: &mut Vec<ResourceId>,
    ) -> Result<BuiltNode> {
        if path.contains(&object.id) {
            let cycle: Vec<String> = path
                .iter()
                .skip_while(|id| **id != object.id)
                .chain(std::iter::once(&object.id))
                .map(|id| id.to_string())
                .collect();
            return Err(Error::CyclicReference(cycle.join(" → ")));
        }

        path.push(object.id);
        let built = match &object.content {
            ObjectContent::Mesh(mesh) => self.build_mesh_node(object, mesh, semantic, inherited),
            ObjectContent::Components(components) => {
                self.build_components_node(object, components, semantic, inherited, path)
            }
        };
        path.pop();

        built
    }

    fn build_components_node(
        &mut self,
        object: &'a Object,
        components: &'a [Component],
        semantic: PartSemantic,
        inherited: PartialPropertyReference,
        path: &mut Vec<ResourceId>,
    ) -> Result<BuiltNode> {
        let context = object.properties.or(inherited);
        let model = self.add_node(Node::new(object_label(object), NodeContent::Empty));
        let (sharp, smooth) = if self.wants_edges(semantic) {
            (
                Some(self.add_node(Node::new(SHARP_EDGES_NAME, NodeContent::Empty))),
                Some(self.add_node(Node::new(SMOOTH_EDGES_NAME, NodeContent::Empty))),
            )
        } else {
            (None, None)
        };

        let mut statistics = Statistics::default();
        for component in components {
            let child_object = self.table.object(component.object_id).ok_or_else(|| {
                Error::MissingObject {
                    object_id: component.object_id,
                    referenced_by: format!("component of object {}", object.id),
                }
            })?;

            let child = self.build_node(
                child_object,
                semantic,
                component.properties.or(context),
                path,
            )?;

            if let Some(transform) = &component.transform {
                let matrix = transform.to_matrix();
                for id in [Some(child.model), child.sharp, child.smooth]
                    .into_iter()
                    .flatten()
                {
                    self.node_mut(id).transform = matrix;
                }
            }

            self.node_mut(model).children.push(child.model);
            for (container, child_edges) in [(sharp, child.sharp), (smooth, child.smooth)] {
                if let (Some(container), Some(child_edges)) = (container, child_edges) {
                    self.node_mut(container).children.push(child_edges);
                }
            }
            statistics += child.statistics;
        }

        Ok(BuiltNode {
            model,
            sharp,
            smooth,
            statistics,
        })
    }

    fn build_mesh_node(
        &mut self,
        object: &'a Object,
        mesh: &'a Mesh,
        semantic: PartSemantic,
        inherited: PartialPropertyReference,
    ) -> Result<BuiltNode> {
        if let Some((triangle, vertex)) = mesh.first_invalid_triangle() {
            return Err(Error::InvalidMesh(format!(
                "Object {}: triangle {} references vertex {} but the mesh has {} vertices",
                object.id,
                triangle,
                vertex,
                mesh.vertices.len()
            )));
        }

        let context = object.properties.or(inherited);
        let (index, _) = self.geometry_requests.insert_full((object.id, context), mesh);
        let geometry = GeometryId(index as u32);
        let model = self.add_node(Node::new(
            object_label(object),
            NodeContent::Geometry(geometry),
        ));

        let (sharp, smooth) = if self.wants_edges(semantic) {
            let (index, _) = self.edge_requests.insert_full(object.id, mesh);
            let edges = EdgeSetId(index as u32);
            let sharp = self.add_node(Node::new(
                SHARP_EDGES_NAME,
                NodeContent::Edges {
                    edges,
                    class: EdgeClass::Sharp,
                },
            ));
            let smooth = self.add_node(Node::new(
                SMOOTH_EDGES_NAME,
                NodeContent::Edges {
                    edges,
                    class: EdgeClass::Smooth,
                },
            ));
            (Some(sharp), Some(smooth))
        } else {
            (None, None)
        };

        Ok(BuiltNode {
            model,
            sharp,
            smooth,
            statistics: Statistics::of_mesh(mesh),
        })
    }
}

#[cfg(feature = "parallel")]
fn map_distinct<T, R, F>(items: &[T], parallel: bool, f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    use rayon::prelude::*;

    if parallel {
        items.par_iter().map(f).collect()
    } else {
        items.iter().map(f).collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn map_distinct<T, R, F>(items: &[T], _parallel: bool, f: F) -> Vec<R>
where
    F: Fn(&T) -> R,
{
    items.iter().map(f).collect()
}

/// Build the render scene for a model
///
/// The root node scales model units to millimeters. Each build item
/// becomes a part whose container carries the item transform and holds the
/// object's node followed, for solid parts, by its sharp and smooth edge
/// nodes.
///
/// # Errors
///
/// Fails without producing a partial scene when a build item or component
/// references a missing object, when components form a cycle, or when a
/// triangle references a vertex outside its mesh.
///
/// # Example
///
/// ```
/// use threemf_scene::SceneConfig;
/// use threemf_scene::model::{BuildItem, Mesh, Model, Object, Triangle, Vertex};
/// use threemf_scene::scene::build_render_model;
///
/// let mut mesh = Mesh::new();
/// mesh.vertices = vec![
///     Vertex::new(0.0, 0.0, 0.0),
///     Vertex::new(1.0, 0.0, 0.0),
///     Vertex::new(0.0, 1.0, 0.0),
/// ];
/// mesh.triangles.push(Triangle::new(0, 1, 2));
///
/// let mut model = Model::new();
/// model.resources.objects.push(Object::new(1, mesh).named("Plate"));
/// model.build.items.push(BuildItem::new(1));
///
/// let scene = build_render_model(&model, &SceneConfig::default())?;
/// assert_eq!(scene.parts().len(), 1);
/// assert_eq!(scene.statistics().triangle_count, 1);
/// # Ok::<(), threemf_scene::Error>(())
/// ```
pub fn build_render_model(model: &Model, config: &SceneConfig) -> Result<RenderModel> {
    let table = ResourceTable::new(&model.resources);
    let mut assembler = Assembler::new(&table, config);

    let mut root_node = Node::new(ROOT_NAME, NodeContent::Empty);
    root_node.transform = Matrix4::new_scaling(model.unit_multiplier());
    let root = assembler.add_node(root_node);

    let mut parts = Vec::with_capacity(model.build.items.len());
    for (index, item) in model.build.items.iter().enumerate() {
        let object = table
            .object(item.object_id)
            .ok_or_else(|| Error::MissingObject {
                object_id: item.object_id,
                referenced_by: format!("build item #{}", index),
            })?;
        let semantic = item.semantic();

        let mut container_node = Node::new(
            format!("{} for item #{}", object_label(object), index),
            NodeContent::Empty,
        );
        if let Some(transform) = &item.transform {
            container_node.transform = transform.to_matrix();
        }
        let container = assembler.add_node(container_node);

        let built = assembler.build_node(
            object,
            semantic,
            PartialPropertyReference::default(),
            &mut Vec::new(),
        )?;

        let children = [Some(built.model), built.sharp, built.smooth];
        assembler
            .node_mut(container)
            .children
            .extend(children.into_iter().flatten());
        assembler.node_mut(root).children.push(container);

        let id = item
            .part_number
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        parts.push(Part {
            id,
            name: object.name.clone(),
            semantic,
            statistics: built.statistics,
            nodes: PartNodes {
                container,
                model: built.model,
                sharp_edges: built.sharp,
                smooth_edges: built.smooth,
            },
        });
    }

    let Assembler {
        nodes,
        geometry_requests,
        edge_requests,
        ..
    } = assembler;

    let geometry_requests: Vec<(GeometryKey, &Mesh)> = geometry_requests.into_iter().collect();
    let edge_requests: Vec<(ResourceId, &Mesh)> = edge_requests.into_iter().collect();

    let resolver = MaterialResolver::new(&table, config);
    let geometries: Vec<RenderGeometry> =
        map_distinct(&geometry_requests, config.parallel(), |((_, context), mesh)| {
            build_geometry(mesh, *context, &resolver)
        });
    let boundary_edges = config.boundary_edges();
    let edge_sets: Vec<EdgeGeometry> =
        map_distinct(&edge_requests, config.parallel(), |(_, mesh)| {
            EdgeGeometry::build(mesh, boundary_edges)
        });

    log::debug!(
        "Built scene: {} parts, {} nodes, {} geometries, {} edge sets",
        parts.len(),
        nodes.len(),
        geometries.len(),
        edge_sets.len()
    );

    Ok(RenderModel {
        root,
        nodes,
        geometries,
        edge_sets,
        parts,
        metadata: model.metadata.clone(),
    })
}
