//! Conversion of meshes into render buffers grouped by material

use indexmap::IndexMap;
use nalgebra::Point3;

use crate::model::{Color, Mesh, PartialPropertyReference};

use super::resolver::{Material, MaterialResolver, PbrMaterial};

/// Name of the material used for triangles drawn with vertex colors
pub const DEFAULT_MATERIAL_NAME: &str = "Non-PBR material";

/// Identifies the material of a group of triangles
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MaterialKey {
    /// Vertex-colored triangles drawn with the default material
    NoMaterial,
    /// Triangles sharing one PBR material
    Pbr(PbrMaterial),
}

/// Shading model of a render material
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightingModel {
    /// Classic specular highlight shading
    Blinn,
    /// Metallic/roughness shading
    PhysicallyBased,
}

/// How translucent surfaces are blended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransparencyMode {
    /// A single blended layer
    SingleLayer,
    /// Back faces then front faces, for translucent solids
    DualLayer,
}

/// Material parameters ready for a renderer
#[derive(Debug, Clone, PartialEq)]
pub struct RenderMaterial {
    /// Display name
    pub name: String,
    /// Shading model
    pub lighting: LightingModel,
    /// Diffuse color in linear RGBA
    pub diffuse: [f32; 4],
    /// Metalness for physically based materials
    pub metalness: Option<f32>,
    /// Roughness for physically based materials
    pub roughness: Option<f32>,
    /// Specular color in linear RGBA, for specular/glossiness materials
    pub specular: Option<[f32; 4]>,
    /// Shininess for specular/glossiness materials
    pub shininess: Option<f32>,
    /// Emission intensity
    pub emission_intensity: f32,
    /// Transparency blending
    pub transparency: TransparencyMode,
}

impl RenderMaterial {
    /// The material for vertex-colored triangles
    ///
    /// Opaque white, so the vertex colors show unchanged.
    pub fn default_material() -> Self {
        Self {
            name: DEFAULT_MATERIAL_NAME.to_string(),
            lighting: LightingModel::Blinn,
            diffuse: Color::WHITE.to_linear_rgba(),
            metalness: None,
            roughness: None,
            specular: None,
            shininess: None,
            emission_intensity: 0.0,
            transparency: TransparencyMode::SingleLayer,
        }
    }

    /// Render material for a material key
    pub fn for_key(key: &MaterialKey) -> Self {
        match key {
            MaterialKey::NoMaterial => Self::default_material(),
            MaterialKey::Pbr(pbr) => Self::from_pbr(pbr),
        }
    }

    fn from_pbr(pbr: &PbrMaterial) -> Self {
        let diffuse = pbr.diffuse();
        let transparency = if diffuse.is_opaque() {
            TransparencyMode::SingleLayer
        } else {
            TransparencyMode::DualLayer
        };
        let name = pbr.name().unwrap_or_default().to_string();

        match pbr {
            PbrMaterial::Metallic {
                metallicness,
                roughness,
                ..
            } => Self {
                name,
                lighting: LightingModel::PhysicallyBased,
                diffuse: diffuse.to_linear_rgba(),
                metalness: Some(*metallicness as f32),
                roughness: Some(*roughness as f32),
                specular: None,
                shininess: None,
                emission_intensity: 0.0,
                transparency,
            },
            PbrMaterial::Specular {
                specular_color,
                glossiness,
                ..
            } => Self {
                name,
                lighting: LightingModel::Blinn,
                diffuse: diffuse.to_linear_rgba(),
                metalness: None,
                roughness: None,
                specular: Some(specular_color.to_linear_rgba()),
                shininess: Some(*glossiness as f32),
                emission_intensity: 0.0,
                transparency,
            },
        }
    }
}

/// Triangle indices sharing one material
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryElement {
    /// Material of the triangles
    pub key: MaterialKey,
    /// Indices into the geometry's position buffer, three per triangle
    pub indices: Vec<u32>,
}

/// Unindexed render buffers for one mesh in one property context
///
/// Every emitted triangle owns three consecutive positions, so vertex
/// colors never bleed between neighbouring triangles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderGeometry {
    /// Vertex positions in model units
    pub positions: Vec<Point3<f32>>,
    /// Vertex colors, parallel to `positions`
    pub colors: Vec<[f32; 4]>,
    /// Index groups in order of first appearance
    pub elements: Vec<GeometryElement>,
    /// Materials, parallel to `elements`
    pub materials: Vec<RenderMaterial>,
}

impl RenderGeometry {
    /// Whether no triangle was emitted
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of emitted triangles
    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }
}

/// Build render buffers for a mesh
///
/// Triangles are visited in order. Fully transparent vertex-colored
/// triangles are dropped; the rest are grouped by material key in order of
/// first appearance. Triangles without a resolvable appearance use the
/// default material with white vertex colors. Triangles referencing missing
/// vertices are skipped; callers validate meshes before building.
pub fn build_geometry(
    mesh: &Mesh,
    inherited: PartialPropertyReference,
    resolver: &MaterialResolver<'_>,
) -> RenderGeometry {
    let mut positions = Vec::with_capacity(mesh.triangles.len() * 3);
    let mut colors = Vec::with_capacity(mesh.triangles.len() * 3);
    let mut groups: IndexMap<MaterialKey, Vec<u32>> = IndexMap::new();

    let mut transparent = 0usize;
    let mut fallback = 0usize;

    for triangle in &mesh.triangles {
        let Some(corners) = triangle
            .vertices()
            .into_iter()
            .map(|index| mesh.vertices.get(index))
            .collect::<Option<Vec<_>>>()
        else {
            continue;
        };

        let material = resolver.material_for(triangle, inherited);
        let (key, vertex_colors) = match material {
            Some(material) if material.is_fully_transparent() => {
                transparent += 1;
                continue;
            }
            Some(Material::VertexColors(vertex_colors)) => (
                MaterialKey::NoMaterial,
                vertex_colors.map(|color| color.to_unit_rgba()),
            ),
            Some(Material::Pbr(pbr)) => (MaterialKey::Pbr(pbr), [Color::WHITE.to_unit_rgba(); 3]),
            None => {
                fallback += 1;
                (MaterialKey::NoMaterial, [Color::WHITE.to_unit_rgba(); 3])
            }
        };

        let base = positions.len() as u32;
        for vertex in corners {
            positions.push(Point3::new(vertex.x as f32, vertex.y as f32, vertex.z as f32));
        }
        colors.extend_from_slice(&vertex_colors);
        groups
            .entry(key)
            .or_default()
            .extend_from_slice(&[base, base + 1, base + 2]);
    }

    log::debug!(
        "Built geometry: {} triangles emitted, {} transparent skipped, {} default material",
        positions.len() / 3,
        transparent,
        fallback
    );

    let (elements, materials) = groups
        .into_iter()
        .map(|(key, indices)| {
            let material = RenderMaterial::for_key(&key);
            (GeometryElement { key, indices }, material)
        })
        .unzip();

    RenderGeometry {
        positions,
        colors,
        elements,
        materials,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use crate::model::*;
    use crate::scene::resources::ResourceTable;

    fn quad(triangles: Vec<Triangle>) -> Mesh {
        let mut mesh = Mesh::new();
        mesh.vertices = vec![
            Vertex::new(0.0, 0.0, 0.0),
            Vertex::new(1.0, 0.0, 0.0),
            Vertex::new(1.0, 1.0, 0.0),
            Vertex::new(0.0, 1.0, 0.0),
        ];
        mesh.triangles = triangles;
        mesh
    }

    fn resources() -> Resources {
        let mut resources = Resources::new();
        let mut colors = ColorGroup::new(1);
        colors.colors = vec![Color::rgb(255, 0, 0), Color::rgba(0, 0, 0, 0)];
        resources.color_groups.push(colors);

        let mut base = BaseMaterialGroup::new(2);
        base.display_properties_id = Some(3);
        base.materials.push(BaseMaterial::new("Glass", Color::rgba(200, 220, 255, 128)));
        resources.base_material_groups.push(base);

        let mut metallic = MetallicDisplayProperties::new(3);
        metallic.metallics.push(MetallicDisplayProperty {
            name: Some("Glass".to_string()),
            metallicness: 0.0,
            roughness: 0.1,
        });
        resources.metallic_display_properties.push(metallic);
        resources
    }

    fn build(mesh: &Mesh, inherited: PartialPropertyReference) -> RenderGeometry {
        let resources = resources();
        let table = ResourceTable::new(&resources);
        let resolver = MaterialResolver::new(&table, &SceneConfig::default());
        build_geometry(mesh, inherited, &resolver)
    }

    #[test]
    fn test_unresolved_triangles_use_default_material() {
        let mesh = quad(vec![Triangle::new(0, 1, 2), Triangle::new(0, 2, 3)]);
        let geometry = build(&mesh, PartialPropertyReference::default());

        assert_eq!(geometry.positions.len(), 6);
        assert_eq!(geometry.elements.len(), 1);
        assert_eq!(geometry.elements[0].key, MaterialKey::NoMaterial);
        assert_eq!(geometry.elements[0].indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(geometry.materials[0], RenderMaterial::default_material());
        assert!(geometry.colors.iter().all(|c| *c == [1.0, 1.0, 1.0, 1.0]));
    }

    #[test]
    fn test_transparent_triangles_are_dropped() {
        let mesh = quad(vec![
            Triangle::new(0, 1, 2).with_uniform_index(1),
            Triangle::new(0, 2, 3).with_uniform_index(0),
        ]);
        let geometry = build(&mesh, PartialPropertyReference::new(Some(1), None));

        assert_eq!(geometry.triangle_count(), 1);
        assert_eq!(geometry.colors[0], [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(geometry.positions[1], Point3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_fully_transparent_mesh_is_empty() {
        let mesh = quad(vec![Triangle::new(0, 1, 2), Triangle::new(0, 2, 3)]);
        let geometry = build(&mesh, PartialPropertyReference::new(Some(1), Some(1)));
        assert!(geometry.is_empty());
        assert!(geometry.elements.is_empty());
        assert!(geometry.materials.is_empty());
    }

    #[test]
    fn test_translucent_pbr_uses_dual_layer() {
        let mesh = quad(vec![
            Triangle::new(0, 1, 2).with_group(2).with_uniform_index(0),
            Triangle::new(0, 2, 3),
        ]);
        let geometry = build(&mesh, PartialPropertyReference::default());

        assert_eq!(geometry.elements.len(), 2);
        assert!(matches!(geometry.elements[0].key, MaterialKey::Pbr(_)));
        assert_eq!(geometry.elements[1].key, MaterialKey::NoMaterial);

        let glass = &geometry.materials[0];
        assert_eq!(glass.name, "Glass");
        assert_eq!(glass.lighting, LightingModel::PhysicallyBased);
        assert_eq!(glass.transparency, TransparencyMode::DualLayer);
        assert_eq!(glass.metalness, Some(0.0));
        assert_eq!(glass.roughness, Some(0.1));
        // PBR triangles are tinted by the material, not the vertex colors
        assert_eq!(geometry.colors[0], [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_empty_mesh() {
        let geometry = build(&Mesh::new(), PartialPropertyReference::default());
        assert!(geometry.is_empty());
        assert_eq!(geometry, RenderGeometry::default());
    }
}
