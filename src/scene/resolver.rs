//! Resolution of triangle property references into colors and materials
//!
//! A triangle's appearance is found by walking from its property reference
//! to a color or base material entry and, when that group names display
//! properties, on to the PBR parameters at the same index. Nothing here
//! fails: unresolvable references yield `None` and the caller draws the
//! triangle with the default material.

use std::hash::{Hash, Hasher};

use crate::config::SceneConfig;
use crate::model::{Color, PartialPropertyReference, PropertyIndex, PropertyReference, Triangle};

use super::resources::{Resource, ResourceTable};

/// Property references of one triangle after inheritance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriangleProperties {
    /// The whole triangle uses one entry
    Uniform(PropertyReference),
    /// Each vertex uses its own entry of the same group
    PerVertex([PropertyReference; 3]),
}

/// Combine a triangle's own property attributes with the inherited context
///
/// The group comes from the triangle or, failing that, from the context. The
/// indices come from the triangle; a triangle without indices uses the
/// context index.
///
/// # Example
///
/// ```
/// use threemf_scene::PartialPropertyReference;
/// use threemf_scene::model::{PropertyReference, Triangle};
/// use threemf_scene::scene::{TriangleProperties, resolve_triangle_properties};
///
/// let triangle = Triangle::new(0, 1, 2).with_uniform_index(3);
/// let inherited = PartialPropertyReference::new(Some(7), Some(0));
/// assert_eq!(
///     resolve_triangle_properties(&triangle, inherited),
///     Some(TriangleProperties::Uniform(PropertyReference::new(7, 3)))
/// );
/// ```
pub fn resolve_triangle_properties(
    triangle: &Triangle,
    inherited: PartialPropertyReference,
) -> Option<TriangleProperties> {
    let group_id = triangle.property_group.or(inherited.group_id)?;

    match triangle.property_index {
        Some(PropertyIndex::PerVertex(indices)) => Some(TriangleProperties::PerVertex(
            indices.map(|index| PropertyReference::new(group_id, index)),
        )),
        Some(PropertyIndex::Uniform(index)) => Some(TriangleProperties::Uniform(
            PropertyReference::new(group_id, index),
        )),
        None => inherited
            .index
            .map(|index| TriangleProperties::Uniform(PropertyReference::new(group_id, index))),
    }
}

/// Physically based material parameters resolved from display properties
#[derive(Debug, Clone)]
pub enum PbrMaterial {
    /// Metallic/roughness workflow
    Metallic {
        /// Base color
        diffuse: Color,
        /// Metallicness in `0.0..=1.0`
        metallicness: f64,
        /// Roughness in `0.0..=1.0`
        roughness: f64,
        /// Display name of the entry
        name: Option<String>,
    },
    /// Specular/glossiness workflow
    Specular {
        /// Base color
        diffuse: Color,
        /// Specular color
        specular_color: Color,
        /// Glossiness in `0.0..=1.0`
        glossiness: f64,
        /// Display name of the entry
        name: Option<String>,
    },
}

impl PbrMaterial {
    /// The base color
    pub fn diffuse(&self) -> Color {
        match self {
            PbrMaterial::Metallic { diffuse, .. } | PbrMaterial::Specular { diffuse, .. } => {
                *diffuse
            }
        }
    }

    /// The display name, if the entry has one
    pub fn name(&self) -> Option<&str> {
        match self {
            PbrMaterial::Metallic { name, .. } | PbrMaterial::Specular { name, .. } => {
                name.as_deref()
            }
        }
    }
}

// Floats compare by bit pattern so equal parameters group together and
// the type can key a hash map.
impl PartialEq for PbrMaterial {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                PbrMaterial::Metallic {
                    diffuse: d1,
                    metallicness: m1,
                    roughness: r1,
                    name: n1,
                },
                PbrMaterial::Metallic {
                    diffuse: d2,
                    metallicness: m2,
                    roughness: r2,
                    name: n2,
                },
            ) => {
                d1 == d2
                    && m1.to_bits() == m2.to_bits()
                    && r1.to_bits() == r2.to_bits()
                    && n1 == n2
            }
            (
                PbrMaterial::Specular {
                    diffuse: d1,
                    specular_color: s1,
                    glossiness: g1,
                    name: n1,
                },
                PbrMaterial::Specular {
                    diffuse: d2,
                    specular_color: s2,
                    glossiness: g2,
                    name: n2,
                },
            ) => d1 == d2 && s1 == s2 && g1.to_bits() == g2.to_bits() && n1 == n2,
            _ => false,
        }
    }
}

impl Eq for PbrMaterial {}

impl Hash for PbrMaterial {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            PbrMaterial::Metallic {
                diffuse,
                metallicness,
                roughness,
                name,
            } => {
                diffuse.hash(state);
                metallicness.to_bits().hash(state);
                roughness.to_bits().hash(state);
                name.hash(state);
            }
            PbrMaterial::Specular {
                diffuse,
                specular_color,
                glossiness,
                name,
            } => {
                diffuse.hash(state);
                specular_color.hash(state);
                glossiness.to_bits().hash(state);
                name.hash(state);
            }
        }
    }
}

/// Resolved appearance of one triangle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Material {
    /// One color per vertex, drawn with the default material
    VertexColors([Color; 3]),
    /// A physically based material
    Pbr(PbrMaterial),
}

impl Material {
    /// Whether every vertex color has zero alpha
    ///
    /// PBR materials are never filtered out.
    pub fn is_fully_transparent(&self) -> bool {
        match self {
            Material::VertexColors(colors) => colors.iter().all(Color::is_fully_transparent),
            Material::Pbr(_) => false,
        }
    }
}

/// Looks up colors and materials in a model's resources
#[derive(Debug, Clone)]
pub struct MaterialResolver<'a> {
    table: &'a ResourceTable<'a>,
    specular_glossiness: bool,
}

impl<'a> MaterialResolver<'a> {
    /// Create a resolver over a resource table
    pub fn new(table: &'a ResourceTable<'a>, config: &SceneConfig) -> Self {
        Self {
            table,
            specular_glossiness: config.specular_glossiness(),
        }
    }

    /// Color of a color or base material entry
    ///
    /// Also returns the reference into the group's display properties, when
    /// the group declares them.
    pub fn color_for(
        &self,
        reference: PropertyReference,
    ) -> Option<(Color, Option<PropertyReference>)> {
        let index = reference.index as usize;
        let (color, display_properties_id) = match self.table.get(reference.group_id)? {
            Resource::ColorGroup(group) => {
                (*group.colors.get(index)?, group.display_properties_id)
            }
            Resource::BaseMaterials(group) => (
                group.materials.get(index)?.display_color,
                group.display_properties_id,
            ),
            _ => return None,
        };

        let display = display_properties_id.map(|id| PropertyReference::new(id, reference.index));
        Some((color, display))
    }

    /// PBR material for a display properties entry
    ///
    /// Specular entries resolve only when specular/glossiness is enabled.
    pub fn pbr_material_for(
        &self,
        display: PropertyReference,
        base_color: Color,
    ) -> Option<PbrMaterial> {
        let index = display.index as usize;
        match self.table.get(display.group_id)? {
            Resource::MetallicDisplayProperties(group) => {
                let entry = group.metallics.get(index)?;
                Some(PbrMaterial::Metallic {
                    diffuse: base_color,
                    metallicness: entry.metallicness,
                    roughness: entry.roughness,
                    name: entry.name.clone(),
                })
            }
            Resource::SpecularDisplayProperties(group) if self.specular_glossiness => {
                let entry = group.speculars.get(index)?;
                Some(PbrMaterial::Specular {
                    diffuse: base_color,
                    specular_color: entry.specular_color,
                    glossiness: entry.glossiness,
                    name: entry.name.clone(),
                })
            }
            _ => None,
        }
    }

    /// Appearance of a triangle, or `None` for the default material
    pub fn material_for(
        &self,
        triangle: &Triangle,
        inherited: PartialPropertyReference,
    ) -> Option<Material> {
        match resolve_triangle_properties(triangle, inherited)? {
            TriangleProperties::PerVertex(references) => {
                let [c1, c2, c3] = references;
                Some(Material::VertexColors([
                    self.color_for(c1)?.0,
                    self.color_for(c2)?.0,
                    self.color_for(c3)?.0,
                ]))
            }
            TriangleProperties::Uniform(reference) => {
                let (color, display) = self.color_for(reference)?;
                match display.and_then(|display| self.pbr_material_for(display, color)) {
                    Some(pbr) => Some(Material::Pbr(pbr)),
                    None => Some(Material::VertexColors([color; 3])),
                }
            }
        }
    }
}
