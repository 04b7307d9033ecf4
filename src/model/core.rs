//! Core 3MF types: objects, meshes, components and build items

use std::collections::HashMap;

use super::material::{
    BaseMaterialGroup, ColorGroup, MetallicDisplayProperties, SpecularDisplayProperties,
};
use super::metadata::Metadata;
use super::property::PartialPropertyReference;
use super::semantic::PartSemantic;
use super::transform::Transform;

/// Identifier of a resource, unique within a package's resource namespace
pub type ResourceId = u32;

/// Index of an entry within a property group
pub type ResourceIndex = u32;

/// Unit of measurement declared by a 3MF model
///
/// Every unit maps to a multiplier converting model coordinates into
/// millimeters, which is the scale applied once at the scene root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    /// 0.001 mm
    Micron,
    /// 1 mm
    Millimeter,
    /// 10 mm
    Centimeter,
    /// 25.4 mm
    Inch,
    /// 304.8 mm
    Foot,
    /// 1000 mm
    Meter,
}

impl Unit {
    /// Parse a unit from its XML attribute value
    pub fn from_xml_value(value: &str) -> Option<Self> {
        match value {
            "micron" => Some(Unit::Micron),
            "millimeter" => Some(Unit::Millimeter),
            "centimeter" => Some(Unit::Centimeter),
            "inch" => Some(Unit::Inch),
            "foot" => Some(Unit::Foot),
            "meter" => Some(Unit::Meter),
            _ => None,
        }
    }

    /// The XML attribute value for this unit
    pub fn as_xml_value(&self) -> &'static str {
        match self {
            Unit::Micron => "micron",
            Unit::Millimeter => "millimeter",
            Unit::Centimeter => "centimeter",
            Unit::Inch => "inch",
            Unit::Foot => "foot",
            Unit::Meter => "meter",
        }
    }

    /// Number of millimeters in one unit
    ///
    /// # Example
    ///
    /// ```
    /// use threemf_scene::Unit;
    ///
    /// assert_eq!(Unit::Inch.millimeters_per_unit(), 25.4);
    /// ```
    pub fn millimeters_per_unit(&self) -> f64 {
        match self {
            Unit::Micron => 0.001,
            Unit::Millimeter => 1.0,
            Unit::Centimeter => 10.0,
            Unit::Inch => 25.4,
            Unit::Foot => 304.8,
            Unit::Meter => 1000.0,
        }
    }
}

/// A vertex in 3D space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
    /// Z coordinate
    pub z: f64,
}

impl Vertex {
    /// Create a new vertex
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// How a triangle indexes into its property group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyIndex {
    /// One index shared by all three vertices (`p1` alone)
    Uniform(ResourceIndex),
    /// One index per vertex (`p1`, `p2` and `p3`)
    PerVertex([ResourceIndex; 3]),
}

/// A triangle defined by three vertex indices
///
/// Property attributes are optional; a triangle without them inherits the
/// group and index of its object, or of the component that placed it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// Index of first vertex
    pub v1: usize,
    /// Index of second vertex
    pub v2: usize,
    /// Index of third vertex
    pub v3: usize,
    /// Property group for this triangle (`pid`)
    pub property_group: Option<ResourceId>,
    /// Property index for this triangle (`p1`, or `p1`..`p3`)
    pub property_index: Option<PropertyIndex>,
}

impl Triangle {
    /// Create a new triangle without properties
    pub fn new(v1: usize, v2: usize, v3: usize) -> Self {
        Self {
            v1,
            v2,
            v3,
            property_group: None,
            property_index: None,
        }
    }

    /// Set the triangle's own property group
    pub fn with_group(mut self, group: ResourceId) -> Self {
        self.property_group = Some(group);
        self
    }

    /// Use a single property index for the whole triangle
    pub fn with_uniform_index(mut self, index: ResourceIndex) -> Self {
        self.property_index = Some(PropertyIndex::Uniform(index));
        self
    }

    /// Use a distinct property index per vertex
    pub fn with_vertex_indices(
        mut self,
        p1: ResourceIndex,
        p2: ResourceIndex,
        p3: ResourceIndex,
    ) -> Self {
        self.property_index = Some(PropertyIndex::PerVertex([p1, p2, p3]));
        self
    }

    /// The three vertex indices in winding order
    pub fn vertices(&self) -> [usize; 3] {
        [self.v1, self.v2, self.v3]
    }
}

/// A triangle mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// List of vertices
    pub vertices: Vec<Vertex>,
    /// List of triangles
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the first triangle referencing a vertex outside the vertex list
    pub fn first_invalid_triangle(&self) -> Option<(usize, usize)> {
        let count = self.vertices.len();
        self.triangles
            .iter()
            .enumerate()
            .find_map(|(index, triangle)| {
                triangle
                    .vertices()
                    .into_iter()
                    .find(|&v| v >= count)
                    .map(|v| (index, v))
            })
    }
}

/// A component that places another object with an optional transformation
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    /// ID of the referenced object
    pub object_id: ResourceId,
    /// Optional affine transform applied to the referenced object
    pub transform: Option<Transform>,
    /// Property context handed down to the referenced object's triangles
    pub properties: PartialPropertyReference,
}

impl Component {
    /// Create a new component with the given object reference
    pub fn new(object_id: ResourceId) -> Self {
        Self {
            object_id,
            transform: None,
            properties: PartialPropertyReference::default(),
        }
    }

    /// Create a new component with a transformation
    pub fn with_transform(object_id: ResourceId, transform: Transform) -> Self {
        Self {
            transform: Some(transform),
            ..Self::new(object_id)
        }
    }
}

/// What an object is made of
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectContent {
    /// A triangle mesh
    Mesh(Mesh),
    /// An assembly of other objects
    Components(Vec<Component>),
}

/// A 3D object resource
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    /// Object ID
    pub id: ResourceId,
    /// Object name
    pub name: Option<String>,
    /// Part number (`partnumber` attribute)
    pub part_number: Option<String>,
    /// Default property group and index (`pid`/`pindex`) for the object's triangles
    pub properties: PartialPropertyReference,
    /// Mesh or components
    pub content: ObjectContent,
}

impl Object {
    /// Create a new mesh object
    pub fn new(id: ResourceId, mesh: Mesh) -> Self {
        Self {
            id,
            name: None,
            part_number: None,
            properties: PartialPropertyReference::default(),
            content: ObjectContent::Mesh(mesh),
        }
    }

    /// Create a new object assembled from components
    pub fn with_components(id: ResourceId, components: Vec<Component>) -> Self {
        Self {
            content: ObjectContent::Components(components),
            ..Self::new(id, Mesh::new())
        }
    }

    /// Set the object's name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The mesh if this object is a mesh object
    pub fn mesh(&self) -> Option<&Mesh> {
        match &self.content {
            ObjectContent::Mesh(mesh) => Some(mesh),
            ObjectContent::Components(_) => None,
        }
    }
}

/// Resources section of a 3MF model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resources {
    /// List of objects
    pub objects: Vec<Object>,
    /// Color groups from the materials extension
    pub color_groups: Vec<ColorGroup>,
    /// Base material groups
    pub base_material_groups: Vec<BaseMaterialGroup>,
    /// Metallic/roughness display properties
    pub metallic_display_properties: Vec<MetallicDisplayProperties>,
    /// Specular/glossiness display properties
    pub specular_display_properties: Vec<SpecularDisplayProperties>,
}

impl Resources {
    /// Create a new empty resources collection
    pub fn new() -> Self {
        Self::default()
    }
}

/// An attribute name resolved against the document's namespace declarations
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpandedName {
    /// Namespace URI, or `None` for unprefixed attributes
    pub namespace: Option<String>,
    /// Local part of the name
    pub local_name: String,
}

impl ExpandedName {
    /// Create an expanded name
    pub fn new(namespace: Option<&str>, local_name: &str) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
            local_name: local_name.to_string(),
        }
    }
}

/// A build item referencing an object to place in the scene
#[derive(Debug, Clone, PartialEq)]
pub struct BuildItem {
    /// ID of the object to build
    pub object_id: ResourceId,
    /// Optional placement transform
    pub transform: Option<Transform>,
    /// Stable part identifier (`partnumber` attribute)
    pub part_number: Option<String>,
    /// Extension attributes keyed by namespace and local name
    pub custom_attributes: HashMap<ExpandedName, String>,
}

impl BuildItem {
    /// Create a new build item
    pub fn new(object_id: ResourceId) -> Self {
        Self {
            object_id,
            transform: None,
            part_number: None,
            custom_attributes: HashMap::new(),
        }
    }

    /// Value of an extension attribute
    pub fn custom_attribute(&self, namespace: &str, local_name: &str) -> Option<&str> {
        self.custom_attributes
            .get(&ExpandedName::new(Some(namespace), local_name))
            .map(String::as_str)
    }

    /// The item's semantic tag, defaulting to solid when absent or unrecognized
    pub fn semantic(&self) -> PartSemantic {
        self.custom_attribute(PartSemantic::NAMESPACE, PartSemantic::ATTRIBUTE)
            .and_then(PartSemantic::from_xml_value)
            .unwrap_or_default()
    }

    /// Tag the item with a semantic
    pub fn set_semantic(&mut self, semantic: PartSemantic) {
        self.custom_attributes.insert(
            ExpandedName::new(Some(PartSemantic::NAMESPACE), PartSemantic::ATTRIBUTE),
            semantic.as_xml_value().to_string(),
        );
    }
}

/// Build section specifying which objects to place
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Build {
    /// List of items to build
    pub items: Vec<BuildItem>,
}

impl Build {
    /// Create a new empty build section
    pub fn new() -> Self {
        Self::default()
    }
}

/// A parsed 3MF model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    /// Declared unit, if any
    pub unit: Option<Unit>,
    /// Package-level metadata in document order
    pub metadata: Vec<Metadata>,
    /// Resources (objects and property groups)
    pub resources: Resources,
    /// Build specification
    pub build: Build,
}

impl Model {
    /// Create a new empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Millimeters per model unit; 1 when the unit is unspecified
    pub fn unit_multiplier(&self) -> f64 {
        self.unit.map_or(1.0, |unit| unit.millimeters_per_unit())
    }

    /// Get a metadata value by name
    pub fn metadata_value(&self, name: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|entry| entry.name.as_str() == name)
            .map(|entry| entry.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_multipliers() {
        assert_eq!(Unit::Micron.millimeters_per_unit(), 0.001);
        assert_eq!(Unit::Centimeter.millimeters_per_unit(), 10.0);
        assert_eq!(Unit::Foot.millimeters_per_unit(), 304.8);
        assert_eq!(Unit::Meter.millimeters_per_unit(), 1000.0);
        assert_eq!(Unit::from_xml_value("inch"), Some(Unit::Inch));
        assert_eq!(Unit::from_xml_value("furlong"), None);
    }

    #[test]
    fn test_default_unit_multiplier() {
        let mut model = Model::new();
        assert_eq!(model.unit_multiplier(), 1.0);
        model.unit = Some(Unit::Inch);
        assert_eq!(model.unit_multiplier(), 25.4);
    }

    #[test]
    fn test_first_invalid_triangle() {
        let mut mesh = Mesh::new();
        mesh.vertices.push(Vertex::new(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::new(1.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::new(0.0, 1.0, 0.0));
        mesh.triangles.push(Triangle::new(0, 1, 2));
        assert_eq!(mesh.first_invalid_triangle(), None);

        mesh.triangles.push(Triangle::new(0, 5, 2));
        assert_eq!(mesh.first_invalid_triangle(), Some((1, 5)));
    }

    #[test]
    fn test_item_semantic_defaults_to_solid() {
        let mut item = BuildItem::new(1);
        assert_eq!(item.semantic(), PartSemantic::Solid);

        item.set_semantic(PartSemantic::Visual);
        assert_eq!(item.semantic(), PartSemantic::Visual);

        item.custom_attributes.insert(
            ExpandedName::new(Some(PartSemantic::NAMESPACE), PartSemantic::ATTRIBUTE),
            "decorative".to_string(),
        );
        assert_eq!(item.semantic(), PartSemantic::Solid);
    }

    #[test]
    fn test_semantic_requires_namespace() {
        let mut item = BuildItem::new(1);
        item.custom_attributes.insert(
            ExpandedName::new(None, PartSemantic::ATTRIBUTE),
            "context".to_string(),
        );
        assert_eq!(item.semantic(), PartSemantic::Solid);
    }
}
