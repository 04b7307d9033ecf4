//! Data structures representing parsed 3MF models

mod core;
mod material;
mod metadata;
mod property;
mod semantic;
mod transform;

pub use core::{
    Build, BuildItem, Component, ExpandedName, Mesh, Model, Object, ObjectContent, PropertyIndex,
    ResourceId, ResourceIndex, Resources, Triangle, Unit, Vertex,
};

pub use material::{
    BaseMaterial, BaseMaterialGroup, Color, ColorGroup, MetallicDisplayProperties,
    MetallicDisplayProperty, SpecularDisplayProperties, SpecularDisplayProperty, srgb_to_linear,
};

pub use metadata::{Metadata, MetadataName};

pub use property::{PartialPropertyReference, PropertyReference};

pub use semantic::PartSemantic;

pub use transform::{TRANSFORM_MATRIX_SIZE, Transform};
