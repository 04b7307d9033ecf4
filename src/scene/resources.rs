//! Lookup of resources by id across all resource kinds

use std::collections::HashMap;

use crate::model::{
    BaseMaterialGroup, ColorGroup, MetallicDisplayProperties, Object, ResourceId, Resources,
    SpecularDisplayProperties,
};

/// A borrowed resource of any kind
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    /// An object
    Object(&'a Object),
    /// A color group
    ColorGroup(&'a ColorGroup),
    /// A base materials group
    BaseMaterials(&'a BaseMaterialGroup),
    /// Metallic/roughness display properties
    MetallicDisplayProperties(&'a MetallicDisplayProperties),
    /// Specular/glossiness display properties
    SpecularDisplayProperties(&'a SpecularDisplayProperties),
}

/// Resources of a model indexed by their shared id namespace
///
/// When two resources claim the same id, the first one indexed wins.
/// Objects are indexed first, then color groups, base materials and the
/// display property groups.
#[derive(Debug, Clone)]
pub struct ResourceTable<'a> {
    resources: HashMap<ResourceId, Resource<'a>>,
}

impl<'a> ResourceTable<'a> {
    /// Index every resource of a model
    pub fn new(resources: &'a Resources) -> Self {
        let capacity = resources.objects.len()
            + resources.color_groups.len()
            + resources.base_material_groups.len()
            + resources.metallic_display_properties.len()
            + resources.specular_display_properties.len();
        let mut table = Self {
            resources: HashMap::with_capacity(capacity),
        };

        for object in &resources.objects {
            table.insert(object.id, Resource::Object(object));
        }
        for group in &resources.color_groups {
            table.insert(group.id, Resource::ColorGroup(group));
        }
        for group in &resources.base_material_groups {
            table.insert(group.id, Resource::BaseMaterials(group));
        }
        for group in &resources.metallic_display_properties {
            table.insert(group.id, Resource::MetallicDisplayProperties(group));
        }
        for group in &resources.specular_display_properties {
            table.insert(group.id, Resource::SpecularDisplayProperties(group));
        }

        table
    }

    fn insert(&mut self, id: ResourceId, resource: Resource<'a>) {
        if self.resources.contains_key(&id) {
            log::warn!("Duplicate resource id {}, keeping the first definition", id);
            return;
        }
        self.resources.insert(id, resource);
    }

    /// Resource with the given id
    pub fn get(&self, id: ResourceId) -> Option<Resource<'a>> {
        self.resources.get(&id).copied()
    }

    /// Object with the given id, if that id names an object
    pub fn object(&self, id: ResourceId) -> Option<&'a Object> {
        match self.get(id)? {
            Resource::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Number of indexed resources
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether no resources are indexed
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ColorGroup, Mesh, Object};

    #[test]
    fn test_lookup_by_kind() {
        let mut resources = Resources::new();
        resources.objects.push(Object::new(1, Mesh::new()));
        resources.color_groups.push(ColorGroup::new(2));

        let table = ResourceTable::new(&resources);
        assert_eq!(table.len(), 2);
        assert!(table.object(1).is_some());
        assert!(table.object(2).is_none());
        assert!(matches!(table.get(2), Some(Resource::ColorGroup(_))));
        assert!(table.get(3).is_none());
    }

    #[test]
    fn test_first_duplicate_wins() {
        let mut resources = Resources::new();
        resources.objects.push(Object::new(1, Mesh::new()).named("first"));
        resources.color_groups.push(ColorGroup::new(1));

        let table = ResourceTable::new(&resources);
        assert_eq!(table.len(), 1);
        assert_eq!(table.object(1).and_then(|o| o.name.as_deref()), Some("first"));
    }
}
