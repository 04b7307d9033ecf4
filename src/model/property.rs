//! References from triangles, objects and components into property groups

use super::core::{ResourceId, ResourceIndex};

/// Points to one entry in a property group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyReference {
    /// The referenced group
    pub group_id: ResourceId,
    /// Entry within the group
    pub index: ResourceIndex,
}

impl PropertyReference {
    /// Create a new property reference
    pub fn new(group_id: ResourceId, index: ResourceIndex) -> Self {
        Self { group_id, index }
    }
}

/// Property context inherited down the object tree
///
/// Either half may be missing: an object can name a group without an index,
/// and a triangle can supply its own index while borrowing the group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PartialPropertyReference {
    /// Group, if known at this level
    pub group_id: Option<ResourceId>,
    /// Index, if known at this level
    pub index: Option<ResourceIndex>,
}

impl PartialPropertyReference {
    /// Create a partial reference
    pub fn new(group_id: Option<ResourceId>, index: Option<ResourceIndex>) -> Self {
        Self { group_id, index }
    }

    /// Fill the halves missing here from `fallback`
    ///
    /// # Example
    ///
    /// ```
    /// use threemf_scene::PartialPropertyReference;
    ///
    /// let own = PartialPropertyReference::new(None, Some(2));
    /// let parent = PartialPropertyReference::new(Some(5), Some(0));
    /// assert_eq!(own.or(parent), PartialPropertyReference::new(Some(5), Some(2)));
    /// ```
    pub fn or(self, fallback: Self) -> Self {
        Self {
            group_id: self.group_id.or(fallback.group_id),
            index: self.index.or(fallback.index),
        }
    }

    /// True when neither group nor index is set
    pub fn is_empty(&self) -> bool {
        self.group_id.is_none() && self.index.is_none()
    }
}

impl From<PropertyReference> for PartialPropertyReference {
    fn from(reference: PropertyReference) -> Self {
        Self::new(Some(reference.group_id), Some(reference.index))
    }
}
