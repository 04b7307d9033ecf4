//! Per-item semantic tag carried as a vendor extension attribute

/// How a build item takes part in the model
///
/// Solid parts are the printable geometry and get edge overlays. Context
/// parts show surroundings, visual parts are decoration; neither is drawn
/// with edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PartSemantic {
    /// Printable geometry
    #[default]
    Solid,
    /// Surrounding geometry shown for reference
    Context,
    /// Decorative, non-physical geometry
    Visual,
}

impl PartSemantic {
    /// Namespace of the `semantic` attribute on build items
    pub const NAMESPACE: &'static str = "https://cadova.org/3mf";

    /// Local name of the attribute
    pub const ATTRIBUTE: &'static str = "semantic";

    /// Parse an attribute value
    pub fn from_xml_value(value: &str) -> Option<Self> {
        match value {
            "solid" => Some(PartSemantic::Solid),
            "context" => Some(PartSemantic::Context),
            "visual" => Some(PartSemantic::Visual),
            _ => None,
        }
    }

    /// The attribute value for this semantic
    pub fn as_xml_value(&self) -> &'static str {
        match self {
            PartSemantic::Solid => "solid",
            PartSemantic::Context => "context",
            PartSemantic::Visual => "visual",
        }
    }
}
