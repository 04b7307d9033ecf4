//! Package-level metadata entries

use std::cmp::Ordering;
use std::fmt;

/// Name of a metadata entry
///
/// The 3MF core specification defines a set of well-known names; anything
/// else is kept verbatim as a custom name. Names order well-known entries
/// first, in their conventional display order, followed by custom names
/// alphabetically.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MetadataName {
    /// `Title`
    Title,
    /// `Designer`
    Designer,
    /// `Description`
    Description,
    /// `Copyright`
    Copyright,
    /// `LicenseTerms`
    LicenseTerms,
    /// `Rating`
    Rating,
    /// `CreationDate`
    CreationDate,
    /// `ModificationDate`
    ModificationDate,
    /// `Application`
    Application,
    /// Any other name, including namespaced ones such as `vendor:Version`
    Custom(String),
}

impl MetadataName {
    /// Parse the `name` attribute of a metadata element
    pub fn parse(name: &str) -> Self {
        match name {
            "Title" => MetadataName::Title,
            "Designer" => MetadataName::Designer,
            "Description" => MetadataName::Description,
            "Copyright" => MetadataName::Copyright,
            "LicenseTerms" => MetadataName::LicenseTerms,
            "Rating" => MetadataName::Rating,
            "CreationDate" => MetadataName::CreationDate,
            "ModificationDate" => MetadataName::ModificationDate,
            "Application" => MetadataName::Application,
            other => MetadataName::Custom(other.to_string()),
        }
    }

    /// The name as written in the document
    pub fn as_str(&self) -> &str {
        match self {
            MetadataName::Title => "Title",
            MetadataName::Designer => "Designer",
            MetadataName::Description => "Description",
            MetadataName::Copyright => "Copyright",
            MetadataName::LicenseTerms => "LicenseTerms",
            MetadataName::Rating => "Rating",
            MetadataName::CreationDate => "CreationDate",
            MetadataName::ModificationDate => "ModificationDate",
            MetadataName::Application => "Application",
            MetadataName::Custom(name) => name,
        }
    }

    /// Human-readable label, e.g. "License Terms"
    pub fn label(&self) -> &str {
        match self {
            MetadataName::LicenseTerms => "License Terms",
            MetadataName::CreationDate => "Creation Date",
            MetadataName::ModificationDate => "Modification Date",
            other => other.as_str(),
        }
    }

    fn standard_rank(&self) -> Option<u8> {
        match self {
            MetadataName::Title => Some(0),
            MetadataName::Designer => Some(1),
            MetadataName::Description => Some(2),
            MetadataName::Copyright => Some(3),
            MetadataName::LicenseTerms => Some(4),
            MetadataName::Rating => Some(5),
            MetadataName::CreationDate => Some(6),
            MetadataName::ModificationDate => Some(7),
            MetadataName::Application => Some(8),
            MetadataName::Custom(_) => None,
        }
    }
}

impl Ord for MetadataName {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.standard_rank(), other.standard_rank()) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.as_str().cmp(other.as_str()),
        }
    }
}

impl PartialOrd for MetadataName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for MetadataName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metadata entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    /// Entry name
    pub name: MetadataName,
    /// Text content
    pub value: String,
    /// The `preserve` flag, if declared
    pub preserve: Option<bool>,
}

impl Metadata {
    /// Create a new metadata entry
    pub fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: MetadataName::parse(name),
            value: value.into(),
            preserve: None,
        }
    }
}
