//! Error types for 3MF scene building
//!
//! Every error carries a code for categorization and a message with enough
//! context to locate the offending element or resource.
//!
//! # Error Codes
//!
//! Error codes follow the pattern: `E<category><number>`
//!
//! Categories:
//! - **E1xxx**: I/O and archive errors
//! - **E2xxx**: XML parsing and structure errors
//! - **E3xxx**: Model structure errors found while building the scene
//!
//! ## Common Error Codes
//!
//! - `E1001`: I/O error reading file
//! - `E1002`: ZIP archive format error
//! - `E1003`: Missing required file in archive
//! - `E2001`: XML parsing error
//! - `E2002`: XML attribute error
//! - `E2003`: Invalid XML structure
//! - `E2004`: Invalid 3MF format
//! - `E3002`: Numeric parse error
//! - `E3003`: Referenced object does not exist
//! - `E3004`: Component graph contains a cycle
//! - `E3005`: Mesh references a vertex that does not exist
//!
//! Only structural errors abort a build. Unresolvable colors and materials
//! fall back to the default appearance and never surface here.

use std::io;
use thiserror::Error;

/// Result type for 3MF operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when loading a 3MF package or building its scene
#[derive(Error, Debug)]
pub enum Error {
    /// IO error occurred while reading the file
    ///
    /// **Error Code**: E1001
    ///
    /// **Common Causes**:
    /// - File not found
    /// - Insufficient permissions
    /// - Disk read error
    #[error("[E1001] I/O error: {0}")]
    Io(#[from] io::Error),

    /// ZIP archive error
    ///
    /// **Error Code**: E1002
    ///
    /// **Common Causes**:
    /// - Corrupted ZIP file
    /// - Archive still being written by another process
    /// - Truncated archive
    ///
    /// **Suggestions**:
    /// - Verify the file is a valid 3MF (ZIP) archive
    /// - Wait for the exporting application to finish and reload
    #[error("[E1002] ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Missing required file in the 3MF archive
    ///
    /// **Error Code**: E1003
    ///
    /// **Common Causes**:
    /// - Incomplete 3MF package
    /// - Missing 3D model part
    /// - Missing relationships file
    ///
    /// **Suggestions**:
    /// - Ensure the archive contains `[Content_Types].xml` and `_rels/.rels`
    /// - Check that the model relationship targets an existing part
    #[error("[E1003] Missing required file: {0}")]
    MissingFile(String),

    /// XML parsing error
    ///
    /// **Error Code**: E2001
    ///
    /// **Common Causes**:
    /// - Malformed XML syntax
    /// - Invalid character encoding
    /// - Unclosed tags
    #[error("[E2001] XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// XML attribute error
    ///
    /// **Error Code**: E2002
    ///
    /// **Common Causes**:
    /// - Malformed attribute syntax
    /// - Duplicate attribute
    /// - Attribute value with invalid escapes
    #[error("[E2002] XML attribute error: {0}")]
    XmlAttr(String),

    /// Invalid XML structure
    ///
    /// **Error Code**: E2003
    ///
    /// **Common Causes**:
    /// - Missing required attributes
    /// - Invalid enumeration values (e.g. an unknown unit)
    /// - DTD declarations
    ///
    /// **Suggestions**:
    /// - Check element hierarchy and attributes against the 3MF core specification
    #[error("[E2003] Invalid XML structure: {0}")]
    InvalidXml(String),

    /// Invalid 3MF format
    ///
    /// **Error Code**: E2004
    ///
    /// **Common Causes**:
    /// - Non-compliant OPC structure
    /// - Missing model relationship
    ///
    /// **Suggestions**:
    /// - Verify the file was exported correctly
    #[error("[E2004] Invalid 3MF format: {0}")]
    InvalidFormat(String),

    /// Parse error for numeric values, colors or transforms
    ///
    /// **Error Code**: E3002
    ///
    /// **Common Causes**:
    /// - Invalid number format
    /// - Transform with a value count other than 12
    /// - Non-finite coordinates
    ///
    /// **Suggestions**:
    /// - Verify numeric values use proper format (e.g., "1.5" not "1,5")
    #[error("[E3002] Parse error: {0}")]
    ParseError(String),

    /// A build item or component references an object that does not exist
    ///
    /// **Error Code**: E3003
    ///
    /// **Common Causes**:
    /// - Dangling `objectid` attribute
    /// - The id refers to a property group instead of an object
    ///
    /// **Suggestions**:
    /// - Check that every `objectid` matches an `<object id="...">` in the resources
    #[error("[E3003] Missing object {object_id} referenced by {referenced_by}")]
    MissingObject {
        /// The id that could not be resolved
        object_id: u32,
        /// Description of the referencing element (build item or component)
        referenced_by: String,
    },

    /// The component graph contains a cycle
    ///
    /// **Error Code**: E3004
    ///
    /// **Common Causes**:
    /// - An object that (directly or indirectly) includes itself as a component
    ///
    /// **Suggestions**:
    /// - Re-export the model; valid 3MF component graphs are acyclic
    #[error("[E3004] Circular component reference: {0}")]
    CyclicReference(String),

    /// A mesh is structurally invalid
    ///
    /// **Error Code**: E3005
    ///
    /// **Common Causes**:
    /// - Triangle vertex index beyond the vertex list
    ///
    /// **Suggestions**:
    /// - Verify all vertex indices are within bounds
    #[error("[E3005] Invalid mesh: {0}")]
    InvalidMesh(String),
}

impl From<std::num::ParseFloatError> for Error {
    fn from(err: std::num::ParseFloatError) -> Self {
        Error::ParseError(format!("Failed to parse floating-point number: {}", err))
    }
}

impl From<std::num::ParseIntError> for Error {
    fn from(err: std::num::ParseIntError) -> Self {
        Error::ParseError(format!("Failed to parse integer: {}", err))
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlAttr(format!("Attribute parsing failed: {}", err))
    }
}

impl Error {
    /// Create an InvalidXml error with element context
    ///
    /// # Arguments
    /// * `element` - The XML element name where the error occurred
    /// * `message` - Description of the error
    pub fn invalid_xml_element(element: &str, message: &str) -> Self {
        Error::InvalidXml(format!("Element '<{}>': {}", element, message))
    }

    /// Create an InvalidXml error for a missing required attribute
    ///
    /// # Arguments
    /// * `element` - The XML element name
    /// * `attribute` - The missing attribute name
    ///
    /// # Example
    /// ```
    /// use threemf_scene::Error;
    ///
    /// let err = Error::missing_attribute("object", "id");
    /// assert!(err.to_string().contains("[E2003]"));
    /// ```
    pub fn missing_attribute(element: &str, attribute: &str) -> Self {
        Error::InvalidXml(format!(
            "Element '<{}>' is missing required attribute '{}'",
            element, attribute
        ))
    }

    /// Create an InvalidFormat error with context about what structure is invalid
    ///
    /// # Arguments
    /// * `context` - What part of the format is invalid (e.g., "OPC structure")
    /// * `message` - Description of the error
    pub fn invalid_format_context(context: &str, message: &str) -> Self {
        Error::InvalidFormat(format!("{}: {}", context, message))
    }

    /// Create a ParseError with context about what was being parsed
    ///
    /// # Arguments
    /// * `field_name` - The name of the field being parsed (e.g., "vertex x coordinate")
    /// * `value` - The value that failed to parse
    /// * `expected_type` - The expected type (e.g., "floating-point number")
    pub fn parse_error_with_context(field_name: &str, value: &str, expected_type: &str) -> Self {
        Error::ParseError(format!(
            "Failed to parse '{}': expected {}, got '{}'",
            field_name, expected_type, value
        ))
    }

    /// Returns true for errors caused by an unreadable archive
    ///
    /// This covers a truncated central directory as well as damaged entries
    /// found while extracting a part. A package that is still being written by the exporting application
    /// typically fails this way, so callers watching the file can retry later.
    pub fn is_incomplete_archive(&self) -> bool {
        matches!(self, Error::Zip(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_in_messages() {
        let io_err = Error::Io(io::Error::new(io::ErrorKind::NotFound, "test"));
        assert!(io_err.to_string().contains("[E1001]"));

        let missing_file = Error::MissingFile("3D/3dmodel.model".to_string());
        assert!(missing_file.to_string().contains("[E1003]"));

        let parse_err = Error::ParseError("test".to_string());
        assert!(parse_err.to_string().contains("[E3002]"));

        let missing_object = Error::MissingObject {
            object_id: 7,
            referenced_by: "build item #0".to_string(),
        };
        assert!(missing_object.to_string().contains("[E3003]"));
        assert!(missing_object.to_string().contains("object 7"));

        let cycle = Error::CyclicReference("1 → 2 → 1".to_string());
        assert!(cycle.to_string().contains("[E3004]"));

        let mesh = Error::InvalidMesh("vertex 9 out of range".to_string());
        assert!(mesh.to_string().contains("[E3005]"));
    }

    #[test]
    fn test_invalid_xml_element_helper() {
        let err = Error::invalid_xml_element("vertex", "Missing required 'x' attribute");
        assert!(err.to_string().contains("Element '<vertex>'"));
        assert!(err.to_string().contains("[E2003]"));
    }

    #[test]
    fn test_missing_attribute_helper() {
        let err = Error::missing_attribute("object", "id");
        assert!(err.to_string().contains("Element '<object>'"));
        assert!(err.to_string().contains("missing required attribute 'id'"));
    }

    #[test]
    fn test_invalid_format_context_helper() {
        let err = Error::invalid_format_context("OPC structure", "Missing relationship");
        assert!(err.to_string().contains("OPC structure: Missing relationship"));
        assert!(err.to_string().contains("[E2004]"));
    }

    #[test]
    fn test_parse_error_with_context_helper() {
        let err = Error::parse_error_with_context("transform", "1 0 0", "12 numbers");
        assert!(err.to_string().contains("transform"));
        assert!(err.to_string().contains("'1 0 0'"));
        assert!(err.to_string().contains("[E3002]"));
    }

    #[test]
    fn test_parse_float_error_conversion() {
        let parse_err: std::num::ParseFloatError = "not_a_number".parse::<f64>().unwrap_err();
        let err = Error::from(parse_err);
        assert!(err.to_string().contains("Failed to parse floating-point number"));
    }

    #[test]
    fn test_incomplete_archive_classification() {
        let zip_err = Error::Zip(zip::result::ZipError::FileNotFound);
        assert!(zip_err.is_incomplete_archive());
        assert!(!Error::MissingFile("x".to_string()).is_incomplete_archive());

        let corrupt_entry = Error::Zip(zip::result::ZipError::Io(io::Error::new(
            io::ErrorKind::InvalidData,
            "Invalid checksum",
        )));
        assert!(corrupt_entry.is_incomplete_archive());
    }
}
