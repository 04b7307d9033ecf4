//! OPC (Open Packaging Conventions) handling for 3MF files
//!
//! 3MF files are ZIP archives following the OPC standard. The package
//! relationships (`_rels/.rels`) name the part holding the 3D model.

use crate::error::{Error, Result};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::io::{Read, Seek};
use zip::ZipArchive;
use zip::result::ZipError;

/// Conventional model part path, used when the relationships name no model
pub const MODEL_PATH: &str = "3D/3dmodel.model";

/// Content types file path
pub const CONTENT_TYPES_PATH: &str = "[Content_Types].xml";

/// Relationships file path
pub const RELS_PATH: &str = "_rels/.rels";

/// 3D model relationship type
pub const MODEL_REL_TYPE: &str = "http://schemas.microsoft.com/3dmanufacturing/2013/01/3dmodel";

/// Represents an OPC package (3MF file)
pub struct Package<R: Read> {
    archive: ZipArchive<R>,
}

impl<R: Read + Seek> Package<R> {
    /// Open a 3MF package from a reader
    ///
    /// Fails when the archive cannot be read or lacks the content types or
    /// package relationships parts.
    pub fn open(reader: R) -> Result<Self> {
        let archive = ZipArchive::new(reader)?;
        let mut package = Self { archive };

        for required in [CONTENT_TYPES_PATH, RELS_PATH] {
            if !package.has_file(required) {
                return Err(Error::invalid_format_context(
                    "OPC structure",
                    &format!("Missing required file: {}", required),
                ));
            }
        }

        Ok(package)
    }

    /// Get the main 3D model file content
    pub fn model_xml(&mut self) -> Result<String> {
        let model_path = self.model_path()?;
        self.file(&model_path)
    }

    /// Discover the model part path from the package relationships
    ///
    /// The leading slash of the relationship target is removed and
    /// percent-encoded characters are decoded.
    pub fn model_path(&mut self) -> Result<String> {
        let rels_content = self.file(RELS_PATH)?;

        let mut reader = Reader::from_str(&rels_content);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    let name = e.name();
                    let name_str = std::str::from_utf8(name.as_ref())
                        .map_err(|e| Error::InvalidXml(e.to_string()))?;

                    if name_str.ends_with("Relationship") {
                        let mut target = None;
                        let mut rel_type = None;

                        for attr in e.attributes() {
                            let attr = attr?;
                            let value = std::str::from_utf8(&attr.value)
                                .map_err(|e| Error::InvalidXml(e.to_string()))?;
                            match attr.key.as_ref() {
                                b"Target" => target = Some(value.to_string()),
                                b"Type" => rel_type = Some(value.to_string()),
                                _ => {}
                            }
                        }

                        if let (Some(target), Some(rel_type)) = (target, rel_type)
                            && rel_type == MODEL_REL_TYPE
                        {
                            return Ok(Self::normalize_part_name(&target));
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        if self.has_file(MODEL_PATH) {
            log::debug!(
                "No model relationship in {}, falling back to {}",
                RELS_PATH,
                MODEL_PATH
            );
            return Ok(MODEL_PATH.to_string());
        }

        Err(Error::MissingFile(
            "3D model relationship not found".to_string(),
        ))
    }

    fn normalize_part_name(target: &str) -> String {
        let stripped = target.strip_prefix('/').unwrap_or(target);
        match urlencoding::decode(stripped) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => stripped.to_string(),
        }
    }

    /// Get a file by name from the archive as text
    ///
    /// Damaged entries (bad local header, corrupt compressed data, checksum
    /// mismatch) are reported as [`Error::Zip`], not as missing files.
    pub fn file(&mut self, name: &str) -> Result<String> {
        let mut file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Err(Error::MissingFile(name.to_string())),
            Err(e) => return Err(Error::Zip(e)),
        };
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|e| Error::Zip(ZipError::Io(e)))?;
        String::from_utf8(bytes).map_err(|e| {
            Error::invalid_format_context(name, &format!("not valid UTF-8: {}", e))
        })
    }

    /// Check if a file exists in the archive
    pub fn has_file(&self, name: &str) -> bool {
        self.archive.index_for_name(name).is_some()
    }
}
