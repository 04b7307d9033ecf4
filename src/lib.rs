//! # threemf-scene
//!
//! Turns 3MF (3D Manufacturing Format) packages into render-ready scenes.
//!
//! A 3MF file is a ZIP container following the Open Packaging Conventions
//! with an XML model inside. This crate reads that model and converts it
//! into a [`RenderModel`]: a node tree with per-material triangle buffers,
//! sharp/smooth edge line buffers and one [`Part`] per build item.
//!
//! ## Features
//!
//! - Pure Rust implementation with no unsafe code
//! - Colors, base materials and metallic/roughness display properties
//!   resolved per triangle, with property inheritance through components
//! - Crease detection for edge overlays
//! - Unit scaling, part statistics and bounding boxes
//! - Reload handling that keeps the previous scene on failure
//! - Distinct meshes built in parallel (`parallel` feature, on by default)
//!
//! ## Example
//!
//! ```no_run
//! use threemf_scene::{Document, SceneConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let document = Document::open("model.3mf", SceneConfig::default())?;
//! let model = document.model();
//!
//! for part in model.parts() {
//!     println!("{}: {} triangles", part.display_name(), part.statistics.triangle_count);
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod document;
pub mod error;
pub mod model;
pub mod opc;
pub mod parser;
pub mod scene;
pub mod view;

pub use config::{BoundaryEdgePolicy, SceneConfig};
pub use document::{Document, LoadOutcome, LoadTicket, ReloadOutcome};
pub use error::{Error, Result};
pub use model::{
    Color, Metadata, MetadataName, Model, PartSemantic, PartialPropertyReference, Transform, Unit,
};
pub use scene::{BoundingBox, Part, RenderModel, Statistics, build_render_model};
pub use view::{EdgeVisibility, PartVisibility};

use std::io::{Read, Seek};

impl Model {
    /// Parse a 3MF file from a reader
    ///
    /// # Arguments
    ///
    /// * `reader` - A reader containing the 3MF file data
    ///
    /// # Example
    ///
    /// ```no_run
    /// use threemf_scene::Model;
    /// use std::fs::File;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let file = File::open("model.3mf")?;
    /// let model = Model::from_reader(file)?;
    /// println!("Model contains {} objects", model.resources.objects.len());
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        parser::parse_3mf(reader)
    }
}

impl RenderModel {
    /// Parse a 3MF file and build its scene
    ///
    /// # Arguments
    ///
    /// * `reader` - A reader containing the 3MF file data
    /// * `config` - Scene building options
    pub fn from_reader<R: Read + Seek>(reader: R, config: &SceneConfig) -> Result<Self> {
        document::load_render_model(reader, config)
    }
}
