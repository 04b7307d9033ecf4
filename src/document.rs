//! A loaded 3MF file and its reload lifecycle
//!
//! A [`Document`] owns the most recently published [`RenderModel`]. Reloads
//! replace it wholesale; a reload that fails leaves the previous model in
//! place. Loads can run elsewhere (for example on a worker thread) by taking
//! a [`LoadTicket`] first: only the result for the newest ticket is
//! published.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime};

use crate::config::SceneConfig;
use crate::error::Result;
use crate::parser::parse_3mf;
use crate::scene::{RenderModel, build_render_model};

/// Result of a reload request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// A new model was published
    Reloaded,
    /// The archive could not be read, most likely because it is still being
    /// written; the previous model was kept
    Incomplete,
    /// Nothing to reload
    Unchanged,
}

/// Claim on publishing the result of one load
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket {
    generation: u64,
}

impl LoadTicket {
    /// Generation number of the load
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What happened to a finished load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The model is now the document's model
    Published,
    /// A newer load was started; the model was dropped
    Superseded,
}

/// A 3MF document
#[derive(Debug)]
pub struct Document {
    path: Option<PathBuf>,
    config: SceneConfig,
    model: RenderModel,
    generation: u64,
    modified: Option<SystemTime>,
}

/// Parse a package and build its render model
///
/// # Arguments
///
/// * `reader` - A reader containing the 3MF file data
/// * `config` - Scene building options
pub fn load_render_model<R: Read + Seek>(reader: R, config: &SceneConfig) -> Result<RenderModel> {
    let start = Instant::now();
    let model = parse_3mf(reader)?;
    let render_model = build_render_model(&model, config)?;
    let statistics = render_model.statistics();
    log::info!(
        "Loaded {} parts ({} vertices, {} triangles) in {:?}",
        render_model.parts().len(),
        statistics.vertex_count,
        statistics.triangle_count,
        start.elapsed()
    );
    Ok(render_model)
}

/// Load a 3MF file from disk
pub fn load_render_model_from_path(path: &Path, config: &SceneConfig) -> Result<RenderModel> {
    let file = File::open(path)?;
    load_render_model(BufReader::new(file), config)
}

fn modification_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

impl Document {
    /// Open and build a 3MF file
    ///
    /// # Example
    ///
    /// ```no_run
    /// use threemf_scene::{Document, SceneConfig};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let document = Document::open("model.3mf", SceneConfig::default())?;
    /// println!("{} parts", document.model().parts().len());
    /// # Ok(())
    /// # }
    /// ```
    pub fn open(path: impl AsRef<Path>, config: SceneConfig) -> Result<Self> {
        let path = path.as_ref();
        let modified = modification_time(path);
        let model = load_render_model_from_path(path, &config)?;
        Ok(Self {
            path: Some(path.to_path_buf()),
            config,
            model,
            generation: 0,
            modified,
        })
    }

    /// Build a document from an in-memory or already open package
    ///
    /// Such a document has no path and never reloads.
    pub fn from_reader<R: Read + Seek>(reader: R, config: SceneConfig) -> Result<Self> {
        let model = load_render_model(reader, &config)?;
        Ok(Self {
            path: None,
            config,
            model,
            generation: 0,
            modified: None,
        })
    }

    /// The published model
    pub fn model(&self) -> &RenderModel {
        &self.model
    }

    /// File backing the document
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Scene building options
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Number of loads started since the document was opened
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start a load, superseding any load started before
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Publish the result of a load if no newer load has started
    ///
    /// A failed load of the newest ticket returns its error and keeps the
    /// current model.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<RenderModel>,
    ) -> Result<LoadOutcome> {
        if ticket.generation != self.generation {
            log::debug!(
                "Dropping load {} superseded by load {}",
                ticket.generation,
                self.generation
            );
            return Ok(LoadOutcome::Superseded);
        }
        self.model = result?;
        Ok(LoadOutcome::Published)
    }

    /// Rebuild the model from disk
    ///
    /// On failure the previous model stays published. Archive errors are
    /// reported as [`ReloadOutcome::Incomplete`] rather than as errors, since
    /// they usually mean the file is being rewritten.
    pub fn reload(&mut self) -> Result<ReloadOutcome> {
        let Some(path) = self.path.clone() else {
            return Ok(ReloadOutcome::Unchanged);
        };

        let ticket = self.begin_load();
        let modified = modification_time(&path);
        let result = load_render_model_from_path(&path, &self.config);

        match self.finish_load(ticket, result) {
            Ok(_) => {
                self.modified = modified;
                Ok(ReloadOutcome::Reloaded)
            }
            Err(e) if e.is_incomplete_archive() => {
                log::warn!("Failed to reload {}: {}", path.display(), e);
                Ok(ReloadOutcome::Incomplete)
            }
            Err(e) => Err(e),
        }
    }

    /// Reload when the file on disk is newer than the last load
    pub fn reload_if_modified(&mut self) -> Result<ReloadOutcome> {
        let Some(path) = self.path.as_deref() else {
            return Ok(ReloadOutcome::Unchanged);
        };

        match (modification_time(path), self.modified) {
            (Some(on_disk), Some(loaded)) if on_disk <= loaded => Ok(ReloadOutcome::Unchanged),
            _ => self.reload(),
        }
    }
}
