//! Per-request scratch space.
//!
//! The rendering engine needs a real file path, so uploaded bytes are written
//! into a fresh `TempDir`. Everything the request produces (the input copy,
//! the engine's cache, the final artifact) lives under that directory, and
//! dropping the [`Workspace`] removes all of it, whichever way the request
//! ends.
//!
//! Layout:
//!
//! ```text
//! docpreview-XXXXXX/
//!  ├─ input/<filename>   uploaded bytes
//!  └─ cache/             engine output
//! ```

use crate::error::PreviewError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

/// A scope-guarded temporary directory holding one request's files.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
    source: PathBuf,
    cache_dir: PathBuf,
}

impl Workspace {
    /// Create a workspace under `parent` (or the system temp dir) and write
    /// `bytes` to `input/<filename>`.
    ///
    /// `filename` must already be a single path component.
    pub fn materialize(
        parent: Option<&Path>,
        filename: &str,
        bytes: &[u8],
    ) -> Result<Self, PreviewError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("docpreview-");
        let dir = match parent {
            Some(p) => builder.tempdir_in(p)?,
            None => builder.tempdir()?,
        };

        let input_dir = dir.path().join("input");
        let cache_dir = dir.path().join("cache");
        std::fs::create_dir(&input_dir)?;
        std::fs::create_dir(&cache_dir)?;

        let source = input_dir.join(filename);
        std::fs::write(&source, bytes)?;
        debug!("Materialised {} bytes to {}", bytes.len(), source.display());

        Ok(Self {
            dir,
            source,
            cache_dir,
        })
    }

    /// The uploaded file.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Directory the engine writes artifacts into.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}
