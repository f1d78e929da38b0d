//! Preview orchestration: upload bytes in, artifact bytes out.
//!
//! [`Previewer::handle`] runs the whole request on Tokio's blocking pool.
//! The workspace is created and dropped inside that closure, so the temp
//! directory is removed on the blocking thread even if the caller stops
//! awaiting (client disconnect) or the job panics.

use crate::config::ServiceConfig;
use crate::engine::{LocalEngine, RenderEngine};
use crate::error::PreviewError;
use crate::pipeline::strategy::{JpegStrategy, Strategy};
use crate::pipeline::workspace::Workspace;
use crate::request::{OutputKind, PreviewRequest};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// The finished preview.
#[derive(Debug, Clone)]
pub struct PreviewOutput {
    /// Where the artifact lived inside the request workspace. The workspace
    /// is already gone when this is returned; use it for logging only.
    pub path: PathBuf,
    /// Artifact file name, safe to show to clients.
    pub file_name: String,
    pub kind: OutputKind,
    pub bytes: Vec<u8>,
}

impl PreviewOutput {
    pub fn mime_type(&self) -> &'static str {
        self.kind.mime_type()
    }
}

/// Runs preview requests against a [`RenderEngine`]. Cheap to clone.
#[derive(Clone)]
pub struct Previewer {
    engine: Arc<dyn RenderEngine>,
    config: Arc<ServiceConfig>,
}

impl std::fmt::Debug for Previewer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Previewer")
            .field("engine", &"<dyn RenderEngine>")
            .field("config", &self.config)
            .finish()
    }
}

impl Previewer {
    pub fn new(engine: Arc<dyn RenderEngine>, config: ServiceConfig) -> Self {
        Self {
            engine,
            config: Arc::new(config),
        }
    }

    /// A previewer using [`LocalEngine`] configured from `config`.
    pub fn with_local_engine(config: ServiceConfig) -> Self {
        let engine = Arc::new(LocalEngine::new(&config));
        Self::new(engine, config)
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    fn jpeg_strategy(&self) -> JpegStrategy {
        JpegStrategy {
            default_size: self.config.default_size,
            max_generation_px: self.config.max_generation_px,
            jpeg_quality: self.config.jpeg_quality,
        }
    }

    /// Produce the preview for `request`.
    ///
    /// # Errors
    /// Whatever the engine or post-processing reports; nothing is retried.
    /// The workspace is removed in every case.
    pub async fn handle(&self, request: PreviewRequest) -> Result<PreviewOutput, PreviewError> {
        let start = Instant::now();
        info!(
            "Preview: filename={} width={:?} height={:?} need_crop={} extension={}",
            request.filename(),
            request.width(),
            request.height(),
            request.need_crop(),
            request.output()
        );

        let this = self.clone();
        let output = tokio::task::spawn_blocking(move || this.handle_blocking(&request))
            .await
            .map_err(|e| PreviewError::Internal(format!("Preview task panicked: {}", e)))??;

        info!(
            "Preview ready: {} ({} bytes) in {}ms",
            output.file_name,
            output.bytes.len(),
            start.elapsed().as_millis()
        );
        Ok(output)
    }

    /// Synchronous body of [`Previewer::handle`]. Call it only from a
    /// blocking context.
    pub fn handle_blocking(&self, request: &PreviewRequest) -> Result<PreviewOutput, PreviewError> {
        // ── Step 1: Workspace ────────────────────────────────────────────────
        let workspace = Workspace::materialize(
            self.config.workspace_root.as_deref(),
            &request.sanitized_filename(),
            request.bytes(),
        )?;

        // ── Step 2: Strategy ─────────────────────────────────────────────────
        let strategy = Strategy::select(request.output(), self.jpeg_strategy());
        debug!("Selected {:?} for {}", strategy, request.output());

        // ── Step 3: Render + post-process ────────────────────────────────────
        let artifact = strategy.process(
            self.engine.as_ref(),
            workspace.source(),
            workspace.cache_dir(),
            request,
        )?;

        // ── Step 4: Read back ────────────────────────────────────────────────
        let bytes = std::fs::read(&artifact)?;
        let file_name = artifact
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("preview.{}", request.output().file_extension()));

        Ok(PreviewOutput {
            path: artifact,
            file_name,
            kind: request.output(),
            bytes,
        })
    }
}
