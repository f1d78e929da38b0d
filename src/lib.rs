//! # docpreview
//!
//! Render previews of uploaded documents: a JPEG thumbnail, a PDF, an HTML
//! page or plain text, with the JPEG optionally resized and centre-cropped to
//! the caller's exact dimensions.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload bytes
//!  │
//!  ├─ 1. Workspace  write into a scope-guarded TempDir
//!  ├─ 2. Strategy   pick jpeg / pdf / html / text handling
//!  ├─ 3. Engine     render a baseline artifact (image crate, pdfium)
//!  ├─ 4. Sizing     square generation size; aspect-preserving resize plan
//!  ├─ 5. Raster     Lanczos3 resize + centre crop, in place
//!  └─ 6. Output     artifact bytes; the workspace is removed
//! ```
//!
//! Steps 1–6 run on Tokio's blocking pool; the engine and the image codecs
//! are synchronous.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docpreview::{Previewer, PreviewRequest, ServiceConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let previewer = Previewer::with_local_engine(ServiceConfig::default());
//!     let bytes = std::fs::read("photo.png")?;
//!     let request = PreviewRequest::builder("photo.png", bytes)
//!         .width(Some(200))
//!         .height(Some(100))
//!         .build()?;
//!     let preview = previewer.handle(request).await?;
//!     std::fs::write(&preview.file_name, &preview.bytes)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Sizing rules
//!
//! * The engine is asked for a `max × max` square, where `max` is the largest
//!   of the default size (256) and any requested side.
//! * The larger requested side (height on a tie) is matched exactly; the
//!   other follows the rendered aspect ratio.
//! * With both sides requested and cropping on, the result is centre-cropped
//!   to exactly the requested box.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docpreview` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod engine;
pub mod error;
pub mod http;
pub mod pipeline;
pub mod preview;
pub mod request;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ServiceConfig, ServiceConfigBuilder};
pub use engine::{LocalEngine, RenderEngine};
pub use error::PreviewError;
pub use http::{build_router, serve};
pub use pipeline::sizing::{generation_size, resize_plan, CropBox, ResizePlan};
pub use pipeline::strategy::Strategy;
pub use preview::{PreviewOutput, Previewer};
pub use request::{Dimensions, OutputKind, PreviewParams, PreviewRequest};
