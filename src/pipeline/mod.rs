//! Pipeline stages for turning an upload into a preview.
//!
//! Each submodule implements exactly one step, so each is testable on its
//! own and the rendering backend can change without touching the sizing
//! rules.
//!
//! ## Data Flow
//!
//! ```text
//! workspace ──▶ strategy ──▶ engine ──▶ sizing ──▶ raster
//! (TempDir)     (per kind)   (render)   (plan)     (resize/crop)
//! ```
//!
//! 1. [`workspace`]: write the upload into a scope-guarded temp directory
//! 2. [`strategy`]:  pick how the requested output kind is produced
//! 3. the [`crate::engine`] renders the baseline artifact
//! 4. [`sizing`]:    generation size and the resize/crop plan (pure)
//! 5. [`raster`]:    apply the plan to the artifact in place

pub mod raster;
pub mod sizing;
pub mod strategy;
pub mod workspace;
