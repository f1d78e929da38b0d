//! Processor selection: one strategy per output kind.
//!
//! A closed enum rather than a trait object: the set of output kinds is
//! fixed, and the `match` in [`Strategy::process`] makes a missing arm a
//! compile error.

use crate::engine::RenderEngine;
use crate::error::PreviewError;
use crate::pipeline::{raster, sizing};
use crate::request::{Dimensions, OutputKind, PreviewRequest};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Settings the raster strategy needs beyond the request itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegStrategy {
    pub default_size: Dimensions,
    pub max_generation_px: u32,
    pub jpeg_quality: u8,
}

impl JpegStrategy {
    /// Generation size for `request`.
    ///
    /// A requested side above `max_generation_px` is rejected; nothing
    /// downstream is ever asked for more.
    pub fn generation_size(&self, request: &PreviewRequest) -> Result<Dimensions, PreviewError> {
        for (name, value) in [("width", request.width()), ("height", request.height())] {
            if let Some(value) = value.filter(|v| *v > self.max_generation_px) {
                warn!("Requested {} {} exceeds cap {}px", name, value, self.max_generation_px);
                return Err(PreviewError::DimensionTooLarge {
                    name,
                    value,
                    max: self.max_generation_px,
                });
            }
        }
        Ok(sizing::generation_size(self.default_size, request.width(), request.height()))
    }

    fn process(
        &self,
        engine: &dyn RenderEngine,
        source: &Path,
        cache_dir: &Path,
        request: &PreviewRequest,
    ) -> Result<PathBuf, PreviewError> {
        let generation = self.generation_size(request)?;
        let artifact = engine.render_jpeg(source, cache_dir, generation)?;

        if !request.has_size() {
            debug!("No size requested; returning rendered artifact as-is");
            return Ok(artifact);
        }

        let rendered = raster::dimensions(&artifact)?;
        let plan = sizing::resize_plan(request.width(), request.height(), request.need_crop(), rendered);
        if let Some(ref p) = plan {
            info!(
                "Resizing preview {} → {} (final {})",
                rendered,
                p.resize,
                p.final_dimensions()
            );
        }
        raster::apply(&artifact, plan.as_ref(), self.jpeg_quality)?;
        Ok(artifact)
    }
}

/// How a request for a given [`OutputKind`] is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Render at the generation size, then resize/crop.
    Jpeg(JpegStrategy),
    /// Pass-through to the engine, no sizing.
    Pdf,
    Html,
    Text,
}

impl Strategy {
    /// Strategy for `kind`.
    pub fn select(kind: OutputKind, jpeg: JpegStrategy) -> Strategy {
        match kind {
            OutputKind::Jpeg => Strategy::Jpeg(jpeg),
            OutputKind::Pdf => Strategy::Pdf,
            OutputKind::Html => Strategy::Html,
            OutputKind::Text => Strategy::Text,
        }
    }

    /// Strategy for a raw `extension` string; unknown values are rejected.
    pub fn for_extension(extension: &str, jpeg: JpegStrategy) -> Result<Strategy, PreviewError> {
        Ok(Self::select(extension.parse()?, jpeg))
    }

    /// The output kind this strategy produces.
    pub fn kind(&self) -> OutputKind {
        match self {
            Strategy::Jpeg(_) => OutputKind::Jpeg,
            Strategy::Pdf => OutputKind::Pdf,
            Strategy::Html => OutputKind::Html,
            Strategy::Text => OutputKind::Text,
        }
    }

    /// Produce the final artifact for `source`. Blocking.
    pub fn process(
        &self,
        engine: &dyn RenderEngine,
        source: &Path,
        cache_dir: &Path,
        request: &PreviewRequest,
    ) -> Result<PathBuf, PreviewError> {
        match self {
            Strategy::Jpeg(jpeg) => jpeg.process(engine, source, cache_dir, request),
            Strategy::Pdf => engine.render_pdf(source, cache_dir),
            Strategy::Html => engine.render_html(source, cache_dir),
            Strategy::Text => engine.render_text(source, cache_dir),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jpeg() -> JpegStrategy {
        JpegStrategy {
            default_size: Dimensions::square(256),
            max_generation_px: 2048,
            jpeg_quality: 85,
        }
    }

    #[test]
    fn select_covers_every_kind() {
        for kind in OutputKind::ALL {
            assert_eq!(Strategy::select(kind, jpeg()).kind(), kind);
        }
    }

    #[test]
    fn for_extension_rejects_unknown() {
        let err = Strategy::for_extension("bmp", jpeg()).unwrap_err();
        assert!(matches!(err, PreviewError::UnknownOutputKind { .. }));
        assert_eq!(Strategy::for_extension("html", jpeg()).unwrap(), Strategy::Html);
    }

    #[test]
    fn oversized_request_is_rejected() {
        let req = PreviewRequest::builder("a.png", vec![])
            .width(Some(100_000))
            .build()
            .unwrap();
        let err = jpeg().generation_size(&req).unwrap_err();
        assert!(
            matches!(err, PreviewError::DimensionTooLarge { name: "width", value: 100_000, max: 2048 }),
            "{err:?}"
        );

        let req = PreviewRequest::builder("a.png", vec![])
            .height(Some(2049))
            .build()
            .unwrap();
        assert!(matches!(
            jpeg().generation_size(&req),
            Err(PreviewError::DimensionTooLarge { name: "height", .. })
        ));
    }

    #[test]
    fn generation_size_within_cap() {
        let req = PreviewRequest::builder("a.png", vec![])
            .width(Some(500))
            .height(Some(100))
            .build()
            .unwrap();
        assert_eq!(jpeg().generation_size(&req).unwrap(), Dimensions::square(500));

        let req = PreviewRequest::builder("a.png", vec![])
            .width(Some(2048))
            .build()
            .unwrap();
        assert_eq!(jpeg().generation_size(&req).unwrap(), Dimensions::square(2048));
    }

    /// Engine that renders exactly the square it is asked for.
    struct ExactEngine;

    impl RenderEngine for ExactEngine {
        fn render_jpeg(&self, _: &Path, cache_dir: &Path, size: Dimensions) -> Result<PathBuf, PreviewError> {
            let image = image::DynamicImage::new_rgb8(size.width, size.height);
            let out = cache_dir.join("exact.jpeg");
            std::fs::write(&out, raster::encode(&image, image::ImageFormat::Jpeg, 85)?)?;
            Ok(out)
        }

        fn render_pdf(&self, _: &Path, _: &Path) -> Result<PathBuf, PreviewError> {
            unreachable!()
        }

        fn render_html(&self, _: &Path, _: &Path) -> Result<PathBuf, PreviewError> {
            unreachable!()
        }

        fn render_text(&self, _: &Path, _: &Path) -> Result<PathBuf, PreviewError> {
            unreachable!()
        }
    }

    #[test]
    fn resize_never_exceeds_rendered_size() {
        let dir = tempfile::tempdir().unwrap();
        let strategy = JpegStrategy {
            default_size: Dimensions::square(64),
            max_generation_px: 256,
            jpeg_quality: 85,
        };

        let req = PreviewRequest::builder("a.pdf", vec![])
            .width(Some(3000))
            .build()
            .unwrap();
        let err = strategy
            .process(&ExactEngine, Path::new("a.pdf"), dir.path(), &req)
            .unwrap_err();
        assert!(matches!(err, PreviewError::DimensionTooLarge { .. }), "{err:?}");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

        let req = PreviewRequest::builder("a.pdf", vec![])
            .width(Some(256))
            .height(Some(100))
            .build()
            .unwrap();
        let out = strategy
            .process(&ExactEngine, Path::new("a.pdf"), dir.path(), &req)
            .unwrap();
        assert_eq!(raster::dimensions(&out).unwrap(), Dimensions::new(256, 100));
    }
}
