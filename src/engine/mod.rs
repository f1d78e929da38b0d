//! Rendering engines: turn an input file into a baseline preview artifact.
//!
//! The pipeline only talks to [`RenderEngine`]. [`LocalEngine`] is the
//! implementation the binary ships with; tests swap in stubs.
//!
//! | input \ output | jpeg | pdf | html | text |
//! |----------------|------|-----|------|------|
//! | raster image   | fit to box | embedded page | data-URI `<img>` | n/a |
//! | PDF            | page 1 via pdfium | copy | text per page | text per page |
//! | HTML           | n/a | n/a | copy | copy |
//! | plain text     | n/a | n/a | escaped `<pre>` | copy |
//!
//! "n/a" is [`PreviewError::UnsupportedInput`].

pub mod detect;
pub mod markup;
pub mod pdf;

use crate::config::ServiceConfig;
use crate::error::PreviewError;
use crate::pipeline::raster;
use crate::request::{Dimensions, OutputKind};
use detect::SourceKind;
use image::imageops::FilterType;
use image::{DynamicImage, ImageDecoder, ImageReader};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Produces preview artifacts inside a caller-owned cache directory.
///
/// All methods block. Each returns the path of a file it created under
/// `cache_dir`, or [`PreviewError::UnsupportedInput`] when `source` cannot be
/// converted to that kind.
pub trait RenderEngine: Send + Sync {
    /// A JPEG no larger than `size` on either axis.
    fn render_jpeg(&self, source: &Path, cache_dir: &Path, size: Dimensions) -> Result<PathBuf, PreviewError>;

    fn render_pdf(&self, source: &Path, cache_dir: &Path) -> Result<PathBuf, PreviewError>;

    fn render_html(&self, source: &Path, cache_dir: &Path) -> Result<PathBuf, PreviewError>;

    fn render_text(&self, source: &Path, cache_dir: &Path) -> Result<PathBuf, PreviewError>;
}

/// Engine backed by the `image` crate and pdfium.
#[derive(Debug, Clone)]
pub struct LocalEngine {
    pdfium_library: Option<PathBuf>,
    jpeg_quality: u8,
}

impl LocalEngine {
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            pdfium_library: config.pdfium_library.clone(),
            jpeg_quality: config.jpeg_quality,
        }
    }

    fn pdfium(&self) -> Result<pdfium_render::prelude::Pdfium, PreviewError> {
        pdf::bind(self.pdfium_library.as_deref())
    }

    fn write_jpeg(&self, image: &DynamicImage, out: &Path) -> Result<(), PreviewError> {
        let bytes = raster::encode(image, image::ImageFormat::Jpeg, self.jpeg_quality)?;
        std::fs::write(out, bytes)?;
        Ok(())
    }
}

impl Default for LocalEngine {
    fn default() -> Self {
        Self::new(&ServiceConfig::default())
    }
}

impl RenderEngine for LocalEngine {
    fn render_jpeg(&self, source: &Path, cache_dir: &Path, size: Dimensions) -> Result<PathBuf, PreviewError> {
        let image = match detect::detect(source)? {
            SourceKind::Image(_) => load_oriented(source)?,
            SourceKind::Pdf => pdf::render_first_page(&self.pdfium()?, source, size)?,
            _ => return Err(unsupported(source, OutputKind::Jpeg)),
        };
        let image = fit_within(image, size);
        let out = artifact_path(cache_dir, source, &format!("-{size}"), OutputKind::Jpeg);
        self.write_jpeg(&image, &out)?;
        debug!("JPEG preview {}x{} → {}", image.width(), image.height(), out.display());
        Ok(out)
    }

    fn render_pdf(&self, source: &Path, cache_dir: &Path) -> Result<PathBuf, PreviewError> {
        let out = artifact_path(cache_dir, source, "", OutputKind::Pdf);
        match detect::detect(source)? {
            SourceKind::Pdf => {
                std::fs::copy(source, &out)?;
            }
            SourceKind::Image(_) => {
                let image = load_oriented(source)?;
                pdf::image_to_pdf(&self.pdfium()?, &image, &out)?;
            }
            _ => return Err(unsupported(source, OutputKind::Pdf)),
        }
        Ok(out)
    }

    fn render_html(&self, source: &Path, cache_dir: &Path) -> Result<PathBuf, PreviewError> {
        let title = file_name(source);
        let html = match detect::detect(source)? {
            SourceKind::Html => read_lossy(source)?,
            SourceKind::Text => markup::text_document(&title, &read_lossy(source)?),
            SourceKind::Pdf => {
                let pages = pdf::extract_text(&self.pdfium()?, source)?;
                markup::pages_document(&title, &pages)
            }
            SourceKind::Image(format) => {
                let bytes = std::fs::read(source)?;
                markup::image_document(&title, format.to_mime_type(), &bytes)
            }
            SourceKind::Unknown => return Err(unsupported(source, OutputKind::Html)),
        };
        let out = artifact_path(cache_dir, source, "", OutputKind::Html);
        std::fs::write(&out, html)?;
        Ok(out)
    }

    fn render_text(&self, source: &Path, cache_dir: &Path) -> Result<PathBuf, PreviewError> {
        let text = match detect::detect(source)? {
            SourceKind::Text | SourceKind::Html => read_lossy(source)?,
            SourceKind::Pdf => pdf::extract_text(&self.pdfium()?, source)?.join("\n\u{000C}\n"),
            _ => return Err(unsupported(source, OutputKind::Text)),
        };
        let out = artifact_path(cache_dir, source, "", OutputKind::Text);
        std::fs::write(&out, text)?;
        Ok(out)
    }
}

fn unsupported(source: &Path, kind: OutputKind) -> PreviewError {
    PreviewError::UnsupportedInput {
        file_name: file_name(source),
        kind,
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| crate::request::DEFAULT_FILENAME.to_string())
}

/// `<cache_dir>/<source stem><suffix>.<kind extension>`
fn artifact_path(cache_dir: &Path, source: &Path, suffix: &str, kind: OutputKind) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| crate::request::DEFAULT_FILENAME.to_string());
    cache_dir.join(format!("{stem}{suffix}.{}", kind.file_extension()))
}

fn read_lossy(path: &Path) -> Result<String, PreviewError> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Decode a raster, honouring its EXIF orientation.
fn load_oriented(path: &Path) -> Result<DynamicImage, PreviewError> {
    let mut decoder = ImageReader::open(path)?.with_guessed_format()?.into_decoder()?;
    let orientation = decoder.orientation()?;
    let mut image = DynamicImage::from_decoder(decoder)?;
    image.apply_orientation(orientation);
    Ok(image)
}

/// Shrink to fit inside `size`, keeping the aspect ratio. Never enlarges.
pub fn fit_within(image: DynamicImage, size: Dimensions) -> DynamicImage {
    if image.width() <= size.width && image.height() <= size.height {
        return image;
    }
    image.resize(size.width, size.height, FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn setup(name: &str, bytes: &[u8]) -> (tempfile::TempDir, PathBuf, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join(name);
        std::fs::write(&source, bytes).unwrap();
        let cache = dir.path().join("cache");
        std::fs::create_dir(&cache).unwrap();
        (dir, source, cache)
    }

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([200, 10, 10])));
        raster::encode(&img, image::ImageFormat::Png, 85).unwrap()
    }

    #[test]
    fn jpeg_from_large_image_fits_box() {
        let (_dir, source, cache) = setup("photo.png", &png_bytes(1000, 500));
        let out = LocalEngine::default()
            .render_jpeg(&source, &cache, Dimensions::square(256))
            .unwrap();
        assert!(out.starts_with(&cache));
        assert_eq!(out.file_name().unwrap(), "photo-256x256.jpeg");
        assert_eq!(raster::dimensions(&out).unwrap(), Dimensions::new(256, 128));
    }

    #[test]
    fn jpeg_from_small_image_is_not_enlarged() {
        let (_dir, source, cache) = setup("icon.png", &png_bytes(40, 20));
        let out = LocalEngine::default()
            .render_jpeg(&source, &cache, Dimensions::square(256))
            .unwrap();
        assert_eq!(raster::dimensions(&out).unwrap(), Dimensions::new(40, 20));
    }

    #[test]
    fn jpeg_from_text_is_unsupported() {
        let (_dir, source, cache) = setup("notes.txt", b"hello");
        let err = LocalEngine::default()
            .render_jpeg(&source, &cache, Dimensions::square(256))
            .unwrap_err();
        assert!(
            matches!(err, PreviewError::UnsupportedInput { ref file_name, kind: OutputKind::Jpeg } if file_name == "notes.txt"),
            "{err:?}"
        );
    }

    #[test]
    fn text_and_html_from_text() {
        let (_dir, source, cache) = setup("notes.txt", b"a < b");
        let engine = LocalEngine::default();

        let txt = engine.render_text(&source, &cache).unwrap();
        assert_eq!(std::fs::read_to_string(&txt).unwrap(), "a < b");
        assert_eq!(txt.extension().unwrap(), "txt");

        let html = engine.render_html(&source, &cache).unwrap();
        assert!(std::fs::read_to_string(&html).unwrap().contains("<pre>a &lt; b</pre>"));
    }

    #[test]
    fn html_from_image_embeds_data_uri() {
        let (_dir, source, cache) = setup("dot.png", &png_bytes(2, 2));
        let out = LocalEngine::default().render_html(&source, &cache).unwrap();
        assert!(std::fs::read_to_string(out).unwrap().contains("data:image/png;base64,"));
    }

    #[test]
    fn pdf_from_text_and_text_from_image_are_unsupported() {
        let engine = LocalEngine::default();
        let (_d1, source, cache) = setup("notes.txt", b"hello");
        assert!(matches!(
            engine.render_pdf(&source, &cache),
            Err(PreviewError::UnsupportedInput { kind: OutputKind::Pdf, .. })
        ));
        let (_d2, source, cache) = setup("dot.png", &png_bytes(2, 2));
        assert!(matches!(
            engine.render_text(&source, &cache),
            Err(PreviewError::UnsupportedInput { kind: OutputKind::Text, .. })
        ));
    }

    #[test]
    fn unknown_binary_is_unsupported_everywhere() {
        let engine = LocalEngine::default();
        let (_dir, source, cache) = setup("blob.bin", b"\0\x01\x02\x03");
        assert!(engine.render_jpeg(&source, &cache, Dimensions::square(64)).is_err());
        assert!(engine.render_pdf(&source, &cache).is_err());
        assert!(engine.render_html(&source, &cache).is_err());
        assert!(engine.render_text(&source, &cache).is_err());
        assert_eq!(std::fs::read_dir(&cache).unwrap().count(), 0);
    }

    #[test]
    fn fit_within_keeps_aspect() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(300, 900));
        let fitted = fit_within(img, Dimensions::square(300));
        assert_eq!((fitted.width(), fitted.height()), (100, 300));
    }
}
