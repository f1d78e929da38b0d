//! PDF backend: rasterise, extract text, and wrap images, via pdfium.
//!
//! Every function here is blocking and must run off the async runtime; the
//! orchestrator already calls the engine from `spawn_blocking`. pdfium keeps
//! thread-local state, so a fresh [`Pdfium`] is bound per call rather than
//! shared across requests.

use crate::error::PreviewError;
use crate::request::Dimensions;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::debug;

/// CSS reference pixel in PDF points (72 / 96).
const POINTS_PER_PIXEL: f32 = 0.75;

/// Bind to the pdfium library at `library`, or the system one.
pub fn bind(library: Option<&Path>) -> Result<Pdfium, PreviewError> {
    let bindings = match library {
        Some(path) => Pdfium::bind_to_library(path),
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| PreviewError::PdfiumUnavailable(format!("{:?}", e)))?;
    Ok(Pdfium::new(bindings))
}

fn render_error(e: PdfiumError) -> PreviewError {
    PreviewError::Render {
        detail: format!("{:?}", e),
    }
}

fn load<'a>(pdfium: &'a Pdfium, path: &Path) -> Result<PdfDocument<'a>, PreviewError> {
    pdfium.load_pdf_from_file(path, None).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            PreviewError::Render {
                detail: "document is password protected".into(),
            }
        } else {
            PreviewError::Render { detail: err_str }
        }
    })
}

/// Rasterise the first page to fit within `size`.
pub fn render_first_page(
    pdfium: &Pdfium,
    path: &Path,
    size: Dimensions,
) -> Result<DynamicImage, PreviewError> {
    let document = load(pdfium, path)?;
    let pages = document.pages();
    debug!("PDF loaded: {} pages", pages.len());

    let page = pages.get(0).map_err(render_error)?;
    let render_config = PdfRenderConfig::new()
        .set_target_width(size.width as i32)
        .set_maximum_height(size.height as i32);
    let bitmap = page.render_with_config(&render_config).map_err(render_error)?;

    let image = bitmap.as_image();
    debug!("Rendered page 1 → {}x{} px", image.width(), image.height());
    Ok(image)
}

/// Text of every page, in order.
pub fn extract_text(pdfium: &Pdfium, path: &Path) -> Result<Vec<String>, PreviewError> {
    let document = load(pdfium, path)?;
    document
        .pages()
        .iter()
        .map(|page| page.text().map(|t| t.all()).map_err(render_error))
        .collect()
}

/// Write `image` as a single-page PDF at `out`, one point per 0.75 px.
pub fn image_to_pdf(pdfium: &Pdfium, image: &DynamicImage, out: &Path) -> Result<(), PreviewError> {
    let width = PdfPoints::new(image.width() as f32 * POINTS_PER_PIXEL);
    let height = PdfPoints::new(image.height() as f32 * POINTS_PER_PIXEL);

    let mut document = pdfium.create_new_pdf().map_err(render_error)?;
    {
        let mut page = document
            .pages_mut()
            .create_page_at_end(PdfPagePaperSize::from_points(width, height))
            .map_err(render_error)?;
        page.objects_mut()
            .create_image_object(PdfPoints::ZERO, PdfPoints::ZERO, image, Some(width), Some(height))
            .map_err(render_error)?;
    }
    document.save_to_file(out).map_err(render_error)?;
    Ok(())
}
