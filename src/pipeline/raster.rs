//! Raster post-processing: apply a [`ResizePlan`] to a rendered artifact.
//!
//! The artifact is overwritten in place. The new image is fully encoded in
//! memory before the file is touched, so a failed encode leaves the rendered
//! artifact as it was.

use crate::error::PreviewError;
use crate::pipeline::sizing::{CropBox, ResizePlan};
use crate::request::Dimensions;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, ImageReader, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// Pixel size of the raster at `path`, read from its header.
pub fn dimensions(path: &Path) -> Result<Dimensions, PreviewError> {
    let (width, height) = image::image_dimensions(path)?;
    Ok(Dimensions::new(width, height))
}

/// Resize and crop the raster at `path` according to `plan`.
///
/// `None` leaves the file untouched.
pub fn apply(path: &Path, plan: Option<&ResizePlan>, jpeg_quality: u8) -> Result<(), PreviewError> {
    let Some(plan) = plan else {
        return Ok(());
    };

    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let format = reader.format().ok_or_else(|| PreviewError::ImageProcessing {
        detail: "rendered artifact is not a recognised raster format".into(),
    })?;
    let source = reader.decode()?;
    debug!(
        "Post-processing {}x{} {:?} → resize {} crop {:?}",
        source.width(),
        source.height(),
        format,
        plan.resize,
        plan.crop
    );

    let output = transform(&source, plan);
    let bytes = encode(&output, format, jpeg_quality)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Resize with Lanczos3, then crop. Pure; used by [`apply`].
pub fn transform(image: &DynamicImage, plan: &ResizePlan) -> DynamicImage {
    let resized = image.resize_exact(plan.resize.width, plan.resize.height, FilterType::Lanczos3);
    match plan.crop {
        None => resized,
        Some(crop) if crop.fits_within(plan.resize) => {
            resized.crop_imm(crop.left as u32, crop.top as u32, crop.width, crop.height)
        }
        Some(crop) => padded_crop(&resized, crop),
    }
}

/// Crop a box that reaches past the image edges; uncovered pixels are black.
fn padded_crop(image: &DynamicImage, crop: CropBox) -> DynamicImage {
    let mut canvas = RgbaImage::from_pixel(crop.width, crop.height, Rgba([0, 0, 0, 255]));
    imageops::replace(&mut canvas, &image.to_rgba8(), -crop.left, -crop.top);
    DynamicImage::ImageRgba8(canvas)
}

/// Encode `image` as `format`. JPEG drops alpha and uses `jpeg_quality`.
pub fn encode(image: &DynamicImage, format: ImageFormat, jpeg_quality: u8) -> Result<Vec<u8>, PreviewError> {
    let mut buf = Vec::new();
    match format {
        ImageFormat::Jpeg => {
            let rgb = image.to_rgb8();
            JpegEncoder::new_with_quality(&mut buf, jpeg_quality).encode_image(&rgb)?;
        }
        other => image.write_to(&mut Cursor::new(&mut buf), other)?,
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::sizing::resize_plan;
    use image::{Rgb, RgbImage};

    fn write_png(dir: &Path, w: u32, h: u32) -> std::path::PathBuf {
        let path = dir.join("rendered.png");
        let img = RgbImage::from_fn(w, h, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]));
        img.save(&path).expect("write fixture");
        path
    }

    #[test]
    fn no_plan_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), 40, 30);
        let before = std::fs::read(&path).unwrap();
        apply(&path, None, 85).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[test]
    fn resize_and_crop_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), 500, 500);
        let plan = resize_plan(Some(200), Some(100), true, dimensions(&path).unwrap()).unwrap();
        apply(&path, Some(&plan), 85).unwrap();
        assert_eq!(dimensions(&path).unwrap(), Dimensions::new(200, 100));
        // Format is preserved.
        let format = ImageReader::open(&path)
            .unwrap()
            .with_guessed_format()
            .unwrap()
            .format();
        assert_eq!(format, Some(ImageFormat::Png));
    }

    #[test]
    fn jpeg_artifact_stays_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preview.jpeg");
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(300, 150, Rgb([10, 200, 30])));
        std::fs::write(&path, encode(&img, ImageFormat::Jpeg, 90).unwrap()).unwrap();

        let plan = resize_plan(Some(120), None, true, Dimensions::new(300, 150)).unwrap();
        apply(&path, Some(&plan), 90).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
        assert_eq!(dimensions(&path).unwrap(), Dimensions::new(120, 60));
    }

    #[test]
    fn padded_crop_fills_black() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(1000, 200, Rgb([255, 255, 255])));
        let plan = resize_plan(Some(200), Some(100), true, Dimensions::new(1000, 200)).unwrap();
        let out = transform(&img, &plan).to_rgb8();
        assert_eq!(out.dimensions(), (200, 100));
        // Resized band is 40 px tall, centred: rows 30..70 white, rest black.
        assert_eq!(out.get_pixel(100, 0), &Rgb([0, 0, 0]));
        assert_eq!(out.get_pixel(100, 50), &Rgb([255, 255, 255]));
        assert_eq!(out.get_pixel(100, 99), &Rgb([0, 0, 0]));
    }

    #[test]
    fn corrupt_artifact_is_processing_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpeg");
        std::fs::write(&path, b"\xFF\xD8\xFF\xE0 definitely not a jpeg").unwrap();
        let plan = resize_plan(Some(10), None, false, Dimensions::new(10, 10)).unwrap();
        let err = apply(&path, Some(&plan), 85).unwrap_err();
        assert!(matches!(err, PreviewError::ImageProcessing { .. }), "{err:?}");
    }
}
