//! Sizing policy: what to ask the engine for, and how to fit its output.
//!
//! Pure arithmetic, no I/O. Two decisions live here:
//!
//! 1. [`generation_size`]: the engine renders a square at least as large as
//!    any dimension the client could want. The true pixel size of the source
//!    (a PDF page, a spreadsheet) is unknown before rendering, so we
//!    over-ask and only ever scale down afterwards.
//! 2. [`resize_plan`]: once the real raster size is known, scale it so the
//!    *driving* dimension matches the request exactly, keep the aspect ratio,
//!    and optionally centre-crop to the exact requested box.

use crate::request::Dimensions;

/// Square generation size: the largest of the defaults and the requested
/// width/height, on both axes.
pub fn generation_size(defaults: Dimensions, width: Option<u32>, height: Option<u32>) -> Dimensions {
    let side = [Some(defaults.width), Some(defaults.height), width, height]
        .into_iter()
        .flatten()
        .max()
        .unwrap_or(1);
    Dimensions::square(side)
}

/// Which requested side sets the scale factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driving {
    Width(u32),
    Height(u32),
}

impl Driving {
    /// The larger requested side drives; a lone side drives; on a tie height
    /// drives.
    pub fn choose(width: Option<u32>, height: Option<u32>) -> Option<Driving> {
        match (width, height) {
            (None, None) => None,
            (Some(w), None) => Some(Driving::Width(w)),
            (None, Some(h)) => Some(Driving::Height(h)),
            (Some(w), Some(h)) if w > h => Some(Driving::Width(w)),
            (Some(_), Some(h)) => Some(Driving::Height(h)),
        }
    }

    /// Aspect-preserving size of `source` with the driving side pinned.
    pub fn scale(self, source: Dimensions) -> Dimensions {
        match self {
            Driving::Width(w) => Dimensions::new(w, proportional(source.height, w, source.width)),
            Driving::Height(h) => Dimensions::new(proportional(source.width, h, source.height), h),
        }
    }
}

/// `round(other * target / same)`.
fn proportional(other: u32, target: u32, same: u32) -> u32 {
    (f64::from(other) * f64::from(target) / f64::from(same.max(1))).round() as u32
}

/// A crop box in the resized image's coordinates.
///
/// `left`/`top` are negative, or `left + width` exceeds the image, when the
/// requested box is larger than the resized image along that axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBox {
    pub left: i64,
    pub top: i64,
    pub width: u32,
    pub height: u32,
}

impl CropBox {
    /// Box of `target` size centred on an image of size `image`. Odd
    /// differences round toward the origin.
    pub fn centered(image: Dimensions, target: Dimensions) -> Self {
        let offset = |outer: u32, inner: u32| (i64::from(outer) - i64::from(inner)).div_euclid(2);
        Self {
            left: offset(image.width, target.width),
            top: offset(image.height, target.height),
            width: target.width,
            height: target.height,
        }
    }

    pub fn right(&self) -> i64 {
        self.left + i64::from(self.width)
    }

    pub fn bottom(&self) -> i64 {
        self.top + i64::from(self.height)
    }

    /// Whether the box lies entirely inside an image of size `image`.
    pub fn fits_within(&self, image: Dimensions) -> bool {
        self.left >= 0
            && self.top >= 0
            && self.right() <= i64::from(image.width)
            && self.bottom() <= i64::from(image.height)
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }
}

/// Resize, then optionally crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizePlan {
    pub resize: Dimensions,
    pub crop: Option<CropBox>,
}

impl ResizePlan {
    /// Pixel size of the artifact after the plan is applied.
    pub fn final_dimensions(&self) -> Dimensions {
        self.crop.map(|c| c.dimensions()).unwrap_or(self.resize)
    }
}

/// Plan the post-processing of a rendered raster of size `source`.
///
/// Returns `None` when neither side was requested. A crop is planned only
/// when both sides were requested and `need_crop` is set.
pub fn resize_plan(
    width: Option<u32>,
    height: Option<u32>,
    need_crop: bool,
    source: Dimensions,
) -> Option<ResizePlan> {
    let driving = Driving::choose(width, height)?;
    let resize = driving.scale(source);
    let crop = match (need_crop, width, height) {
        (true, Some(w), Some(h)) => Some(CropBox::centered(resize, Dimensions::new(w, h))),
        _ => None,
    };
    Some(ResizePlan { resize, crop })
}
