//! Service configuration.
//!
//! Every knob lives in [`ServiceConfig`], built via [`ServiceConfigBuilder`].
//! The binary maps its CLI flags and `DOCPREVIEW_*` environment variables onto
//! the builder; library users and tests call the builder directly.

use crate::error::PreviewError;
use crate::request::Dimensions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration shared by every preview request.
///
/// # Example
/// ```rust
/// use docpreview::ServiceConfig;
///
/// let config = ServiceConfig::builder()
///     .default_size(320, 320)
///     .jpeg_quality(90)
///     .build()
///     .unwrap();
/// assert_eq!(config.default_size.width, 320);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Smallest preview the rendering engine is asked for. Default: 256×256.
    ///
    /// The generation size is the largest of this and any requested
    /// dimension, so small requests still get a sharp downscale.
    pub default_size: Dimensions,

    /// JPEG encoder quality for generated and post-processed previews. Range: 1–100. Default: 85.
    pub jpeg_quality: u8,

    /// Largest width or height a client may request, in pixels. Default: 4096.
    ///
    /// Bounds both the square the engine renders and the resize target;
    /// larger requests fail with [`PreviewError::DimensionTooLarge`].
    pub max_generation_px: u32,

    /// Largest accepted upload body in bytes. Default: 64 MiB.
    pub max_upload_bytes: usize,

    /// Explicit path to the pdfium shared library. If None, the system
    /// library is used.
    pub pdfium_library: Option<PathBuf>,

    /// Parent directory for per-request workspaces. If None, the system
    /// temp directory is used.
    pub workspace_root: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_size: Dimensions::square(256),
            jpeg_quality: 85,
            max_generation_px: 4096,
            max_upload_bytes: 64 * 1024 * 1024,
            pdfium_library: None,
            workspace_root: None,
        }
    }
}

impl ServiceConfig {
    /// Create a new builder for `ServiceConfig`.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ServiceConfig`].
#[derive(Debug)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    pub fn default_size(mut self, width: u32, height: u32) -> Self {
        self.config.default_size = Dimensions { width, height };
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn max_generation_px(mut self, px: u32) -> Self {
        self.config.max_generation_px = px;
        self
    }

    pub fn max_upload_bytes(mut self, bytes: usize) -> Self {
        self.config.max_upload_bytes = bytes;
        self
    }

    pub fn pdfium_library(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library = Some(path.into());
        self
    }

    pub fn workspace_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.workspace_root = Some(path.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ServiceConfig, PreviewError> {
        let c = &self.config;
        if c.default_size.width == 0 || c.default_size.height == 0 {
            return Err(PreviewError::InvalidConfig(format!(
                "default size must be non-zero, got {}x{}",
                c.default_size.width, c.default_size.height
            )));
        }
        let floor = c.default_size.width.max(c.default_size.height);
        if c.max_generation_px < floor {
            return Err(PreviewError::InvalidConfig(format!(
                "max generation size {} is below the default size {}",
                c.max_generation_px, floor
            )));
        }
        if c.max_upload_bytes == 0 {
            return Err(PreviewError::InvalidConfig(
                "max upload size must be ≥ 1 byte".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_build() {
        let c = ServiceConfig::builder().build().unwrap();
        assert_eq!(c.default_size, Dimensions::square(256));
        assert_eq!(c.jpeg_quality, 85);
        assert!(c.pdfium_library.is_none());
    }

    #[test]
    fn quality_is_clamped() {
        let c = ServiceConfig::builder().jpeg_quality(0).build().unwrap();
        assert_eq!(c.jpeg_quality, 1);
        let c = ServiceConfig::builder().jpeg_quality(250).build().unwrap();
        assert_eq!(c.jpeg_quality, 100);
    }

    #[test]
    fn zero_default_size_rejected() {
        let err = ServiceConfig::builder().default_size(0, 256).build().unwrap_err();
        assert!(matches!(err, PreviewError::InvalidConfig(_)));
    }

    #[test]
    fn generation_cap_below_default_rejected() {
        let err = ServiceConfig::builder()
            .default_size(512, 512)
            .max_generation_px(256)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("below the default size"));
    }
}
