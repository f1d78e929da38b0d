//! Request types: what the client asked for, validated once up front.
//!
//! A [`PreviewRequest`] cannot be built with an unknown output kind or a zero
//! dimension, so the rest of the pipeline never has to re-check either.

use crate::error::PreviewError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Filename used when the client does not send one, or sends only path
/// separators.
pub const DEFAULT_FILENAME: &str = "unnamed";

/// The preview format a client can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// Raster preview, resized and cropped on request. (default)
    #[default]
    Jpeg,
    Pdf,
    Html,
    Text,
}

impl OutputKind {
    pub const ALL: [OutputKind; 4] = [
        OutputKind::Jpeg,
        OutputKind::Pdf,
        OutputKind::Html,
        OutputKind::Text,
    ];

    /// Query-string spelling, e.g. `extension=jpeg`.
    pub fn as_str(self) -> &'static str {
        match self {
            OutputKind::Jpeg => "jpeg",
            OutputKind::Pdf => "pdf",
            OutputKind::Html => "html",
            OutputKind::Text => "text",
        }
    }

    /// `Content-Type` of the rendered artifact.
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputKind::Jpeg => "image/jpeg",
            OutputKind::Pdf => "application/pdf",
            OutputKind::Html => "text/html; charset=utf-8",
            OutputKind::Text => "text/plain; charset=utf-8",
        }
    }

    /// File extension of the rendered artifact.
    pub fn file_extension(self) -> &'static str {
        match self {
            OutputKind::Jpeg => "jpeg",
            OutputKind::Pdf => "pdf",
            OutputKind::Html => "html",
            OutputKind::Text => "txt",
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputKind {
    type Err = PreviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OutputKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| PreviewError::UnknownOutputKind {
                extension: s.to_string(),
            })
    }
}

/// A width × height pair in pixels. Both sides are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn square(side: u32) -> Self {
        Self::new(side, side)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// One preview job. Immutable once built.
#[derive(Clone)]
pub struct PreviewRequest {
    filename: String,
    bytes: Vec<u8>,
    width: Option<u32>,
    height: Option<u32>,
    need_crop: bool,
    output: OutputKind,
}

impl fmt::Debug for PreviewRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewRequest")
            .field("filename", &self.filename)
            .field("bytes", &self.bytes.len())
            .field("width", &self.width)
            .field("height", &self.height)
            .field("need_crop", &self.need_crop)
            .field("output", &self.output)
            .finish()
    }
}

impl PreviewRequest {
    /// Start a request for `bytes` named `filename`.
    ///
    /// Defaults: JPEG output, no size constraint, crop enabled.
    pub fn builder(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> PreviewRequestBuilder {
        PreviewRequestBuilder {
            request: PreviewRequest {
                filename: filename.into(),
                bytes: bytes.into(),
                width: None,
                height: None,
                need_crop: true,
                output: OutputKind::default(),
            },
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn width(&self) -> Option<u32> {
        self.width
    }

    pub fn height(&self) -> Option<u32> {
        self.height
    }

    pub fn need_crop(&self) -> bool {
        self.need_crop
    }

    pub fn output(&self) -> OutputKind {
        self.output
    }

    /// Whether the client constrained the preview size at all.
    pub fn has_size(&self) -> bool {
        self.width.is_some() || self.height.is_some()
    }

    /// Filename reduced to its last path component, safe to join onto the
    /// workspace directory.
    pub fn sanitized_filename(&self) -> String {
        sanitize_filename(&self.filename)
    }
}

/// Builder for [`PreviewRequest`].
#[derive(Debug)]
pub struct PreviewRequestBuilder {
    request: PreviewRequest,
}

impl PreviewRequestBuilder {
    pub fn width(mut self, width: Option<u32>) -> Self {
        self.request.width = width;
        self
    }

    pub fn height(mut self, height: Option<u32>) -> Self {
        self.request.height = height;
        self
    }

    pub fn need_crop(mut self, v: bool) -> Self {
        self.request.need_crop = v;
        self
    }

    pub fn output(mut self, kind: OutputKind) -> Self {
        self.request.output = kind;
        self
    }

    /// Parse `extension` into an [`OutputKind`].
    pub fn extension(self, extension: &str) -> Result<Self, PreviewError> {
        let kind = extension.parse()?;
        Ok(self.output(kind))
    }

    /// Build the request, rejecting zero dimensions.
    pub fn build(self) -> Result<PreviewRequest, PreviewError> {
        let r = &self.request;
        if r.width == Some(0) {
            return Err(PreviewError::InvalidParameter {
                name: "width",
                value: "0".into(),
            });
        }
        if r.height == Some(0) {
            return Err(PreviewError::InvalidParameter {
                name: "height",
                value: "0".into(),
            });
        }
        Ok(self.request)
    }
}

/// Raw query parameters of `POST /preview`, before validation.
///
/// Everything arrives as text so a malformed value produces our own JSON
/// error instead of the framework's plain-text rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreviewParams {
    pub filename: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub need_crop: Option<String>,
    pub extension: Option<String>,
}

impl PreviewParams {
    /// Validate the parameters and attach the uploaded body.
    pub fn into_request(self, bytes: impl Into<Vec<u8>>) -> Result<PreviewRequest, PreviewError> {
        let filename = self
            .filename
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| DEFAULT_FILENAME.to_string());
        let width = parse_dimension("width", self.width.as_deref())?;
        let height = parse_dimension("height", self.height.as_deref())?;
        let need_crop = match self.need_crop.as_deref() {
            None | Some("") => true,
            Some(v) => parse_flag("need_crop", v)?,
        };
        let extension = self.extension.unwrap_or_else(|| OutputKind::Jpeg.to_string());

        PreviewRequest::builder(filename, bytes)
            .width(width)
            .height(height)
            .need_crop(need_crop)
            .extension(&extension)?
            .build()
    }
}

fn parse_dimension(name: &'static str, raw: Option<&str>) -> Result<Option<u32>, PreviewError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => match v.parse::<u32>() {
            Ok(n) if n > 0 => Ok(Some(n)),
            _ => Err(PreviewError::InvalidParameter {
                name,
                value: v.to_string(),
            }),
        },
    }
}

fn parse_flag(name: &'static str, raw: &str) -> Result<bool, PreviewError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(PreviewError::InvalidParameter {
            name,
            value: raw.to_string(),
        }),
    }
}

/// Keep only the final path component of a client-supplied name.
pub fn sanitize_filename(name: &str) -> String {
    let last = name
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();
    match last {
        "" | "." | ".." => DEFAULT_FILENAME.to_string(),
        other => other.to_string(),
    }
}
