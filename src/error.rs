//! Error types for the docpreview library.
//!
//! A single [`PreviewError`] covers every way a preview request can fail.
//! All variants are local to one request: nothing is retried and nothing is
//! fatal to the process. The HTTP boundary turns every variant into a
//! `400` JSON body via [`PreviewError::public_message`], which never
//! includes workspace paths.

use crate::request::OutputKind;
use thiserror::Error;

/// All errors returned by the docpreview library.
#[derive(Debug, Error)]
pub enum PreviewError {
    // ── Client errors ─────────────────────────────────────────────────────
    /// The requested output extension is not one of jpeg/pdf/html/text.
    #[error("Unknown output kind '{extension}'; expected one of: jpeg, pdf, html, text")]
    UnknownOutputKind { extension: String },

    /// A request parameter could not be parsed or is out of range.
    #[error("Invalid value '{value}' for parameter '{name}'")]
    InvalidParameter { name: &'static str, value: String },

    /// A requested side exceeds the configured generation cap.
    #[error("Requested {name} {value} exceeds the maximum of {max} pixels")]
    DimensionTooLarge { name: &'static str, value: u32, max: u32 },

    /// The rendering engine cannot turn this input into the requested kind.
    #[error("Cannot render '{file_name}' as {kind}: unsupported input type")]
    UnsupportedInput { file_name: String, kind: OutputKind },

    // ── Processing errors ─────────────────────────────────────────────────
    /// Loading, resizing, cropping or saving the raster artifact failed.
    #[error("Image processing failed: {detail}")]
    ImageProcessing { detail: String },

    /// The PDF backend could not load or render the document.
    #[error("Rendering failed: {detail}")]
    Render { detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set DOCPREVIEW_PDFIUM_LIB=/path/to/libpdfium or install pdfium system-wide."
    )]
    PdfiumUnavailable(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Creating the temporary workspace or reading/writing inside it failed.
    #[error("Workspace I/O failed: {source}")]
    Workspace {
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PreviewError {
    /// Whether the failure was caused by what the client sent.
    ///
    /// The HTTP status is the same either way; this only picks the log level.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PreviewError::UnknownOutputKind { .. }
                | PreviewError::InvalidParameter { .. }
                | PreviewError::DimensionTooLarge { .. }
                | PreviewError::UnsupportedInput { .. }
                | PreviewError::ImageProcessing { .. }
                | PreviewError::Render { .. }
        )
    }

    /// Message safe to hand back to a client.
    ///
    /// I/O errors can mention temporary paths, so they are reduced to a
    /// generic sentence; everything else already only names what the client
    /// supplied.
    pub fn public_message(&self) -> String {
        match self {
            PreviewError::Workspace { .. } => "Failed to store the uploaded file".to_string(),
            PreviewError::PdfiumUnavailable(_) => "PDF rendering is not available".to_string(),
            PreviewError::Internal(_) => "Internal error while rendering preview".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<std::io::Error> for PreviewError {
    fn from(source: std::io::Error) -> Self {
        PreviewError::Workspace { source }
    }
}

impl From<image::ImageError> for PreviewError {
    fn from(err: image::ImageError) -> Self {
        PreviewError::ImageProcessing {
            detail: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_kind_display() {
        let e = PreviewError::UnknownOutputKind {
            extension: "bmp".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("'bmp'"), "got: {msg}");
        assert!(msg.contains("jpeg"));
        assert!(e.is_client_error());
    }

    #[test]
    fn unsupported_input_names_file_and_kind() {
        let e = PreviewError::UnsupportedInput {
            file_name: "archive.bin".into(),
            kind: OutputKind::Pdf,
        };
        assert!(e.to_string().contains("archive.bin"));
        assert!(e.to_string().contains("pdf"));
    }

    #[test]
    fn workspace_error_hides_paths() {
        let e = PreviewError::Workspace {
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "/tmp/.tmpAbc123/secret.docx: not found",
            ),
        };
        assert!(e.to_string().contains("/tmp/"));
        assert!(!e.public_message().contains("/tmp/"));
        assert!(!e.is_client_error());
    }

    #[test]
    fn image_error_converts_to_processing() {
        let err = image::ImageError::Unsupported(
            image::error::UnsupportedError::from_format_and_kind(
                image::error::ImageFormatHint::Unknown,
                image::error::UnsupportedErrorKind::Format(image::error::ImageFormatHint::Unknown),
            ),
        );
        let e: PreviewError = err.into();
        assert!(matches!(e, PreviewError::ImageProcessing { .. }));
    }
}
