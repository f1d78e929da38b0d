//! Input sniffing: decide what an uploaded file actually is.
//!
//! Content wins over the filename. Magic bytes identify PDFs and rasters;
//! the extension (via `mime_guess`) only separates HTML from plain text,
//! and valid UTF-8 without NUL bytes is accepted as text when the name says
//! nothing useful.

use crate::error::PreviewError;
use image::ImageFormat;
use mime_guess::mime;
use std::io::Read;
use std::path::Path;

/// How many leading bytes are inspected.
const SNIFF_LEN: u64 = 1024;

/// What the engine thinks an input file is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Pdf,
    /// A raster format this build can decode.
    Image(ImageFormat),
    Html,
    Text,
    Unknown,
}

/// Sniff the file at `path`.
pub fn detect(path: &Path) -> Result<SourceKind, PreviewError> {
    let mut head = Vec::with_capacity(SNIFF_LEN as usize);
    std::fs::File::open(path)?
        .take(SNIFF_LEN)
        .read_to_end(&mut head)?;
    Ok(classify(path, &head))
}

/// Classify from the leading bytes and the file name.
pub fn classify(path: &Path, head: &[u8]) -> SourceKind {
    if head.starts_with(b"%PDF") {
        return SourceKind::Pdf;
    }
    if let Ok(format) = image::guess_format(head) {
        if format.reading_enabled() {
            return SourceKind::Image(format);
        }
    }

    let guessed = mime_guess::from_path(path).first();
    if let Some(m) = &guessed {
        if m.type_() == mime::TEXT && m.subtype() == mime::HTML {
            return SourceKind::Html;
        }
    }
    if !looks_textual(head) {
        return SourceKind::Unknown;
    }
    if looks_like_html(head) {
        return SourceKind::Html;
    }
    match guessed {
        Some(m) if m.type_() != mime::TEXT && m.subtype() != mime::JSON && m.subtype() != mime::XML => {
            // Valid UTF-8 but the name claims something else (e.g. `.docx`).
            SourceKind::Unknown
        }
        _ => SourceKind::Text,
    }
}

/// No NUL bytes and valid UTF-8, allowing a multi-byte character cut off by
/// the sniff window.
fn looks_textual(head: &[u8]) -> bool {
    if head.contains(&0) {
        return false;
    }
    match std::str::from_utf8(head) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none(),
    }
}

fn looks_like_html(head: &[u8]) -> bool {
    let text = String::from_utf8_lossy(head);
    let start = text.trim_start().to_ascii_lowercase();
    start.starts_with("<!doctype html") || start.starts_with("<html")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[test]
    fn pdf_magic_wins_over_name() {
        assert_eq!(classify(Path::new("x.html"), b"%PDF-1.7\n"), SourceKind::Pdf);
    }

    #[test]
    fn raster_by_magic() {
        assert_eq!(
            classify(Path::new("unnamed"), PNG_MAGIC),
            SourceKind::Image(ImageFormat::Png)
        );
        assert_eq!(
            classify(Path::new("photo.txt"), b"\xFF\xD8\xFF\xE0\0\x10JFIF"),
            SourceKind::Image(ImageFormat::Jpeg)
        );
    }

    #[test]
    fn html_by_extension_or_content() {
        assert_eq!(classify(Path::new("page.htm"), b"hello"), SourceKind::Html);
        assert_eq!(
            classify(Path::new("unnamed"), b"  <!DOCTYPE html><html></html>"),
            SourceKind::Html
        );
    }

    #[test]
    fn text_variants() {
        assert_eq!(classify(Path::new("notes.txt"), b"plain"), SourceKind::Text);
        assert_eq!(classify(Path::new("data.json"), b"{\"a\": 1}"), SourceKind::Text);
        assert_eq!(classify(Path::new("unnamed"), "héllo".as_bytes()), SourceKind::Text);
        // Cut in the middle of a two-byte character.
        assert_eq!(classify(Path::new("unnamed"), &"é".as_bytes()[..1]), SourceKind::Text);
    }

    #[test]
    fn binary_or_mislabelled_is_unknown() {
        assert_eq!(classify(Path::new("blob.bin"), b"\0\x01\x02"), SourceKind::Unknown);
        assert_eq!(classify(Path::new("report.docx"), b"PK\x03\x04"), SourceKind::Unknown);
        assert_eq!(classify(Path::new("unnamed"), b"\xC3\x28 invalid"), SourceKind::Unknown);
    }

    #[test]
    fn detect_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("readme.md");
        std::fs::write(&path, "# Title\n").unwrap();
        assert_eq!(detect(&path).unwrap(), SourceKind::Text);
    }
}
