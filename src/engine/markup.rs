//! Minimal HTML documents for the HTML preview kind.

use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Escape text for use inside HTML element content or a quoted attribute.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn document(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
        escape(title),
        body
    )
}

/// Plain text shown verbatim in a `<pre>` block.
pub fn text_document(title: &str, text: &str) -> String {
    document(title, &format!("<pre>{}</pre>\n", escape(text)))
}

/// One `<section>` per PDF page, numbered from 1.
pub fn pages_document(title: &str, pages: &[String]) -> String {
    let body: String = pages
        .iter()
        .enumerate()
        .map(|(i, text)| {
            format!(
                "<section id=\"page-{n}\">\n<pre>{}</pre>\n</section>\n",
                escape(text),
                n = i + 1
            )
        })
        .collect();
    document(title, &body)
}

/// A raster embedded as a base64 data URI.
pub fn image_document(title: &str, mime_type: &str, bytes: &[u8]) -> String {
    let b64 = STANDARD.encode(bytes);
    document(
        title,
        &format!(
            "<img alt=\"{}\" src=\"data:{};base64,{}\">\n",
            escape(title),
            mime_type,
            b64
        ),
    )
}
