use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};

use super::error::ApiError;
use super::AppState;
use crate::preview::PreviewOutput;
use crate::request::PreviewParams;

const INDEX_HTML: &str = include_str!("index.html");

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn version() -> &'static str {
    concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"))
}

/// `POST /preview?filename=&width=&height=&need_crop=&extension=`, raw file
/// bytes as the body.
pub async fn preview(
    State(state): State<AppState>,
    query: Result<Query<PreviewParams>, QueryRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let Query(params) =
        query.map_err(|rejection| ApiError::new(rejection.status(), rejection.body_text()))?;
    let body = body.map_err(|rejection| ApiError::new(rejection.status(), rejection.body_text()))?;
    let request = params.into_request(body.to_vec())?;
    let output = state.previewer.handle(request).await?;
    Ok(artifact_response(output))
}

fn artifact_response(output: PreviewOutput) -> Response {
    let disposition = HeaderValue::from_str(&format!(
        "inline; filename=\"{}\"",
        header_safe_name(&output.file_name)
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("inline"));

    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, HeaderValue::from_static(output.mime_type())),
            (CONTENT_DISPOSITION, disposition),
        ],
        output.bytes,
    )
        .into_response()
}

/// Printable ASCII only, without quotes or backslashes.
fn header_safe_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect()
}
