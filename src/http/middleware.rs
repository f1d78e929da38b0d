use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use tracing::{error, info, warn};

use super::error::ErrorReport;

/// One log line per request; failures carry the diagnostic from
/// [`ErrorReport`].
pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let mut response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = start.elapsed().as_millis();
    let report = response.extensions_mut().remove::<ErrorReport>();

    match report {
        Some(report) if !report.client_fault || status.is_server_error() => {
            error!(
                target: "docpreview::http",
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                query = uri.query().unwrap_or(""),
                elapsed_ms = elapsed_ms,
                detail = %report.detail,
                "request failed"
            );
        }
        Some(report) => {
            warn!(
                target: "docpreview::http",
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                query = uri.query().unwrap_or(""),
                elapsed_ms = elapsed_ms,
                detail = %report.detail,
                "request rejected"
            );
        }
        None => {
            info!(
                target: "docpreview::http",
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                elapsed_ms = elapsed_ms,
                "request served"
            );
        }
    }

    response
}
