use crate::error::PreviewError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// JSON body of every failed request: `{"error": "...", "code": 400}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: u16,
}

/// Full diagnostic for the response logger. Travels in the response
/// extensions and never reaches the client.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub detail: String,
    pub client_fault: bool,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    report: ErrorReport,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            status,
            report: ErrorReport {
                detail: message.clone(),
                client_fault: status.is_client_error(),
            },
            message,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<PreviewError> for ApiError {
    fn from(err: PreviewError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: err.public_message(),
            report: ErrorReport {
                detail: err.to_string(),
                client_fault: err.is_client_error(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            code: self.status.as_u16(),
        };
        let mut response = (self.status, Json(body)).into_response();
        response.extensions_mut().insert(self.report);
        response
    }
}
