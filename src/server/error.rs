//! Error-to-HTTP response conversion.
//!
//! Handlers return `Result<T, AppError>`; any [`videometa_common::Error`]
//! converts with `?`. The body uses the host REST error shape
//! `{"code", "message", "data": {"status"}}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use videometa_common::Error;

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError {
    inner: Error,
    code: Option<&'static str>,
}

impl AppError {
    pub fn new(inner: Error) -> Self {
        Self { inner, code: None }
    }

    /// Override the machine-readable code derived from the error kind.
    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.inner.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn message(&self) -> String {
        match &self.inner {
            Error::NotFound(msg) | Error::Forbidden(msg) | Error::InvalidInput(msg) => msg.clone(),
            Error::Unauthorized => "Sorry, you are not allowed to do that.".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<Error> for AppError {
    fn from(e: Error) -> Self {
        Self::new(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self.inner,
                "Server error in API handler"
            );
        }

        let body = json!({
            "code": self.code.unwrap_or_else(|| self.inner.rest_code()),
            "message": self.message(),
            "data": { "status": status.as_u16() },
        });

        (status, axum::Json(body)).into_response()
    }
}
