//! Error envelope for API responses.
//!
//! Handlers return [`ApiError`]; its response carries the error body as an
//! extension. [`error_envelope`] adds the request path and method and logs it.
//! Handler panics become internal errors through [`panic_response`].

use std::any::Any;

use axum::{
    Json,
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use redakto_core::Error;
use serde::Serialize;
use serde_json::{Value, json};
use utoipa::ToSchema;

const INTERNAL_ERROR: &str = "internal_server_error";
const INTERNAL_MESSAGE: &str = "An unexpected error occurred.";

#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    pub details: Value,
}

impl ErrorBody {
    fn from_error(err: &Error) -> Self {
        if err.is_domain() {
            Self {
                error: err.kind().to_string(),
                message: err.to_string(),
                details: err.details(),
            }
        } else {
            Self {
                error: INTERNAL_ERROR.to_string(),
                message: INTERNAL_MESSAGE.to_string(),
                details: json!({}),
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if !self.0.is_domain() {
            tracing::error!("Unexpected error: {:?}", self.0);
        }

        let body = ErrorBody::from_error(&self.0);
        let mut response = (status, Json(&body)).into_response();
        response.extensions_mut().insert(body);
        response
    }
}

/// Body of every error response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorEnvelope {
    #[schema(example = "/api/predict/detect_entities")]
    pub path: String,
    #[schema(example = "POST")]
    pub method: String,
    #[schema(example = "EntitySetNotFoundError")]
    pub error: String,
    pub message: String,
    #[schema(value_type = Object)]
    pub details: Value,
}

/// Turns a handler panic into an internal error response.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let reason = panic
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| panic.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "unknown panic payload".to_string());
    ApiError(Error::Other(anyhow::anyhow!("Handler panicked: {}", reason))).into_response()
}

/// Rewrites error responses into `{path, method, error, message, details}`.
pub async fn error_envelope(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let method = request.method().to_string();

    let response = next.run(request).await;
    let Some(body) = response.extensions().get::<ErrorBody>().cloned() else {
        return response;
    };

    tracing::error!(
        path = %path,
        method = %method,
        details = %body.details,
        "{}",
        body.message
    );

    let status = response.status();
    let envelope = ErrorEnvelope {
        path,
        method,
        error: body.error,
        message: body.message,
        details: body.details,
    };
    (status, Json(envelope)).into_response()
}
