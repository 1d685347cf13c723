//! Extractors that deserialize and then validate, failing with a 422 envelope.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Query, Request, rejection::JsonRejection},
    http::request::Parts,
};
use redakto_core::{Error, FieldError, Validate};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

pub struct ValidatedJson<T>(pub T);

pub struct ValidatedQuery<T>(pub T);

fn json_rejection(rejection: JsonRejection) -> ApiError {
    let kind = match &rejection {
        JsonRejection::JsonDataError(_) => "value_error",
        JsonRejection::JsonSyntaxError(_) => "json_invalid",
        JsonRejection::MissingJsonContentType(_) => "content_type",
        _ => "body_error",
    };
    ApiError(Error::Validation(vec![FieldError::new(
        kind,
        &["body"],
        rejection.body_text(),
        Value::Null,
    )]))
}

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(json_rejection)?;
        value
            .validate("body")
            .map(Self)
            .map_err(|errors| ApiError(Error::Validation(errors)))
    }
}

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                ApiError(Error::Validation(vec![FieldError::new(
                    "value_error",
                    &["query"],
                    rejection.body_text(),
                    Value::String(parts.uri.query().unwrap_or_default().to_string()),
                )]))
            })?;
        value
            .validate("query")
            .map(Self)
            .map_err(|errors| ApiError(Error::Validation(errors)))
    }
}
