//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`; anything that
//! converts into `AppError` can be propagated with `?` and renders with the
//! status, body and log level its `ErrorMetadata` describes.

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use showcase_core::{AppError, ErrorMetadata, LogLevel};
use showcase_infra::ErrorResponse;
use showcase_services::MediaStoreError;

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from showcase-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<MediaStoreError> for HttpAppError {
    fn from(err: MediaStoreError) -> Self {
        HttpAppError(err.into())
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

/// Convert JSON body deserialization failures into a 400 with our ErrorResponse format.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

/// JSON body extractor that answers with our ErrorResponse format on
/// deserialization failure.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

/// Response body for `error`; details are left out in production and for
/// sensitive errors.
pub fn error_body(error: &AppError, is_production: bool) -> ErrorResponse {
    let hide_details = is_production || error.is_sensitive();
    ErrorResponse {
        error: error.client_message(),
        details: (!hide_details).then(|| error.detailed_message()),
        error_type: (!hide_details).then(|| error.error_type().to_string()),
        code: error.error_code().to_string(),
        recoverable: error.is_recoverable(),
        suggested_action: error.suggested_action().map(String::from),
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        (status, Json(error_body(app_error, is_production_env()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_is_verbatim() {
        let error = AppError::MediaValidation(
            "Hero and slider images must be at least 1200px wide (this one is 800px)".to_string(),
        );
        let body = error_body(&error, true);

        assert_eq!(body.code, "MEDIA_VALIDATION_ERROR");
        assert_eq!(
            body.error,
            "Hero and slider images must be at least 1200px wide (this one is 800px)"
        );
        assert!(body.details.is_none());
    }

    #[test]
    fn test_storage_failure_is_generic() {
        let error = AppError::Storage("disk /var/data full".to_string());

        let body = error_body(&error, false);
        assert_eq!(body.error, "Operation failed");
        assert_eq!(body.code, "STORAGE_ERROR");
        assert!(body.details.is_none());

        let response = HttpAppError(error).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_details_shown_outside_production() {
        let error = AppError::NotFound("Division 'mining' not found".to_string());

        let body = error_body(&error, false);
        assert!(body.details.is_some());
        assert!(error_body(&error, true).details.is_none());
        assert_eq!(
            HttpAppError(error).into_response().status(),
            StatusCode::NOT_FOUND
        );
    }
}
