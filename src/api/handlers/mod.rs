pub mod health;
pub use self::health::health;

pub mod registration;
pub mod session;
pub mod types;

use crate::error::Error;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;
use types::ErrorResponse;

/// Handler error carrying a session manager failure.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

/// HTTP status for a session manager failure.
#[must_use]
pub fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::Validation { .. } => StatusCode::BAD_REQUEST,
        Error::Session | Error::Identity(_) => StatusCode::UNAUTHORIZED,
        Error::Authentication(provider) if provider.is_throttling() => {
            StatusCode::TOO_MANY_REQUESTS
        }
        Error::Authentication(provider) => match provider.code() {
            // Unknown users look like bad passwords to avoid account enumeration.
            Some("NotAuthorizedException" | "UserNotFoundException") => StatusCode::UNAUTHORIZED,
            Some("UserNotConfirmedException" | "PasswordResetRequiredException") => {
                StatusCode::FORBIDDEN
            }
            Some("UsernameExistsException" | "AliasExistsException") => StatusCode::CONFLICT,
            Some(
                "CodeMismatchException"
                | "ExpiredCodeException"
                | "InvalidPasswordException"
                | "InvalidParameterException",
            ) => StatusCode::BAD_REQUEST,
            _ => StatusCode::BAD_GATEWAY,
        },
        Error::Configuration(_) | Error::Endpoint(_) | Error::Cookie(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);

        let message = match &self.0 {
            Error::Authentication(provider) if provider.code() == Some("UserNotFoundException") => {
                "Incorrect username or password.".to_string()
            }
            err if status.is_server_error() => {
                error!("request failed: {err}");
                status
                    .canonical_reason()
                    .unwrap_or("Internal Server Error")
                    .to_string()
            }
            err => err.to_string(),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
