use axum::http::header::InvalidHeaderValue;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("missing configuration value: {0}")]
    Configuration(&'static str),
    #[error("invalid identity provider endpoint: {0}")]
    Endpoint(String),
    #[error("{field} {reason}")]
    Validation {
        field: &'static str,
        reason: &'static str,
    },
    #[error("no session token present in request")]
    Session,
    #[error(transparent)]
    Authentication(#[from] ProviderError),
    #[error("identity provider response is missing {0}")]
    Identity(&'static str),
    #[error("invalid session cookie: {0}")]
    Cookie(#[from] InvalidHeaderValue),
}

impl Error {
    pub(crate) const fn required(field: &'static str) -> Self {
        Self::Validation {
            field,
            reason: "is required",
        }
    }

    /// Provider error code, when the failure came from the identity provider.
    #[must_use]
    pub fn provider_code(&self) -> Option<&str> {
        match self {
            Self::Authentication(err) => err.code(),
            _ => None,
        }
    }
}

/// Failures reported by, or while talking to, the identity provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{code}: {message}")]
    Service {
        status: u16,
        code: String,
        message: String,
    },
    /// The call never produced a service answer: dispatch, timeout or an
    /// unreadable response.
    #[error("identity provider request failed: {0}")]
    Transport(String),
    #[error("invalid identity provider request: {0}")]
    InvalidRequest(String),
}

impl ProviderError {
    /// Error type name as reported by the provider, e.g. `NotAuthorizedException`.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Service { code, .. } => Some(code),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_throttling(&self) -> bool {
        matches!(
            self.code(),
            Some(
                "TooManyRequestsException"
                    | "LimitExceededException"
                    | "TooManyFailedAttemptsException"
            )
        )
    }
}
