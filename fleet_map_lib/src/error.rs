use thiserror::Error;

/// Everything that can go wrong between the viewer and the hosted backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("username not found")]
    NotFound,

    #[error("wrong password")]
    WrongPassword,

    #[error("{0}")]
    Validation(String),

    #[error("invalid GeoJSON: {0}")]
    Parse(String),

    #[error("backend error: {0}")]
    Backend(String),
}
