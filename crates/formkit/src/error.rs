//! Library error types.

use thiserror::Error;

/// Errors raised at the edges of the form helper.
///
/// Rendering itself never fails; these cover binding a model and moving
/// flash data through the session.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("bound model must serialize to a JSON object")]
    ModelNotObject,

    #[error("failed to serialize form data: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

/// Result type alias using FormError.
pub type FormResult<T> = Result<T, FormError>;
