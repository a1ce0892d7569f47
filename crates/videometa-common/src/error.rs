//! Common error types used throughout videometa.
//!
//! A single error type covers the failure cases the host layer can surface:
//! missing items, rejected principals, invalid payloads and storage failures.
//! The metadata extension itself never constructs errors; it only propagates
//! whatever the store returns.

/// Common error type for videometa.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested item was not found.
    #[error("Item not found: {0}")]
    NotFound(String),

    /// The request carries no valid credentials.
    #[error("Unauthorized")]
    Unauthorized,

    /// The principal is authenticated but not allowed to perform the action.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A database operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input was provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new NotFound error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new Forbidden error.
    pub fn forbidden<S: Into<String>>(msg: S) -> Self {
        Self::Forbidden(msg.into())
    }

    /// Create a new Database error.
    pub fn database<S: Into<String>>(msg: S) -> Self {
        Self::Database(msg.into())
    }

    /// Create a new InvalidInput error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new Internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// HTTP status code the REST layer reports for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Unauthorized => 401,
            Self::Forbidden(_) => 403,
            Self::InvalidInput(_) => 400,
            Self::Database(_) | Self::Io(_) | Self::Internal(_) => 500,
        }
    }

    /// Machine-readable error code in the host platform's REST vocabulary.
    pub fn rest_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "rest_post_invalid_id",
            Self::Unauthorized => "rest_not_logged_in",
            Self::Forbidden(_) => "rest_cannot_update",
            Self::InvalidInput(_) => "rest_invalid_param",
            Self::Database(_) => "rest_db_error",
            Self::Io(_) | Self::Internal(_) => "rest_internal_error",
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Internal(format!("JSON error: {e}"))
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
