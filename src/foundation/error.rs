/// Convenience result type used across Overmark.
pub type OvermarkResult<T> = Result<T, OvermarkError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum OvermarkError {
    /// Unreadable or corrupt image bytes. Recoverable; never touches a surface.
    #[error("decode error: {0}")]
    Decode(String),

    /// An operation was invoked before its required inputs were ready.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// Surface-to-bytes conversion failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// Invalid user-provided configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OvermarkError {
    /// Build an [`OvermarkError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build an [`OvermarkError::Precondition`] value.
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Build an [`OvermarkError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build an [`OvermarkError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// `true` for errors that are expected at runtime and scoped to one input
    /// (bad image bytes, failed encoding).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::Encode(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
