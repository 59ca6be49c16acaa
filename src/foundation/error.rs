/// Convenience result type used across layermint.
pub type MintResult<T> = Result<T, MintError>;

/// Top-level error taxonomy used by the generation and consumption phases.
///
/// `Composite` and `Metadata` are per-item kinds: batch runners record them in a
/// [`crate::BatchReport`] instead of aborting. Every other kind is fatal for the run.
#[derive(thiserror::Error, Debug)]
pub enum MintError {
    /// A required directory or file is missing (catalog root, category directory, manifest).
    #[error("not found: {0}")]
    NotFound(String),

    /// Manifest content is not valid JSON or does not have the expected record shape.
    #[error("parse error: {0}")]
    Parse(String),

    /// Reading, resizing, compositing or writing a single image failed.
    #[error("composite error: {0}")]
    Composite(String),

    /// Building or writing a single metadata document failed.
    #[error("metadata error: {0}")]
    Metadata(String),

    /// The manifest does not match the fingerprint an output set was produced from.
    #[error("stale manifest: {0}")]
    Stale(String),

    /// Invalid configuration or a refused operation.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MintError {
    /// Build a [`MintError::NotFound`] value.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Build a [`MintError::Parse`] value.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Build a [`MintError::Composite`] value.
    pub fn composite(msg: impl Into<String>) -> Self {
        Self::Composite(msg.into())
    }

    /// Build a [`MintError::Metadata`] value.
    pub fn metadata(msg: impl Into<String>) -> Self {
        Self::Metadata(msg.into())
    }

    /// Build a [`MintError::Stale`] value.
    pub fn stale(msg: impl Into<String>) -> Self {
        Self::Stale(msg.into())
    }

    /// Build a [`MintError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Whether batch runners isolate this error to a single item.
    pub fn is_per_item(&self) -> bool {
        matches!(self, Self::Composite(_) | Self::Metadata(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
