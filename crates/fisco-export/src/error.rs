//! # Render Error Types
//!
//! Every variant is fatal for the request: no partial document is returned.

use thiserror::Error;

/// Result type alias for rendering.
pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Debug, Error)]
pub enum RenderError {
    /// The table layout capability is missing or misconfigured.
    /// Checked before any report content is laid out.
    #[error("Table layout unavailable: {0}")]
    LayoutUnavailable(String),

    /// Layout started but could not place a block.
    #[error("Layout failed: {0}")]
    LayoutFailed(String),

    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
