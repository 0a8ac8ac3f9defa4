use thiserror::Error;

/// Top-level error type for wasend.
///
/// The `Display` text is what ends up in `{ "error": ... }` result items
/// when the node runs in continue-on-fail mode.
#[derive(Debug, Error)]
pub enum WasendError {
    /// Missing or invalid node parameter.
    #[error("parameter error: {0}")]
    Parameter(String),

    /// Missing credential field or failed credential lookup.
    #[error("credentials error: {0}")]
    Credentials(String),

    /// The API answered with a non-success status.
    #[error("whatsapp api returned {status}: {body}")]
    Http { status: u16, body: String },

    /// Transport failure: connect, timeout, TLS, body read.
    #[error("request failed: {0}")]
    Request(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
