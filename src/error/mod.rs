//! Error handling for the SEMD pipeline.

/// Specialized error type for pipeline operations
#[derive(Debug, thiserror::Error)]
pub enum OncoCubeError {
    /// Error opening or reading a file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Error parsing an XML payload
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
    /// Structurally broken document (unbalanced tags, no root element)
    #[error("malformed document: {0}")]
    Malformed(String),
    /// Error decoding a JSON-shaped value (settings, summaries)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Error with a directory lookup backend
    #[error("directory error: {0}")]
    Directory(String),
    /// Error with a cube store backend
    #[error("cube store error: {0}")]
    Store(String),
    /// Invalid caller-supplied parameter, identified by name
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Name of the offending parameter
        name: String,
        /// What was wrong with it
        message: String,
    },
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, OncoCubeError>;
