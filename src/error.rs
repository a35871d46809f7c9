//! Error types for the capture pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while rendering and post-processing assets
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid or missing configuration (parameter file, placeholder contract)
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Failed to launch the headless browser
    #[error("Browser launch failed: {0}")]
    Launch(String),

    /// Failed to navigate to or load a scene document
    #[error("Failed to load scene: {0}")]
    Load(String),

    /// The capture target never appeared in the rendered document
    #[error("Timed out after {timeout_ms}ms waiting for #{element_id} in {document}")]
    SelectorTimeout {
        document: String,
        element_id: String,
        timeout_ms: u64,
    },

    /// Screenshot or fragment extraction failed mid-session
    #[error("Capture failed: {0}")]
    Capture(String),

    /// Vector post-processing failed (normalization, flattening tool)
    #[error("Vector post-processing failed: {0}")]
    PostProcess(String),

    /// Variant generation failed (malformed template SVG)
    #[error("Variant generation failed: {0}")]
    Variant(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Capture(err.to_string())
    }
}
