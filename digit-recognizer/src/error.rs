use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecognizerError {
    #[error("Model configuration not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("Invalid model configuration: {0}")]
    ConfigParse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to load image: {0}")]
    ImageLoad(String),

    #[error("Serving URL does not exist.")]
    Connectivity(#[source] reqwest::Error),

    #[error("Serving endpoint returned {status}: {body}")]
    Server { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RecognizerError {
    /// Whether the error was raised while building a recognizer, as opposed
    /// to while serving a single prediction.
    pub fn is_setup_error(&self) -> bool {
        matches!(
            self,
            RecognizerError::ConfigNotFound(_)
                | RecognizerError::ConfigParse(_)
                | RecognizerError::Http(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, RecognizerError>;
