pub mod config;
pub mod error;
pub mod models;
pub mod recognizer;

pub use error::{RecognizerError, Result};
pub use models::{ImageTensor, ModelConfiguration, PredictionResult};
pub use recognizer::{DigitRecognizer, ServingClient};
