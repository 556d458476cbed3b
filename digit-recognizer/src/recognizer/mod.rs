//! Digit Recognition Module
//!
//! Turns an image file into a digit prediction by way of a remote
//! TensorFlow Serving endpoint.
//!
//! # Architecture
//!
//! - `preprocessing` converts a decoded image into a `[1, H, W, 1]` tensor
//! - `ServingClient` posts the tensor to the model's predict URL
//! - `DigitRecognizer` ties both to one loaded `ModelConfiguration`
//!
//! # Configuration
//!
//! Endpoint and model selection come from `Config` (see `config.rs`):
//! - `serving.base_url` / `serving.model_name`: predict endpoint location
//! - `serving.timeout_secs`: request timeout, the only cancellation mechanism
//! - `model.version` / `model.config_dir`: which `v<version>.json` to load
//!
//! # Usage
//!
//! ```rust,ignore
//! let recognizer = DigitRecognizer::from_config(&config)?;
//! match recognizer.predict_digit("upload.png").await {
//!     PredictionResult::Success { digit, score } => println!("{digit} ({score})"),
//!     PredictionResult::Failure { message } => eprintln!("{message}"),
//! }
//! ```

mod api;
mod preprocessing;
mod provider;

pub use api::{argmax, predict_url, ServingClient, CONNECTIVITY_MESSAGE};
pub use preprocessing::{load_and_preprocess, preprocess_bytes, resize, to_grayscale};
pub use provider::DigitRecognizer;
