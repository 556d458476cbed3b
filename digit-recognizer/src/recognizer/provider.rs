use std::path::Path;

use tracing::{info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::models::{ImageTensor, ModelConfiguration, PredictionResult};

use super::api::ServingClient;
use super::preprocessing;

/// Recognizes the digit in an image file.
///
/// Built from an already loaded [`ModelConfiguration`], so the resize target
/// is fixed for the recognizer's whole lifetime. Cloning is cheap and clones
/// share the underlying HTTP connection pool.
#[derive(Clone, Debug)]
pub struct DigitRecognizer {
    configuration: ModelConfiguration,
    client: ServingClient,
}

impl DigitRecognizer {
    pub fn new(configuration: ModelConfiguration, client: ServingClient) -> Self {
        Self {
            configuration,
            client,
        }
    }

    /// Loads the descriptor for the configured model version and points the
    /// client at that version's predict endpoint.
    pub fn from_config(config: &Config) -> Result<Self> {
        let configuration =
            ModelConfiguration::load(&config.model.version, &config.model.config_dir)?;
        let client = ServingClient::new(config.predict_url(), config.serving.timeout_secs)?;

        info!(
            version = configuration.model_version(),
            width = configuration.final_image_width(),
            height = configuration.final_image_height(),
            url = client.url(),
            "Digit recognizer initialized"
        );

        Ok(Self::new(configuration, client))
    }

    pub fn model_configuration(&self) -> &ModelConfiguration {
        &self.configuration
    }

    pub fn load_and_preprocess(&self, image_path: impl AsRef<Path>) -> Result<ImageTensor> {
        preprocessing::load_and_preprocess(image_path, &self.configuration)
    }

    pub fn preprocess_bytes(&self, bytes: &[u8]) -> Result<ImageTensor> {
        preprocessing::preprocess_bytes(bytes, &self.configuration)
    }

    /// Preprocesses the image and asks the serving endpoint for a prediction.
    pub async fn predict_digit(&self, image_path: impl AsRef<Path>) -> PredictionResult {
        match self.load_and_preprocess(image_path) {
            Ok(tensor) => self.client.predict(tensor).await,
            Err(e) => {
                warn!(error = %e, "Image preprocessing failed");
                PredictionResult::failure(e.to_string())
            }
        }
    }

    /// Like [`predict_digit`](Self::predict_digit) for an in-memory upload.
    pub async fn predict_bytes(&self, bytes: &[u8]) -> PredictionResult {
        match self.preprocess_bytes(bytes) {
            Ok(tensor) => self.client.predict(tensor).await,
            Err(e) => {
                warn!(error = %e, "Image preprocessing failed");
                PredictionResult::failure(e.to_string())
            }
        }
    }
}
