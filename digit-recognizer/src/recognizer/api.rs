use reqwest::{header::CONTENT_TYPE, Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{RecognizerError, Result};
use crate::models::{ImageTensor, PredictionResult};

/// Message reported when the serving endpoint cannot be reached.
pub const CONNECTIVITY_MESSAGE: &str = "Serving URL does not exist.";

/// TensorFlow Serving predict URL for a versioned model.
pub fn predict_url(base_url: &str, model_name: &str, model_version: &str) -> String {
    format!(
        "{}/v1/models/{}_v{}:predict",
        base_url.trim_end_matches('/'),
        model_name,
        model_version
    )
}

/// Index and value of the largest score.
///
/// The first occurrence wins on ties, and NaN scores are never selected.
/// Returns `None` when no score is comparable.
pub fn argmax(scores: &[f32]) -> Option<(usize, f32)> {
    scores
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, score)| !score.is_nan())
        .fold(None, |best, (idx, score)| match best {
            Some((_, best_score)) if score <= best_score => best,
            _ => Some((idx, score)),
        })
}

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    inputs: &'a ImageTensor,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    outputs: Vec<Vec<f32>>,
}

#[derive(Clone, Debug)]
pub struct ServingClient {
    client: Client,
    url: String,
}

impl ServingClient {
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| RecognizerError::Http(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Sends one predict request and reduces the per-class scores to a digit.
    ///
    /// Never fails: transport problems and non-200 responses come back as
    /// `PredictionResult::Failure`. No retries are attempted.
    pub async fn predict(&self, tensor: ImageTensor) -> PredictionResult {
        match self.request_scores(&tensor).await {
            Ok(scores) => Self::select_digit(&scores),
            Err(e) => {
                warn!(url = %self.url, error = %e, "Prediction request failed");
                let message = match e {
                    RecognizerError::Connectivity(_) => CONNECTIVITY_MESSAGE.to_string(),
                    RecognizerError::Server { body, .. } => body,
                    other => other.to_string(),
                };
                PredictionResult::failure(message)
            }
        }
    }

    async fn request_scores(&self, tensor: &ImageTensor) -> Result<Vec<Vec<f32>>> {
        debug!(url = %self.url, shape = ?tensor.shape(), "Sending predict request");

        let resp = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .json(&PredictRequest { inputs: tensor })
            .send()
            .await
            .map_err(RecognizerError::Connectivity)?;

        let status = resp.status();
        let body = resp.text().await.map_err(RecognizerError::Connectivity)?;

        if status != StatusCode::OK {
            return Err(RecognizerError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: PredictResponse = serde_json::from_str(&body)?;
        Ok(parsed.outputs)
    }

    /// Picks the winning class of the first batch element.
    ///
    /// The score is reported as returned, never renormalized, so a winning
    /// score outside [0, 1] (raw logits, for instance) is a `Failure`.
    fn select_digit(outputs: &[Vec<f32>]) -> PredictionResult {
        let Some(scores) = outputs.first() else {
            return PredictionResult::failure("Serving response contained no outputs");
        };

        match argmax(scores) {
            Some((digit, score)) if digit <= 9 && (0.0..=1.0).contains(&score) => {
                PredictionResult::Success {
                    digit: digit as u8,
                    score,
                }
            }
            Some((digit, score)) if digit <= 9 => PredictionResult::failure(format!(
                "Score {score} for digit {digit} is outside [0, 1]"
            )),
            Some((digit, _)) => PredictionResult::failure(format!(
                "Predicted class {digit} is not a digit ({} classes returned)",
                scores.len()
            )),
            None => PredictionResult::failure("Serving response contained no scores"),
        }
    }
}
