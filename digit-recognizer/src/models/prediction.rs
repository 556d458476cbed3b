use serde::{Deserialize, Serialize};

/// Outcome of a single prediction. Inference-time problems are reported as
/// `Failure` rather than returned as errors, so callers match on the tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum PredictionResult {
    Success { digit: u8, score: f32 },
    Failure { message: String },
}

impl PredictionResult {
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Score as a percentage rounded to three decimals.
    pub fn confidence_percent(&self) -> Option<f64> {
        match self {
            Self::Success { score, .. } => {
                Some((f64::from(*score) * 100.0 * 1000.0).round() / 1000.0)
            }
            Self::Failure { .. } => None,
        }
    }
}

impl std::fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success { digit, .. } => write!(
                f,
                "digit {} ({}% confidence)",
                digit,
                self.confidence_percent().unwrap_or_default()
            ),
            Self::Failure { message } => write!(f, "{message}"),
        }
    }
}
