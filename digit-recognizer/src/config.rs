use serde::Deserialize;
use std::env;
use std::path::PathBuf;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub serving: ServingConfig,
    pub model: ModelConfig,
}

/// Remote model server the tensors are sent to
#[derive(Debug, Clone, Deserialize)]
pub struct ServingConfig {
    pub base_url: String,
    pub model_name: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    pub version: String,
    pub config_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            serving: ServingConfig {
                base_url: env::var("SERVING_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:8501".to_string()),
                model_name: env::var("SERVING_MODEL_NAME")
                    .unwrap_or_else(|_| "digit_recognizer".to_string()),
                timeout_secs: parse_env_or("SERVING_TIMEOUT", 30),
            },
            model: ModelConfig {
                version: env::var("MODEL_VERSION").unwrap_or_else(|_| "1.0.0".to_string()),
                config_dir: env::var("MODEL_CONFIG_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("configs/models/digit_recognizer")),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Full predict URL for the configured model version.
    pub fn predict_url(&self) -> String {
        crate::recognizer::predict_url(
            &self.serving.base_url,
            &self.serving.model_name,
            &self.model.version,
        )
    }
}
