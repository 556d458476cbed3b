use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::error::{RecognizerError, Result};

/// Per-version model input requirements, loaded once and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfiguration {
    model_version: String,
    final_image_width: u32,
    final_image_height: u32,
}

#[derive(Debug, Deserialize, Validate)]
struct ConfigurationFile {
    #[validate(nested)]
    model: ModelSection,
}

#[derive(Debug, Deserialize, Validate)]
struct ModelSection {
    #[serde(default)]
    model_version: Option<String>,
    #[validate(range(min = 1, message = "must be a positive integer"))]
    final_image_width: u32,
    #[validate(range(min = 1, message = "must be a positive integer"))]
    final_image_height: u32,
}

impl ModelConfiguration {
    /// Builds a configuration directly, rejecting zero dimensions.
    pub fn new(model_version: impl Into<String>, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(RecognizerError::ConfigParse(format!(
                "image dimensions must be positive, got {width}x{height}"
            )));
        }

        Ok(Self {
            model_version: model_version.into(),
            final_image_width: width,
            final_image_height: height,
        })
    }

    /// Path of the descriptor for `model_version` inside `config_dir`.
    pub fn path_for(model_version: &str, config_dir: &Path) -> PathBuf {
        config_dir.join(format!("v{model_version}.json"))
    }

    /// Reads and validates `<config_dir>/v<model_version>.json`.
    pub fn load(model_version: &str, config_dir: impl AsRef<Path>) -> Result<Self> {
        let path = Self::path_for(model_version, config_dir.as_ref());

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(RecognizerError::ConfigNotFound(path))
            }
            Err(e) => return Err(RecognizerError::Io(e)),
        };

        Self::parse(model_version, &contents)
    }

    /// Parses a descriptor document for `model_version`.
    pub fn parse(model_version: &str, contents: &str) -> Result<Self> {
        let file: ConfigurationFile = serde_json::from_str(contents)
            .map_err(|e| RecognizerError::ConfigParse(e.to_string()))?;

        file.validate()
            .map_err(|e| RecognizerError::ConfigParse(e.to_string()))?;

        if let Some(declared) = &file.model.model_version {
            if declared != model_version {
                return Err(RecognizerError::ConfigParse(format!(
                    "descriptor declares version {declared}, expected {model_version}"
                )));
            }
        }

        tracing::debug!(
            version = model_version,
            width = file.model.final_image_width,
            height = file.model.final_image_height,
            "Loaded model configuration"
        );

        Self::new(
            model_version,
            file.model.final_image_width,
            file.model.final_image_height,
        )
    }

    pub fn model_version(&self) -> &str {
        &self.model_version
    }

    pub fn final_image_width(&self) -> u32 {
        self.final_image_width
    }

    pub fn final_image_height(&self) -> u32 {
        self.final_image_height
    }
}
