// Common test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;

use digit_recognizer::config::{Config, ModelConfig, ServingConfig};
use image::{GrayImage, Luma};
use tempfile::TempDir;

static INIT: Once = Once::new();

/// Initialize tracing subscriber once for tests
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

/// Write a `v<version>.json` descriptor into `dir`
pub fn write_descriptor(dir: &Path, version: &str, width: u32, height: u32) {
    let contents = serde_json::json!({
        "model": {
            "model_version": version,
            "final_image_width": width,
            "final_image_height": height,
        }
    });
    fs::write(dir.join(format!("v{version}.json")), contents.to_string())
        .expect("Failed to write model descriptor");
}

/// Write a synthetic grayscale "1": a white vertical bar on black
pub fn write_digit_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let center = width / 2;
    let img = GrayImage::from_fn(width, height, |x, y| {
        let on_stroke = x.abs_diff(center) <= width / 14 && y > height / 7 && y < height * 6 / 7;
        Luma([if on_stroke { 255 } else { 0 }])
    });

    let path = dir.join(name);
    img.save(&path).expect("Failed to write digit image");
    path
}

/// Config pointing at `base_url` with descriptors under `config_dir`
pub fn test_config(base_url: &str, config_dir: &Path) -> Config {
    Config {
        serving: ServingConfig {
            base_url: base_url.to_string(),
            model_name: "digit_recognizer".to_string(),
            timeout_secs: 5,
        },
        model: ModelConfig {
            version: "1.0.0".to_string(),
            config_dir: config_dir.to_path_buf(),
        },
    }
}

/// Temp directory holding a 28x28 descriptor for version 1.0.0
pub fn descriptor_dir() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    write_descriptor(dir.path(), "1.0.0", 28, 28);
    dir
}
