//! MRI classification service configuration

use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub inference: InferenceConfig,
    pub model: ModelConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InferenceConfig {
    pub device: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    pub path: PathBuf,
    /// Remote fallback: downloaded to `path` on startup if the file is absent
    pub url: Option<String>,
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn default_path() -> &'static str {
        "config.toml"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig { port: 3000 },
            inference: InferenceConfig {
                device: "CPU".to_string(),
            },
            model: ModelConfig {
                path: PathBuf::from("models/brain_mri_vgg16.onnx"),
                url: None,
            },
        }
    }
}
