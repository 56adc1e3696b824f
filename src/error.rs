//! Error taxonomy for the classification pipeline

use std::path::PathBuf;

use thiserror::Error;

use crate::classes::NUM_CLASSES;

#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The model artifact is absent and no remote fallback produced it.
    #[error("model file not found at {path}")]
    ModelNotFound { path: PathBuf },

    /// The artifact exists but could not be deserialized or compiled.
    #[error("failed to load model: {reason}")]
    ModelLoad { reason: String },

    /// The remote fallback download failed.
    #[error("failed to fetch model from {url}: {source}")]
    ModelFetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The uploaded bytes could not be decoded as an image, or the image
    /// has zero-sized dimensions.
    #[error("unsupported image: {reason}")]
    UnsupportedImage { reason: String },

    /// The forward pass failed, or its input/output shape was wrong.
    #[error("inference failed: {reason}")]
    Inference { reason: String },

    /// A prediction vector with the wrong number of entries reached the
    /// result mapper.
    #[error("prediction vector has {got} entries, expected {expected}")]
    InvalidPrediction { expected: usize, got: usize },
}

impl ClassifyError {
    pub fn model_load(reason: impl std::fmt::Display) -> Self {
        Self::ModelLoad {
            reason: reason.to_string(),
        }
    }

    pub fn unsupported(reason: impl std::fmt::Display) -> Self {
        Self::UnsupportedImage {
            reason: reason.to_string(),
        }
    }

    pub fn inference(reason: impl std::fmt::Display) -> Self {
        Self::Inference {
            reason: reason.to_string(),
        }
    }

    pub fn invalid_prediction(got: usize) -> Self {
        Self::InvalidPrediction {
            expected: NUM_CLASSES,
            got,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ClassifyError::ModelNotFound {
            path: PathBuf::from("models/mri.onnx"),
        };
        assert!(err.to_string().contains("models/mri.onnx"));

        let err = ClassifyError::invalid_prediction(3);
        assert!(err.to_string().contains('3'));
        assert!(err.to_string().contains('4'));
    }
}
