//! Scan service - core classification flow
//!
//! Orchestrates model loading, preprocessing, inference and result mapping
//! for a single uploaded MRI image.

use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::engine::preprocess::{decode_image, preprocess};
use crate::engine::{Classifier, ModelLoader};
use crate::error::ClassifyError;

use super::types::{ClassificationResult, HealthResult, ScanResult};

/// MRI classification service
pub struct ScanService {
    loader: Arc<ModelLoader>,
}

impl ScanService {
    pub fn new(loader: Arc<ModelLoader>) -> Self {
        Self { loader }
    }

    /// Classify a single uploaded MRI image.
    ///
    /// The model handle is resolved before the image bytes are touched, so a
    /// missing artifact surfaces as `ModelNotFound` regardless of the upload.
    pub async fn classify(&self, image_data: &[u8]) -> Result<ScanResult, ClassifyError> {
        let start = Instant::now();

        let image_data = image_data.to_vec();
        let loader = self.loader.clone();

        let classification: ClassificationResult = tokio::task::spawn_blocking(move || {
            loader.get()?;

            let image = decode_image(&image_data)?;
            let tensor = preprocess(&image)?;

            let classifier = Classifier::new(loader);
            let probs = classifier.predict(&tensor)?;

            ClassificationResult::from_prediction(&probs)
        })
        .await
        .map_err(|e| ClassifyError::inference(format!("classification task failed: {e}")))??;

        let inference_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "Classified scan as {} ({:.1}%) in {}ms",
            classification.class.as_str(),
            classification.confidence * 100.0,
            inference_time_ms
        );

        Ok(ScanResult {
            classification,
            inference_time_ms,
        })
    }

    /// Eagerly load the model so a bad artifact fails at startup
    pub async fn warm_up(&self) -> Result<(), ClassifyError> {
        let loader = self.loader.clone();
        tokio::task::spawn_blocking(move || loader.get().map(|_| ()))
            .await
            .map_err(|e| ClassifyError::inference(format!("warm-up task failed: {e}")))?
    }

    /// Get health status
    pub fn health(&self) -> HealthResult {
        HealthResult {
            healthy: true,
            version: env!("CARGO_PKG_VERSION").to_string(),
            model_loaded: self.loader.is_loaded(),
        }
    }
}
