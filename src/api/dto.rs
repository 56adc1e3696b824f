//! REST API response data transfer objects

use serde::Serialize;

use crate::classes::TumorClass;
use crate::service::types::ScanResult;

/// Classification response
#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub class: String,
    pub display_name: String,
    pub confidence: f32,
    pub severity: String,
    pub color: String,
    pub description: String,
    pub distribution: Vec<ClassScoreDto>,
    pub inference_time_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct ClassScoreDto {
    pub class: String,
    pub probability: f32,
}

impl From<ScanResult> for ClassifyResponse {
    fn from(result: ScanResult) -> Self {
        let class = result.classification.class;
        let meta = class.metadata();

        Self {
            class: class.as_str().to_string(),
            display_name: class.display_name().to_string(),
            confidence: result.classification.confidence,
            severity: meta.severity.to_string(),
            color: meta.color.to_string(),
            description: meta.description.to_string(),
            distribution: result
                .classification
                .distribution
                .iter()
                .map(|s| ClassScoreDto {
                    class: s.class.as_str().to_string(),
                    probability: s.probability,
                })
                .collect(),
            inference_time_ms: result.inference_time_ms,
        }
    }
}

/// Per-class static metadata, as rendered by clients
#[derive(Debug, Serialize)]
pub struct ClassInfoDto {
    pub class: String,
    pub display_name: String,
    pub description: String,
    pub details: String,
    pub treatment: String,
    pub prognosis: String,
    pub color: String,
    pub severity: String,
}

impl From<TumorClass> for ClassInfoDto {
    fn from(class: TumorClass) -> Self {
        let meta = class.metadata();
        Self {
            class: class.as_str().to_string(),
            display_name: class.display_name().to_string(),
            description: meta.description.to_string(),
            details: meta.details.to_string(),
            treatment: meta.treatment.to_string(),
            prognosis: meta.prognosis.to_string(),
            color: meta.color.to_string(),
            severity: meta.severity.to_string(),
        }
    }
}

/// Classes response
#[derive(Debug, Serialize)]
pub struct ClassesResponse {
    pub classes: Vec<ClassInfoDto>,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: String,
    pub model_loaded: bool,
}

/// Metrics response
#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub uptime_seconds: u64,
    pub model_loaded: bool,
    pub total_classifications: u64,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: &str, code: &str) -> Self {
        Self {
            error: error.to_string(),
            code: code.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::types::{ClassificationResult, ScanResult};

    #[test]
    fn test_classify_response_serialization() {
        let classification =
            ClassificationResult::from_prediction(&[0.7, 0.1, 0.1, 0.1]).unwrap();
        let response = ClassifyResponse::from(ScanResult {
            classification,
            inference_time_ms: 42,
        });

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["class"], "glioma");
        assert_eq!(json["display_name"], "Glioma");
        assert_eq!(json["inference_time_ms"], 42);
        assert_eq!(json["distribution"].as_array().unwrap().len(), 4);
        assert_eq!(json["distribution"][2]["class"], "notumor");
    }

    #[test]
    fn test_class_info_carries_metadata() {
        let info = ClassInfoDto::from(TumorClass::NoTumor);
        assert_eq!(info.class, "notumor");
        assert_eq!(info.severity, "none");
        assert!(!info.treatment.is_empty());
        assert!(info.color.starts_with('#'));
    }
}
