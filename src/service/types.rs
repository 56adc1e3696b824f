//! Service layer types

use serde::Serialize;

use crate::classes::{ClassMetadata, TumorClass, NUM_CLASSES};
use crate::error::ClassifyError;

/// Probability assigned to one class, in model output order
#[derive(Debug, Clone, Serialize)]
pub struct ClassScore {
    pub class: TumorClass,
    pub probability: f32,
}

/// Structured classification output for one image
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationResult {
    pub class: TumorClass,
    /// Probability of the predicted class
    pub confidence: f32,
    /// Full per-class distribution, label-aligned
    pub distribution: Vec<ClassScore>,
    pub metadata: &'static ClassMetadata,
}

impl ClassificationResult {
    /// Map a raw probability vector to a structured result.
    ///
    /// When several classes share the maximum probability the lowest-indexed
    /// label wins, so results stay deterministic on exact ties.
    pub fn from_prediction(probs: &[f32]) -> Result<Self, ClassifyError> {
        if probs.len() != NUM_CLASSES {
            return Err(ClassifyError::invalid_prediction(probs.len()));
        }

        let mut best = 0;
        for (i, &p) in probs.iter().enumerate() {
            if p > probs[best] {
                best = i;
            }
        }

        let class = TumorClass::ALL[best];
        let distribution = TumorClass::ALL
            .iter()
            .zip(probs.iter())
            .map(|(&class, &probability)| ClassScore { class, probability })
            .collect();

        Ok(Self {
            class,
            confidence: probs[best],
            distribution,
            metadata: class.metadata(),
        })
    }
}

/// Classification outcome with timing
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    pub classification: ClassificationResult,
    pub inference_time_ms: u64,
}

/// Health check result
#[derive(Debug, Clone, Serialize)]
pub struct HealthResult {
    pub healthy: bool,
    pub version: String,
    pub model_loaded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax_selects_highest_probability() {
        let result = ClassificationResult::from_prediction(&[0.1, 0.2, 0.6, 0.1]).unwrap();
        assert_eq!(result.class, TumorClass::NoTumor);
        assert!((result.confidence - 0.6).abs() < 1e-6);
        assert_eq!(result.distribution.len(), NUM_CLASSES);
    }

    #[test]
    fn test_tie_break_picks_lowest_index() {
        let result = ClassificationResult::from_prediction(&[0.25, 0.25, 0.25, 0.25]).unwrap();
        assert_eq!(result.class, TumorClass::Glioma);

        let result = ClassificationResult::from_prediction(&[0.1, 0.4, 0.4, 0.1]).unwrap();
        assert_eq!(result.class, TumorClass::Meningioma);
    }

    #[test]
    fn test_distribution_preserves_label_order() {
        let probs = [0.4, 0.3, 0.2, 0.1];
        let result = ClassificationResult::from_prediction(&probs).unwrap();
        for (score, (&class, &p)) in result
            .distribution
            .iter()
            .zip(TumorClass::ALL.iter().zip(probs.iter()))
        {
            assert_eq!(score.class, class);
            assert!((score.probability - p).abs() < 1e-6);
        }
    }

    #[test]
    fn test_wrong_length_vector_is_rejected() {
        let err = ClassificationResult::from_prediction(&[0.5, 0.5]).unwrap_err();
        assert!(matches!(
            err,
            ClassifyError::InvalidPrediction {
                expected: 4,
                got: 2
            }
        ));

        let err = ClassificationResult::from_prediction(&[]).unwrap_err();
        assert!(matches!(err, ClassifyError::InvalidPrediction { got: 0, .. }));
    }

    #[test]
    fn test_metadata_matches_predicted_class() {
        let result = ClassificationResult::from_prediction(&[0.0, 0.0, 0.0, 1.0]).unwrap();
        assert_eq!(result.class, TumorClass::Pituitary);
        assert_eq!(
            result.metadata.color,
            TumorClass::Pituitary.metadata().color
        );
    }
}
