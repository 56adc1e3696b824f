//! Tumor classifier forward pass

use std::sync::Arc;

use ndarray::Array4;

use crate::classes::NUM_CLASSES;
use crate::engine::loader::ModelLoader;
use crate::error::ClassifyError;

/// Tolerance for deciding whether raw model output already is a
/// probability distribution
const PROB_SUM_TOLERANCE: f32 = 1e-3;

/// Tumor classifier
///
/// Runs the model forward pass on a preprocessed tensor and returns a
/// label-aligned probability vector.
pub struct Classifier {
    loader: Arc<ModelLoader>,
}

impl Classifier {
    pub fn new(loader: Arc<ModelLoader>) -> Self {
        Self { loader }
    }

    /// Produce a 4-entry probability distribution for a preprocessed tensor.
    ///
    /// Deterministic: a fixed model and a fixed input tensor always produce
    /// the same output.
    pub fn predict(&self, input: &Array4<f32>) -> Result<Vec<f32>, ClassifyError> {
        let model = self.loader.get()?;
        let output = model.infer(input)?;

        if output.len() != NUM_CLASSES {
            return Err(ClassifyError::inference(format!(
                "model produced {} outputs, expected {}",
                output.len(),
                NUM_CLASSES
            )));
        }

        // The exported model normally ends in a softmax layer. If the output
        // does not look like a probability distribution, normalize it here.
        let sum: f32 = output.iter().sum();
        let probs = if (sum - 1.0).abs() > PROB_SUM_TOLERANCE || output.iter().any(|&v| v < 0.0) {
            softmax(&output)
        } else {
            output
        };

        Ok(probs)
    }
}

/// Numerically stable softmax
pub fn softmax(x: &[f32]) -> Vec<f32> {
    let max_val = x.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exp_vals: Vec<f32> = x.iter().map(|v| (v - max_val).exp()).collect();
    let sum: f32 = exp_vals.iter().sum();
    exp_vals.iter().map(|v| v / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::loader::TumorModel;
    use crate::engine::preprocess::INPUT_SIZE;

    struct StubModel {
        output: Vec<f32>,
    }

    impl TumorModel for StubModel {
        fn infer(&self, _input: &Array4<f32>) -> Result<Vec<f32>, ClassifyError> {
            Ok(self.output.clone())
        }
    }

    fn classifier_with(output: Vec<f32>) -> Classifier {
        Classifier::new(Arc::new(ModelLoader::preloaded(Arc::new(StubModel {
            output,
        }))))
    }

    fn input_tensor() -> Array4<f32> {
        let (w, h) = INPUT_SIZE;
        Array4::zeros((1, h as usize, w as usize, 3))
    }

    #[test]
    fn test_predict_passes_through_probabilities() {
        let classifier = classifier_with(vec![0.1, 0.2, 0.6, 0.1]);
        let probs = classifier.predict(&input_tensor()).unwrap();
        assert_eq!(probs, vec![0.1, 0.2, 0.6, 0.1]);
    }

    #[test]
    fn test_predict_normalizes_raw_logits() {
        let classifier = classifier_with(vec![1.0, 2.0, 3.0, 4.0]);
        let probs = classifier.predict(&input_tensor()).unwrap();

        assert_eq!(probs.len(), NUM_CLASSES);
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-3);
        for &p in &probs {
            assert!((0.0..=1.0).contains(&p));
        }
        // Ordering of the logits must survive normalization
        assert!(probs[3] > probs[2] && probs[2] > probs[1] && probs[1] > probs[0]);
    }

    #[test]
    fn test_predict_normalizes_negative_scores() {
        let classifier = classifier_with(vec![-1.0, 0.5, 0.3, 0.2]);
        let probs = classifier.predict(&input_tensor()).unwrap();

        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-3);
        assert!(probs.iter().all(|&p| p >= 0.0));
    }

    #[test]
    fn test_predict_rejects_wrong_output_cardinality() {
        let classifier = classifier_with(vec![0.5, 0.5]);
        let err = classifier.predict(&input_tensor()).unwrap_err();
        assert!(matches!(err, ClassifyError::Inference { .. }));
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let result = softmax(&[1.0, 2.0, 3.0]);
        let sum: f32 = result.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(result[2] > result[1]);
        assert!(result[1] > result[0]);
    }
}
