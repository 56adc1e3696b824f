//! Inference engine module
//!
//! Provides OpenVINO-based classification with:
//! - At-most-once model loading with a remote fetch fallback
//! - Deterministic image preprocessing
//! - Forward pass with probability normalization

pub mod classifier;
pub mod loader;
pub mod preprocess;

pub use classifier::Classifier;
pub use loader::{ensure_model_present, ModelLoader, TumorModel};
