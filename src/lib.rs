//! Brain MRI Classification Service Library

pub mod api;
pub mod classes;
pub mod config;
pub mod engine;
pub mod error;
pub mod service;

pub use classes::TumorClass;
pub use config::Config;
pub use error::ClassifyError;
