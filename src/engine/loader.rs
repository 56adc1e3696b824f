//! Model loading and caching
//!
//! Loads the serialized network artifact at most once per process and hands
//! out a shared read-only handle for concurrent inference calls. A remote
//! fetch fallback can populate the local artifact path on startup.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use ndarray::Array4;
use openvino::{CompiledModel, Core, ElementType, Shape, Tensor};
use parking_lot::RwLock;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::engine::preprocess::INPUT_SIZE;
use crate::error::ClassifyError;

/// Inference-capable handle produced by the loader.
///
/// The production implementation wraps an OpenVINO compiled model; tests
/// substitute synthetic models.
pub trait TumorModel: Send + Sync {
    /// Run a forward pass on a `(1, 224, 224, 3)` tensor and return the raw
    /// output scores, aligned to the fixed label order.
    fn infer(&self, input: &Array4<f32>) -> Result<Vec<f32>, ClassifyError>;
}

/// Wrapper for OpenVINO CompiledModel that implements Send + Sync
#[derive(Clone)]
pub struct SafeCompiledModel(Arc<CompiledModel>);
unsafe impl Send for SafeCompiledModel {}
unsafe impl Sync for SafeCompiledModel {}

impl SafeCompiledModel {
    /// Create an inference request
    /// OpenVINO CompiledModel methods are thread-safe in C++, but the Rust
    /// bindings require &mut self. We bypass this restriction safely.
    fn create_infer_request(&self) -> anyhow::Result<openvino::InferRequest> {
        unsafe {
            let ptr = Arc::as_ptr(&self.0) as *mut CompiledModel;
            (*ptr).create_infer_request().map_err(|e| e.into())
        }
    }
}

/// OpenVINO-backed tumor classification model
pub struct OpenVinoModel {
    compiled: SafeCompiledModel,
}

impl TumorModel for OpenVinoModel {
    fn infer(&self, input: &Array4<f32>) -> Result<Vec<f32>, ClassifyError> {
        let (target_w, target_h) = INPUT_SIZE;
        let expected = [1, target_h as usize, target_w as usize, 3];
        if input.shape() != expected {
            return Err(ClassifyError::inference(format!(
                "input tensor shape {:?} does not match expected {:?}",
                input.shape(),
                expected
            )));
        }

        let mut request = self
            .compiled
            .create_infer_request()
            .map_err(ClassifyError::inference)?;

        // NHWC input, matching the exported Keras model
        let input_shape = Shape::new(&[1, target_h as i64, target_w as i64, 3])
            .map_err(ClassifyError::inference)?;
        let mut input_tensor =
            Tensor::new(ElementType::F32, &input_shape).map_err(ClassifyError::inference)?;

        let input_data = input
            .as_slice()
            .ok_or_else(|| ClassifyError::inference("input tensor is not contiguous"))?;
        unsafe {
            let tensor_data = input_tensor
                .get_raw_data_mut()
                .map_err(ClassifyError::inference)?
                .as_mut_ptr() as *mut f32;
            std::ptr::copy_nonoverlapping(input_data.as_ptr(), tensor_data, input_data.len());
        }

        request
            .set_input_tensor(&input_tensor)
            .map_err(ClassifyError::inference)?;
        request.infer().map_err(ClassifyError::inference)?;

        let output = request
            .get_output_tensor()
            .map_err(ClassifyError::inference)?;
        let output_shape = output.get_shape().map_err(ClassifyError::inference)?;
        let output_len = output_shape.get_dimensions().iter().product::<i64>() as usize;

        let output_data: Vec<f32> = unsafe {
            let ptr = output
                .get_raw_data()
                .map_err(ClassifyError::inference)?
                .as_ptr() as *const f32;
            std::slice::from_raw_parts(ptr, output_len).to_vec()
        };

        Ok(output_data)
    }
}

/// Model loader with at-most-once initialization
///
/// The first `get` deserializes and compiles the artifact behind a
/// double-checked write lock; every later call returns a clone of the same
/// cached handle. The handle is immutable after load and safe for concurrent
/// use by simultaneous inference calls.
pub struct ModelLoader {
    path: PathBuf,
    device: String,
    model: RwLock<Option<Arc<dyn TumorModel>>>,
}

impl ModelLoader {
    pub fn new(path: impl Into<PathBuf>, device: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            device: device.into(),
            model: RwLock::new(None),
        }
    }

    /// Create a loader with an already-loaded model handle.
    ///
    /// Used by tests and callers that construct the model themselves.
    pub fn preloaded(model: Arc<dyn TumorModel>) -> Self {
        Self {
            path: PathBuf::new(),
            device: String::new(),
            model: RwLock::new(Some(model)),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.model.read().is_some()
    }

    /// Get the cached model handle, loading it on first use
    pub fn get(&self) -> Result<Arc<dyn TumorModel>, ClassifyError> {
        {
            if let Some(model) = self.model.read().as_ref() {
                return Ok(model.clone());
            }
        }

        let mut guard = self.model.write();
        // Double-check after acquiring the write lock
        if let Some(model) = guard.as_ref() {
            return Ok(model.clone());
        }

        if !self.path.exists() {
            return Err(ClassifyError::ModelNotFound {
                path: self.path.clone(),
            });
        }

        let path_str = self
            .path
            .to_str()
            .ok_or_else(|| ClassifyError::model_load("model path is not valid UTF-8"))?;

        info!("Loading model from {}", self.path.display());
        let start = Instant::now();

        let mut core = Core::new().map_err(ClassifyError::model_load)?;
        let model = core
            .read_model_from_file(path_str, "")
            .map_err(ClassifyError::model_load)?;
        let compiled = core
            .compile_model(&model, self.device.as_str().into())
            .map_err(ClassifyError::model_load)?;

        info!("Model loaded in {:?}", start.elapsed());

        let handle: Arc<dyn TumorModel> = Arc::new(OpenVinoModel {
            compiled: SafeCompiledModel(Arc::new(compiled)),
        });
        *guard = Some(handle.clone());

        Ok(handle)
    }
}

/// Download the model artifact if it is missing and a remote URL is configured.
///
/// The downloaded bytes are written through to `path`, so subsequent startups
/// read straight from disk. Fails with `ModelNotFound` when the file is
/// absent and no URL is available.
pub async fn ensure_model_present(path: &Path, url: Option<&str>) -> Result<(), ClassifyError> {
    if path.exists() {
        return Ok(());
    }

    let url = match url {
        Some(u) if !u.is_empty() => u,
        _ => {
            return Err(ClassifyError::ModelNotFound {
                path: path.to_path_buf(),
            })
        }
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(ClassifyError::model_load)?;
        }
    }

    info!("Downloading model from {}", url);
    let fetch_err = |source| ClassifyError::ModelFetch {
        url: url.to_string(),
        source,
    };

    let mut response = reqwest::get(url)
        .await
        .map_err(fetch_err)?
        .error_for_status()
        .map_err(fetch_err)?;

    // Stream through a temporary file so an interrupted download never
    // leaves a truncated artifact at the cache path.
    let tmp_path = path.with_extension("download");
    let mut file = tokio::fs::File::create(&tmp_path)
        .await
        .map_err(ClassifyError::model_load)?;

    while let Some(chunk) = response.chunk().await.map_err(fetch_err)? {
        file.write_all(&chunk)
            .await
            .map_err(ClassifyError::model_load)?;
    }
    file.flush().await.map_err(ClassifyError::model_load)?;
    drop(file);

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(ClassifyError::model_load)?;

    info!("Model downloaded to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubModel {
        output: Vec<f32>,
    }

    impl TumorModel for StubModel {
        fn infer(&self, _input: &Array4<f32>) -> Result<Vec<f32>, ClassifyError> {
            Ok(self.output.clone())
        }
    }

    #[test]
    fn test_preloaded_returns_identical_handle() {
        let loader = ModelLoader::preloaded(Arc::new(StubModel {
            output: vec![0.1, 0.2, 0.3, 0.4],
        }));

        let first = loader.get().unwrap();
        let second = loader.get().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_missing_model_file() {
        let loader = ModelLoader::new("/nonexistent/model.onnx", "CPU");
        assert!(!loader.is_loaded());

        let err = loader.get().err().unwrap();
        assert!(matches!(err, ClassifyError::ModelNotFound { .. }));
    }

    #[tokio::test]
    async fn test_ensure_model_present_without_url() {
        let path = Path::new("/nonexistent/model.onnx");
        let err = ensure_model_present(path, None).await.unwrap_err();
        assert!(matches!(err, ClassifyError::ModelNotFound { .. }));

        let err = ensure_model_present(path, Some("")).await.unwrap_err();
        assert!(matches!(err, ClassifyError::ModelNotFound { .. }));
    }
}
