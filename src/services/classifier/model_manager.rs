use crate::config::{ServerConfig, TensorLayout};
use crate::error::AppError;
use crate::models::classify_types::{ClassLabel, Classification, ModelStatus};
use crate::services::classifier::inference;
use ndarray::Array4;
use ort::session::Session;
use ort::value::Value;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};

/// A forward pass from a preprocessed `[1, ...]` tensor to raw class scores.
pub trait Classifier: Send {
    fn run(&mut self, input: Array4<f32>) -> Result<Vec<f32>, AppError>;
}

pub struct OnnxClassifier {
    session: Session,
}

impl OnnxClassifier {
    pub fn load(model_path: PathBuf, use_gpu: bool) -> Result<Self, AppError> {
        let _ = ort::init().with_name("poultry-health").commit();

        let mut builder = Session::builder()
            .map_err(|e| AppError::new(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)
            .map_err(|e| AppError::new(format!("Failed to set optimization level: {}", e)))?
            .with_intra_threads(4)
            .map_err(|e| AppError::new(format!("Failed to set intra threads: {}", e)))?;

        if use_gpu {
            builder = builder
                .with_execution_providers([
                    ort::execution_providers::DirectMLExecutionProvider::default().build(),
                    ort::execution_providers::CoreMLExecutionProvider::default().build(),
                    ort::execution_providers::CUDAExecutionProvider::default().build(),
                    ort::execution_providers::CPUExecutionProvider::default().build(),
                ])
                .map_err(|e| {
                    AppError::new(format!("Failed to register GPU execution providers: {}", e))
                })?;
        } else {
            builder = builder
                .with_execution_providers([
                    ort::execution_providers::CPUExecutionProvider::default().build(),
                ])
                .map_err(|e| {
                    AppError::new(format!("Failed to register CPU execution provider: {}", e))
                })?;
        }

        let session = builder
            .commit_from_file(&model_path)
            .map_err(|e| {
                AppError::new(format!(
                    "Failed to load ONNX model {}: {}",
                    model_path.display(),
                    e
                ))
            })?;

        Ok(Self { session })
    }
}

impl Classifier for OnnxClassifier {
    fn run(&mut self, input: Array4<f32>) -> Result<Vec<f32>, AppError> {
        // Single-input model
        let input_name = self.session.inputs()[0].name().to_string();

        let input_tensor = Value::from_array(input)
            .map_err(|e| AppError::new(format!("Failed to create tensor value: {}", e)))?;

        let outputs = self
            .session
            .run(ort::inputs![input_name.as_str() => input_tensor])
            .map_err(|e| AppError::new(format!("Inference failed: {}", e)))?;

        let output_value = outputs
            .values()
            .next()
            .ok_or_else(|| AppError::new("Model produced no outputs"))?;

        let (_, data) = output_value
            .try_extract_tensor::<f32>()
            .map_err(|e| AppError::new(format!("Failed to extract output tensor: {}", e)))?;

        Ok(data.to_vec())
    }
}

type SharedClassifier = Arc<std::sync::Mutex<Option<Box<dyn Classifier>>>>;

/// Owns the process-wide classifier. Loaded once at startup, then only read
/// through `classify`.
#[derive(Clone)]
pub struct ModelManager {
    pub model_path: PathBuf,
    pub input_size: u32,
    pub layout: TensorLayout,
    pub top_k: usize,
    use_gpu: bool,
    model: SharedClassifier,
    // Set once the classifier is in place. Async callers read this instead of
    // the model mutex, which a forward pass holds for its whole duration.
    ready: Arc<AtomicBool>,
}

impl ModelManager {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            model_path: config.model_path.clone(),
            input_size: config.input_size,
            layout: config.layout,
            top_k: config.top_k,
            use_gpu: config.use_gpu,
            model: Arc::new(std::sync::Mutex::new(None)),
            ready: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Build a manager around an already constructed classifier.
    pub fn with_classifier(config: &ServerConfig, classifier: Box<dyn Classifier>) -> Self {
        let manager = Self::new(config);
        if let Ok(mut guard) = manager.model.lock() {
            *guard = Some(classifier);
            manager.ready.store(true, Ordering::Release);
        }
        manager
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn status(&self) -> ModelStatus {
        ModelStatus {
            ready: self.is_ready(),
            model_path: self.model_path.to_string_lossy().to_string(),
            input_size: self.input_size,
            top_k: self.top_k,
            labels: ClassLabel::ALL.iter().map(|l| l.name().to_string()).collect(),
        }
    }

    pub async fn load_model(&self) -> Result<(), AppError> {
        if self.is_ready() {
            return Ok(());
        }

        let result = self.do_load_model().await;
        match &result {
            Ok(()) => info!("Model loaded from {}", self.model_path.display()),
            Err(e) => error!("Failed to load model: {}", e),
        }
        result
    }

    async fn do_load_model(&self) -> Result<(), AppError> {
        if !self.model_path.exists() {
            return Err(format!("Model file not found: {}", self.model_path.display()).into());
        }

        let model_path = self.model_path.clone();
        let use_gpu = self.use_gpu;
        let model = self.model.clone();

        tokio::task::spawn_blocking(move || -> Result<(), AppError> {
            let classifier = OnnxClassifier::load(model_path, use_gpu)?;
            let mut guard = model
                .lock()
                .map_err(|_| AppError::new("Model lock poisoned"))?;
            *guard = Some(Box::new(classifier));
            Ok(())
        })
        .await
        .map_err(|e| AppError::new(format!("Failed to spawn model loading task: {}", e)))??;

        self.ready.store(true, Ordering::Release);
        Ok(())
    }

    /// Decode, run and rank one upload on a blocking thread.
    pub async fn classify(&self, bytes: Vec<u8>) -> Result<Classification, AppError> {
        if !self.is_ready() {
            return Err(AppError::unavailable("Model not loaded"));
        }

        let model = self.model.clone();
        let input_size = self.input_size;
        let layout = self.layout;
        let top_k = self.top_k;

        tokio::task::spawn_blocking(move || {
            let mut guard = model
                .lock()
                .map_err(|_| AppError::new("Model lock poisoned"))?;
            let classifier = guard
                .as_mut()
                .ok_or_else(|| AppError::unavailable("Model unloaded"))?;
            inference::classify_image_with_model(
                classifier.as_mut(),
                &bytes,
                input_size,
                layout,
                top_k,
            )
        })
        .await
        .map_err(|e| AppError::new(format!("Task join failed: {}", e)))?
    }
}
