use clap::ValueEnum;
use std::path::PathBuf;

pub const DEFAULT_MODEL_PATH: &str = "model/mobilenetV2/mobilenetv2_ft.onnx";
pub const DEFAULT_INPUT_SIZE: u32 = 128;
pub const MAX_TOP_K: usize = 4;

/// Pixel tensor layout expected by the exported model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TensorLayout {
    /// `[1, H, W, 3]`, the Keras default.
    Nhwc,
    /// `[1, 3, H, W]`
    Nchw,
}

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// ONNX export of the fine-tuned classifier
    pub model_path: PathBuf,
    /// Square edge the uploads are resized to
    pub input_size: u32,
    /// Number of ranked classes returned per prediction
    pub top_k: usize,
    pub layout: TensorLayout,
    pub use_gpu: bool,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 7860,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            input_size: DEFAULT_INPUT_SIZE,
            top_k: MAX_TOP_K,
            layout: TensorLayout::Nhwc,
            use_gpu: true,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.clamp(1, MAX_TOP_K);
        self
    }
}
