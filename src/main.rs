//! Poultry disease identification server
//!
//! Serves a single-page upload form and a JSON prediction endpoint backed by
//! a fine-tuned MobileNetV2 exported to ONNX.

use std::path::PathBuf;

use clap::Parser;
use poultry_health_lib::config::{
    ServerConfig, TensorLayout, DEFAULT_INPUT_SIZE, DEFAULT_MODEL_PATH,
};
use poultry_health_lib::logging::init_logging;

#[derive(Parser, Debug)]
#[command(name = "poultry-health")]
#[command(version)]
#[command(about = "Classify poultry fecal images by disease")]
struct Cli {
    /// Host to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "7860")]
    port: u16,

    /// ONNX model file
    #[arg(short, long, env = "POULTRY_MODEL_PATH", default_value = DEFAULT_MODEL_PATH)]
    model: PathBuf,

    /// Edge length uploads are resized to
    #[arg(long, default_value_t = DEFAULT_INPUT_SIZE)]
    input_size: u32,

    /// Ranked classes returned per prediction (1-4)
    #[arg(long, default_value = "4")]
    top_k: usize,

    /// Input tensor layout of the model
    #[arg(long, value_enum, default_value = "nhwc")]
    layout: TensorLayout,

    /// Skip GPU execution providers
    #[arg(long)]
    cpu_only: bool,

    /// Maximum upload size in megabytes
    #[arg(long, default_value = "10")]
    max_upload_mb: usize,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = ServerConfig {
        host: cli.host,
        port: cli.port,
        model_path: cli.model,
        input_size: cli.input_size,
        layout: cli.layout,
        use_gpu: !cli.cpu_only,
        max_upload_bytes: cli.max_upload_mb * 1024 * 1024,
        ..ServerConfig::default()
    }
    .with_top_k(cli.top_k);

    poultry_health_lib::run(config).await
}
