//! Copy a labeled dataset folder into canonical `<category>.<index>.jpg` names.
//!
//! Plain files are copied as they are; `pcr`-prefixed files are renumbered to
//! continue each category's sequence.

use std::path::PathBuf;

use clap::Parser;
use poultry_health_lib::logging::init_logging;
use poultry_health_lib::models::rename_types::RenameOutcome;
use poultry_health_lib::services::rename_service::rename_dataset;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "rename-dataset")]
#[command(version)]
#[command(about = "Rename and copy poultry dataset images by category")]
struct Cli {
    /// Source folder
    #[arg(default_value = "all")]
    source: PathBuf,

    /// Target folder, created if missing
    #[arg(default_value = "all_new")]
    target: PathBuf,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    info!("Starting rename and copy...");
    let summary = match rename_dataset(&cli.source, &cli.target)? {
        RenameOutcome::SourceMissing => return Ok(()),
        RenameOutcome::Completed(summary) => summary,
    };
    info!("Done!");

    info!(
        "Copied {}, renamed {}, skipped {}, failed {}",
        summary.copied,
        summary.renamed,
        summary.skipped.len(),
        summary.failures.len()
    );
    info!(
        "Total files in {}: {}",
        cli.target.display(),
        summary.target_file_count
    );

    Ok(())
}
