use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use tracing::{error, info};

use doc_consolidator::telemetry::init_tracing;
use doc_consolidator::{Dependencies, LogFormat, Settings, SettingsOverrides};
use doc_consolidator_pipeline::profile::{PHYSICIAN_PROFILE, SPECIALTY_ROLLUP_PROFILE};

#[derive(Parser)]
#[command(name = "doc-consolidator")]
#[command(about = "Consolidate normalized relation extracts into JSON Lines documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Local data root (overrides LOCAL_DATA_ROOT_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Source directory under the data root (overrides DOWNLOAD_PREFIX)
    #[arg(long, global = true)]
    download_prefix: Option<String>,

    /// Output directory under the data root (overrides UPLOAD_PREFIX)
    #[arg(long, global = true)]
    upload_prefix: Option<String>,

    /// Output file name (overrides TRANSFORMED_FILENAME)
    #[arg(long, global = true)]
    output_name: Option<String>,

    /// Prefix stripped from source file names (overrides DATASET_PREFIX)
    #[arg(long, global = true)]
    dataset_prefix: Option<String>,

    /// Emit logs as JSON (overrides LOG_FORMAT)
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build one document per physician
    Physician,
    /// Build the specialty rollup documents
    SpecialtyRollup,
}

impl Cli {
    fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            data_root: self.data_dir.clone(),
            download_prefix: self.download_prefix.clone(),
            upload_prefix: self.upload_prefix.clone(),
            transformed_filename: self.output_name.clone(),
            dataset_prefix: self.dataset_prefix.clone(),
            log_format: self.json_logs.then_some(LogFormat::Json),
        }
    }

    fn profile(&self) -> &'static str {
        match self.command {
            Commands::Physician => PHYSICIAN_PROFILE,
            Commands::SpecialtyRollup => SPECIALTY_ROLLUP_PROFILE,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    let mut settings = Settings::from_env()?;
    settings.apply(cli.overrides());
    init_tracing(settings.log_format);

    info!(profile = cli.profile(), "Starting document consolidator");

    let dependencies = Dependencies::new(&settings, cli.profile())?;
    let report = match dependencies.orchestrator.run().await {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, "Consolidation failed");
            return Err(e.into());
        }
    };

    info!(
        documents = report.documents,
        relations = report.relations_loaded,
        warnings = report.warnings.len(),
        elapsed_ms = report.elapsed_ms(),
        location = report.output_location.as_deref().unwrap_or_default(),
        "Consolidation complete"
    );
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
