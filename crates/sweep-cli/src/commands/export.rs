use std::path::PathBuf;

use clap::Args;
use sqlx::SqlitePool;

use sweep_core::AppConfig;
use sweep_store::{export_csv, export_json, ExportFormat};

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Output file; defaults to a timestamped file in the export directory.
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Output format: json or csv.
    #[arg(long, default_value = "json")]
    pub format: ExportFormat,
}

pub async fn run(args: &ExportArgs, config: &AppConfig, pool: &SqlitePool) -> anyhow::Result<()> {
    let path = match &args.output {
        Some(path) => path.clone(),
        None => {
            let stamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
            config
                .export_dir
                .join(format!("posts_{stamp}.{}", args.format.extension()))
        }
    };

    let written = match args.format {
        ExportFormat::Json => export_json(pool, &path).await?,
        ExportFormat::Csv => export_csv(pool, &path).await?,
    };
    println!("exported {written} post(s) to {}", path.display());
    Ok(())
}
