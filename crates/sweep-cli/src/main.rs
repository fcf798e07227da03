mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "sweep")]
#[command(about = "Collect social media posts from forums, Reddit, Twitter, and Facebook")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a collection cycle, once or on a schedule.
    Collect(commands::collect::CollectArgs),
    /// Search previously collected posts.
    Search(commands::search::SearchArgs),
    /// Show collection statistics.
    Stats,
    /// Export collected posts to a file.
    Export(commands::export::ExportArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = sweep_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    std::fs::create_dir_all(&config.data_dir)?;
    std::fs::create_dir_all(&config.export_dir)?;
    let platforms = sweep_core::load_or_init_platforms(&config.platforms_path)?;

    let pool = sweep_store::connect(&config.db_path()).await?;
    sweep_store::run_migrations(&pool).await?;

    match cli.command {
        Commands::Collect(args) => commands::collect::run(args, &config, &platforms, pool).await,
        Commands::Search(args) => commands::search::run(&args, &pool).await,
        Commands::Stats => commands::stats::run(&pool).await,
        Commands::Export(args) => commands::export::run(&args, &config, &pool).await,
    }
}
