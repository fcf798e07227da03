use std::time::Duration;

use clap::Args;
use sqlx::SqlitePool;
use tokio::sync::watch;

use sweep_agent::{run_continuous, Coordinator, ScheduleConfig};
use sweep_collectors::CollectRequest;
use sweep_core::{AppConfig, PlatformsConfig};
use sweep_store::{export_csv, export_json};

#[derive(Debug, Args)]
pub struct CollectArgs {
    /// Platforms to sweep; defaults to every enabled platform.
    #[arg(long, value_delimiter = ',')]
    pub platforms: Option<Vec<String>>,
    /// Keywords to filter by; omit to collect everything.
    #[arg(long, value_delimiter = ',')]
    pub keywords: Vec<String>,
    /// Upper bound on posts per platform.
    #[arg(long, default_value_t = 100)]
    pub max_posts: usize,
    /// Lookback window in hours.
    #[arg(long, default_value_t = 24)]
    pub time_range: i64,
    /// Keep collecting on a schedule until interrupted.
    #[arg(long)]
    pub continuous: bool,
    /// Minutes between scheduled cycles.
    #[arg(long, default_value_t = 60)]
    pub interval: u64,
}

pub async fn run(
    args: CollectArgs,
    config: &AppConfig,
    platforms: &PlatformsConfig,
    pool: SqlitePool,
) -> anyhow::Result<()> {
    let coordinator = Coordinator::from_config(platforms, config, pool.clone())?;
    let request = CollectRequest::new(
        args.keywords,
        args.max_posts,
        chrono::Duration::hours(args.time_range),
    );

    if args.continuous {
        let (tx, rx) = watch::channel(false);
        tokio::spawn(async move {
            shutdown_signal().await;
            let _ = tx.send(true);
        });

        let schedule = ScheduleConfig {
            interval: Duration::from_secs(args.interval * 60),
            failure_cooldown: Duration::from_secs(config.failure_cooldown_secs),
        };
        println!(
            "collecting every {} minute(s); press ctrl-c to stop",
            args.interval
        );
        run_continuous(&coordinator, args.platforms.as_deref(), &request, schedule, rx).await;
        return Ok(());
    }

    let summary = coordinator
        .collect_data(args.platforms.as_deref(), &request)
        .await?;

    let mut breakdown: Vec<_> = summary.collected.iter().collect();
    breakdown.sort_by_key(|(name, _)| name.clone());
    for (name, records) in breakdown {
        println!("{name}: {} post(s)", records.len());
    }
    println!(
        "collected {} post(s), {} new",
        summary.total_collected(),
        summary.inserted
    );

    // Snapshot exports alongside every one-shot collection, so the freshest
    // data is always on disk in both formats.
    let stamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let json_path = config.export_dir.join(format!("posts_{stamp}.json"));
    export_json(&pool, &json_path).await?;
    let csv_path = config.export_dir.join(format!("posts_{stamp}.csv"));
    export_csv(&pool, &csv_path).await?;
    println!("exported snapshots to {}", config.export_dir.display());

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, finishing the current cycle");
}
