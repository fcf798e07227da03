use chrono::SecondsFormat;
use sqlx::SqlitePool;

use sweep_store::statistics;

pub async fn run(pool: &SqlitePool) -> anyhow::Result<()> {
    let stats = statistics(pool).await?;

    println!("total posts: {}", stats.total_posts);

    if !stats.by_platform.is_empty() {
        println!("by platform:");
        for entry in &stats.by_platform {
            println!("  {}: {}", entry.platform, entry.count);
        }
    }

    match (stats.earliest, stats.latest) {
        (Some(earliest), Some(latest)) => println!(
            "date range: {} .. {}",
            earliest.to_rfc3339_opts(SecondsFormat::Secs, true),
            latest.to_rfc3339_opts(SecondsFormat::Secs, true)
        ),
        _ => println!("date range: no timestamped posts yet"),
    }

    if !stats.by_day.is_empty() {
        println!("recent days:");
        for (day, count) in &stats.by_day {
            println!("  {day}: {count}");
        }
    }

    Ok(())
}
