use chrono::{Duration, SecondsFormat, Utc};
use clap::Args;
use sqlx::SqlitePool;

use sweep_store::{query_posts, PostFilter};

const PREVIEW_LEN: usize = 100;
/// Search output is for eyeballing, not export; cap it.
const MAX_RESULTS: i64 = 20;

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Keywords to search for in post content (any match).
    #[arg(long, required = true, value_delimiter = ',')]
    pub keywords: Vec<String>,
    /// Restrict to one platform.
    #[arg(long)]
    pub platform: Option<String>,
    /// How many days back to search.
    #[arg(long, default_value_t = 7)]
    pub days_back: i64,
}

pub async fn run(args: &SearchArgs, pool: &SqlitePool) -> anyhow::Result<()> {
    let filter = PostFilter {
        platform: args.platform.clone(),
        since: Some(Utc::now() - Duration::days(args.days_back)),
        keywords: args.keywords.clone(),
        limit: Some(MAX_RESULTS),
        ..PostFilter::default()
    };
    let posts = query_posts(pool, &filter).await?;

    if posts.is_empty() {
        println!("no posts match");
        return Ok(());
    }
    for post in &posts {
        let when = post
            .timestamp
            .map_or_else(|| "unknown time".to_string(), |ts| {
                ts.to_rfc3339_opts(SecondsFormat::Secs, true)
            });
        let preview: String = post.content.chars().take(PREVIEW_LEN).collect();
        println!("[{}] {} ({when})", post.platform, post.author);
        println!("  {preview}");
        if !post.url.is_empty() {
            println!("  {}", post.url);
        }
    }
    println!("{} post(s) shown", posts.len());
    Ok(())
}
