//! Integration tests against a real SQLite file in a temp directory.

use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use tempfile::TempDir;

use sweep_core::PostRecord;
use sweep_store::{
    connect, export_csv, export_json, query_posts, run_migrations, statistics, upsert_ignore,
    PostFilter,
};

async fn fresh_pool(dir: &TempDir) -> SqlitePool {
    let pool = connect(&dir.path().join("posts.db")).await.expect("connect");
    run_migrations(&pool).await.expect("migrate");
    pool
}

fn record(platform: &str, post_id: &str, content: &str, ts: Option<DateTime<Utc>>) -> PostRecord {
    PostRecord::new(
        platform.to_string(),
        post_id.to_string(),
        "tester".to_string(),
        content.to_string(),
        ts,
        format!("https://example.com/{post_id}"),
    )
}

#[tokio::test]
async fn first_write_wins_on_duplicate_keys() {
    let dir = TempDir::new().expect("tempdir");
    let pool = fresh_pool(&dir).await;
    let now = Utc::now();

    let first = record("forums", "p1", "original content", Some(now));
    let inserted = upsert_ignore(&pool, &[first]).await.expect("insert");
    assert_eq!(inserted, 1);

    let replay = record("forums", "p1", "changed content", Some(now));
    let inserted = upsert_ignore(&pool, &[replay]).await.expect("insert");
    assert_eq!(inserted, 0, "duplicate key must be ignored");

    let posts = query_posts(&pool, &PostFilter::default()).await.expect("query");
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].content, "original content");
}

#[tokio::test]
async fn same_post_id_on_different_platforms_is_distinct() {
    let dir = TempDir::new().expect("tempdir");
    let pool = fresh_pool(&dir).await;
    let now = Utc::now();

    let records = vec![
        record("forums", "shared", "forum copy", Some(now)),
        record("reddit", "shared", "reddit copy", Some(now)),
    ];
    let inserted = upsert_ignore(&pool, &records).await.expect("insert");
    assert_eq!(inserted, 2);
}

#[tokio::test]
async fn query_filters_and_orders_newest_first() {
    let dir = TempDir::new().expect("tempdir");
    let pool = fresh_pool(&dir).await;
    let now = Utc::now();

    let records = vec![
        record("forums", "old", "rust release notes", Some(now - Duration::hours(10))),
        record("forums", "new", "rust async patterns", Some(now - Duration::hours(1))),
        record("forums", "undated", "rust without a timestamp", None),
        record("reddit", "other", "rust on reddit", Some(now - Duration::hours(2))),
        record("forums", "offtopic", "gardening tips", Some(now - Duration::hours(3))),
    ];
    upsert_ignore(&pool, &records).await.expect("insert");

    let filter = PostFilter {
        platform: Some("forums".to_string()),
        keywords: vec!["rust".to_string()],
        ..PostFilter::default()
    };
    let posts = query_posts(&pool, &filter).await.expect("query");

    let ids: Vec<&str> = posts.iter().map(|p| p.post_id.as_str()).collect();
    assert_eq!(ids, vec!["new", "old", "undated"], "newest first, undated last");
}

#[tokio::test]
async fn query_respects_time_bounds_and_limit() {
    let dir = TempDir::new().expect("tempdir");
    let pool = fresh_pool(&dir).await;
    let now = Utc::now();

    let records = vec![
        record("forums", "recent", "inside the window", Some(now - Duration::days(1))),
        record("forums", "stale", "outside the window", Some(now - Duration::days(20))),
    ];
    upsert_ignore(&pool, &records).await.expect("insert");

    let filter = PostFilter {
        since: Some(now - Duration::days(7)),
        ..PostFilter::default()
    };
    let posts = query_posts(&pool, &filter).await.expect("query");
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].post_id, "recent");

    let filter = PostFilter {
        limit: Some(1),
        ..PostFilter::default()
    };
    let posts = query_posts(&pool, &filter).await.expect("query");
    assert_eq!(posts.len(), 1);
}

#[tokio::test]
async fn statistics_reflect_stored_posts() {
    let dir = TempDir::new().expect("tempdir");
    let pool = fresh_pool(&dir).await;
    let now = Utc::now();

    let records = vec![
        record("forums", "f1", "a", Some(now - Duration::hours(2))),
        record("forums", "f2", "b", Some(now - Duration::hours(1))),
        record("reddit", "r1", "c", Some(now - Duration::hours(3))),
    ];
    upsert_ignore(&pool, &records).await.expect("insert");
    // A replayed record must not inflate the totals.
    upsert_ignore(&pool, &[record("forums", "f1", "a", Some(now))])
        .await
        .expect("insert");

    let stats = statistics(&pool).await.expect("stats");
    assert_eq!(stats.total_posts, 3);
    assert_eq!(stats.by_platform.len(), 2);
    assert_eq!(stats.by_platform[0].platform, "forums");
    assert_eq!(stats.by_platform[0].count, 2);
    assert!(!stats.by_day.is_empty());
    assert!(stats.earliest.is_some());
    assert!(stats.latest >= stats.earliest);
}

#[tokio::test]
async fn tags_and_metadata_survive_a_round_trip() {
    let dir = TempDir::new().expect("tempdir");
    let pool = fresh_pool(&dir).await;

    let mut metadata = serde_json::Map::new();
    metadata.insert("subreddit".to_string(), serde_json::json!("rust"));
    let stored = record("reddit", "rich", "typed content", Some(Utc::now()))
        .with_tags(vec!["rust".to_string(), "async".to_string()])
        .with_metadata(metadata);
    upsert_ignore(&pool, &[stored]).await.expect("insert");

    let posts = query_posts(&pool, &PostFilter::default()).await.expect("query");
    assert_eq!(posts[0].tags, vec!["rust".to_string(), "async".to_string()]);
    assert_eq!(posts[0].metadata["subreddit"], "rust");
}

#[tokio::test]
async fn exports_write_both_formats() {
    let dir = TempDir::new().expect("tempdir");
    let pool = fresh_pool(&dir).await;
    let now = Utc::now();

    let records = vec![
        record("forums", "e1", "plain content", Some(now)),
        record("forums", "e2", "content, with a comma", None),
    ];
    upsert_ignore(&pool, &records).await.expect("insert");

    let json_path = dir.path().join("posts.json");
    let written = export_json(&pool, &json_path).await.expect("export json");
    assert_eq!(written, 2);
    let parsed: Vec<PostRecord> =
        serde_json::from_str(&std::fs::read_to_string(&json_path).expect("read"))
            .expect("valid json");
    // Re-parsing the export must yield the stored records, field for field.
    let stored = query_posts(&pool, &PostFilter::default()).await.expect("query");
    assert_eq!(parsed, stored);
    for record in &stored {
        let twin = parsed
            .iter()
            .find(|p| p.dedup_key() == record.dedup_key())
            .expect("identity survives the round trip");
        assert_eq!(twin.content, record.content);
        assert_eq!(twin.timestamp, record.timestamp);
    }

    let csv_path = dir.path().join("posts.csv");
    let written = export_csv(&pool, &csv_path).await.expect("export csv");
    assert_eq!(written, 2);
    let body = std::fs::read_to_string(&csv_path).expect("read");
    let mut lines = body.lines();
    assert!(lines
        .next()
        .is_some_and(|header| header.starts_with("platform,post_id,")));
    assert_eq!(lines.count(), 2);
    assert!(body.contains("\"content, with a comma\""));
}
