//! Database operations for the `posts` table.

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use sweep_core::PostRecord;

use crate::StoreError;

/// A raw row from the `posts` table. Timestamps live as RFC 3339 text and
/// tags/metadata as JSON text; [`Self::into_record`] decodes them.
#[derive(Debug, Clone, sqlx::FromRow)]
struct PostRow {
    platform: String,
    post_id: String,
    author: String,
    content: String,
    timestamp: Option<String>,
    url: String,
    likes: i64,
    shares: i64,
    comments: i64,
    tags: String,
    metadata: String,
}

impl PostRow {
    /// Decode into a [`PostRecord`], tolerating malformed JSON columns from
    /// older rows rather than failing the whole query.
    fn into_record(self) -> PostRecord {
        let timestamp = self.timestamp.as_deref().and_then(parse_rfc3339);
        let tags: Vec<String> = serde_json::from_str(&self.tags).unwrap_or_default();
        let metadata: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(&self.metadata).unwrap_or_default();

        PostRecord::new(
            self.platform,
            self.post_id,
            self.author,
            self.content,
            timestamp,
            self.url,
        )
        .with_counts(self.likes, self.shares, self.comments)
        .with_tags(tags)
        .with_metadata(metadata)
    }
}

fn parse_rfc3339(value: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(value) {
        Ok(parsed) => Some(parsed.with_timezone(&Utc)),
        Err(err) => {
            tracing::warn!(value, error = %err, "unparseable timestamp in posts table");
            None
        }
    }
}

fn encode_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Insert records, silently skipping any (platform, post_id) pair already
/// stored. The first collected version of a post wins.
///
/// Returns the number of rows actually inserted.
///
/// # Errors
///
/// Returns [`StoreError::Sqlx`] if the transaction fails; nothing is
/// inserted in that case.
pub async fn upsert_ignore(pool: &SqlitePool, records: &[PostRecord]) -> Result<u64, StoreError> {
    let mut tx = pool.begin().await?;
    let mut inserted = 0u64;

    for record in records {
        let result = sqlx::query(
            "INSERT INTO posts \
               (platform, post_id, author, content, timestamp, url, \
                likes, shares, comments, tags, metadata) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT (platform, post_id) DO NOTHING",
        )
        .bind(&record.platform)
        .bind(&record.post_id)
        .bind(&record.author)
        .bind(&record.content)
        .bind(record.timestamp.map(encode_timestamp))
        .bind(&record.url)
        .bind(record.likes)
        .bind(record.shares)
        .bind(record.comments)
        .bind(serde_json::to_string(&record.tags)?)
        .bind(serde_json::to_string(&record.metadata)?)
        .execute(&mut *tx)
        .await?;
        inserted += result.rows_affected();
    }

    tx.commit().await?;
    Ok(inserted)
}

/// Filters for [`query_posts`]. All fields are conjunctive; keywords are
/// OR-combined against post content.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub platform: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub keywords: Vec<String>,
    pub limit: Option<i64>,
}

/// Fetch posts matching `filter`, newest first; rows with no timestamp
/// sort last.
///
/// # Errors
///
/// Returns [`StoreError::Sqlx`] if the query fails.
pub async fn query_posts(
    pool: &SqlitePool,
    filter: &PostFilter,
) -> Result<Vec<PostRecord>, StoreError> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT platform, post_id, author, content, timestamp, url, \
                likes, shares, comments, tags, metadata \
         FROM posts WHERE 1 = 1",
    );

    if let Some(platform) = &filter.platform {
        builder.push(" AND platform = ").push_bind(platform);
    }
    if let Some(since) = filter.since {
        builder
            .push(" AND timestamp >= ")
            .push_bind(encode_timestamp(since));
    }
    if let Some(until) = filter.until {
        builder
            .push(" AND timestamp <= ")
            .push_bind(encode_timestamp(until));
    }
    if !filter.keywords.is_empty() {
        builder.push(" AND (");
        for (i, keyword) in filter.keywords.iter().enumerate() {
            if i > 0 {
                builder.push(" OR ");
            }
            builder
                .push("content LIKE ")
                .push_bind(format!("%{keyword}%"));
        }
        builder.push(")");
    }

    builder.push(" ORDER BY (timestamp IS NULL), timestamp DESC");
    if let Some(limit) = filter.limit {
        builder.push(" LIMIT ").push_bind(limit);
    }

    let rows: Vec<PostRow> = builder.build_query_as().fetch_all(pool).await?;
    Ok(rows.into_iter().map(PostRow::into_record).collect())
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlatformCount {
    pub platform: String,
    pub count: i64,
}

/// Aggregate view over everything collected so far.
#[derive(Debug, Clone)]
pub struct Statistics {
    pub total_posts: i64,
    pub by_platform: Vec<PlatformCount>,
    /// (day, count) pairs for the most recent 30 days that have posts,
    /// newest first. Days come from post timestamps, not collection time.
    pub by_day: Vec<(String, i64)>,
    pub earliest: Option<DateTime<Utc>>,
    pub latest: Option<DateTime<Utc>>,
}

/// # Errors
///
/// Returns [`StoreError::Sqlx`] if any of the aggregate queries fail.
pub async fn statistics(pool: &SqlitePool) -> Result<Statistics, StoreError> {
    let total_posts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
        .fetch_one(pool)
        .await?;

    let by_platform: Vec<PlatformCount> = sqlx::query_as(
        "SELECT platform, COUNT(*) AS count FROM posts \
         GROUP BY platform ORDER BY count DESC, platform",
    )
    .fetch_all(pool)
    .await?;

    let by_day: Vec<(String, i64)> = sqlx::query_as(
        "SELECT substr(timestamp, 1, 10) AS day, COUNT(*) \
         FROM posts WHERE timestamp IS NOT NULL \
         GROUP BY day ORDER BY day DESC LIMIT 30",
    )
    .fetch_all(pool)
    .await?;

    let (earliest, latest): (Option<String>, Option<String>) =
        sqlx::query_as("SELECT MIN(timestamp), MAX(timestamp) FROM posts")
            .fetch_one(pool)
            .await?;

    Ok(Statistics {
        total_posts,
        by_platform,
        by_day,
        earliest: earliest.as_deref().and_then(parse_rfc3339),
        latest: latest.as_deref().and_then(parse_rfc3339),
    })
}
