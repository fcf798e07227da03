//! Export the posts table to JSON or CSV snapshot files.

use std::path::Path;
use std::str::FromStr;

use chrono::SecondsFormat;
use sqlx::SqlitePool;

use sweep_core::PostRecord;

use crate::posts::{query_posts, PostFilter};
use crate::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(format!("unknown export format '{other}' (json or csv)")),
        }
    }
}

/// Write every stored post to `path` as a pretty-printed JSON array,
/// preserving nested tags and metadata.
///
/// Returns the number of records written.
///
/// # Errors
///
/// Returns [`StoreError`] if the query, serialization, or write fails.
pub async fn export_json(pool: &SqlitePool, path: &Path) -> Result<usize, StoreError> {
    let records = query_posts(pool, &PostFilter::default()).await?;
    let body = serde_json::to_string_pretty(&records)?;
    write_file(path, &body)?;
    Ok(records.len())
}

/// Write every stored post to `path` as CSV. Tags flatten to a
/// semicolon-joined list and metadata to its JSON text.
///
/// Returns the number of records written.
///
/// # Errors
///
/// Returns [`StoreError`] if the query, serialization, or write fails.
pub async fn export_csv(pool: &SqlitePool, path: &Path) -> Result<usize, StoreError> {
    let records = query_posts(pool, &PostFilter::default()).await?;

    let mut body = String::from(
        "platform,post_id,author,content,timestamp,url,likes,shares,comments,tags,metadata\n",
    );
    for record in &records {
        body.push_str(&csv_row(record)?);
        body.push('\n');
    }
    write_file(path, &body)?;
    Ok(records.len())
}

fn write_file(path: &Path, body: &str) -> Result<(), StoreError> {
    std::fs::write(path, body).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn csv_row(record: &PostRecord) -> Result<String, StoreError> {
    let timestamp = record
        .timestamp
        .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default();
    let metadata = serde_json::to_string(&record.metadata)?;

    let fields = [
        csv_field(&record.platform),
        csv_field(&record.post_id),
        csv_field(&record.author),
        csv_field(&record.content),
        csv_field(&timestamp),
        csv_field(&record.url),
        record.likes.to_string(),
        record.shares.to_string(),
        record.comments.to_string(),
        csv_field(&record.tags.join(";")),
        csv_field(&metadata),
    ];
    Ok(fields.join(","))
}

/// Quote a field if it carries a comma, quote, or newline; embedded quotes
/// double per RFC 4180.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
