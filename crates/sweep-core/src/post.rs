use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single unit of collected content.
///
/// The pair `(platform, post_id)` identifies a record globally; the store
/// enforces uniqueness on it and re-collecting the same item is a no-op.
/// Records are immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    /// Source tag, e.g. `reddit`, `twitter`, `forums`.
    pub platform: String,
    /// Source-local identifier.
    pub post_id: String,
    pub author: String,
    pub content: String,
    /// Source-reported creation time. `None` only when the source genuinely
    /// cannot provide one; such records bypass time-range filtering but are
    /// retained in storage.
    pub timestamp: Option<DateTime<Utc>>,
    pub url: String,
    #[serde(default)]
    pub likes: i64,
    #[serde(default)]
    pub shares: i64,
    #[serde(default)]
    pub comments: i64,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Open source-specific payload (subreddit, upvote ratio, scrape origin…).
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl PostRecord {
    /// Build a record with zeroed counters and empty tags/metadata.
    ///
    /// Counter fields are clamped to zero so malformed source payloads can
    /// never produce negative engagement numbers.
    #[must_use]
    pub fn new(
        platform: impl Into<String>,
        post_id: impl Into<String>,
        author: impl Into<String>,
        content: impl Into<String>,
        timestamp: Option<DateTime<Utc>>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            platform: platform.into(),
            post_id: post_id.into(),
            author: author.into(),
            content: content.into(),
            timestamp,
            url: url.into(),
            likes: 0,
            shares: 0,
            comments: 0,
            tags: Vec::new(),
            metadata: Map::new(),
        }
    }

    /// Set the engagement counters, clamping negatives to zero.
    #[must_use]
    pub fn with_counts(mut self, likes: i64, shares: i64, comments: i64) -> Self {
        self.likes = likes.max(0);
        self.shares = shares.max(0);
        self.comments = comments.max(0);
        self
    }

    #[must_use]
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// The store-level dedup identity of this record.
    #[must_use]
    pub fn dedup_key(&self) -> (&str, &str) {
        (&self.platform, &self.post_id)
    }
}
