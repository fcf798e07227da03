//! Source collectors for the sweep agent.
//!
//! Each external source (forums, Reddit, Twitter, Facebook) implements the [`Collector`]
//! capability. All variants share one contract: respect `max_posts`, the
//! lookback window, and keyword filtering; skip malformed items; and only
//! fail as a whole when the source itself is unreachable or rejects us.

pub mod error;
pub mod facebook;
pub mod filter;
pub mod forum;
pub mod reddit;
pub mod twitter;

use async_trait::async_trait;
use chrono::Duration;

use sweep_core::PostRecord;

pub use error::CollectorError;
pub use facebook::FacebookCollector;
pub use forum::ForumCollector;
pub use reddit::RedditCollector;
pub use twitter::TwitterCollector;

/// Parameters of one collection cycle, shared by every collector.
#[derive(Debug, Clone)]
pub struct CollectRequest {
    /// Empty means no keyword filter.
    pub keywords: Vec<String>,
    /// Upper bound on records returned per collector.
    pub max_posts: usize,
    /// Lookback window; records with a known timestamp outside
    /// `[now - time_window, now]` are excluded.
    pub time_window: Duration,
}

impl CollectRequest {
    #[must_use]
    pub fn new(keywords: Vec<String>, max_posts: usize, time_window: Duration) -> Self {
        Self {
            keywords,
            max_posts,
            time_window,
        }
    }
}

/// A source that knows how to fetch posts from one external system.
///
/// Implementations differ only in how they talk to their source; the
/// coordinator treats them uniformly through this trait.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Stable platform tag written into every record this collector produces.
    fn platform(&self) -> &'static str;

    /// Fetch up to `request.max_posts` records matching the request.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError`] only for collector-level failures (network
    /// unreachable, auth rejected, unexpected status). Per-item failures are
    /// skipped, never propagated.
    async fn collect(&self, request: &CollectRequest) -> Result<Vec<PostRecord>, CollectorError>;
}
