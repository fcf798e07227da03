//! Forum collector: fetches a configured list of forum URLs and parses each
//! one with the strategy its URL implies.
//!
//! Strategies cover public Reddit `.json` listings, Hacker News front pages,
//! Discourse instances, and a generic HTML fallback. A URL that fails is
//! logged and skipped so one dead forum never sinks the whole sweep.
//!
//! Records keep the platform tag of their strategy, not of this collector:
//! a configured Reddit listing URL yields `platform = "reddit"` rows, so in
//! stored data they group with the API collector's output rather than under
//! `forums`.

mod discourse;
mod generic;
mod hackernews;
mod reddit_json;

use chrono::Utc;

use sweep_core::platforms::ForumsConfig;
use sweep_core::PostRecord;

use crate::{CollectRequest, Collector, CollectorError};

/// How to interpret the body fetched from a forum URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ForumStrategy {
    RedditJson,
    HackerNews,
    Discourse,
    Generic,
}

impl ForumStrategy {
    fn detect(url: &str) -> Self {
        let lower = url.to_lowercase();
        if lower.contains("reddit.com") || lower.ends_with(".json") {
            Self::RedditJson
        } else if lower.contains("news.ycombinator.com") {
            Self::HackerNews
        } else if lower.contains("discourse") {
            Self::Discourse
        } else {
            Self::Generic
        }
    }

    /// The URL actually fetched; some strategies read a machine endpoint
    /// next to the page the operator configured.
    fn fetch_url(self, url: &str) -> String {
        let trimmed = url.trim_end_matches('/');
        match self {
            Self::RedditJson if !url.ends_with(".json") => format!("{trimmed}/.json"),
            Self::Discourse if !url.ends_with(".json") => format!("{trimmed}/latest.json"),
            _ => url.to_string(),
        }
    }
}

/// Collector over operator-configured forum URLs.
pub struct ForumCollector {
    client: reqwest::Client,
    urls: Vec<String>,
    request_delay: std::time::Duration,
}

impl ForumCollector {
    /// # Errors
    ///
    /// Returns [`CollectorError::Http`] if the HTTP client cannot be built.
    pub fn new(
        config: ForumsConfig,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, CollectorError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            urls: config.urls,
            request_delay: std::time::Duration::from_secs(config.request_delay_secs),
        })
    }

    async fn collect_one(
        &self,
        url: &str,
        request: &CollectRequest,
        budget: usize,
    ) -> Result<Vec<PostRecord>, CollectorError> {
        let strategy = ForumStrategy::detect(url);
        let fetch_url = strategy.fetch_url(url);
        tracing::debug!(url = %fetch_url, ?strategy, "fetching forum");

        let response = self.client.get(&fetch_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CollectorError::UnexpectedStatus {
                status: status.as_u16(),
                url: fetch_url,
            });
        }
        let body = response.text().await?;

        let scoped = CollectRequest::new(request.keywords.clone(), budget, request.time_window);
        let now = Utc::now();
        match strategy {
            ForumStrategy::RedditJson => reddit_json::parse(&body, &fetch_url, &scoped, now),
            ForumStrategy::HackerNews => Ok(hackernews::parse(&body, &scoped, now)),
            ForumStrategy::Discourse => discourse::parse(&body, url, &scoped, now),
            ForumStrategy::Generic => Ok(generic::parse(&body, url, &scoped)),
        }
    }
}

#[async_trait::async_trait]
impl Collector for ForumCollector {
    fn platform(&self) -> &'static str {
        "forums"
    }

    async fn collect(&self, request: &CollectRequest) -> Result<Vec<PostRecord>, CollectorError> {
        if self.urls.is_empty() {
            return Ok(Vec::new());
        }

        // Split the budget evenly so one busy forum cannot crowd out the rest.
        let per_url = (request.max_posts / self.urls.len()).max(1);
        let mut records = Vec::new();

        for (i, url) in self.urls.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.request_delay).await;
            }
            match self.collect_one(url, request, per_url).await {
                Ok(mut found) => {
                    tracing::debug!(url = %url, count = found.len(), "forum fetched");
                    records.append(&mut found);
                }
                Err(err) => {
                    tracing::warn!(url = %url, error = %err, "forum fetch failed, skipping");
                }
            }
        }

        records.truncate(request.max_posts);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_detection_by_url() {
        assert_eq!(
            ForumStrategy::detect("https://www.reddit.com/r/rust"),
            ForumStrategy::RedditJson
        );
        assert_eq!(
            ForumStrategy::detect("https://example.com/feed.json"),
            ForumStrategy::RedditJson
        );
        assert_eq!(
            ForumStrategy::detect("https://news.ycombinator.com"),
            ForumStrategy::HackerNews
        );
        assert_eq!(
            ForumStrategy::detect("https://discourse.example.org"),
            ForumStrategy::Discourse
        );
        assert_eq!(
            ForumStrategy::detect("https://forum.example.org"),
            ForumStrategy::Generic
        );
    }

    #[test]
    fn fetch_url_appends_machine_endpoints() {
        assert_eq!(
            ForumStrategy::RedditJson.fetch_url("https://www.reddit.com/r/rust/"),
            "https://www.reddit.com/r/rust/.json"
        );
        assert_eq!(
            ForumStrategy::RedditJson.fetch_url("https://www.reddit.com/r/rust/.json"),
            "https://www.reddit.com/r/rust/.json"
        );
        assert_eq!(
            ForumStrategy::Discourse.fetch_url("https://discourse.example.org"),
            "https://discourse.example.org/latest.json"
        );
        assert_eq!(
            ForumStrategy::Generic.fetch_url("https://forum.example.org/hot"),
            "https://forum.example.org/hot"
        );
    }
}
