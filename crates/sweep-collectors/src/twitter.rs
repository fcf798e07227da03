//! Twitter/X collector over the v2 recent-search API (app-only bearer token).

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use sweep_core::platforms::TwitterConfig;
use sweep_core::PostRecord;

use crate::filter::within_window;
use crate::{CollectRequest, Collector, CollectorError};

const SEARCH_URL: &str = "https://api.twitter.com/2/tweets/search/recent";
/// The API accepts 10..=100 results per request.
const MIN_RESULTS: usize = 10;
const MAX_RESULTS: usize = 100;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Tweet>,
}

#[derive(Debug, Deserialize)]
struct Tweet {
    id: String,
    text: String,
    author_id: Option<String>,
    created_at: Option<DateTime<Utc>>,
    public_metrics: Option<PublicMetrics>,
}

#[derive(Debug, Default, Deserialize)]
struct PublicMetrics {
    #[serde(default)]
    retweet_count: i64,
    #[serde(default)]
    reply_count: i64,
    #[serde(default)]
    like_count: i64,
    #[serde(default)]
    quote_count: i64,
}

pub struct TwitterCollector {
    client: reqwest::Client,
    config: TwitterConfig,
}

impl TwitterCollector {
    /// # Errors
    ///
    /// Returns [`CollectorError::Http`] if the HTTP client cannot be built.
    pub fn new(
        config: TwitterConfig,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, CollectorError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client, config })
    }
}

#[async_trait::async_trait]
impl Collector for TwitterCollector {
    fn platform(&self) -> &'static str {
        "twitter"
    }

    async fn collect(&self, request: &CollectRequest) -> Result<Vec<PostRecord>, CollectorError> {
        // Recent search requires a query; an app-only token has no timeline
        // to fall back to, so an unfiltered request yields nothing here.
        if request.keywords.is_empty() {
            tracing::debug!("twitter collector needs keywords; returning no records");
            return Ok(Vec::new());
        }

        let now = Utc::now();
        let start_time = (now - request.time_window).to_rfc3339_opts(SecondsFormat::Secs, true);
        let max_results = request.max_posts.clamp(MIN_RESULTS, MAX_RESULTS).to_string();
        let query = format!("({}) -is:retweet", request.keywords.join(" OR "));

        let response = self
            .client
            .get(SEARCH_URL)
            .bearer_auth(&self.config.bearer_token)
            .query(&[
                ("query", query.as_str()),
                ("max_results", max_results.as_str()),
                ("start_time", start_time.as_str()),
                ("tweet.fields", "created_at,public_metrics,author_id"),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(CollectorError::Auth {
                platform: "twitter",
                reason: format!("search rejected with status {status}"),
            });
        }
        if !status.is_success() {
            return Err(CollectorError::UnexpectedStatus {
                status: status.as_u16(),
                url: SEARCH_URL.to_string(),
            });
        }

        let body = response.text().await?;
        let records = parse_search_response(&body, request, now)?;
        tracing::debug!(count = records.len(), "collected tweets");
        Ok(records)
    }
}

/// Parse a recent-search response body into filtered records.
fn parse_search_response(
    body: &str,
    request: &CollectRequest,
    now: DateTime<Utc>,
) -> Result<Vec<PostRecord>, CollectorError> {
    let response =
        serde_json::from_str::<SearchResponse>(body).map_err(|e| CollectorError::Deserialize {
            context: "twitter recent search response".to_string(),
            source: e,
        })?;

    let mut records = Vec::new();
    for tweet in response.data {
        if records.len() >= request.max_posts {
            break;
        }
        // The API already applies the query and start_time, but a tweet can
        // still drift outside the window between request and response.
        if !within_window(tweet.created_at, now, request.time_window) {
            continue;
        }

        let metrics = tweet.public_metrics.unwrap_or_default();
        let author = tweet.author_id.unwrap_or_else(|| "unknown".to_string());
        let url = format!("https://twitter.com/i/web/status/{}", tweet.id);

        let mut metadata = Map::new();
        metadata.insert(
            "quote_count".to_string(),
            Value::Number(metrics.quote_count.max(0).into()),
        );

        records.push(
            PostRecord::new(
                "twitter",
                tweet.id,
                author,
                tweet.text,
                tweet.created_at,
                url,
            )
            .with_counts(
                metrics.like_count,
                metrics.retweet_count,
                metrics.reply_count,
            )
            .with_metadata(metadata),
        );
    }
    Ok(records)
}
