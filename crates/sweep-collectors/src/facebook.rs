//! Facebook collector over the Graph API feed endpoint.
//!
//! The Graph API exposes no general public-post search; with a page or user
//! access token only the token owner's own feed is readable, so that is what
//! gets collected. Keyword filtering happens client-side.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use sweep_core::platforms::FacebookConfig;
use sweep_core::PostRecord;

use crate::filter::{matches_keywords, within_window};
use crate::{CollectRequest, Collector, CollectorError};

const FEED_URL: &str = "https://graph.facebook.com/v19.0/me/posts";
const FEED_FIELDS: &str =
    "id,message,created_time,permalink_url,likes.summary(true),comments.summary(true),shares,type";
/// The feed endpoint caps page size at 100.
const MAX_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
struct FeedResponse {
    #[serde(default)]
    data: Vec<FeedPost>,
}

#[derive(Debug, Deserialize)]
struct FeedPost {
    id: Option<String>,
    message: Option<String>,
    created_time: Option<String>,
    permalink_url: Option<String>,
    likes: Option<Summarized>,
    comments: Option<Summarized>,
    shares: Option<ShareCount>,
    #[serde(rename = "type")]
    post_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Summarized {
    summary: Option<SummaryCount>,
}

#[derive(Debug, Deserialize)]
struct SummaryCount {
    #[serde(default)]
    total_count: i64,
}

#[derive(Debug, Deserialize)]
struct ShareCount {
    #[serde(default)]
    count: i64,
}

pub struct FacebookCollector {
    client: reqwest::Client,
    config: FacebookConfig,
}

impl FacebookCollector {
    /// # Errors
    ///
    /// Returns [`CollectorError::Http`] if the HTTP client cannot be built.
    pub fn new(
        config: FacebookConfig,
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
impl Collector for FacebookCollector {
    fn platform(&self) -> &'static str {
        "facebook"
    }

    async fn collect(&self, request: &CollectRequest) -> Result<Vec<PostRecord>, CollectorError> {
        let limit = request.max_posts.min(MAX_LIMIT).to_string();
        let response = self
            .client
            .get(FEED_URL)
            .bearer_auth(&self.config.access_token)
            .query(&[("fields", FEED_FIELDS), ("limit", limit.as_str())])
            .send()
            .await?;

        let status = response.status();
        // The Graph API reports an invalid or expired token as 400 with an
        // OAuthException body, not only as 401/403.
        if status == reqwest::StatusCode::BAD_REQUEST
            || status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(CollectorError::Auth {
                platform: "facebook",
                reason: format!("feed request rejected with status {status}"),
            });
        }
        if !status.is_success() {
            return Err(CollectorError::UnexpectedStatus {
                status: status.as_u16(),
                url: FEED_URL.to_string(),
            });
        }

        let body = response.text().await?;
        let records = parse_feed_response(&body, request, Utc::now())?;
        tracing::debug!(count = records.len(), "collected facebook posts");
        Ok(records)
    }
}

/// Parse a Graph API feed body into filtered records.
fn parse_feed_response(
    body: &str,
    request: &CollectRequest,
    now: DateTime<Utc>,
) -> Result<Vec<PostRecord>, CollectorError> {
    let response =
        serde_json::from_str::<FeedResponse>(body).map_err(|e| CollectorError::Deserialize {
            context: "facebook feed response".to_string(),
            source: e,
        })?;

    let mut records = Vec::new();
    for post in response.data {
        if records.len() >= request.max_posts {
            break;
        }
        let Some(id) = post.id else {
            tracing::debug!("skipping facebook post without id");
            continue;
        };

        let timestamp = post.created_time.as_deref().and_then(parse_created_time);
        if !within_window(timestamp, now, request.time_window) {
            continue;
        }

        let content = post.message.unwrap_or_default();
        if !matches_keywords(&content, &request.keywords) {
            continue;
        }

        let likes = post
            .likes
            .and_then(|l| l.summary)
            .map_or(0, |s| s.total_count);
        let comments = post
            .comments
            .and_then(|c| c.summary)
            .map_or(0, |s| s.total_count);
        let shares = post.shares.map_or(0, |s| s.count);

        let mut metadata = Map::new();
        if let Some(post_type) = post.post_type {
            metadata.insert("type".to_string(), Value::String(post_type));
        }

        records.push(
            PostRecord::new(
                "facebook",
                id,
                "me".to_string(),
                content,
                timestamp,
                post.permalink_url.unwrap_or_default(),
            )
            .with_counts(likes, shares, comments)
            .with_metadata(metadata),
        );
    }
    Ok(records)
}

/// The Graph API emits `2026-08-25T10:00:00+0000` (no colon in the offset);
/// accept both that and plain RFC 3339.
fn parse_created_time(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}
