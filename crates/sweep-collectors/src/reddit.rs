//! Reddit API collector (client-credentials OAuth).

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use sweep_core::platforms::RedditConfig;
use sweep_core::PostRecord;

use crate::filter::{matches_keywords, within_window};
use crate::{CollectRequest, Collector, CollectorError};

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const API_BASE: &str = "https://oauth.reddit.com";
/// Listing page size; Reddit caps this at 100.
const PAGE_LIMIT: usize = 100;
const MAX_PAGES: usize = 4;
/// Pause between listing pages so we stay under Reddit's rate budget.
const PAGE_DELAY_MS: u64 = 1000;

/// Reddit OAuth token response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Reddit listing wrapper.
#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<Thing>,
    after: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Thing {
    data: SubmissionData,
}

#[derive(Debug, Default, Deserialize)]
struct SubmissionData {
    id: Option<String>,
    author: Option<String>,
    title: Option<String>,
    selftext: Option<String>,
    created_utc: Option<f64>,
    permalink: Option<String>,
    score: Option<i64>,
    num_comments: Option<i64>,
    subreddit: Option<String>,
    upvote_ratio: Option<f64>,
}

/// Collector for Reddit submissions via the OAuth search/listing API.
pub struct RedditCollector {
    client: reqwest::Client,
    config: RedditConfig,
}

impl RedditCollector {
    /// Build the collector with a configured timeout and `User-Agent`.
    ///
    /// No token is exchanged here; a fresh token is fetched per collection
    /// cycle since app-only tokens expire between scheduled runs.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::Http`] if the HTTP client cannot be built.
    pub fn new(config: RedditConfig, timeout_secs: u64) -> Result<Self, CollectorError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client, config })
    }

    async fn fetch_token(&self) -> Result<String, CollectorError> {
        let response = self
            .client
            .post(TOKEN_URL)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CollectorError::Auth {
                platform: "reddit",
                reason: format!("token exchange failed with status {}", response.status()),
            });
        }

        let token: TokenResponse =
            response
                .json()
                .await
                .map_err(|e| CollectorError::Auth {
                    platform: "reddit",
                    reason: format!("token parse error: {e}"),
                })?;
        Ok(token.access_token)
    }

    async fn fetch_listing_page(
        &self,
        token: &str,
        request: &CollectRequest,
        after: Option<&str>,
    ) -> Result<Listing, CollectorError> {
        // Keyword search when keywords are given; otherwise the firehose of
        // new submissions, matching the "no filter" contract.
        let (endpoint, mut params): (String, Vec<(&str, String)>) = if request.keywords.is_empty() {
            (format!("{API_BASE}/r/all/new"), Vec::new())
        } else {
            (
                format!("{API_BASE}/search"),
                vec![
                    ("q", request.keywords.join(" OR ")),
                    ("sort", "new".to_string()),
                ],
            )
        };
        params.push(("limit", PAGE_LIMIT.to_string()));
        if let Some(cursor) = after {
            params.push(("after", cursor.to_string()));
        }

        let response = self
            .client
            .get(&endpoint)
            .header("Authorization", format!("Bearer {token}"))
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(CollectorError::Auth {
                platform: "reddit",
                reason: format!("listing request rejected with status {status}"),
            });
        }
        if !status.is_success() {
            return Err(CollectorError::UnexpectedStatus {
                status: status.as_u16(),
                url: endpoint,
            });
        }

        let body = response.text().await?;
        serde_json::from_str::<Listing>(&body).map_err(|e| CollectorError::Deserialize {
            context: format!("reddit listing from {endpoint}"),
            source: e,
        })
    }
}

#[async_trait::async_trait]
impl Collector for RedditCollector {
    fn platform(&self) -> &'static str {
        "reddit"
    }

    async fn collect(&self, request: &CollectRequest) -> Result<Vec<PostRecord>, CollectorError> {
        let token = self.fetch_token().await?;
        let now = Utc::now();
        let mut records = Vec::new();
        let mut after: Option<String> = None;

        for page in 0..MAX_PAGES {
            if page > 0 {
                tokio::time::sleep(std::time::Duration::from_millis(PAGE_DELAY_MS)).await;
            }

            let listing = self
                .fetch_listing_page(&token, request, after.as_deref())
                .await?;
            after = listing.data.after.clone();

            let remaining = request.max_posts.saturating_sub(records.len());
            records.extend(records_from_listing(listing, request, now, remaining));

            if records.len() >= request.max_posts || after.is_none() {
                break;
            }
        }

        tracing::debug!(count = records.len(), "collected reddit submissions");
        Ok(records)
    }
}

/// Parse a public Reddit listing body (the `.json` endpoints) into records.
///
/// Shared with the forum collector's Reddit strategy, which reads the same
/// listing shape without authentication.
pub(crate) fn parse_public_listing(
    body: &str,
    source_url: &str,
    request: &CollectRequest,
    now: DateTime<Utc>,
) -> Result<Vec<PostRecord>, CollectorError> {
    let listing =
        serde_json::from_str::<Listing>(body).map_err(|e| CollectorError::Deserialize {
            context: format!("reddit listing from {source_url}"),
            source: e,
        })?;
    Ok(records_from_listing(listing, request, now, request.max_posts))
}

/// Convert listing children into filtered records, up to `limit`.
///
/// Children without an `id` are malformed and skipped; everything else is
/// filtered by the request's time window and keywords.
fn records_from_listing(
    listing: Listing,
    request: &CollectRequest,
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<PostRecord> {
    let mut records = Vec::new();

    for child in listing.data.children {
        if records.len() >= limit {
            break;
        }
        let data = child.data;
        let Some(id) = data.id else {
            tracing::debug!("skipping reddit submission without id");
            continue;
        };

        let timestamp = data
            .created_utc
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs as i64, 0));
        if !within_window(timestamp, now, request.time_window) {
            continue;
        }

        let title = data.title.unwrap_or_default();
        let selftext = data.selftext.unwrap_or_default();
        let content = if selftext.is_empty() {
            title.clone()
        } else {
            format!("{title}\n\n{selftext}")
        };
        if !matches_keywords(&content, &request.keywords) {
            continue;
        }

        let subreddit = data.subreddit.unwrap_or_default();
        let mut metadata = Map::new();
        if !subreddit.is_empty() {
            metadata.insert("subreddit".to_string(), Value::String(subreddit.clone()));
        }
        if let Some(ratio) = data.upvote_ratio {
            if let Some(number) = serde_json::Number::from_f64(ratio) {
                metadata.insert("upvote_ratio".to_string(), Value::Number(number));
            }
        }

        let url = data
            .permalink
            .map(|p| format!("https://reddit.com{p}"))
            .unwrap_or_default();
        let tags = if subreddit.is_empty() {
            Vec::new()
        } else {
            vec![subreddit]
        };

        records.push(
            PostRecord::new(
                "reddit",
                id,
                data.author.unwrap_or_else(|| "[deleted]".to_string()),
                content,
                timestamp,
                url,
            )
            .with_counts(data.score.unwrap_or(0), 0, data.num_comments.unwrap_or(0))
            .with_tags(tags)
            .with_metadata(metadata),
        );
    }

    records
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn listing_body(created_utc: i64) -> String {
        format!(
            r#"{{
              "data": {{
                "children": [
                  {{"data": {{
                    "id": "abc",
                    "author": "alice",
                    "title": "Learning Python",
                    "selftext": "the asyncio module is great",
                    "created_utc": {created_utc},
                    "permalink": "/r/python/comments/abc/learning_python/",
                    "score": 42,
                    "num_comments": 7,
                    "subreddit": "python",
                    "upvote_ratio": 0.97
                  }}}},
                  {{"data": {{"title": "no id, malformed"}}}}
                ],
                "after": null
              }}
            }}"#
        )
    }

    fn request(keywords: &[&str]) -> CollectRequest {
        CollectRequest::new(
            keywords.iter().map(|k| (*k).to_string()).collect(),
            100,
            Duration::hours(24),
        )
    }

    #[test]
    fn parses_listing_and_skips_malformed_children() {
        let now = Utc::now();
        let body = listing_body(now.timestamp() - 60);
        let records =
            parse_public_listing(&body, "https://reddit.com/r/python/.json", &request(&[]), now)
                .expect("parses");

        assert_eq!(records.len(), 1, "malformed child must be skipped");
        let record = &records[0];
        assert_eq!(record.platform, "reddit");
        assert_eq!(record.post_id, "abc");
        assert_eq!(record.likes, 42);
        assert_eq!(record.comments, 7);
        assert_eq!(record.tags, vec!["python".to_string()]);
        assert_eq!(record.metadata["subreddit"], "python");
        assert!(record.url.starts_with("https://reddit.com/r/python/"));
    }

    #[test]
    fn excludes_submissions_outside_time_window() {
        let now = Utc::now();
        let body = listing_body((now - Duration::hours(48)).timestamp());
        let records =
            parse_public_listing(&body, "test", &request(&[]), now).expect("parses");
        assert!(records.is_empty());
    }

    #[test]
    fn keyword_filter_matches_title_and_body() {
        let now = Utc::now();
        let body = listing_body(now.timestamp() - 60);
        let hit = parse_public_listing(&body, "test", &request(&["asyncio"]), now).unwrap();
        assert_eq!(hit.len(), 1);
        let miss = parse_public_listing(&body, "test", &request(&["golang"]), now).unwrap();
        assert!(miss.is_empty());
    }

    #[test]
    fn malformed_body_is_a_deserialize_error() {
        let result = parse_public_listing("not json", "test", &request(&[]), Utc::now());
        assert!(matches!(result, Err(CollectorError::Deserialize { .. })));
    }
}
