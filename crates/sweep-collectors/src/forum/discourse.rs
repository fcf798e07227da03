//! Discourse instances via the public `/latest.json` topic list.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use sweep_core::PostRecord;

use crate::filter::{matches_keywords, within_window};
use crate::{CollectRequest, CollectorError};

#[derive(Debug, Deserialize)]
struct LatestResponse {
    topic_list: TopicList,
}

#[derive(Debug, Deserialize)]
struct TopicList {
    #[serde(default)]
    topics: Vec<Topic>,
}

#[derive(Debug, Deserialize)]
struct Topic {
    id: u64,
    title: Option<String>,
    slug: Option<String>,
    created_at: Option<DateTime<Utc>>,
    like_count: Option<i64>,
    reply_count: Option<i64>,
    views: Option<i64>,
    category_id: Option<i64>,
    #[serde(default)]
    tags: Vec<String>,
    last_poster_username: Option<String>,
}

pub(super) fn parse(
    body: &str,
    base_url: &str,
    request: &CollectRequest,
    now: DateTime<Utc>,
) -> Result<Vec<PostRecord>, CollectorError> {
    let response =
        serde_json::from_str::<LatestResponse>(body).map_err(|e| CollectorError::Deserialize {
            context: format!("discourse topic list from {base_url}"),
            source: e,
        })?;

    let base = base_url.trim_end_matches('/');
    let mut records = Vec::new();

    for topic in response.topic_list.topics {
        if records.len() >= request.max_posts {
            break;
        }
        if !within_window(topic.created_at, now, request.time_window) {
            continue;
        }
        let title = topic.title.unwrap_or_default();
        if title.is_empty() || !matches_keywords(&title, &request.keywords) {
            continue;
        }

        let url = match topic.slug {
            Some(slug) => format!("{base}/t/{slug}/{}", topic.id),
            None => format!("{base}/t/{}", topic.id),
        };

        let mut metadata = Map::new();
        if let Some(views) = topic.views {
            metadata.insert("views".to_string(), Value::Number(views.max(0).into()));
        }
        if let Some(category_id) = topic.category_id {
            metadata.insert("category_id".to_string(), Value::Number(category_id.into()));
        }

        records.push(
            PostRecord::new(
                "forums",
                format!("discourse-{}", topic.id),
                topic.last_poster_username.unwrap_or_else(|| "unknown".to_string()),
                title,
                topic.created_at,
                url,
            )
            .with_counts(topic.like_count.unwrap_or(0), 0, topic.reply_count.unwrap_or(0))
            .with_tags(topic.tags)
            .with_metadata(metadata),
        );
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn body(created_at: &str) -> String {
        format!(
            r#"{{
              "topic_list": {{
                "topics": [
                  {{
                    "id": 512,
                    "title": "Async runtimes compared",
                    "slug": "async-runtimes-compared",
                    "created_at": "{created_at}",
                    "like_count": 9,
                    "reply_count": 4,
                    "views": 210,
                    "category_id": 6,
                    "tags": ["async"],
                    "last_poster_username": "carol"
                  }},
                  {{"id": 513, "title": null}}
                ]
              }}
            }}"#
        )
    }

    #[test]
    fn parses_topics_into_records() {
        let now = Utc::now();
        let created = (now - Duration::hours(2)).to_rfc3339();
        let request = CollectRequest::new(Vec::new(), 50, Duration::hours(24));
        let records = parse(&body(&created), "https://discourse.example.org/", &request, now)
            .expect("parses");

        assert_eq!(records.len(), 1, "untitled topic must be skipped");
        let record = &records[0];
        assert_eq!(record.post_id, "discourse-512");
        assert_eq!(record.author, "carol");
        assert_eq!(record.likes, 9);
        assert_eq!(record.comments, 4);
        assert_eq!(record.tags, vec!["async".to_string()]);
        assert_eq!(record.metadata["views"], 210);
        assert_eq!(
            record.url,
            "https://discourse.example.org/t/async-runtimes-compared/512"
        );
    }

    #[test]
    fn keyword_filter_applies_to_titles() {
        let now = Utc::now();
        let created = (now - Duration::hours(2)).to_rfc3339();
        let request =
            CollectRequest::new(vec!["kubernetes".to_string()], 50, Duration::hours(24));
        let records =
            parse(&body(&created), "https://discourse.example.org", &request, now).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn malformed_body_is_a_deserialize_error() {
        let request = CollectRequest::new(Vec::new(), 50, Duration::hours(24));
        let result = parse("<html>", "https://discourse.example.org", &request, Utc::now());
        assert!(matches!(result, Err(CollectorError::Deserialize { .. })));
    }
}
