//! Generic HTML fallback for forums with no known machine endpoint.
//!
//! Pulls text out of `<article>` and post-like `<div>` blocks. These pages
//! carry no reliable ids or timestamps, so the post id is derived from a
//! content hash and the timestamp is left unknown.

use regex::Regex;
use sha2::{Digest, Sha256};

use sweep_core::PostRecord;

use crate::filter::matches_keywords;
use crate::CollectRequest;

/// Blocks shorter than this are navigation chrome, not posts.
const MIN_CONTENT_LEN: usize = 10;
const MAX_CONTENT_LEN: usize = 500;

pub(super) fn parse(html: &str, source_url: &str, request: &CollectRequest) -> Vec<PostRecord> {
    let block_re = Regex::new(
        r#"(?is)<(?:article[^>]*|div[^>]*class=['"][^'"]*(?:post|topic|thread|message)[^'"]*['"][^>]*)>(.*?)</(?:article|div)>"#,
    )
    .expect("valid forum block regex");

    let mut records = Vec::new();
    for cap in block_re.captures_iter(html) {
        if records.len() >= request.max_posts {
            break;
        }
        let block = cap.get(1).map_or("", |m| m.as_str());
        let text = strip_tags(block);
        if text.len() < MIN_CONTENT_LEN {
            continue;
        }
        if !matches_keywords(&text, &request.keywords) {
            continue;
        }

        let content = truncate_chars(&text, MAX_CONTENT_LEN);
        records.push(PostRecord::new(
            "forums",
            content_post_id(source_url, &text),
            "unknown".to_string(),
            content,
            None,
            source_url.to_string(),
        ));
    }
    records
}

/// Stable id from SHA-256(url + text), so re-sweeping the same page
/// deduplicates instead of inserting copies.
fn content_post_id(source_url: &str, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source_url.as_bytes());
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let hex: String = digest.iter().take(8).map(|b| format!("{b:02x}")).collect();
    format!("generic-{hex}")
}

fn strip_tags(input: &str) -> String {
    let tags = Regex::new(r"(?is)<[^>]+>").expect("valid tags regex");
    let no_tags = tags.replace_all(input, " ");
    no_tags.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
