//! Hacker News front page. HN exposes no JSON on the main site, so this
//! reads the `athing` table rows straight out of the HTML.

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;

use sweep_core::PostRecord;

use crate::filter::{matches_keywords, within_window};
use crate::CollectRequest;

const SITE_BASE: &str = "https://news.ycombinator.com";

pub(super) fn parse(html: &str, request: &CollectRequest, now: DateTime<Utc>) -> Vec<PostRecord> {
    let row_re = Regex::new(r#"(?is)<tr[^>]*class=['"][^'"]*athing[^'"]*['"][^>]*id=['"](\d+)['"]"#)
        .expect("valid athing regex");

    // Each story is one athing row followed by a subtext row; slice the page
    // from one athing to the next so the per-story regexes stay anchored.
    let matches: Vec<(usize, String)> = row_re
        .captures_iter(html)
        .filter_map(|cap| {
            let start = cap.get(0)?.start();
            Some((start, cap.get(1)?.as_str().to_string()))
        })
        .collect();

    let mut records = Vec::new();
    for (i, (start, id)) in matches.iter().enumerate() {
        if records.len() >= request.max_posts {
            break;
        }
        let end = matches.get(i + 1).map_or(html.len(), |(next, _)| *next);
        let segment = &html[*start..end];

        let Some(record) = parse_story(segment, id) else {
            tracing::debug!(id = %id, "skipping story without a title");
            continue;
        };
        if !within_window(record.timestamp, now, request.time_window) {
            continue;
        }
        if !matches_keywords(&record.content, &request.keywords) {
            continue;
        }
        records.push(record);
    }
    records
}

fn parse_story(segment: &str, id: &str) -> Option<PostRecord> {
    let title_re = Regex::new(r#"(?is)<span class="titleline">\s*<a href="([^"]+)"[^>]*>(.*?)</a>"#)
        .expect("valid titleline regex");
    let score_re =
        Regex::new(r#"(?is)<span class="score"[^>]*>\s*(\d+)\s*point"#).expect("valid score regex");
    let user_re = Regex::new(r#"(?is)class="hnuser"[^>]*>([^<]+)<"#).expect("valid hnuser regex");
    let age_re = Regex::new(r#"(?is)<span class="age"[^>]*title="([^" ]+)"#).expect("valid age regex");
    let comments_re = Regex::new(r"(?is)(\d+)\s*(?:&nbsp;)?comments").expect("valid comments regex");

    let title_cap = title_re.captures(segment)?;
    let href = title_cap.get(1).map_or("", |m| m.as_str());
    let title = title_cap.get(2).map_or("", |m| m.as_str()).trim().to_string();
    if title.is_empty() {
        return None;
    }

    let url = if href.starts_with("http") {
        href.to_string()
    } else {
        format!("{SITE_BASE}/{href}")
    };

    let likes = score_re
        .captures(segment)
        .and_then(|cap| cap.get(1)?.as_str().parse::<i64>().ok())
        .unwrap_or(0);
    let comments = comments_re
        .captures(segment)
        .and_then(|cap| cap.get(1)?.as_str().parse::<i64>().ok())
        .unwrap_or(0);
    let author = user_re
        .captures(segment)
        .and_then(|cap| cap.get(1).map(|m| m.as_str().to_string()))
        .unwrap_or_else(|| "unknown".to_string());
    let timestamp = age_re
        .captures(segment)
        .and_then(|cap| parse_age_title(cap.get(1)?.as_str()));

    Some(
        PostRecord::new("forums", format!("hn-{id}"), author, title, timestamp, url)
            .with_counts(likes, 0, comments),
    )
}

/// The age span's `title` attribute carries an ISO timestamp without a zone
/// marker; HN renders it in UTC.
fn parse_age_title(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
