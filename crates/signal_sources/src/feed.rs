//! Loose feed parsers: RSS 2.0 item lists and Reddit JSON listings.
//!
//! Both accept what public endpoints actually return:
//! missing fields default, malformed items are skipped, and only a
//! completely undecodable document is an error.

use std::sync::OnceLock;

use chrono::{DateTime, TimeZone, Utc};
use common::{Engagement, Error, RawItem};
use regex::Regex;
use serde::Deserialize;

fn item_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<item\b[^>]*>(.*?)</item>").expect("valid item regex"))
}

fn tag_re(tag: &str) -> Regex {
    Regex::new(&format!(r"(?is)<{tag}\b[^>]*>(.*?)</{tag}>")).expect("valid tag regex")
}

struct TagPatterns {
    title: Regex,
    description: Regex,
    link: Regex,
    pub_date: Regex,
    markup: Regex,
}

fn patterns() -> &'static TagPatterns {
    static PATTERNS: OnceLock<TagPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| TagPatterns {
        title: tag_re("title"),
        description: tag_re("description"),
        link: tag_re("link"),
        pub_date: tag_re("pubDate"),
        markup: Regex::new(r"<[^>]+>").expect("valid markup regex"),
    })
}

/// Parse `<item>` blocks out of an RSS document.
///
/// Items without a title are dropped. Returns an empty list for documents
/// with no items; the caller decides whether that is a failure.
pub fn parse_rss(xml: &str) -> Vec<RawItem> {
    let p = patterns();

    item_re()
        .captures_iter(xml)
        .filter_map(|cap| {
            let block = cap.get(1)?.as_str();
            let title = capture_text(&p.title, block)?;
            if title.is_empty() {
                return None;
            }

            let body = capture_text(&p.description, block)
                .map(|d| p.markup.replace_all(&d, " ").split_whitespace().collect::<Vec<_>>().join(" "))
                .unwrap_or_default();
            let external_link = capture_text(&p.link, block).unwrap_or_default();
            let published_at = capture_text(&p.pub_date, block).and_then(|d| parse_feed_date(&d));

            Some(RawItem {
                title,
                body,
                published_at,
                external_link,
                engagement: None,
            })
        })
        .collect()
}

fn capture_text(re: &Regex, block: &str) -> Option<String> {
    let raw = re.captures(block)?.get(1)?.as_str();
    Some(decode_entities(&strip_cdata(raw)).trim().to_string())
}

fn strip_cdata(raw: &str) -> String {
    raw.replace("<![CDATA[", "").replace("]]>", "")
}

fn decode_entities(raw: &str) -> String {
    raw.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// RSS dates are RFC 2822; some mirrors emit RFC 3339.
pub fn parse_feed_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Nitter titles read "username: post text"; keep the post text.
pub fn strip_author_prefix(title: &str) -> String {
    match title.split_once(':') {
        Some((_, rest)) if !rest.trim().is_empty() => rest.trim().to_string(),
        _ => title.to_string(),
    }
}

// ── Reddit listing ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    data: RedditPost,
}

#[derive(Debug, Deserialize)]
struct RedditPost {
    #[serde(default)]
    title: String,
    #[serde(default)]
    selftext: String,
    #[serde(default)]
    score: f64,
    #[serde(default)]
    num_comments: f64,
    #[serde(default)]
    created_utc: Option<f64>,
    #[serde(default)]
    permalink: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

/// Decode a Reddit search listing into items carrying engagement metrics.
pub fn parse_reddit_listing(json: &str, base_url: &str) -> Result<Vec<RawItem>, Error> {
    let listing: Listing = serde_json::from_str(json)?;

    Ok(listing
        .data
        .children
        .into_iter()
        .map(|child| child.data)
        .filter(|post| !post.title.trim().is_empty())
        .map(|post| {
            let external_link = match (post.permalink, post.url) {
                (Some(permalink), _) if !permalink.is_empty() => {
                    format!("{}{}", base_url.trim_end_matches('/'), permalink)
                }
                (_, Some(url)) => url,
                _ => String::new(),
            };
            let published_at = post
                .created_utc
                .filter(|ts| ts.is_finite())
                .and_then(|ts| Utc.timestamp_opt(ts as i64, 0).single());

            RawItem {
                title: post.title.trim().to_string(),
                body: post.selftext,
                published_at,
                external_link,
                engagement: Some(Engagement {
                    score: post.score.max(0.0),
                    comments: post.num_comments.max(0.0),
                }),
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rss() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8"?>
        <rss version="2.0"><channel>
            <title>Search results</title>
            <item>
                <title><![CDATA[Bitcoin surges past record high]]></title>
                <description><![CDATA[<a href="x">Markets</a> rally &amp; cheer]]></description>
                <link>https://news.example.com/a</link>
                <pubDate>Wed, 12 Feb 2025 10:00:00 GMT</pubDate>
            </item>
            <item>
                <title>Regulators warn of crypto risk</title>
                <link>https://news.example.com/b</link>
                <pubDate>not a date</pubDate>
            </item>
            <item>
                <description>no title here</description>
            </item>
        </channel></rss>"#
    }

    #[test]
    fn test_parse_rss_items() {
        let items = parse_rss(sample_rss());
        assert_eq!(items.len(), 2);

        assert_eq!(items[0].title, "Bitcoin surges past record high");
        assert_eq!(items[0].body, "Markets rally & cheer");
        assert_eq!(items[0].external_link, "https://news.example.com/a");
        let ts = items[0].published_at.expect("date should parse");
        assert_eq!(ts.to_rfc3339(), "2025-02-12T10:00:00+00:00");

        assert_eq!(items[1].body, "");
        assert!(items[1].published_at.is_none());
    }

    #[test]
    fn test_parse_rss_channel_title_is_not_an_item() {
        let items = parse_rss("<rss><channel><title>Only a channel</title></channel></rss>");
        assert!(items.is_empty());
    }

    #[test]
    fn test_parse_rss_garbage() {
        assert!(parse_rss("<html><body>rate limited</body></html>").is_empty());
        assert!(parse_rss("").is_empty());
    }

    #[test]
    fn test_parse_feed_date_rfc3339() {
        let ts = parse_feed_date("2025-02-12T10:00:00Z").expect("rfc3339 accepted");
        assert_eq!(ts.timestamp(), 1_739_354_400);
    }

    #[test]
    fn test_strip_author_prefix() {
        assert_eq!(strip_author_prefix("satoshi: to the moon"), "to the moon");
        assert_eq!(strip_author_prefix("no prefix here"), "no prefix here");
        assert_eq!(strip_author_prefix("trailing:"), "trailing:");
    }

    #[test]
    fn test_parse_reddit_listing() {
        let json = r#"{
            "kind": "Listing",
            "data": {
                "children": [
                    {"kind": "t3", "data": {
                        "title": "BTC breakout incoming",
                        "selftext": "looks bullish",
                        "score": 250,
                        "num_comments": 40,
                        "created_utc": 1739354400.0,
                        "subreddit": "bitcoin",
                        "permalink": "/r/bitcoin/comments/abc/btc_breakout/"
                    }},
                    {"kind": "t3", "data": {"title": "   ", "score": 3}},
                    {"kind": "t3", "data": {"title": "Link post", "url": "https://example.com/x"}}
                ]
            }
        }"#;

        let items = parse_reddit_listing(json, "https://www.reddit.com/").expect("listing decodes");
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0].external_link,
            "https://www.reddit.com/r/bitcoin/comments/abc/btc_breakout/"
        );
        assert_eq!(
            items[0].engagement,
            Some(Engagement { score: 250.0, comments: 40.0 })
        );
        assert_eq!(items[0].published_at.map(|t| t.timestamp()), Some(1_739_354_400));
        assert_eq!(items[1].external_link, "https://example.com/x");
        assert_eq!(items[1].engagement, Some(Engagement::default()));
    }

    #[test]
    fn test_parse_reddit_listing_rejects_non_listing() {
        assert!(parse_reddit_listing(r#"{"error": 429}"#, "https://www.reddit.com").is_err());
        assert!(parse_reddit_listing("<html>", "https://www.reddit.com").is_err());
    }
}
