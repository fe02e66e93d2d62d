// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset};
use regex::Regex;
use url::Url;

use crate::error::FeedError;

static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Represents a parsed podcast feed
#[derive(Debug, Clone)]
pub struct Podcast {
    pub title: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub link: Option<String>,
    /// Feed categories joined with ", "
    pub category: Option<String>,
    pub feed_url: Url,
    pub episodes: Vec<Episode>,
}

/// Represents a single podcast episode as announced by the feed
#[derive(Debug, Clone)]
pub struct Episode {
    pub title: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub guid: Option<String>,
    /// Publish timestamp, RFC 3339 when the feed date could be parsed
    pub published: Option<String>,
    pub episode_number: Option<String>,
    /// Download URL of the audio file, empty when the item has no enclosure
    pub file_url: String,
    pub format: Option<String>,
}

/// Parse RSS feed XML bytes into a Podcast struct
pub fn parse_feed(xml_bytes: &[u8], feed_url: Url) -> Result<Podcast, FeedError> {
    let channel = rss::Channel::read_from(xml_bytes)?;

    let title = channel.title().trim().to_string();
    if title.is_empty() {
        return Err(FeedError::MissingTitle {
            source_name: feed_url.to_string(),
        });
    }

    let author = channel
        .itunes_ext()
        .and_then(|ext| ext.author())
        .or_else(|| channel.managing_editor())
        .and_then(non_empty);

    let category = non_empty(
        &channel
            .categories()
            .iter()
            .map(|c| c.name().trim())
            .collect::<Vec<_>>()
            .join(", "),
    );

    Ok(Podcast {
        title,
        author,
        description: non_empty(channel.description()),
        language: channel.language().and_then(non_empty),
        link: non_empty(channel.link()),
        category,
        feed_url,
        episodes: channel.items().iter().map(parse_episode).collect(),
    })
}

fn parse_episode(item: &rss::Item) -> Episode {
    let itunes = item.itunes_ext();

    let author = item
        .author()
        .and_then(non_empty)
        .or_else(|| itunes.and_then(|ext| ext.author()).and_then(non_empty));

    let description = item
        .description()
        .and_then(non_empty)
        .or_else(|| itunes.and_then(|ext| ext.summary()).and_then(non_empty))
        .map(|d| strip_html(&d))
        .and_then(|d| non_empty(&d));

    let published = item.pub_date().and_then(|date_str| {
        DateTime::parse_from_rfc2822(date_str.trim())
            .ok()
            .or_else(|| parse_relaxed_date(date_str.trim()))
            .map(|dt| dt.to_rfc3339())
    });

    let (file_url, format) = match item.enclosure() {
        Some(enclosure) => (
            enclosure.url().trim().to_string(),
            non_empty(enclosure.mime_type()),
        ),
        None => (String::new(), None),
    };

    Episode {
        title: item.title().map(str::trim).unwrap_or_default().to_string(),
        author,
        description,
        link: item.link().and_then(non_empty),
        guid: item.guid().and_then(|g| non_empty(g.value())),
        published,
        episode_number: itunes.and_then(|ext| ext.episode()).and_then(non_empty),
        file_url,
        format,
    }
}

/// Try to parse dates that don't strictly conform to RFC 2822
fn parse_relaxed_date(date_str: &str) -> Option<DateTime<FixedOffset>> {
    let formats = [
        "%a, %d %b %Y %H:%M:%S %z",
        "%Y-%m-%dT%H:%M:%S%:z",
        "%Y-%m-%d %H:%M:%S %z",
    ];

    formats
        .iter()
        .find_map(|format| DateTime::parse_from_str(date_str, format).ok())
        .or_else(|| DateTime::parse_from_rfc3339(date_str).ok())
}

/// Remove markup from a description and decode its HTML entities
fn strip_html(text: &str) -> String {
    let without_tags = HTML_TAG.replace_all(text, "");
    html_escape::decode_html_entities(&without_tags)
        .trim()
        .to_string()
}

fn non_empty(s: &str) -> Option<String> {
    Some(s.trim().to_string()).filter(|s| !s.is_empty())
}
