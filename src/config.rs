// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use tracing::{debug, info};

use crate::error::ConfigError;

/// Per-run settings handed to every stage of a run
///
/// The timestamp is taken once so every row touched in a run carries the same
/// first/last-seen value.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// RFC 3339 timestamp of the run start
    pub timestamp: String,
    /// Directory holding downloaded episodes and the download script
    pub podcasts_dir: PathBuf,
}

impl RunContext {
    /// Create a context stamped with the current time
    pub fn new(podcasts_dir: impl Into<PathBuf>) -> Self {
        Self::with_timestamp(
            podcasts_dir,
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        )
    }

    /// Create a context with a fixed timestamp
    pub fn with_timestamp(podcasts_dir: impl Into<PathBuf>, timestamp: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            podcasts_dir: podcasts_dir.into(),
        }
    }
}

/// Read the list of feeds to ingest
///
/// One feed per line. Lines without "http" in them (comments, blanks, stray
/// text) are skipped.
pub fn read_feed_list(path: &Path) -> Result<Vec<String>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    let feeds = parse_feed_list(&content);
    info!(path = %path.display(), count = feeds.len(), "loaded feed list");
    debug!(?feeds, "feed URLs");

    Ok(feeds)
}

fn parse_feed_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| line.contains("http"))
        .map(String::from)
        .collect()
}
