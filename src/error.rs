// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when fetching or parsing RSS feeds
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Failed to fetch feed from {url}: {source}")]
    FetchFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read feed file {path}: {source}")]
    FileReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse RSS feed: {0}")]
    ParseFailed(#[from] rss::Error),

    #[error("Invalid feed URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Feed {source_name} has no title")]
    MissingTitle { source_name: String },
}

/// Errors raised by the episode catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to open catalog {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Catalog query failed: {0}")]
    Query(#[from] rusqlite::Error),

    /// The primary key uniqueness invariant is already broken
    #[error("'{title}' is in the catalog {count} times under key {key}, this should not happen")]
    DuplicateEpisode {
        title: String,
        key: String,
        count: usize,
    },

    #[error("Podcast '{title}' is in the catalog {count} times, this should not happen")]
    DuplicatePodcast { title: String, count: usize },

    #[error("Download '{filename}' is recorded {count} times, this should not happen")]
    DuplicateDownload { filename: String, count: usize },
}

/// Errors that can occur when scanning the podcast directory
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Podcast directory does not exist: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectoryFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors produced while reconciling the catalog against the directory
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// A missing episode has no usable title, so no filename can be built for it
    #[error("Episode '{episode}' (content id {content_id}) is missing but has no usable title")]
    UnresolvedTitle { content_id: String, episode: String },
}

/// Errors that can occur when writing the download script
#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("Failed to write download script {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur when loading the feed list
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read feed list {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur when writing audio tags to an episode file
#[derive(Error, Debug)]
pub enum TagError {
    #[error("Failed to tag {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: lofty::error::LoftyError,
    },

    #[error("No tag can be written to {path}")]
    Unsupported { path: PathBuf },
}

/// Top-level errors for ingest and planning runs
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("Reconcile error: {0}")]
    Reconcile(#[from] ReconcileError),

    #[error("Script error: {0}")]
    Script(#[from] ScriptError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Tag error: {0}")]
    Tag(#[from] TagError),
}

impl SyncError {
    /// True when the error reports broken catalog data rather than an I/O failure
    pub fn is_integrity_violation(&self) -> bool {
        matches!(
            self,
            SyncError::Catalog(
                CatalogError::DuplicateEpisode { .. }
                    | CatalogError::DuplicatePodcast { .. }
                    | CatalogError::DuplicateDownload { .. }
            ) | SyncError::Reconcile(ReconcileError::UnresolvedTitle { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_episode_is_integrity_violation() {
        let err = SyncError::from(CatalogError::DuplicateEpisode {
            title: "Ep One".to_string(),
            key: "abc".to_string(),
            count: 2,
        });
        assert!(err.is_integrity_violation());
        assert!(err.to_string().contains("Ep One"));
    }

    #[test]
    fn unresolved_title_is_integrity_violation() {
        let err = SyncError::from(ReconcileError::UnresolvedTitle {
            content_id: "hashZ".to_string(),
            episode: "Pod A: ".to_string(),
        });
        assert!(err.is_integrity_violation());
        assert!(err.to_string().contains("hashZ"));
    }

    #[test]
    fn scan_error_is_not_integrity_violation() {
        let err = SyncError::from(ScanError::DirectoryNotFound(PathBuf::from("/nope")));
        assert!(!err.is_integrity_violation());
    }

    #[test]
    fn tag_error_is_not_integrity_violation() {
        let err = SyncError::from(TagError::Unsupported {
            path: PathBuf::from("/podcasts/a.mp3"),
        });
        assert!(!err.is_integrity_violation());
        assert!(err.to_string().contains("a.mp3"));
    }
}
