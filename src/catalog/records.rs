use serde::Serialize;

use crate::error::CatalogError;

/// One catalog episode as seen by the reconciliation step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub podcast_title: String,
    pub episode_title: String,
    pub content_id: String,
}

/// One catalog episode with everything needed to name and fetch its file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchRow {
    pub podcast_title: String,
    /// Publish timestamp, or the first-seen timestamp when the feed had none
    pub date: String,
    pub episode_title: String,
    pub episode_key: String,
    pub content_id: String,
    pub file_url: String,
}

/// Read access to the episode catalog
///
/// Both queries only return episodes with a non-empty download URL, in
/// catalog order.
pub trait CatalogReader {
    fn reconcile_rows(&self) -> Result<Vec<CatalogEntry>, CatalogError>;

    fn fetch_rows(&self) -> Result<Vec<FetchRow>, CatalogError>;
}

/// Outcome of ingesting one podcast feed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub new_podcast: bool,
    pub new_episodes: usize,
    pub seen_episodes: usize,
}

/// Outcome of recording the files present in the podcast directory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    pub new_downloads: usize,
    pub seen_downloads: usize,
}

/// A recorded download still waiting for its audio tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UntaggedDownload {
    pub filename: String,
    pub podcast_title: String,
    pub episode_title: String,
}
