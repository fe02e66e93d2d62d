pub mod catalog;
pub mod config;
pub mod episode;
pub mod error;
pub mod feed;
pub mod fetch_list;
pub mod http;
pub mod progress;
pub mod reconcile;
pub mod scan;
pub mod script;
pub mod sync;
pub mod tagging;

// Re-export main types for convenience
pub use catalog::{
    Catalog, CatalogEntry, CatalogReader, DownloadSummary, FetchRow, IngestSummary,
    UntaggedDownload,
};
pub use config::{RunContext, read_feed_list};
pub use episode::{
    FilenameParts, content_id, decode_filename, encode_filename, episode_key, is_well_formed,
    normalize_title,
};
pub use error::{
    CatalogError, ConfigError, FeedError, ReconcileError, ScanError, ScriptError, SyncError,
    TagError,
};
pub use feed::{Episode, Podcast, fetch_feed, is_url, parse_feed, parse_feed_file};
pub use fetch_list::{FetchInstruction, build_fetch_list};
pub use http::{HttpClient, ReqwestClient};
pub use progress::{NoopReporter, ProgressEvent, ProgressReporter, SharedProgressReporter};
pub use reconcile::{ReconcileStats, Reconciliation, reconcile};
pub use scan::{scan_catalog, scan_directory};
pub use script::{SCRIPT_NAME, render_download_script, script_line, write_download_script};
pub use sync::{
    FetchPlan, IngestReport, TagReport, ingest_feeds, plan_downloads, record_downloads,
    tag_downloads,
};
pub use tagging::{EpisodeTags, LoftyTagWriter, PODCAST_GENRE, TAG_COMMENT, TagWriter};
