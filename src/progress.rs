use std::path::PathBuf;
use std::sync::Arc;

use crate::reconcile::ReconcileStats;

/// Events emitted during a run for progress reporting
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Feed is being fetched from a URL or read from a file
    FetchingFeed { source: String },

    /// Feed has been written to the catalog
    FeedIngested {
        podcast_title: String,
        new_episodes: usize,
        seen_episodes: usize,
    },

    /// Feed could not be fetched or parsed; the run carries on
    FeedFailed { source: String, error: String },

    /// All feeds have been processed
    IngestCompleted {
        ingested: usize,
        failed: usize,
        new_episodes: usize,
    },

    /// Podcast directory has been listed
    DirectoryScanned { files: usize },

    /// Catalog has been read
    CatalogScanned { episodes: usize },

    /// Missing episodes have been worked out
    Reconciled { stats: ReconcileStats },

    /// Download instructions are ready
    FetchListReady { count: usize },

    /// Download script has been written
    ScriptWritten { path: PathBuf, lines: usize },

    /// Files on disk have been recorded as downloads
    DownloadsRecorded {
        new_downloads: usize,
        seen_downloads: usize,
    },

    /// Episode file has been tagged
    FileTagged { filename: String },

    /// Episode file could not be tagged; it stays pending for the next run
    TagFailed { filename: String, error: String },

    /// All pending downloads have been processed
    TaggingCompleted { tagged: usize, failed: usize },
}

/// Trait for reporting progress events during a run.
///
/// Implementations can use this to display spinners, log messages,
/// or collect statistics.
pub trait ProgressReporter: Send + Sync {
    /// Report a progress event
    fn report(&self, event: ProgressEvent);
}

/// A shared reference to a progress reporter
pub type SharedProgressReporter = Arc<dyn ProgressReporter>;

/// A no-op progress reporter that silently ignores all events.
/// Useful for tests or quiet mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn report(&self, _event: ProgressEvent) {
        // Intentionally empty
    }
}

impl NoopReporter {
    /// Create a new NoopReporter wrapped in an Arc
    pub fn shared() -> SharedProgressReporter {
        Arc::new(Self)
    }
}
