// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::catalog::{Catalog, CatalogReader, DownloadSummary};
use crate::config::RunContext;
use crate::error::SyncError;
use crate::feed::{Podcast, fetch_feed, is_url, parse_feed_file};
use crate::fetch_list::{FetchInstruction, build_fetch_list};
use crate::http::HttpClient;
use crate::progress::{ProgressEvent, SharedProgressReporter};
use crate::reconcile::{ReconcileStats, reconcile};
use crate::scan::{scan_catalog, scan_directory};
use crate::tagging::{EpisodeTags, TagWriter};

/// Result of an ingest run
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    /// Number of feeds written to the catalog
    pub ingested: usize,
    /// Episodes added to the catalog
    pub new_episodes: usize,
    /// Episodes that were already known
    pub seen_episodes: usize,
    /// Feeds that could not be fetched or parsed (source, error message)
    pub failed_feeds: Vec<(String, String)>,
}

/// Download instructions worked out by a planning run
#[derive(Debug, Clone, Serialize)]
pub struct FetchPlan {
    /// Files to fetch, in catalog order
    pub instructions: Vec<FetchInstruction>,
    /// Episode counts after each reconciliation step
    pub stats: ReconcileStats,
}

/// Result of a tagging run
#[derive(Debug, Clone, Default)]
pub struct TagReport {
    /// Files tagged and stamped in the catalog
    pub tagged: usize,
    /// Files that could not be tagged (filename, error message)
    pub failed_files: Vec<(String, String)>,
}

/// Fetch every feed source and write it to the catalog
///
/// Sources are URLs or local file paths. A feed that cannot be fetched or
/// parsed is reported and skipped. Catalog errors abort the run, since they
/// mean the catalog can no longer be trusted.
pub async fn ingest_feeds<C: HttpClient>(
    client: &C,
    catalog: &Catalog,
    sources: &[String],
    ctx: &RunContext,
    reporter: SharedProgressReporter,
) -> Result<IngestReport, SyncError> {
    let mut report = IngestReport::default();

    for source in sources {
        reporter.report(ProgressEvent::FetchingFeed {
            source: source.clone(),
        });

        let podcast = match load_feed(client, source).await {
            Ok(podcast) => podcast,
            Err(e) => {
                warn!(%source, error = %e, "skipping feed");
                reporter.report(ProgressEvent::FeedFailed {
                    source: source.clone(),
                    error: e.to_string(),
                });
                report.failed_feeds.push((source.clone(), e.to_string()));
                continue;
            }
        };

        let summary = catalog.ingest_podcast(&podcast, ctx)?;

        reporter.report(ProgressEvent::FeedIngested {
            podcast_title: podcast.title.clone(),
            new_episodes: summary.new_episodes,
            seen_episodes: summary.seen_episodes,
        });

        report.ingested += 1;
        report.new_episodes += summary.new_episodes;
        report.seen_episodes += summary.seen_episodes;
    }

    reporter.report(ProgressEvent::IngestCompleted {
        ingested: report.ingested,
        failed: report.failed_feeds.len(),
        new_episodes: report.new_episodes,
    });

    Ok(report)
}

async fn load_feed<C: HttpClient>(client: &C, source: &str) -> Result<Podcast, SyncError> {
    let podcast = if is_url(source) {
        fetch_feed(client, source).await?
    } else {
        parse_feed_file(Path::new(source))?
    };
    Ok(podcast)
}

/// Work out which catalog episodes still need downloading
///
/// The podcast directory and the catalog are each read once, and every
/// reconciliation step works off that one snapshot.
pub fn plan_downloads<R: CatalogReader + ?Sized>(
    catalog: &R,
    ctx: &RunContext,
    reporter: SharedProgressReporter,
) -> Result<FetchPlan, SyncError> {
    let files = scan_directory(&ctx.podcasts_dir)?;
    reporter.report(ProgressEvent::DirectoryScanned { files: files.len() });

    let entries = scan_catalog(catalog)?;
    reporter.report(ProgressEvent::CatalogScanned {
        episodes: entries.len(),
    });

    let reconciliation = reconcile(&files, &entries)?;
    let stats = reconciliation.stats();
    reporter.report(ProgressEvent::Reconciled { stats });

    let rows = catalog.fetch_rows()?;
    let instructions = build_fetch_list(&reconciliation, &rows);

    info!(count = instructions.len(), "episodes to download");
    reporter.report(ProgressEvent::FetchListReady {
        count: instructions.len(),
    });

    Ok(FetchPlan {
        instructions,
        stats,
    })
}

/// Record the episode files currently in the podcast directory
pub fn record_downloads(
    catalog: &Catalog,
    ctx: &RunContext,
    reporter: SharedProgressReporter,
) -> Result<DownloadSummary, SyncError> {
    let files = scan_directory(&ctx.podcasts_dir)?;
    reporter.report(ProgressEvent::DirectoryScanned { files: files.len() });

    let summary = catalog.record_downloads(&files, ctx)?;

    reporter.report(ProgressEvent::DownloadsRecorded {
        new_downloads: summary.new_downloads,
        seen_downloads: summary.seen_downloads,
    });

    Ok(summary)
}

/// Tag every recorded download that has not been tagged yet
///
/// A file that cannot be tagged is reported and left untagged, so the next
/// run tries again. Catalog errors abort the run.
pub fn tag_downloads<W: TagWriter + ?Sized>(
    writer: &W,
    catalog: &Catalog,
    ctx: &RunContext,
    reporter: SharedProgressReporter,
) -> Result<TagReport, SyncError> {
    let mut report = TagReport::default();

    for download in catalog.untagged_downloads()? {
        let path = ctx.podcasts_dir.join(&download.filename);
        let tags = EpisodeTags::for_episode(&download.podcast_title, &download.episode_title);

        match writer.write_tags(&path, &tags) {
            Ok(()) => {
                catalog.mark_tagged(&download.filename, ctx)?;
                reporter.report(ProgressEvent::FileTagged {
                    filename: download.filename.clone(),
                });
                report.tagged += 1;
            }
            Err(e) => {
                warn!(filename = %download.filename, error = %e, "tagging failed");
                reporter.report(ProgressEvent::TagFailed {
                    filename: download.filename.clone(),
                    error: e.to_string(),
                });
                report.failed_files.push((download.filename, e.to_string()));
            }
        }
    }

    info!(
        tagged = report.tagged,
        failed = report.failed_files.len(),
        "tagging finished"
    );
    reporter.report(ProgressEvent::TaggingCompleted {
        tagged: report.tagged,
        failed: report.failed_files.len(),
    });

    Ok(report)
}
