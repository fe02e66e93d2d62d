// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::BTreeSet;
use std::path::Path;

use rusqlite::{Connection, params};
use tracing::{debug, info};

use crate::config::RunContext;
use crate::episode::{content_id, decode_filename, episode_key};
use crate::error::CatalogError;
use crate::feed::{Episode, Podcast};

use super::records::{
    CatalogEntry, CatalogReader, DownloadSummary, FetchRow, IngestSummary, UntaggedDownload,
};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS podcasts (
    title TEXT PRIMARY KEY,
    author TEXT,
    description TEXT,
    language TEXT,
    link TEXT,
    category TEXT,
    first_seen TEXT NOT NULL,
    last_seen TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS episodes (
    author TEXT,
    description TEXT,
    episode TEXT,
    file TEXT,
    format TEXT,
    guid TEXT,
    link TEXT,
    published TEXT,
    title TEXT,
    first_seen TEXT,
    last_seen TEXT,
    podcast_title TEXT,
    episode_key TEXT PRIMARY KEY,
    content_id TEXT
);

CREATE TABLE IF NOT EXISTS downloads (
    filename TEXT PRIMARY KEY,
    hash TEXT NOT NULL,
    first_seen TEXT NOT NULL,
    last_seen TEXT NOT NULL,
    tagged_at TEXT DEFAULT NULL
);
"#;

/// SQLite-backed catalog of podcasts, episodes and recorded downloads
pub struct Catalog {
    conn: Connection,
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog").finish_non_exhaustive()
    }
}

impl Catalog {
    /// Open (or create) the catalog database at `path`
    pub fn open(path: &Path) -> Result<Self, CatalogError> {
        let conn = Connection::open(path).map_err(|e| CatalogError::OpenFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::with_connection(conn)
    }

    /// Open a throwaway catalog that lives only in memory
    pub fn open_in_memory() -> Result<Self, CatalogError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, CatalogError> {
        conn.execute_batch(SCHEMA)?;
        add_missing_column(&conn, "downloads", "tagged_at", "TEXT DEFAULT NULL")?;
        Ok(Self { conn })
    }

    /// Add a parsed feed to the catalog
    ///
    /// New podcasts and episodes are inserted with the run timestamp as first and
    /// last seen; known ones only get their last-seen timestamp bumped. Finding an
    /// episode key more than once aborts the ingest.
    pub fn ingest_podcast(
        &self,
        podcast: &Podcast,
        ctx: &RunContext,
    ) -> Result<IngestSummary, CatalogError> {
        let tx = self.conn.unchecked_transaction()?;
        let mut summary = IngestSummary::default();

        let count = count_rows(&tx, "SELECT count(*) FROM podcasts WHERE title = ?1", &podcast.title)?;
        match count {
            0 => {
                info!(podcast = %podcast.title, "new podcast, adding to catalog");
                tx.execute(
                    "INSERT INTO podcasts
                     (author, category, description, language, link, title, first_seen, last_seen)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
                    params![
                        podcast.author.as_deref().and_then(null_if_empty),
                        podcast.category.as_deref().and_then(null_if_empty),
                        podcast.description.as_deref().and_then(null_if_empty),
                        podcast.language.as_deref().and_then(null_if_empty),
                        podcast.link.as_deref().and_then(null_if_empty),
                        podcast.title,
                        ctx.timestamp,
                    ],
                )?;
                summary.new_podcast = true;
            }
            1 => {
                debug!(podcast = %podcast.title, "podcast already in catalog");
                tx.execute(
                    "UPDATE podcasts SET last_seen = ?1 WHERE title = ?2",
                    params![ctx.timestamp, podcast.title],
                )?;
            }
            count => {
                return Err(CatalogError::DuplicatePodcast {
                    title: podcast.title.clone(),
                    count,
                });
            }
        }

        for episode in &podcast.episodes {
            if ingest_episode(&tx, &podcast.title, episode, ctx)? {
                summary.new_episodes += 1;
            } else {
                summary.seen_episodes += 1;
            }
        }

        tx.commit()?;

        info!(
            podcast = %podcast.title,
            new = summary.new_episodes,
            seen = summary.seen_episodes,
            "ingested feed"
        );

        Ok(summary)
    }

    /// Record which well-formed episode files are present in the podcast directory
    ///
    /// The identifier stored for a new file is the one embedded in its name.
    pub fn record_downloads(
        &self,
        filenames: &BTreeSet<String>,
        ctx: &RunContext,
    ) -> Result<DownloadSummary, CatalogError> {
        let tx = self.conn.unchecked_transaction()?;
        let mut summary = DownloadSummary::default();

        for filename in filenames {
            let count = count_rows(&tx, "SELECT count(*) FROM downloads WHERE filename = ?1", filename)?;
            match count {
                0 => {
                    debug!(%filename, "fresh download, adding");
                    let parts = decode_filename(filename);
                    tx.execute(
                        "INSERT INTO downloads (filename, hash, first_seen, last_seen)
                         VALUES (?1, ?2, ?3, ?3)",
                        params![filename, parts.content_id, ctx.timestamp],
                    )?;
                    summary.new_downloads += 1;
                }
                1 => {
                    tx.execute(
                        "UPDATE downloads SET last_seen = ?1 WHERE filename = ?2",
                        params![ctx.timestamp, filename],
                    )?;
                    summary.seen_downloads += 1;
                }
                count => {
                    return Err(CatalogError::DuplicateDownload {
                        filename: filename.clone(),
                        count,
                    });
                }
            }
        }

        tx.commit()?;
        Ok(summary)
    }

    /// Recorded downloads that have not been tagged yet, by filename
    ///
    /// A download is joined to its episode through the identifier in its
    /// filename, which is either the content id or, for older files, the
    /// episode key.
    pub fn untagged_downloads(&self) -> Result<Vec<UntaggedDownload>, CatalogError> {
        let mut stmt = self.conn.prepare(
            "SELECT d.filename,
                    COALESCE(e.podcast_title, 'title missing'),
                    COALESCE(e.title, 'title missing')
             FROM downloads AS d
             JOIN episodes AS e ON e.content_id = d.hash OR e.episode_key = d.hash
             WHERE d.tagged_at IS NULL
             GROUP BY d.filename
             ORDER BY d.filename",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(UntaggedDownload {
                filename: row.get(0)?,
                podcast_title: row.get(1)?,
                episode_title: row.get(2)?,
            })
        })?;

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Stamp a download as tagged in this run
    pub fn mark_tagged(&self, filename: &str, ctx: &RunContext) -> Result<(), CatalogError> {
        let affected = self.conn.execute(
            "UPDATE downloads SET tagged_at = ?1 WHERE filename = ?2",
            params![ctx.timestamp, filename],
        )?;

        if affected > 1 {
            return Err(CatalogError::DuplicateDownload {
                filename: filename.to_string(),
                count: affected,
            });
        }
        Ok(())
    }

    /// Number of episodes in the catalog, with or without a download URL
    pub fn episode_count(&self) -> Result<usize, CatalogError> {
        let count: i64 = self
            .conn
            .query_row("SELECT count(*) FROM episodes", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl CatalogReader for Catalog {
    fn reconcile_rows(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        let mut stmt = self.conn.prepare(
            "SELECT podcast_title, title, content_id
             FROM episodes
             WHERE file IS NOT NULL AND file != ''
             ORDER BY rowid",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(CatalogEntry {
                podcast_title: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                episode_title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                content_id: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            })
        })?;

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn fetch_rows(&self) -> Result<Vec<FetchRow>, CatalogError> {
        let mut stmt = self.conn.prepare(
            "SELECT podcast_title, IFNULL(published, first_seen), title, episode_key, content_id, file
             FROM episodes
             WHERE file IS NOT NULL AND file != ''
             ORDER BY rowid",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(FetchRow {
                podcast_title: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                date: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                episode_title: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                episode_key: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                content_id: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                file_url: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
            })
        })?;

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

/// Insert or touch one episode, returning true when it was new
fn ingest_episode(
    conn: &Connection,
    podcast_title: &str,
    episode: &Episode,
    ctx: &RunContext,
) -> Result<bool, CatalogError> {
    let key = episode_key(podcast_title, &episode.title);

    let count = count_rows(conn, "SELECT count(*) FROM episodes WHERE episode_key = ?1", &key)?;
    match count {
        0 => {
            debug!(episode = %episode.title, %key, "new episode");
            conn.execute(
                "INSERT INTO episodes (
                    author, description, episode, file, format, guid, link, published,
                    title, first_seen, last_seen, podcast_title, episode_key, content_id
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10, ?11, ?12, ?13)",
                params![
                    episode.author.as_deref().and_then(null_if_empty),
                    episode.description.as_deref().and_then(null_if_empty),
                    episode.episode_number.as_deref().and_then(null_if_empty),
                    null_if_empty(&episode.file_url),
                    episode.format.as_deref().and_then(null_if_empty),
                    episode.guid.as_deref().and_then(null_if_empty),
                    episode.link.as_deref().and_then(null_if_empty),
                    episode.published.as_deref().and_then(null_if_empty),
                    null_if_empty(&episode.title),
                    ctx.timestamp,
                    null_if_empty(podcast_title),
                    key,
                    content_id(&episode.file_url),
                ],
            )?;
            Ok(true)
        }
        1 => {
            conn.execute(
                "UPDATE episodes SET last_seen = ?1 WHERE episode_key = ?2",
                params![ctx.timestamp, key],
            )?;
            Ok(false)
        }
        count => Err(CatalogError::DuplicateEpisode {
            title: episode.title.clone(),
            key,
            count,
        }),
    }
}

/// Catalogs created before a column existed get it added in place
fn add_missing_column(
    conn: &Connection,
    table: &str,
    column: &str,
    definition: &str,
) -> Result<(), CatalogError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;

    if !columns.iter().any(|c| c == column) {
        info!(table, column, "adding column to existing catalog");
        conn.execute_batch(&format!("ALTER TABLE {table} ADD COLUMN {column} {definition}"))?;
    }
    Ok(())
}

fn count_rows(conn: &Connection, sql: &str, value: &str) -> Result<usize, CatalogError> {
    let count: i64 = conn.query_row(sql, params![value], |row| row.get(0))?;
    Ok(count as usize)
}

fn null_if_empty(s: &str) -> Option<&str> {
    Some(s).filter(|s| !s.trim().is_empty())
}
