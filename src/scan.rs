// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use tracing::{debug, warn};

use crate::catalog::{CatalogEntry, CatalogReader};
use crate::episode::{episode_key, is_well_formed};
use crate::error::{CatalogError, ScanError};

/// List the well-formed episode filenames in the podcast directory
///
/// Anything else in the directory (resource forks, scripts, partial or foreign
/// files) is silently left out.
pub fn scan_directory(podcasts_dir: &Path) -> Result<BTreeSet<String>, ScanError> {
    if !podcasts_dir.is_dir() {
        return Err(ScanError::DirectoryNotFound(podcasts_dir.to_path_buf()));
    }

    let entries = std::fs::read_dir(podcasts_dir).map_err(|e| ScanError::ReadDirectoryFailed {
        path: podcasts_dir.to_path_buf(),
        source: e,
    })?;

    let mut filenames = BTreeSet::new();
    let mut skipped = 0usize;

    for entry in entries {
        let entry = entry.map_err(|e| ScanError::ReadDirectoryFailed {
            path: podcasts_dir.to_path_buf(),
            source: e,
        })?;

        let Some(filename) = entry.file_name().to_str().map(String::from) else {
            warn!(name = ?entry.file_name(), "skipping entry with non UTF-8 name");
            continue;
        };

        if is_well_formed(&filename) {
            filenames.insert(filename);
        } else {
            skipped += 1;
        }
    }

    debug!(
        dir = %podcasts_dir.display(),
        episodes = filenames.len(),
        skipped,
        "scanned podcast directory"
    );

    Ok(filenames)
}

/// Read every catalog episode that has a download URL
///
/// Two rows for the same podcast and episode title share a primary key, which
/// means the catalog is already inconsistent; that is reported, not repaired.
pub fn scan_catalog<R: CatalogReader + ?Sized>(
    reader: &R,
) -> Result<Vec<CatalogEntry>, CatalogError> {
    let rows = reader.reconcile_rows()?;

    if let Some(err) = find_duplicate(&rows) {
        return Err(err);
    }

    debug!(rows = rows.len(), "read catalog");
    Ok(rows)
}

fn find_duplicate(rows: &[CatalogEntry]) -> Option<CatalogError> {
    let mut seen = HashSet::with_capacity(rows.len());

    let duplicate = rows
        .iter()
        .find(|row| !seen.insert((row.podcast_title.as_str(), row.episode_title.as_str())))?;

    let count = rows
        .iter()
        .filter(|r| {
            r.podcast_title == duplicate.podcast_title && r.episode_title == duplicate.episode_title
        })
        .count();

    Some(CatalogError::DuplicateEpisode {
        title: duplicate.episode_title.clone(),
        key: episode_key(&duplicate.podcast_title, &duplicate.episode_title),
        count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::catalog::FetchRow;
    use tempfile::tempdir;

    struct StaticCatalog(Vec<CatalogEntry>);

    impl CatalogReader for StaticCatalog {
        fn reconcile_rows(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
            Ok(self.0.clone())
        }

        fn fetch_rows(&self) -> Result<Vec<FetchRow>, CatalogError> {
            Ok(vec![])
        }
    }

    fn entry(podcast: &str, episode: &str, id: &str) -> CatalogEntry {
        CatalogEntry {
            podcast_title: podcast.to_string(),
            episode_title: episode.to_string(),
            content_id: id.to_string(),
        }
    }

    #[test]
    fn scan_empty_dir_returns_empty_set() {
        let dir = tempdir().unwrap();
        assert!(scan_directory(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn scan_missing_dir_is_an_error() {
        let dir = tempdir().unwrap();
        let result = scan_directory(&dir.path().join("nope"));
        assert!(matches!(result, Err(ScanError::DirectoryNotFound(_))));
    }

    #[test]
    fn scan_keeps_only_well_formed_episode_files() {
        let dir = tempdir().unwrap();
        for name in [
            "Pod_A-2020-01-01-Ep_One-hashY.mp3",
            "Pod_A-2020-01-02-Ep_Two-hashZ.mp3",
            "._Pod_A-2020-01-01-Ep_One-hashY.mp3",
            "download_pods.sh",
            "Pod-A-2020-01-01-Ep_One-hashY.mp3",
            "Pod_A-2020-01-01-Ep_One-hashY.json",
        ] {
            std::fs::write(dir.path().join(name), b"audio").unwrap();
        }

        let files = scan_directory(dir.path()).unwrap();

        assert_eq!(
            files.into_iter().collect::<Vec<_>>(),
            vec![
                "Pod_A-2020-01-01-Ep_One-hashY.mp3",
                "Pod_A-2020-01-02-Ep_Two-hashZ.mp3",
            ]
        );
    }

    #[test]
    fn scan_catalog_returns_rows_in_order() {
        let catalog = StaticCatalog(vec![
            entry("Pod A", "Ep Two", "b"),
            entry("Pod A", "Ep One", "a"),
        ]);

        let rows = scan_catalog(&catalog).unwrap();
        assert_eq!(rows[0].content_id, "b");
        assert_eq!(rows[1].content_id, "a");
    }

    #[test]
    fn scan_catalog_allows_same_title_in_different_podcasts() {
        let catalog = StaticCatalog(vec![
            entry("Pod A", "Trailer", "a"),
            entry("Pod B", "Trailer", "b"),
        ]);
        assert_eq!(scan_catalog(&catalog).unwrap().len(), 2);
    }

    #[test]
    fn scan_catalog_rejects_duplicate_keys() {
        let catalog = StaticCatalog(vec![
            entry("Pod A", "Ep One", "a"),
            entry("Pod A", "Ep One", "b"),
        ]);

        match scan_catalog(&catalog).unwrap_err() {
            CatalogError::DuplicateEpisode { title, key, count } => {
                assert_eq!(title, "Ep One");
                assert_eq!(key, episode_key("Pod A", "Ep One"));
                assert_eq!(count, 2);
            }
            other => panic!("Expected DuplicateEpisode, got {other:?}"),
        }
    }
}
