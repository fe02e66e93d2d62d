// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use serde::Serialize;
use tracing::debug;

use crate::catalog::FetchRow;
use crate::episode::encode_filename;
use crate::reconcile::Reconciliation;

/// One file to download and the name to store it under
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchInstruction {
    pub url: String,
    pub filename: String,
}

/// Turn the reconciled missing set into download instructions
///
/// Rows come out in the order the catalog returned them. An empty result is
/// a normal outcome, not an error.
pub fn build_fetch_list(missing: &Reconciliation, rows: &[FetchRow]) -> Vec<FetchInstruction> {
    let instructions: Vec<FetchInstruction> = rows
        .iter()
        .filter(|row| missing.is_missing(&row.content_id))
        .map(|row| FetchInstruction {
            url: row.file_url.clone(),
            filename: encode_filename(
                &row.podcast_title,
                &row.episode_title,
                &row.date,
                &row.content_id,
            ),
        })
        .collect();

    debug!(count = instructions.len(), "built fetch list");
    instructions
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeSet;

    use crate::catalog::CatalogEntry;
    use crate::reconcile::reconcile;

    fn row(podcast: &str, date: &str, episode: &str, id: &str) -> FetchRow {
        FetchRow {
            podcast_title: podcast.to_string(),
            date: date.to_string(),
            episode_title: episode.to_string(),
            episode_key: format!("key-{id}"),
            content_id: id.to_string(),
            file_url: format!("https://example.com/{id}.mp3"),
        }
    }

    fn missing_for(rows: &[FetchRow], files: &[&str]) -> Reconciliation {
        let catalog: Vec<CatalogEntry> = rows
            .iter()
            .map(|r| CatalogEntry {
                podcast_title: r.podcast_title.clone(),
                episode_title: r.episode_title.clone(),
                content_id: r.content_id.clone(),
            })
            .collect();
        let files: BTreeSet<String> = files.iter().map(|f| f.to_string()).collect();
        reconcile(&files, &catalog).unwrap()
    }

    #[test]
    fn builds_canonical_filenames_with_short_date() {
        let rows = vec![row("Pod A", "2020-01-01T08:30:00Z", "Ep Two", "hashZ")];
        let missing = missing_for(&rows, &[]);

        let list = build_fetch_list(&missing, &rows);

        assert_eq!(
            list,
            vec![FetchInstruction {
                url: "https://example.com/hashZ.mp3".to_string(),
                filename: "Pod_A-2020-01-01-Ep_Two-hashZ.mp3".to_string(),
            }]
        );
    }

    #[test]
    fn keeps_catalog_order() {
        let rows = vec![
            row("Pod B", "2021-03-03", "Zeta", "z"),
            row("Pod A", "2020-01-01", "Alpha", "a"),
            row("Pod C", "2019-02-02", "Mid", "m"),
        ];
        let missing = missing_for(&rows, &[]);

        let ids: Vec<String> = build_fetch_list(&missing, &rows)
            .into_iter()
            .map(|i| i.url)
            .collect();

        assert_eq!(
            ids,
            vec![
                "https://example.com/z.mp3",
                "https://example.com/a.mp3",
                "https://example.com/m.mp3",
            ]
        );
    }

    #[test]
    fn skips_episodes_already_on_disk() {
        let rows = vec![
            row("Pod A", "2020-01-01", "Ep One", "hashX"),
            row("Pod A", "2020-01-02", "Something Else", "hashW"),
        ];
        let missing = missing_for(&rows, &["Pod_A-2020-01-01-Ep_One-hashY.mp3"]);

        let list = build_fetch_list(&missing, &rows);

        assert_eq!(list.len(), 1);
        assert_eq!(list[0].filename, "Pod_A-2020-01-02-Something_Else-hashW.mp3");
    }

    #[test]
    fn nothing_missing_gives_empty_list() {
        let rows = vec![row("Pod A", "2020-01-01", "Ep One", "id1")];
        let missing = missing_for(&rows, &["Pod_A-2020-01-01-Ep_One-id1.mp3"]);

        assert!(build_fetch_list(&missing, &rows).is_empty());
    }
}
