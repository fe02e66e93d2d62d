// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Work out which catalog episodes have no file on disk yet.
//!
//! Files are matched to catalog rows by the content identifier embedded in
//! their name. Files written before the identifier scheme changed carry a
//! different identifier, so every episode that fails the identifier match gets
//! two more chances based on its title token:
//!
//! 1. the token occurs anywhere in an on-disk filename, or
//! 2. the token equals the title token embedded in an on-disk filename.
//!
//! Pass 1 goes over the distinct catalog title tokens. A token shared by
//! several rows stands for the last of those rows only, so the other rows
//! can still be cleared by pass 2.
//!
//! Pass 1 can match an unrelated file whose name happens to contain a short
//! token ("News", "Q") and so hide an episode that really is missing. That
//! false negative is accepted; the passes stay as they are.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::CatalogEntry;
use crate::episode::{decode_filename, normalize_title};
use crate::error::ReconcileError;

/// How many candidate episodes were left after each step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileStats {
    /// Distinct content identifiers in the catalog
    pub catalog_ids: usize,
    /// Distinct content identifiers embedded in on-disk filenames
    pub file_ids: usize,
    /// Catalog identifiers with no file carrying the same identifier
    pub by_content_id: usize,
    /// Still missing after the title substring pass
    pub after_substring_match: usize,
    /// Still missing after the exact title token pass
    pub after_token_match: usize,
}

/// Result of a reconciliation run
///
/// A snapshot of the directory and catalog as they were scanned. Re-run the
/// whole reconciliation for fresh results.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    missing: HashSet<String>,
    stats: ReconcileStats,
}

impl Reconciliation {
    /// Content identifiers of the episodes that need downloading
    pub fn missing(&self) -> &HashSet<String> {
        &self.missing
    }

    pub fn is_missing(&self, content_id: &str) -> bool {
        self.missing.contains(content_id)
    }

    pub fn len(&self) -> usize {
        self.missing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn stats(&self) -> ReconcileStats {
        self.stats
    }
}

/// Compare the catalog against the files on disk
///
/// `filenames` must already be filtered to well-formed episode files, and both
/// inputs must come from the same scan for all passes to agree.
///
/// Fails when an episode is still missing after both fallback passes but its
/// title reduces to an empty token, because no filename can be built for it.
pub fn reconcile(
    filenames: &BTreeSet<String>,
    catalog: &[CatalogEntry],
) -> Result<Reconciliation, ReconcileError> {
    // Step 1: what the files say
    let mut file_ids = HashSet::with_capacity(filenames.len());
    let mut file_tokens = HashSet::with_capacity(filenames.len());
    for filename in filenames {
        let parts = decode_filename(filename);
        file_ids.insert(parts.content_id);
        file_tokens.insert(parts.title_token);
    }

    // Step 2: what the catalog says, with tokens recomputed from the titles
    let tokens: Vec<String> = catalog
        .iter()
        .map(|entry| normalize_title(&entry.episode_title))
        .collect();

    // Later rows win in both directions
    let mut token_by_id: HashMap<&str, &str> = HashMap::with_capacity(catalog.len());
    let mut id_by_token: HashMap<&str, &str> = HashMap::with_capacity(catalog.len());
    for (entry, token) in catalog.iter().zip(&tokens) {
        token_by_id.insert(entry.content_id.as_str(), token.as_str());
        id_by_token.insert(token.as_str(), entry.content_id.as_str());
    }

    // Step 3: identifier difference
    let mut missing: HashSet<&str> = token_by_id
        .keys()
        .copied()
        .filter(|id| !file_ids.contains(*id))
        .collect();

    let mut stats = ReconcileStats {
        catalog_ids: token_by_id.len(),
        file_ids: file_ids.len(),
        by_content_id: missing.len(),
        ..Default::default()
    };

    info!(
        catalog_ids = stats.catalog_ids,
        file_ids = stats.file_ids,
        missing = stats.by_content_id,
        "matched catalog against files by content id"
    );

    // Step 4: an empty token matches any file, so it only survives an empty directory
    let mut checked_tokens = HashSet::with_capacity(id_by_token.len());
    for token in tokens.iter().map(String::as_str) {
        if !checked_tokens.insert(token) {
            continue;
        }

        let Some(&content_id) = id_by_token.get(token) else {
            continue;
        };
        if !missing.contains(content_id) {
            continue;
        }

        if let Some(filename) = filenames
            .iter()
            .find(|filename| token.is_empty() || filename.contains(token))
        {
            debug!(%content_id, %token, %filename, "title found in filename");
            missing.remove(content_id);
        }
    }

    stats.after_substring_match = missing.len();
    info!(
        missing = stats.after_substring_match,
        "matched remaining episodes by title substring"
    );

    // Step 5
    missing.retain(|id| {
        let token = token_by_id.get(id).copied().unwrap_or_default();
        !file_tokens.contains(token)
    });

    stats.after_token_match = missing.len();
    info!(
        missing = stats.after_token_match,
        "matched remaining episodes by title token"
    );

    // Step 6: every row of a missing id gets a filename, so check each one
    if let Some((entry, _)) = catalog
        .iter()
        .zip(&tokens)
        .find(|(entry, token)| token.is_empty() && missing.contains(entry.content_id.as_str()))
    {
        return Err(ReconcileError::UnresolvedTitle {
            content_id: entry.content_id.clone(),
            episode: format!("{}: {}", entry.podcast_title, entry.episode_title),
        });
    }

    Ok(Reconciliation {
        missing: missing.into_iter().map(String::from).collect(),
        stats,
    })
}
