// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Audio tags for downloaded episodes
//!
//! Every recorded download gets the episode title, the podcast title as
//! album and a fixed genre, once. The catalog remembers when a file was
//! tagged so later runs leave it alone.

use std::path::Path;

use lofty::config::WriteOptions;
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::Tag;

use crate::error::TagError;

pub const PODCAST_GENRE: &str = "Podcast";
pub const TAG_COMMENT: &str = "Tagged by podledger";

/// The tag values written to one episode file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeTags {
    pub title: String,
    pub album: String,
    pub genre: String,
    pub comment: String,
}

impl EpisodeTags {
    pub fn for_episode(podcast_title: &str, episode_title: &str) -> Self {
        Self {
            title: episode_title.to_string(),
            album: podcast_title.to_string(),
            genre: PODCAST_GENRE.to_string(),
            comment: TAG_COMMENT.to_string(),
        }
    }
}

/// Writes tags into audio files
pub trait TagWriter: Send + Sync {
    fn write_tags(&self, path: &Path, tags: &EpisodeTags) -> Result<(), TagError>;
}

/// Tag writer backed by lofty
///
/// Files without a tag get one of their format's primary tag type.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyTagWriter;

impl TagWriter for LoftyTagWriter {
    fn write_tags(&self, path: &Path, tags: &EpisodeTags) -> Result<(), TagError> {
        let write_failed = |source: lofty::error::LoftyError| TagError::WriteFailed {
            path: path.to_path_buf(),
            source,
        };

        let mut tagged_file = Probe::open(path)
            .map_err(write_failed)?
            .read()
            .map_err(write_failed)?;

        if tagged_file.primary_tag().is_none() {
            let tag_type = tagged_file.primary_tag_type();
            tagged_file.insert_tag(Tag::new(tag_type));
        }

        let Some(tag) = tagged_file.primary_tag_mut() else {
            return Err(TagError::Unsupported {
                path: path.to_path_buf(),
            });
        };

        tag.set_title(tags.title.clone());
        tag.set_album(tags.album.clone());
        tag.set_genre(tags.genre.clone());
        tag.set_comment(tags.comment.clone());

        tag.save_to_path(path, WriteOptions::default())
            .map_err(write_failed)
    }
}
