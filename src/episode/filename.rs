use super::title::normalize_title;

/// Extension of every file the download script produces
pub const AUDIO_EXTENSION: &str = "mp3";

/// Prefix of resource-fork artifacts left behind by macOS
const RESOURCE_FORK_PREFIX: &str = "._";

/// Number of dashes in a well-formed episode filename
const FILENAME_DASHES: usize = 5;

/// Length of the date component, e.g. "2024-01-15"
const DATE_LENGTH: usize = 10;

/// Identifier and title token recovered from an episode filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameParts {
    pub content_id: String,
    pub title_token: String,
}

/// Build the canonical filename for an episode
///
/// Format: "Podcast_Title-YYYY-MM-DD-Episode_Title-<content id>.mp3". Only the
/// first ten characters of `date` are used.
pub fn encode_filename(
    podcast_title: &str,
    episode_title: &str,
    date: &str,
    content_id: &str,
) -> String {
    let short_date: String = date.chars().take(DATE_LENGTH).collect();

    format!(
        "{}-{}-{}-{}.{}",
        normalize_title(podcast_title),
        short_date,
        normalize_title(episode_title),
        content_id,
        AUDIO_EXTENSION
    )
}

/// Recover the content identifier and title token from a filename
///
/// Dots count as dashes, the identifier is the second-to-last segment and the
/// title token the one before it. Names with fewer than three segments yield
/// empty parts, so callers should filter with [`is_well_formed`] first.
pub fn decode_filename(filename: &str) -> FilenameParts {
    let dashed = filename.replace('.', "-");
    let segments: Vec<&str> = dashed.split('-').collect();
    let n = segments.len();

    if n < 3 {
        return FilenameParts {
            content_id: String::new(),
            title_token: String::new(),
        };
    }

    FilenameParts {
        content_id: segments[n - 2].to_string(),
        title_token: segments[n - 3].to_string(),
    }
}

/// Check whether a directory entry looks like an episode we wrote
///
/// Resource-fork artifacts are skipped. Everything else needs exactly five
/// dashes and the audio extension somewhere in the name.
pub fn is_well_formed(filename: &str) -> bool {
    !filename.starts_with(RESOURCE_FORK_PREFIX)
        && filename.matches('-').count() == FILENAME_DASHES
        && filename.contains(AUDIO_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    // === Encoding ===

    #[test]
    fn encode_builds_canonical_filename() {
        assert_eq!(
            encode_filename("Pod A", "Ep One", "2020-01-01T10:00:00Z", "hashX"),
            "Pod_A-2020-01-01-Ep_One-hashX.mp3"
        );
    }

    #[test]
    fn encode_normalizes_both_titles() {
        assert_eq!(
            encode_filename("NASA Daily", "The \"Big\" One!", "2024-01-15", "abc"),
            "Nasa_Daily-2024-01-15-The_Big_One-abc.mp3"
        );
    }

    #[test]
    fn encode_keeps_short_dates_as_is() {
        assert_eq!(
            encode_filename("Pod", "Ep", "2024", "abc"),
            "Pod-2024-Ep-abc.mp3"
        );
    }

    #[test]
    fn encoded_filenames_are_well_formed() {
        let filename = encode_filename("Pod A", "Ep One", "2020-01-01T10:00:00Z", "hashX");
        assert!(is_well_formed(&filename));
    }

    // === Decoding ===

    #[test]
    fn decode_extracts_id_and_title_token() {
        let parts = decode_filename("Pod_A-2020-01-01-Ep_One-hashY.mp3");
        assert_eq!(parts.content_id, "hashY");
        assert_eq!(parts.title_token, "Ep_One");
    }

    #[test]
    fn decode_reverses_encode() {
        let cases = [
            ("Pod A", "Ep One", "2020-01-01", "0cc175b9c0f1b6a831c399e269772661"),
            ("NASA Daily", "Mars, again?", "2024-02-29T08:00:00+00:00", "id1"),
            ("Pod", "", "2021-12-03", "id2"),
        ];

        for (podcast, episode, date, id) in cases {
            let parts = decode_filename(&encode_filename(podcast, episode, date, id));
            assert_eq!(parts.content_id, id);
            assert_eq!(parts.title_token, normalize_title(episode));
        }
    }

    #[test]
    fn decode_short_names_gives_empty_parts() {
        let parts = decode_filename("notes.txt");
        assert_eq!(parts.content_id, "");
        assert_eq!(parts.title_token, "");
    }

    #[test]
    fn decode_treats_dots_as_separators() {
        let parts = decode_filename("a.b.c.mp3");
        assert_eq!(parts.content_id, "c");
        assert_eq!(parts.title_token, "b");
    }

    // === Well-formed filter ===

    #[test]
    fn rejects_resource_fork_artifacts() {
        assert!(!is_well_formed("._Pod_A-2020-01-01-Ep_One-hashY.mp3"));
    }

    #[test]
    fn rejects_wrong_dash_count() {
        assert!(!is_well_formed("Pod-A-2020-01-01-Ep_One-hashY.mp3"));
        assert!(!is_well_formed("Pod_A-2020-01-01-hashY.mp3"));
    }

    #[test]
    fn rejects_names_without_audio_extension() {
        assert!(!is_well_formed("Pod_A-2020-01-01-Ep_One-hashY.json"));
    }

    #[test]
    fn rejects_empty_and_single_char_names() {
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("."));
    }

    #[test]
    fn accepts_extension_anywhere_in_name() {
        assert!(is_well_formed("Pod_A-2020-01-01-Ep_One-hashY.mp3.bak"));
    }
}
