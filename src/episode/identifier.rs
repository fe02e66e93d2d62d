/// Content identifier of an episode: hex MD5 of its download URL
///
/// This is the current scheme embedded in filenames.
pub fn content_id(download_url: &str) -> String {
    format!("{:x}", md5::compute(download_url.as_bytes()))
}

/// Primary key of an episode: hex MD5 of podcast title followed by episode title
///
/// Files written by older runs carry this key in place of the content identifier.
pub fn episode_key(podcast_title: &str, episode_title: &str) -> String {
    format!("{:x}", md5::compute(format!("{podcast_title}{episode_title}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_id_is_hex_md5_of_url() {
        // md5("") is a well known constant
        assert_eq!(content_id(""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(content_id("https://example.com/ep1.mp3").len(), 32);
    }

    #[test]
    fn content_id_differs_per_url() {
        assert_ne!(
            content_id("https://example.com/ep1.mp3"),
            content_id("https://example.com/ep2.mp3")
        );
    }

    #[test]
    fn episode_key_hashes_the_concatenation() {
        assert_eq!(episode_key("Pod A", "Ep One"), content_id("Pod AEp One"));
    }

    #[test]
    fn identifiers_never_contain_filename_separators() {
        let id = episode_key("Pod", "Ep");
        assert!(!id.contains('-'));
        assert!(!id.contains('.'));
    }
}
