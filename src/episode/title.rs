use std::sync::LazyLock;

use regex::bytes::Regex;

/// Maximum number of bytes of a title considered for the token
const MAX_TITLE_BYTES: usize = 100;

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new("[A-Za-z]+").unwrap());

/// Turn a free-text title into the canonical, filesystem-safe title token
///
/// Quotes are dropped, the text is cut to its first 100 bytes, and every run of
/// ASCII letters becomes a word. Fully uppercase words are title-cased, all other
/// words keep their casing. Words are joined with `_`.
///
/// The cut happens on raw bytes and may land inside a word or a multi-byte
/// character. Only ASCII letters survive, so the token is always valid UTF-8.
pub fn normalize_title(title: &str) -> String {
    let unquoted: Vec<u8> = title
        .bytes()
        .filter(|b| !matches!(b, b'"' | b'\''))
        .collect();
    let head = &unquoted[..unquoted.len().min(MAX_TITLE_BYTES)];

    WORD.find_iter(head)
        .map(|m| word_token(m.as_bytes()))
        .collect::<Vec<_>>()
        .join("_")
}

fn word_token(word: &[u8]) -> String {
    if word.iter().all(u8::is_ascii_uppercase) {
        word.iter()
            .enumerate()
            .map(|(i, b)| {
                if i == 0 {
                    *b as char
                } else {
                    b.to_ascii_lowercase() as char
                }
            })
            .collect()
    } else {
        word.iter().map(|b| *b as char).collect()
    }
}
