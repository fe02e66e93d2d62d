mod filename;
mod identifier;
mod title;

pub use filename::{AUDIO_EXTENSION, FilenameParts, decode_filename, encode_filename, is_well_formed};
pub use identifier::{content_id, episode_key};
pub use title::normalize_title;
