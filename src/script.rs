// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Download script generation.
//!
//! The script is only written here. Running it is left to the user.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::ScriptError;
use crate::fetch_list::FetchInstruction;

/// Name of the script written into the podcast directory
pub const SCRIPT_NAME: &str = "download_pods.sh";

const WGET: &str = "wget --no-clobber --continue --no-check-certificate --no-verbose";

/// Render the shell command that downloads one file
pub fn script_line(url: &str, filename: &str) -> String {
    let url = shell_quote(url);
    let filename = shell_quote(filename);
    format!("{WGET} {url} -O {filename} && chmod 666 {filename}")
}

/// Render the whole script, one command per line
pub fn render_download_script(instructions: &[FetchInstruction]) -> String {
    instructions
        .iter()
        .map(|i| script_line(&i.url, &i.filename))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write the download script into `dir`, replacing any previous one
///
/// An empty instruction list still writes an (empty) script so a stale one
/// never gets run again.
pub fn write_download_script(
    dir: &Path,
    instructions: &[FetchInstruction],
) -> Result<PathBuf, ScriptError> {
    let path = dir.join(SCRIPT_NAME);

    std::fs::write(&path, render_download_script(instructions)).map_err(|e| {
        ScriptError::WriteFailed {
            path: path.clone(),
            source: e,
        }
    })?;

    info!(path = %path.display(), lines = instructions.len(), "wrote download script");
    Ok(path)
}

// Single quotes inside the value close the quote, emit an escaped quote and reopen
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
