//! Server checksum listing
//!
//! `ServerSndFilesChecksums.txt` is the output of `md5sum` run over the sound
//! directory of the live site:
//!
//! ```text
//! d41d8cd98f00b204e9800998ecf8427e  /srv/soundcomparisons/site/sound/Eng/Eng_101_house.mp3
//! ```
//!
//! Each line yields the checksum, the folder the file sits in, its stem and
//! its extension. Parsing is fail-fast: the first line that does not match
//! aborts the read.

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

const LINE_PATTERN: &str = r"^(.*?)  .*/([^/]+?)/([^/]+?)\.(.*)";

#[allow(clippy::expect_used)]
fn line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // LINE_PATTERN is a constant, compilation cannot fail at runtime
    RE.get_or_init(|| Regex::new(LINE_PATTERN).expect("LINE_PATTERN compiles"))
}

/// One file observed on the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerChecksumRecord {
    /// MD5 of the file content
    pub checksum: String,
    /// Directory directly containing the file
    pub folder: String,
    /// File name without extension
    pub stem: String,
    /// File extension
    pub extension: String,
}

impl ServerChecksumRecord {
    /// `stem.ext`, the bitstream id this file corresponds to
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.stem, self.extension)
    }

    /// `folder/stem.ext`, as reported in reconciliation results
    pub fn folder_path(&self) -> String {
        format!("{}/{}.{}", self.folder, self.stem, self.extension)
    }
}

/// Parse a single listing line
///
/// Returns `None` if the line does not match the listing grammar.
pub fn parse_line(line: &str) -> Option<ServerChecksumRecord> {
    let caps = line_regex().captures(line)?;
    Some(ServerChecksumRecord {
        checksum: caps[1].to_string(),
        folder: caps[2].to_string(),
        stem: caps[3].to_string(),
        extension: caps[4].to_string(),
    })
}

/// Parse a whole listing, skipping blank lines
///
/// # Errors
///
/// [`Error::MalformedServerLine`] for the first line that does not parse.
pub fn parse_listing(text: &str) -> Result<Vec<ServerChecksumRecord>> {
    let mut records = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let record = parse_line(line).ok_or_else(|| Error::MalformedServerLine {
            line_number: i + 1,
            line: line.to_string(),
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Read and parse `ServerSndFilesChecksums.txt`
///
/// # Errors
///
/// [`Error::MissingInput`] if the file does not exist, otherwise as
/// [`parse_listing`].
pub fn read_server_listing(path: &Path) -> Result<Vec<ServerChecksumRecord>> {
    if !path.is_file() {
        return Err(Error::MissingInput {
            what: "server checksum listing",
            path: path.to_path_buf(),
        });
    }
    let text = std::fs::read_to_string(path)?;
    let records = parse_listing(&text)?;
    tracing::debug!(?path, records = records.len(), "read server checksum listing");
    Ok(records)
}
