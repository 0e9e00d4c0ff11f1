//! Reconciliation of the catalog against the live server
//!
//! Compares three views of the sound files:
//!
//! - the files on the server (the checksum listing),
//! - the objects in the media catalog,
//! - the valid paths derived from the relational data,
//!
//! and classifies every difference:
//!
//! | category    | meaning                                                          |
//! |-------------|------------------------------------------------------------------|
//! | `new`       | on the server and valid, but no catalog object has that name     |
//! | `modified`  | on the server with a checksum differing from the stored bitstream |
//! | `obsolete`  | in the catalog, not on the server and not valid                  |
//! | `check`     | in the catalog, not on the server, but valid (likely deleted by mistake) |
//! | `dup_paths` | names shared by several catalog objects                          |
//! | `dup_md5`   | checksums shared by several catalog objects                      |

use crate::catalog::CatalogIndex;
use crate::error::Result;
use crate::server_listing::ServerChecksumRecord;
use crate::utils::{to_pretty_json, write_atomic};
use crate::valid_paths::ValidPathSet;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;
use tracing::{debug, info, warn};

/// Result of a reconciliation run
///
/// All maps are keyed in sorted order and `new` is sorted, so identical
/// inputs always produce an identical report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    /// `folder/stem.ext` on the server, valid, and unknown to the catalog
    pub new: BTreeSet<String>,
    /// Object id to `folder/stem.ext` whose server checksum differs
    pub modified: BTreeMap<String, Vec<String>>,
    /// Object id to names neither on the server nor valid
    pub obsolete: BTreeMap<String, Vec<String>>,
    /// Object id to names not on the server but valid
    pub check: BTreeMap<String, Vec<String>>,
    /// Name to the ids of all objects carrying it, for names used more than once
    pub dup_paths: BTreeMap<String, Vec<String>>,
    /// Checksum to the ids of all objects holding it, for checksums seen more than once
    pub dup_md5: BTreeMap<String, Vec<String>>,
}

/// Number of entries per report category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    /// Entries in `new`
    pub new: usize,
    /// Paths in `modified`
    pub modified: usize,
    /// Objects in `obsolete`
    pub obsolete: usize,
    /// Objects in `check`
    pub check: usize,
    /// Names in `dup_paths`
    pub dup_paths: usize,
    /// Checksums in `dup_md5`
    pub dup_md5: usize,
}

impl ReconciliationReport {
    /// Counts per category
    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            new: self.new.len(),
            modified: self.modified.values().map(Vec::len).sum(),
            obsolete: self.obsolete.len(),
            check: self.check.len(),
            dup_paths: self.dup_paths.len(),
            dup_md5: self.dup_md5.len(),
        }
    }

    /// Whether catalog and server agree completely
    pub fn is_clean(&self) -> bool {
        self.summary() == ReportSummary::default()
    }

    /// Render as JSON with four-space indentation
    pub fn to_json(&self) -> Result<String> {
        to_pretty_json(self)
    }

    /// Write the report to `path` atomically
    pub fn write(&self, path: &Path) -> Result<()> {
        write_atomic(path, self.to_json()?)?;
        info!(?path, "wrote reconciliation report");
        Ok(())
    }
}

/// Classify the differences between server, catalog and valid paths
pub fn reconcile<'a>(
    valid: &ValidPathSet,
    index: &CatalogIndex,
    server: impl IntoIterator<Item = &'a ServerChecksumRecord>,
) -> ReconciliationReport {
    let mut report = ReconciliationReport::default();
    let mut seen: HashSet<&str> = HashSet::new();

    // Pass 1: files on the server
    for record in server {
        seen.insert(record.stem.as_str());

        match index.get_by_name(&record.stem) {
            Some(obj) => {
                let file_name = record.file_name();
                match obj.bitstream(&file_name) {
                    Some(bs) if bs.checksum != record.checksum => {
                        debug!(
                            object = %obj.id,
                            file = %file_name,
                            stored = %bs.checksum,
                            server = %record.checksum,
                            "checksum differs"
                        );
                        report
                            .modified
                            .entry(obj.id.clone())
                            .or_default()
                            .push(record.folder_path());
                    }
                    // unchanged, or stored under another extension only
                    _ => {}
                }
            }
            None => {
                if valid.contains(&record.stem) {
                    report.new.insert(record.folder_path());
                }
            }
        }
    }

    for paths in report.modified.values_mut() {
        paths.sort();
        paths.dedup();
    }

    // Pass 2: objects in the catalog
    let mut by_name: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    let mut by_md5: BTreeMap<&str, Vec<String>> = BTreeMap::new();

    for obj in index.iter() {
        for bs in &obj.bitstreams {
            by_md5
                .entry(bs.checksum.as_str())
                .or_default()
                .push(obj.id.clone());
        }

        let Some(name) = obj.name() else {
            warn!(object = %obj.id, "catalog object has no name, not classified");
            continue;
        };
        by_name.entry(name).or_default().push(obj.id.clone());

        if seen.contains(name) {
            continue;
        }
        let bucket = if valid.contains(name) {
            &mut report.check
        } else {
            &mut report.obsolete
        };
        bucket
            .entry(obj.id.clone())
            .or_default()
            .push(name.to_string());
    }

    report.dup_paths = duplicates(by_name);
    report.dup_md5 = duplicates(by_md5);

    let summary = report.summary();
    info!(
        new = summary.new,
        modified = summary.modified,
        obsolete = summary.obsolete,
        check = summary.check,
        dup_paths = summary.dup_paths,
        dup_md5 = summary.dup_md5,
        "reconciled catalog against server"
    );

    report
}

fn duplicates(map: BTreeMap<&str, Vec<String>>) -> BTreeMap<String, Vec<String>> {
    map.into_iter()
        .filter(|(_, ids)| ids.len() > 1)
        .map(|(key, ids)| (key.to_string(), ids))
        .collect()
}
