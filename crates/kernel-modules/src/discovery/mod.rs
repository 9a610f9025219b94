//! Module directory discovery.
//!
//! [`discover`] lists the immediate subdirectories of the modules root in byte
//! order and parses each directory's manifest. Read and parse failures are
//! kept per candidate, and entries the listing cannot yield are kept as
//! [`SkippedEntry`] values, so the caller can record them without affecting
//! sibling modules.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use serde_json::Value;

use crate::error::ModuleError;
use crate::manifest::{MANIFEST_FILE_NAME, RawManifest};

/// A directory found under the modules root.
#[derive(Debug)]
pub struct Candidate {
    name: String,
    directory: Utf8PathBuf,
    outcome: Result<RawManifest, ModuleError>,
}

impl Candidate {
    /// Returns the directory name, which is also the expected module name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the module directory.
    #[must_use]
    pub fn directory(&self) -> &Utf8Path {
        &self.directory
    }

    /// Returns the parsed manifest or the discovery failure.
    #[must_use]
    pub const fn outcome(&self) -> &Result<RawManifest, ModuleError> {
        &self.outcome
    }

    /// Splits the candidate into its parts.
    #[must_use]
    pub fn into_parts(self) -> (String, Utf8PathBuf, Result<RawManifest, ModuleError>) {
        (self.name, self.directory, self.outcome)
    }
}

/// A root entry that did not become a candidate.
#[derive(Debug)]
pub enum SkippedEntry {
    /// A directory whose name is not valid UTF-8.
    NonUtf8Name(PathBuf),
    /// An entry the directory listing failed to produce.
    Unreadable(io::Error),
}

/// Result of listing the modules root.
#[derive(Debug, Default)]
pub struct Discovery {
    candidates: Vec<Candidate>,
    skipped: Vec<SkippedEntry>,
}

impl Discovery {
    /// Returns candidates in byte order of their directory names.
    #[must_use]
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Returns root entries that did not become candidates.
    #[must_use]
    pub fn skipped(&self) -> &[SkippedEntry] {
        &self.skipped
    }

    /// Splits the listing into candidates and skipped entries.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Candidate>, Vec<SkippedEntry>) {
        (self.candidates, self.skipped)
    }
}

/// Lists module directories under `root` and parses their manifests.
///
/// Plain files under the root are ignored. Symbolic links to directories are
/// followed. An entry the listing fails to yield is skipped; its siblings are
/// still listed.
///
/// # Errors
///
/// Returns the I/O error when `root` itself cannot be listed.
pub fn discover(root: &Utf8Path) -> io::Result<Discovery> {
    let entries = fs::read_dir(root)?.map(|entry| entry.map(|found| found.path()));
    Ok(collect_candidates(entries))
}

fn collect_candidates(entries: impl Iterator<Item = io::Result<PathBuf>>) -> Discovery {
    let mut directories = Vec::new();
    let mut skipped = Vec::new();

    for entry in entries {
        let path = match entry {
            Ok(path) => path,
            Err(error) => {
                skipped.push(SkippedEntry::Unreadable(error));
                continue;
            }
        };
        if !path.is_dir() {
            continue;
        }
        match Utf8PathBuf::from_path_buf(path) {
            Ok(directory) => {
                if let Some(name) = directory.file_name().map(str::to_owned) {
                    directories.push((name, directory));
                }
            }
            Err(non_utf8) => skipped.push(SkippedEntry::NonUtf8Name(non_utf8)),
        }
    }

    directories.sort_unstable_by(|(left, _), (right, _)| left.as_bytes().cmp(right.as_bytes()));

    let candidates = directories
        .into_iter()
        .map(|(name, directory)| {
            let outcome = read_manifest(&name, &directory);
            Candidate {
                name,
                directory,
                outcome,
            }
        })
        .collect();

    Discovery {
        candidates,
        skipped,
    }
}

/// Reads and parses the manifest of a single module directory.
///
/// # Errors
///
/// Returns [`ModuleError::Discovery`] when the file cannot be read, is not
/// valid JSON, or does not hold a JSON object.
pub fn read_manifest(name: &str, directory: &Utf8Path) -> Result<RawManifest, ModuleError> {
    let path = directory.join(MANIFEST_FILE_NAME);
    let text = fs::read_to_string(&path).map_err(|err| ModuleError::Discovery {
        module: name.to_owned(),
        message: format!("failed to read {path}"),
        source: Some(Arc::new(err)),
    })?;

    let value: Value = serde_json::from_str(&text).map_err(|err| ModuleError::Discovery {
        module: name.to_owned(),
        message: format!("{MANIFEST_FILE_NAME} is not valid JSON"),
        source: Some(Arc::new(err)),
    })?;

    match value {
        Value::Object(object) => Ok(object),
        other => Err(ModuleError::Discovery {
            module: name.to_owned(),
            message: format!(
                "{MANIFEST_FILE_NAME} must hold a JSON object, found {}",
                json_kind(&other)
            ),
            source: None,
        }),
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
