//! Module manifest types and the manifest validator.
//!
//! Every module directory carries a [`MANIFEST_FILE_NAME`] file holding a JSON
//! object. Discovery hands the parsed object over as a [`RawManifest`];
//! [`validate`] narrows it to an immutable [`ModuleManifest`] once the module
//! contract holds. Fields other than `name` and `entry` are kept verbatim as
//! metadata.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationFailure;

/// Fixed name of the manifest file inside each module directory.
pub const MANIFEST_FILE_NAME: &str = "module.json";

/// File extensions accepted for a module's entry source file.
pub const SOURCE_EXTENSIONS: &[&str] = &["rs"];

/// Parsed, not yet validated manifest object.
pub type RawManifest = serde_json::Map<String, Value>;

const NAME_FIELD: &str = "name";
const ENTRY_FIELD: &str = "entry";

/// Validated description of a module.
///
/// # Example
///
/// ```
/// use kernel_modules::ModuleManifest;
///
/// let manifest = ModuleManifest::new("audit", "src/lib.rs")
///     .with_metadata("version", "1.2.0".into());
///
/// assert_eq!(manifest.name(), "audit");
/// assert_eq!(manifest.entry(), "src/lib.rs");
/// assert_eq!(
///     manifest.metadata().get("version"),
///     Some(&serde_json::Value::from("1.2.0"))
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleManifest {
    name: String,
    entry: String,
    #[serde(flatten)]
    metadata: RawManifest,
}

impl ModuleManifest {
    /// Creates a manifest with no extra metadata.
    #[must_use]
    pub fn new(name: impl Into<String>, entry: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entry: entry.into(),
            metadata: RawManifest::new(),
        }
    }

    /// Adds an optional metadata field.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Returns the module name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the entry path relative to the module directory.
    #[must_use]
    pub const fn entry(&self) -> &str {
        self.entry.as_str()
    }

    /// Returns the optional metadata fields.
    #[must_use]
    pub const fn metadata(&self) -> &RawManifest {
        &self.metadata
    }

    /// Resolves the entry against the module directory.
    #[must_use]
    pub fn entry_path(&self, module_dir: &Utf8Path) -> Utf8PathBuf {
        module_dir.join(&self.entry)
    }
}

/// Returns `true` when `entry` ends in one of [`SOURCE_EXTENSIONS`].
#[must_use]
pub fn has_source_extension(entry: &str) -> bool {
    Utf8Path::new(entry)
        .extension()
        .is_some_and(|extension| SOURCE_EXTENSIONS.contains(&extension))
}

/// Returns `true` when `entry` is a non-empty relative path made only of
/// plain components, so it resolves inside the module directory.
#[must_use]
pub fn is_contained_entry(entry: &str) -> bool {
    let path = Utf8Path::new(entry);
    path.components().next().is_some()
        && path
            .components()
            .all(|component| matches!(component, Utf8Component::Normal(_) | Utf8Component::CurDir))
}

/// Validates a raw manifest found in directory `directory` at `module_dir`.
///
/// Checks run in a fixed order and the first violation wins: `name` is a
/// string, `entry` is a string, `name` equals the directory name, `entry` is a
/// relative path that stays inside the module directory, `entry` has a
/// recognised source extension, and the entry file exists. The existence
/// check is the only filesystem access.
///
/// # Errors
///
/// Returns the first [`ValidationFailure`] encountered.
pub fn validate(
    directory: &str,
    module_dir: &Utf8Path,
    raw: &RawManifest,
) -> Result<ModuleManifest, ValidationFailure> {
    let name = string_field(raw, NAME_FIELD)?;
    let entry = string_field(raw, ENTRY_FIELD)?;

    if name != directory {
        return Err(ValidationFailure::NameMismatch {
            declared: name.to_owned(),
            directory: directory.to_owned(),
        });
    }
    if !is_contained_entry(entry) {
        return Err(ValidationFailure::EntryOutsideModule {
            entry: entry.to_owned(),
        });
    }
    if !has_source_extension(entry) {
        return Err(ValidationFailure::UnrecognisedEntry {
            entry: entry.to_owned(),
        });
    }

    let path = module_dir.join(entry);
    if !path.exists() {
        return Err(ValidationFailure::EntryNotFound { path });
    }

    let metadata = raw
        .iter()
        .filter(|(key, _)| key.as_str() != NAME_FIELD && key.as_str() != ENTRY_FIELD)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Ok(ModuleManifest {
        name: name.to_owned(),
        entry: entry.to_owned(),
        metadata,
    })
}

fn string_field<'a>(raw: &'a RawManifest, field: &'static str) -> Result<&'a str, ValidationFailure> {
    raw.get(field)
        .and_then(Value::as_str)
        .ok_or(ValidationFailure::MissingField { field })
}
