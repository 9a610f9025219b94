//! On-disk module trees for pipeline tests.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use serde_json::json;
use tempfile::TempDir;

use crate::manifest::MANIFEST_FILE_NAME;

/// Default entry used by [`ModuleTree::add_module`].
pub const DEFAULT_ENTRY: &str = "src/lib.rs";

/// Temporary modules root populated by tests.
pub struct ModuleTree {
    dir: TempDir,
}

impl ModuleTree {
    /// Creates an empty modules root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create modules root"),
        }
    }

    /// Returns the modules root.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        Utf8Path::from_path(self.dir.path()).expect("temporary directory is valid UTF-8")
    }

    /// Returns the directory of module `name`.
    #[must_use]
    pub fn module_dir(&self, name: &str) -> Utf8PathBuf {
        self.root().join(name)
    }

    /// Adds a valid module whose manifest name matches its directory.
    pub fn add_module(&self, name: &str) -> Utf8PathBuf {
        let manifest = json!({ "name": name, "entry": DEFAULT_ENTRY });
        self.add_module_with_manifest(name, &manifest.to_string())
    }

    /// Adds a module directory with verbatim manifest text and the default
    /// entry file.
    pub fn add_module_with_manifest(&self, name: &str, manifest: &str) -> Utf8PathBuf {
        let dir = self.module_dir(name);
        fs::create_dir_all(&dir).expect("create module directory");
        fs::write(dir.join(MANIFEST_FILE_NAME), manifest).expect("write manifest");
        self.write_file(name, DEFAULT_ENTRY, "pub fn init() {}\n");
        dir
    }

    /// Adds a module directory without a manifest file.
    pub fn add_bare_directory(&self, name: &str) -> Utf8PathBuf {
        let dir = self.module_dir(name);
        fs::create_dir_all(&dir).expect("create module directory");
        dir
    }

    /// Writes a file relative to a module directory.
    pub fn write_file(&self, name: &str, relative: &str, contents: &str) {
        let path = self.module_dir(name).join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent directory");
        }
        fs::write(path, contents).expect("write module file");
    }

    /// Removes a file relative to a module directory.
    pub fn remove_file(&self, name: &str, relative: &str) {
        fs::remove_file(self.module_dir(name).join(relative)).expect("remove module file");
    }

    /// Writes a plain file directly under the modules root.
    pub fn write_root_file(&self, file_name: &str, contents: &str) {
        fs::write(self.root().join(file_name), contents).expect("write root file");
    }
}

impl Default for ModuleTree {
    fn default() -> Self {
        Self::new()
    }
}
