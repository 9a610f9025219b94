//! Test configuration loaders for scenarios covering success and failure paths.

use std::ffi::OsString;
use std::fs;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use kernel_config::Config;
use ortho_config::OrthoError;
use serde_json::json;
use tempfile::TempDir;

use crate::bootstrap::ConfigLoader;

/// Loader that points the modules directory at a temporary tree.
pub struct TestConfigLoader {
    modules_dir: TempDir,
}

impl TestConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        let modules_dir =
            TempDir::new().expect("failed to create temporary directory for modules");
        Self { modules_dir }
    }

    /// Returns the temporary modules directory.
    pub fn modules_dir(&self) -> &Utf8Path {
        Utf8Path::from_path(self.modules_dir.path())
            .expect("temporary modules path was not valid UTF-8")
    }

    /// Writes a valid module whose manifest matches its directory name.
    pub fn add_module(&self, name: &str) -> Utf8PathBuf {
        let dir = self.modules_dir().join(name);
        fs::create_dir_all(dir.join("src")).expect("create module directory");
        let manifest = json!({ "name": name, "entry": "src/lib.rs" });
        fs::write(dir.join("module.json"), manifest.to_string()).expect("write manifest");
        fs::write(dir.join("src/lib.rs"), "pub fn init() {}\n").expect("write entry file");
        dir
    }
}

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(Config {
            modules_dir: self.modules_dir().to_owned(),
            ..Config::default()
        })
    }
}

/// Loader that intentionally fails by passing invalid CLI arguments.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("kerneld"),
            OsString::from("--log-format"),
            OsString::from("bogus"),
        ];
        Config::load_from_iter(args)
    }
}
