//! Scenario world shared across bootstrap BDD steps.

use std::cell::RefCell;
use std::sync::Arc;

use crate::bootstrap::{BootstrapError, ConfigLoader, Kernel, bootstrap_with};
use crate::linked::linked_entry_points;

use super::config_loader::{FailingConfigLoader, TestConfigLoader};
use super::reporter::RecordingHealthReporter;

/// Scenario world shared across BDD steps.
pub struct TestWorld {
    modules: TestConfigLoader,
    use_failing_loader: bool,
    pub reporter: Arc<RecordingHealthReporter>,
    kernel: Option<Kernel>,
    bootstrap_error: Option<BootstrapError>,
}

impl TestWorld {
    /// Builds a world with a successful configuration loader.
    pub fn new() -> Self {
        Self {
            modules: TestConfigLoader::new(),
            use_failing_loader: false,
            reporter: Arc::new(RecordingHealthReporter::default()),
            kernel: None,
            bootstrap_error: None,
        }
    }

    /// Installs a loader that always fails.
    pub fn use_failing_loader(&mut self) {
        self.use_failing_loader = true;
        self.reset_results();
    }

    /// Installs a loader that succeeds.
    pub fn use_successful_loader(&mut self) {
        self.use_failing_loader = false;
        self.reset_results();
    }

    /// Writes a valid module into the modules directory.
    pub fn add_module(&self, name: &str) {
        self.modules.add_module(name);
    }

    /// Runs the bootstrap sequence once.
    pub fn bootstrap(&mut self) {
        if self.kernel.is_some() || self.bootstrap_error.is_some() {
            return;
        }

        let loader: &dyn ConfigLoader = if self.use_failing_loader {
            &FailingConfigLoader
        } else {
            &self.modules
        };
        match bootstrap_with(loader, self.reporter.clone(), linked_entry_points()) {
            Ok(kernel) => {
                self.kernel = Some(kernel);
            }
            Err(error) => {
                self.bootstrap_error = Some(error);
            }
        }
    }

    /// Returns whether bootstrap produced an error.
    pub fn bootstrap_error(&self) -> Option<&BootstrapError> {
        self.bootstrap_error.as_ref()
    }

    /// Returns the kernel handle when bootstrap succeeded.
    pub fn kernel(&self) -> Option<&Kernel> {
        self.kernel.as_ref()
    }

    fn reset_results(&mut self) {
        self.kernel = None;
        self.bootstrap_error = None;
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Default test world fixture.
pub fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::new())
}
