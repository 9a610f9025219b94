//! Test double for [`HealthReporter`] that records structured events for assertions.
//!
//! The recorder captures bootstrap telemetry together with the per-module
//! outcomes forwarded by the pipeline.

use std::io;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use camino::Utf8Path;
use kernel_config::Config;
use kernel_modules::{ModuleError, ModuleManifest, RunState, SetupReport, SetupReporter};

use crate::bootstrap::BootstrapError;
use crate::health::HealthReporter;

/// Structured health events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    /// Bootstrap started.
    BootstrapStarting,
    /// Bootstrap completed with the given module counts.
    BootstrapSucceeded { initialised: usize, failed: usize },
    /// Bootstrap failed with an error description.
    BootstrapFailed(String),
    /// Module setup started.
    SetupStarting,
    /// A module finished initialisation.
    ModuleInitialised(String),
    /// A module failed at some stage.
    ModuleFailed(String),
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl SetupReporter for RecordingHealthReporter {
    fn setup_starting(&self, _root: &Utf8Path) {
        self.record(HealthEvent::SetupStarting);
    }

    fn setup_skipped(&self, _state: RunState) {}

    fn root_unavailable(&self, _root: &Utf8Path, _error: &io::Error) {}

    fn module_skipped(&self, _path: &Path, _reason: &str) {}

    fn entry_unreadable(&self, _root: &Utf8Path, _error: &io::Error) {}

    fn module_discovered(&self, _name: &str) {}

    fn module_validated(&self, _manifest: &ModuleManifest) {}

    fn module_loaded(&self, _manifest: &ModuleManifest) {}

    fn module_initialised(&self, name: &str, _elapsed: Duration) {
        self.record(HealthEvent::ModuleInitialised(name.to_owned()));
    }

    fn module_failed(&self, error: &ModuleError) {
        self.record(HealthEvent::ModuleFailed(error.module().to_owned()));
    }

    fn setup_completed(&self, _report: &SetupReport) {}
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config, report: &SetupReport) {
        self.record(HealthEvent::BootstrapSucceeded {
            initialised: report.initialised(),
            failed: report.failed(),
        });
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }
}
