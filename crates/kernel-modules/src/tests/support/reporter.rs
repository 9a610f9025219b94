//! Test double for [`SetupReporter`] that records structured events.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use camino::Utf8Path;

use crate::diagnostics::Stage;
use crate::error::ModuleError;
use crate::manifest::ModuleManifest;
use crate::report::SetupReport;
use crate::reporter::SetupReporter;
use crate::setup::RunState;

/// Pipeline events tracked during tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupEvent {
    /// A run began.
    Starting,
    /// A call returned early.
    Skipped(RunState),
    /// The modules root could not be listed.
    RootUnavailable,
    /// A directory was skipped.
    ModuleSkipped(PathBuf),
    /// The root listing failed to yield an entry.
    EntryUnreadable,
    /// A manifest parsed.
    Discovered(String),
    /// A manifest validated.
    Validated(String),
    /// An entry point loaded.
    Loaded(String),
    /// An initializer completed.
    Initialised(String),
    /// A stage recorded a failure.
    Failed {
        /// Module name.
        module: String,
        /// Stage that failed.
        stage: Stage,
    },
    /// The run completed.
    Completed {
        /// Initialised module count.
        initialised: usize,
        /// Failed module count.
        failed: usize,
    },
}

/// Records pipeline events for assertions.
#[derive(Debug, Default)]
pub struct RecordingSetupReporter {
    events: Mutex<Vec<SetupEvent>>,
}

impl RecordingSetupReporter {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<SetupEvent> {
        self.events
            .lock()
            .expect("setup reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: SetupEvent) {
        self.events
            .lock()
            .expect("setup reporter mutex poisoned")
            .push(event);
    }
}

impl SetupReporter for RecordingSetupReporter {
    fn setup_starting(&self, _root: &Utf8Path) {
        self.record(SetupEvent::Starting);
    }

    fn setup_skipped(&self, state: RunState) {
        self.record(SetupEvent::Skipped(state));
    }

    fn root_unavailable(&self, _root: &Utf8Path, _error: &io::Error) {
        self.record(SetupEvent::RootUnavailable);
    }

    fn module_skipped(&self, path: &Path, _reason: &str) {
        self.record(SetupEvent::ModuleSkipped(path.to_path_buf()));
    }

    fn entry_unreadable(&self, _root: &Utf8Path, _error: &io::Error) {
        self.record(SetupEvent::EntryUnreadable);
    }

    fn module_discovered(&self, name: &str) {
        self.record(SetupEvent::Discovered(name.to_owned()));
    }

    fn module_validated(&self, manifest: &ModuleManifest) {
        self.record(SetupEvent::Validated(manifest.name().to_owned()));
    }

    fn module_loaded(&self, manifest: &ModuleManifest) {
        self.record(SetupEvent::Loaded(manifest.name().to_owned()));
    }

    fn module_initialised(&self, name: &str, _elapsed: Duration) {
        self.record(SetupEvent::Initialised(name.to_owned()));
    }

    fn module_failed(&self, error: &ModuleError) {
        self.record(SetupEvent::Failed {
            module: error.module().to_owned(),
            stage: error.stage(),
        });
    }

    fn setup_completed(&self, report: &SetupReport) {
        self.record(SetupEvent::Completed {
            initialised: report.initialised(),
            failed: report.failed(),
        });
    }
}
