//! Structured reporting of pipeline lifecycle events.

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use camino::Utf8Path;

use crate::error::ModuleError;
use crate::manifest::ModuleManifest;
use crate::report::SetupReport;
use crate::setup::RunState;

/// Tracing target for pipeline events.
const SETUP_TARGET: &str = "kernel_modules::setup";

/// Observer notified as the pipeline progresses.
pub trait SetupReporter: Send + Sync {
    /// Invoked when a run begins.
    fn setup_starting(&self, root: &Utf8Path);

    /// Invoked when a call returns early because a run is in progress or done.
    fn setup_skipped(&self, state: RunState);

    /// Invoked when the modules root cannot be listed.
    fn root_unavailable(&self, root: &Utf8Path, error: &io::Error);

    /// Invoked for a directory that cannot be a module.
    fn module_skipped(&self, path: &Path, reason: &str);

    /// Invoked when the root listing fails to yield one entry.
    fn entry_unreadable(&self, root: &Utf8Path, error: &io::Error);

    /// Invoked after a manifest parses to a JSON object.
    fn module_discovered(&self, name: &str);

    /// Invoked after a manifest passes validation.
    fn module_validated(&self, manifest: &ModuleManifest);

    /// Invoked after a module's entry point loads.
    fn module_loaded(&self, manifest: &ModuleManifest);

    /// Invoked after a module's `init` completes.
    fn module_initialised(&self, name: &str, elapsed: Duration);

    /// Invoked whenever a stage records a failure.
    fn module_failed(&self, error: &ModuleError);

    /// Invoked once the run is complete.
    fn setup_completed(&self, report: &SetupReport);
}

impl<T> SetupReporter for Arc<T>
where
    T: SetupReporter + ?Sized,
{
    fn setup_starting(&self, root: &Utf8Path) {
        (**self).setup_starting(root);
    }

    fn setup_skipped(&self, state: RunState) {
        (**self).setup_skipped(state);
    }

    fn root_unavailable(&self, root: &Utf8Path, error: &io::Error) {
        (**self).root_unavailable(root, error);
    }

    fn module_skipped(&self, path: &Path, reason: &str) {
        (**self).module_skipped(path, reason);
    }

    fn entry_unreadable(&self, root: &Utf8Path, error: &io::Error) {
        (**self).entry_unreadable(root, error);
    }

    fn module_discovered(&self, name: &str) {
        (**self).module_discovered(name);
    }

    fn module_validated(&self, manifest: &ModuleManifest) {
        (**self).module_validated(manifest);
    }

    fn module_loaded(&self, manifest: &ModuleManifest) {
        (**self).module_loaded(manifest);
    }

    fn module_initialised(&self, name: &str, elapsed: Duration) {
        (**self).module_initialised(name, elapsed);
    }

    fn module_failed(&self, error: &ModuleError) {
        (**self).module_failed(error);
    }

    fn setup_completed(&self, report: &SetupReport) {
        (**self).setup_completed(report);
    }
}

/// Default reporter that records pipeline events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredSetupReporter;

impl StructuredSetupReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

impl SetupReporter for StructuredSetupReporter {
    fn setup_starting(&self, root: &Utf8Path) {
        tracing::info!(
            target: SETUP_TARGET,
            event = "setup_starting",
            root = %root,
            "starting module setup"
        );
    }

    fn setup_skipped(&self, state: RunState) {
        tracing::debug!(
            target: SETUP_TARGET,
            event = "setup_skipped",
            state = %state,
            "module setup already ran; ignoring call"
        );
    }

    fn root_unavailable(&self, root: &Utf8Path, error: &io::Error) {
        tracing::warn!(
            target: SETUP_TARGET,
            event = "root_unavailable",
            root = %root,
            error = %error,
            "modules root cannot be listed; no modules will be set up"
        );
    }

    fn module_skipped(&self, path: &Path, reason: &str) {
        tracing::warn!(
            target: SETUP_TARGET,
            event = "module_skipped",
            path = %path.display(),
            reason,
            "skipping module directory"
        );
    }

    fn entry_unreadable(&self, root: &Utf8Path, error: &io::Error) {
        tracing::warn!(
            target: SETUP_TARGET,
            event = "entry_unreadable",
            root = %root,
            error = %error,
            "skipping unreadable entry under modules root"
        );
    }

    fn module_discovered(&self, name: &str) {
        tracing::debug!(
            target: SETUP_TARGET,
            event = "module_discovered",
            module = name,
            "module manifest parsed"
        );
    }

    fn module_validated(&self, manifest: &ModuleManifest) {
        tracing::debug!(
            target: SETUP_TARGET,
            event = "module_validated",
            module = manifest.name(),
            entry = manifest.entry(),
            "module manifest validated"
        );
    }

    fn module_loaded(&self, manifest: &ModuleManifest) {
        tracing::debug!(
            target: SETUP_TARGET,
            event = "module_loaded",
            module = manifest.name(),
            "module entry point loaded"
        );
    }

    fn module_initialised(&self, name: &str, elapsed: Duration) {
        tracing::info!(
            target: SETUP_TARGET,
            event = "module_initialised",
            module = name,
            elapsed_ms = millis(elapsed),
            "module initialised"
        );
    }

    fn module_failed(&self, error: &ModuleError) {
        tracing::error!(
            target: SETUP_TARGET,
            event = "module_failed",
            module = error.module(),
            stage = %error.stage(),
            error = %error,
            "module setup failed"
        );
    }

    fn setup_completed(&self, report: &SetupReport) {
        tracing::info!(
            target: SETUP_TARGET,
            event = "setup_completed",
            discovered = report.discovered(),
            validated = report.validated(),
            loaded = report.loaded(),
            initialised = report.initialised(),
            failed = report.failed(),
            duration_ms = millis(report.duration()),
            "module setup completed"
        );
    }
}
