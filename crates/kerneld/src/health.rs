//! Structured health reporting for host lifecycle events.
//!
//! [`HealthReporter`] extends the pipeline's [`SetupReporter`] with bootstrap
//! events, so a single observer sees configuration, telemetry, and every
//! module outcome in order.

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use camino::Utf8Path;
use kernel_config::Config;
use kernel_modules::{
    ModuleError, ModuleManifest, RunState, SetupReport, SetupReporter, StructuredSetupReporter,
};

use crate::bootstrap::BootstrapError;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: SetupReporter {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after module setup completes.
    fn bootstrap_succeeded(&self, config: &Config, report: &SetupReport);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter + ?Sized,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config, report: &SetupReport) {
        (**self).bootstrap_succeeded(config, report);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter {
    setup: StructuredSetupReporter,
}

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            setup: StructuredSetupReporter::new(),
        }
    }
}

impl SetupReporter for StructuredHealthReporter {
    fn setup_starting(&self, root: &Utf8Path) {
        self.setup.setup_starting(root);
    }

    fn setup_skipped(&self, state: RunState) {
        self.setup.setup_skipped(state);
    }

    fn root_unavailable(&self, root: &Utf8Path, error: &io::Error) {
        self.setup.root_unavailable(root, error);
    }

    fn module_skipped(&self, path: &Path, reason: &str) {
        self.setup.module_skipped(path, reason);
    }

    fn entry_unreadable(&self, root: &Utf8Path, error: &io::Error) {
        self.setup.entry_unreadable(root, error);
    }

    fn module_discovered(&self, name: &str) {
        self.setup.module_discovered(name);
    }

    fn module_validated(&self, manifest: &ModuleManifest) {
        self.setup.module_validated(manifest);
    }

    fn module_loaded(&self, manifest: &ModuleManifest) {
        self.setup.module_loaded(manifest);
    }

    fn module_initialised(&self, name: &str, elapsed: Duration) {
        self.setup.module_initialised(name, elapsed);
    }

    fn module_failed(&self, error: &ModuleError) {
        self.setup.module_failed(error);
    }

    fn setup_completed(&self, report: &SetupReport) {
        self.setup.setup_completed(report);
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting kernel bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config, report: &SetupReport) {
        let summary = serde_json::to_string(report)
            .unwrap_or_else(|error| format!("report unavailable: {error}"));
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            modules_dir = %config.modules_dir(),
            log_filter = %config.log_filter(),
            log_format = %config.log_format(),
            failed = report.failed(),
            report = %summary,
            "kernel bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "kernel bootstrap failed"
        );
    }
}
