//! Host bootstrap orchestration.

use std::sync::Arc;

use ortho_config::OrthoError;
use thiserror::Error;

use kernel_config::Config;
use kernel_modules::{EntryPoints, LinkedLoader, ModuleSetup, SetupReport, SetupReporter};

use crate::health::HealthReporter;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the host configuration.
    ///
    /// # Errors
    ///
    /// Returns the loader's error when no valid configuration can be built.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader that returns a configuration resolved elsewhere.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps an already resolved configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
}

/// Result of a successful bootstrap invocation.
pub struct Kernel {
    config: Config,
    setup: ModuleSetup<LinkedLoader>,
    telemetry: TelemetryHandle,
}

impl Kernel {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Accessor for the module setup context.
    #[must_use]
    pub const fn setup(&self) -> &ModuleSetup<LinkedLoader> {
        &self.setup
    }

    /// Snapshot of the module setup outcome.
    #[must_use]
    pub fn report(&self) -> SetupReport {
        self.setup.report()
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub const fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }
}

/// Bootstraps the host using the supplied collaborators.
///
/// Loads configuration, installs telemetry, and runs module setup over the
/// modules directory using `entry_points` as the table of linked modules.
///
/// # Errors
///
/// Returns [`BootstrapError`] when configuration or telemetry cannot be
/// initialised. Module failures are recorded in the setup report instead.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    entry_points: EntryPoints,
) -> Result<Kernel, BootstrapError> {
    reporter.bootstrap_starting();

    let config = match loader.load() {
        Ok(config) => config,
        Err(source) => {
            let error = BootstrapError::Configuration { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let telemetry = match telemetry::initialise(&config) {
        Ok(handle) => handle,
        Err(source) => {
            let error = BootstrapError::Telemetry { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let setup_reporter: Arc<dyn SetupReporter> = reporter.clone();
    let setup = ModuleSetup::new(config.modules_dir(), LinkedLoader::new(entry_points))
        .with_reporter(setup_reporter);
    setup.setup();
    reporter.bootstrap_succeeded(&config, &setup.report());

    Ok(Kernel {
        config,
        setup,
        telemetry,
    })
}
