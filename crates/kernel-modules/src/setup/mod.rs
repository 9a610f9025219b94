//! The run-once setup orchestrator.
//!
//! [`ModuleSetup`] is the context object that owns the diagnostics registry,
//! the run state, and the loading strategy. [`ModuleSetup::setup`] moves the
//! run state from [`RunState::Idle`] to [`RunState::InProgress`] with a single
//! atomic exchange, so a second or concurrent call returns immediately without
//! touching any stage. Module failures are absorbed into the registry; the run
//! always finishes in [`RunState::Complete`].
//!
//! Initialisers run one after another on the calling thread in byte order of
//! module names. The registry lock is never held while module code runs, so an
//! initializer may query the setup handle it is being run by.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use camino::{Utf8Path, Utf8PathBuf};

use crate::diagnostics::{Diagnostics, ModuleStatus};
use crate::discovery::{self, SkippedEntry};
use crate::error::ModuleError;
use crate::initializer;
use crate::loader::{InitFn, ModuleLoader};
use crate::manifest::{self, ModuleManifest, RawManifest};
use crate::report::SetupReport;
use crate::reporter::{SetupReporter, StructuredSetupReporter};

/// Lifecycle of a [`ModuleSetup`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    /// No run has started.
    Idle,
    /// A run is executing.
    InProgress,
    /// A run has finished.
    Complete,
}

impl RunState {
    const fn as_u8(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::InProgress => 1,
            Self::Complete => 2,
        }
    }

    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::InProgress,
            _ => Self::Complete,
        }
    }

    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::InProgress => "in_progress",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

struct DiscoveredModule {
    name: String,
    directory: Utf8PathBuf,
    raw: RawManifest,
}

struct ValidatedModule {
    directory: Utf8PathBuf,
    manifest: Arc<ModuleManifest>,
}

struct LoadedModule {
    manifest: Arc<ModuleManifest>,
    init: InitFn,
}

/// Context object driving discovery, validation, loading, and initialisation.
///
/// # Example
///
/// ```
/// use kernel_modules::{LinkedLoader, ModuleSetup, RunState};
///
/// let dir = tempfile::tempdir().expect("temporary modules root");
/// let root = dir.path().to_str().expect("UTF-8 path");
/// let setup = ModuleSetup::new(root, LinkedLoader::default());
///
/// setup.setup();
/// setup.setup();
///
/// assert_eq!(setup.run_state(), RunState::Complete);
/// assert!(setup.load_order().is_empty());
/// assert_eq!(setup.report().failed(), 0);
/// ```
pub struct ModuleSetup<L> {
    root: Utf8PathBuf,
    loader: L,
    reporter: Arc<dyn SetupReporter>,
    state: AtomicU8,
    diagnostics: RwLock<Diagnostics>,
    duration: RwLock<Duration>,
}

impl<L: fmt::Debug> fmt::Debug for ModuleSetup<L> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ModuleSetup")
            .field("root", &self.root)
            .field("loader", &self.loader)
            .field("state", &self.run_state())
            .finish_non_exhaustive()
    }
}

impl<L> ModuleSetup<L> {
    /// Creates an idle setup over `root` that reports through `tracing`.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>, loader: L) -> Self {
        Self {
            root: root.into(),
            loader,
            reporter: Arc::new(StructuredSetupReporter::new()),
            state: AtomicU8::new(RunState::Idle.as_u8()),
            diagnostics: RwLock::new(Diagnostics::new()),
            duration: RwLock::new(Duration::ZERO),
        }
    }

    /// Replaces the lifecycle reporter.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn SetupReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Returns the modules root.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Returns the loading strategy.
    #[must_use]
    pub const fn loader(&self) -> &L {
        &self.loader
    }

    /// Returns the current run state.
    #[must_use]
    pub fn run_state(&self) -> RunState {
        RunState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Returns a snapshot of every module's outcome.
    #[must_use]
    pub fn report(&self) -> SetupReport {
        SetupReport::from_diagnostics(&self.read_diagnostics(), self.duration())
    }

    /// Returns the manifests of initialised modules, in load order.
    #[must_use]
    pub fn manifests(&self) -> Vec<Arc<ModuleManifest>> {
        self.read_diagnostics().initialised_manifests()
    }

    /// Returns the names of initialised modules, in load order.
    #[must_use]
    pub fn load_order(&self) -> Vec<String> {
        self.read_diagnostics().load_order().to_vec()
    }

    /// Returns `true` when `name` completed initialisation.
    #[must_use]
    pub fn is_module_set_up(&self, name: &str) -> bool {
        matches!(
            self.read_diagnostics().get(name),
            Some(ModuleStatus::Initialised { .. })
        )
    }

    /// Returns the current record for `name`, or `None` if it was never
    /// discovered.
    #[must_use]
    pub fn module_info(&self, name: &str) -> Option<ModuleStatus> {
        self.read_diagnostics().get(name).cloned()
    }

    /// Returns the total duration of the completed run, or zero before that.
    #[must_use]
    pub fn duration(&self) -> Duration {
        *self.duration.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clears all pipeline state so `setup` can run again.
    #[cfg(any(test, feature = "test-support"))]
    pub fn reset(&self) {
        self.write_diagnostics().clear();
        *self.duration.write().unwrap_or_else(PoisonError::into_inner) = Duration::ZERO;
        self.state.store(RunState::Idle.as_u8(), Ordering::Release);
    }

    fn read_diagnostics(&self) -> RwLockReadGuard<'_, Diagnostics> {
        self.diagnostics.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_diagnostics(&self) -> RwLockWriteGuard<'_, Diagnostics> {
        self.diagnostics
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, name: &str, status: ModuleStatus) {
        self.write_diagnostics().record(name, status);
    }

    fn record_failure(&self, error: ModuleError) {
        self.reporter.module_failed(&error);
        let name = error.module().to_owned();
        self.record(&name, ModuleStatus::Failed { error });
    }
}

impl<L: ModuleLoader> ModuleSetup<L> {
    /// Runs the pipeline once.
    ///
    /// Returns immediately when a run is already in progress or complete.
    /// Never fails: module errors are recorded and visible through
    /// [`ModuleSetup::report`].
    pub fn setup(&self) {
        if let Err(current) = self.state.compare_exchange(
            RunState::Idle.as_u8(),
            RunState::InProgress.as_u8(),
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            self.reporter.setup_skipped(RunState::from_u8(current));
            return;
        }

        self.reporter.setup_starting(&self.root);
        let started = Instant::now();

        let discovered = self.discover_modules();
        let validated = self.validate_modules(discovered);
        let loaded = self.load_modules(validated);
        self.initialise_modules(loaded);

        *self.duration.write().unwrap_or_else(PoisonError::into_inner) = started.elapsed();
        self.state
            .store(RunState::Complete.as_u8(), Ordering::Release);
        self.reporter.setup_completed(&self.report());
    }

    fn discover_modules(&self) -> Vec<DiscoveredModule> {
        let listing = match discovery::discover(&self.root) {
            Ok(listing) => listing,
            Err(error) => {
                self.reporter.root_unavailable(&self.root, &error);
                return Vec::new();
            }
        };

        let (candidates, skipped) = listing.into_parts();
        for entry in &skipped {
            match entry {
                SkippedEntry::NonUtf8Name(path) => self
                    .reporter
                    .module_skipped(path, "directory name is not valid UTF-8"),
                SkippedEntry::Unreadable(error) => {
                    self.reporter.entry_unreadable(&self.root, error);
                }
            }
        }

        let mut discovered = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let (name, directory, outcome) = candidate.into_parts();
            match outcome {
                Ok(raw) => {
                    self.record(&name, ModuleStatus::Discovered { raw: raw.clone() });
                    self.reporter.module_discovered(&name);
                    discovered.push(DiscoveredModule {
                        name,
                        directory,
                        raw,
                    });
                }
                Err(error) => self.record_failure(error),
            }
        }
        discovered
    }

    fn validate_modules(&self, discovered: Vec<DiscoveredModule>) -> Vec<ValidatedModule> {
        let mut validated = Vec::with_capacity(discovered.len());
        for module in discovered {
            match manifest::validate(&module.name, &module.directory, &module.raw) {
                Ok(valid) => {
                    let shared = Arc::new(valid);
                    self.record(
                        &module.name,
                        ModuleStatus::Validated {
                            manifest: Arc::clone(&shared),
                        },
                    );
                    self.reporter.module_validated(&shared);
                    validated.push(ValidatedModule {
                        directory: module.directory,
                        manifest: shared,
                    });
                }
                Err(reason) => self.record_failure(ModuleError::Validation {
                    module: module.name,
                    reason,
                }),
            }
        }
        validated
    }

    fn load_modules(&self, validated: Vec<ValidatedModule>) -> Vec<LoadedModule> {
        let mut loaded = Vec::with_capacity(validated.len());
        for module in validated {
            match self.loader.load(&module.directory, &module.manifest) {
                Ok(init) => {
                    self.record(
                        module.manifest.name(),
                        ModuleStatus::Loaded {
                            manifest: Arc::clone(&module.manifest),
                        },
                    );
                    self.reporter.module_loaded(&module.manifest);
                    loaded.push(LoadedModule {
                        manifest: module.manifest,
                        init,
                    });
                }
                Err(error) => self.record_failure(error),
            }
        }
        loaded
    }

    fn initialise_modules(&self, loaded: Vec<LoadedModule>) {
        for module in loaded {
            let name = module.manifest.name();
            match initializer::initialise(name, module.init) {
                Ok(elapsed) => {
                    self.record(
                        name,
                        ModuleStatus::Initialised {
                            manifest: Arc::clone(&module.manifest),
                            elapsed,
                        },
                    );
                    self.reporter.module_initialised(name, elapsed);
                }
                Err(error) => self.record_failure(error),
            }
        }
    }
}
