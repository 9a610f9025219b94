//! Entry point resolution for validated modules.
//!
//! Modules are linked into the host binary. Each one registers a factory in an
//! [`EntryPoints`] table under its module name; evaluating the factory plays
//! the part of importing the module and yields its [`ModuleExports`]. The
//! [`LinkedLoader`] resolves a validated manifest through that table and
//! extracts the `init` export without calling it.
//!
//! The [`ModuleLoader`] trait is the seam between the pipeline and the loading
//! strategy, so tests and alternative hosts can supply their own.

use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use camino::Utf8Path;
use serde_json::Value;
use thiserror::Error;

use crate::error::{Cause, ModuleError, PanicError};
use crate::manifest::ModuleManifest;

/// Name of the export the loader extracts.
pub const INIT_EXPORT: &str = "init";

/// A module's initialisation routine.
///
/// The routine may block for as long as it needs; the pipeline waits for it
/// before moving on to the next module.
pub type InitFn = Box<dyn FnOnce() -> Result<(), Cause> + Send>;

/// Factory evaluated when a module is loaded.
pub type ModuleFactory = Arc<dyn Fn() -> Result<ModuleExports, Cause> + Send + Sync>;

/// A single named export of a module.
pub enum Export {
    /// An invocable initialisation routine.
    Init(InitFn),
    /// A plain value that cannot be invoked.
    Value(Value),
}

impl fmt::Debug for Export {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init(_) => formatter.write_str("Export::Init(..)"),
            Self::Value(value) => formatter.debug_tuple("Export::Value").field(value).finish(),
        }
    }
}

/// Named exports produced by evaluating a module's entry point.
///
/// # Example
///
/// ```
/// use kernel_modules::ModuleExports;
///
/// let exports = ModuleExports::with_init(|| Ok(()))
///     .with_value("version", "1.0.0".into());
/// assert!(exports.has_init());
/// ```
#[derive(Debug, Default)]
pub struct ModuleExports {
    exports: HashMap<String, Export>,
}

impl ModuleExports {
    /// Creates an empty export set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an export set holding only an `init` routine.
    #[must_use]
    pub fn with_init<F>(init: F) -> Self
    where
        F: FnOnce() -> Result<(), Cause> + Send + 'static,
    {
        Self::new().with_export(INIT_EXPORT, Export::Init(Box::new(init)))
    }

    /// Adds or replaces a named export.
    #[must_use]
    pub fn with_export(mut self, name: impl Into<String>, export: Export) -> Self {
        self.exports.insert(name.into(), export);
        self
    }

    /// Adds or replaces a plain value export.
    #[must_use]
    pub fn with_value(self, name: impl Into<String>, value: Value) -> Self {
        self.with_export(name, Export::Value(value))
    }

    /// Returns `true` when an invocable `init` is exported.
    #[must_use]
    pub fn has_init(&self) -> bool {
        matches!(self.exports.get(INIT_EXPORT), Some(Export::Init(_)))
    }

    /// Removes and returns the `init` routine when it is invocable.
    pub fn take_init(&mut self) -> Option<InitFn> {
        match self.exports.remove(INIT_EXPORT)? {
            Export::Init(init) => Some(init),
            Export::Value(_) => None,
        }
    }
}

/// Error returned when registering a second entry point under one name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("entry point for module '{name}' is already registered")]
pub struct DuplicateEntryPoint {
    name: String,
}

impl DuplicateEntryPoint {
    /// Returns the module name that was registered twice.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }
}

/// Registration table of module entry points linked into the host.
///
/// # Example
///
/// ```
/// use kernel_modules::{EntryPoints, ModuleExports};
///
/// let mut entry_points = EntryPoints::new();
/// entry_points
///     .register("audit", || Ok(ModuleExports::with_init(|| Ok(()))))
///     .expect("first registration succeeds");
/// assert!(entry_points.contains("audit"));
/// assert!(entry_points.register("audit", || Ok(ModuleExports::new())).is_err());
/// ```
#[derive(Clone, Default)]
pub struct EntryPoints {
    factories: HashMap<String, ModuleFactory>,
}

impl fmt::Debug for EntryPoints {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        formatter
            .debug_struct("EntryPoints")
            .field("modules", &names)
            .finish()
    }
}

impl EntryPoints {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the entry point for a module.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateEntryPoint`] when `name` already has an entry point.
    pub fn register<F>(
        &mut self,
        module: impl Into<String>,
        factory: F,
    ) -> Result<(), DuplicateEntryPoint>
    where
        F: Fn() -> Result<ModuleExports, Cause> + Send + Sync + 'static,
    {
        let name = module.into();
        if self.factories.contains_key(&name) {
            return Err(DuplicateEntryPoint { name });
        }
        self.factories.insert(name, Arc::new(factory));
        Ok(())
    }

    /// Looks up the factory registered for a module.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ModuleFactory> {
        self.factories.get(name)
    }

    /// Returns `true` when `name` has an entry point.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Returns the number of registered entry points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns `true` when no entry point is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

/// Strategy for turning a validated manifest into an `init` routine.
///
/// Implementations must not invoke the routine. Failures to resolve or
/// evaluate the module are reported as [`ModuleError::Load`]; a module that
/// evaluates but lacks an invocable `init` is reported as
/// [`ModuleError::MissingInit`].
pub trait ModuleLoader {
    /// Loads the module described by `manifest` from `module_dir`.
    ///
    /// # Errors
    ///
    /// Returns a load-stage [`ModuleError`] describing why no `init` routine
    /// could be produced.
    fn load(&self, module_dir: &Utf8Path, manifest: &ModuleManifest)
    -> Result<InitFn, ModuleError>;
}

/// Loader that resolves modules through a table of linked entry points.
#[derive(Debug, Clone, Default)]
pub struct LinkedLoader {
    entry_points: EntryPoints,
}

impl LinkedLoader {
    /// Creates a loader over the given entry points.
    #[must_use]
    pub const fn new(entry_points: EntryPoints) -> Self {
        Self { entry_points }
    }

    /// Returns the entry point table.
    #[must_use]
    pub const fn entry_points(&self) -> &EntryPoints {
        &self.entry_points
    }
}

impl ModuleLoader for LinkedLoader {
    fn load(
        &self,
        module_dir: &Utf8Path,
        manifest: &ModuleManifest,
    ) -> Result<InitFn, ModuleError> {
        let name = manifest.name();
        let factory = self
            .entry_points
            .get(name)
            .ok_or_else(|| ModuleError::Load {
                module: name.to_owned(),
                message: format!(
                    "entry '{}' is not linked into this host",
                    manifest.entry_path(module_dir)
                ),
                source: None,
            })?;

        let mut exports = evaluate(name, factory)?;
        exports.take_init().ok_or_else(|| ModuleError::MissingInit {
            module: name.to_owned(),
        })
    }
}

/// Evaluates a module factory, converting returned errors and panics into
/// load failures.
fn evaluate(name: &str, factory: &ModuleFactory) -> Result<ModuleExports, ModuleError> {
    match panic::catch_unwind(AssertUnwindSafe(|| factory())) {
        Ok(Ok(exports)) => Ok(exports),
        Ok(Err(source)) => Err(ModuleError::Load {
            module: name.to_owned(),
            message: String::from("entry point failed to evaluate"),
            source: Some(source),
        }),
        Err(payload) => Err(ModuleError::Load {
            module: name.to_owned(),
            message: String::from("entry point panicked during evaluation"),
            source: Some(Arc::new(PanicError::from_payload(payload.as_ref()))),
        }),
    }
}
