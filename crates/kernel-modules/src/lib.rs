//! Start-up bootstrap for kernel modules.
//!
//! The `kernel-modules` crate turns a directory tree into a set of running
//! subsystems. Each immediate child of the modules root is a candidate module
//! holding a `module.json` manifest. A single [`ModuleSetup::setup`] call runs
//! four stages over every candidate:
//!
//! 1. **Discovery** lists module directories in byte order and parses each
//!    manifest as a JSON object.
//! 2. **Validation** checks the manifest shape, that the declared name matches
//!    the directory, and that the entry source file exists inside the module
//!    directory.
//! 3. **Loading** resolves the module's entry point through a
//!    [`ModuleLoader`] and extracts its `init` export.
//! 4. **Initialisation** runs each `init` exactly once, sequentially, timing
//!    each call.
//!
//! A failure at any stage ends that module's progress only. Outcomes are kept
//! in the [`Diagnostics`] registry owned by the [`ModuleSetup`] context and are
//! surfaced through [`SetupReport`] and the point lookups on [`ModuleSetup`].
//!
//! # Example
//!
//! ```rust,no_run
//! use kernel_modules::{EntryPoints, LinkedLoader, ModuleExports, ModuleSetup};
//!
//! let mut entry_points = EntryPoints::new();
//! entry_points
//!     .register("audit", || Ok(ModuleExports::with_init(|| Ok(()))))
//!     .expect("audit registers once");
//!
//! let setup = ModuleSetup::new("modules", LinkedLoader::new(entry_points));
//! setup.setup();
//!
//! let report = setup.report();
//! assert_eq!(report.failed(), 0);
//! ```

pub mod diagnostics;
pub mod discovery;
pub mod error;
pub mod initializer;
pub mod loader;
pub mod manifest;
pub mod report;
pub mod reporter;
pub mod setup;

#[cfg(test)]
mod tests;

pub use self::diagnostics::{Diagnostics, ModuleStatus, Stage, StageParseError};
pub use self::error::{Cause, ModuleError, PanicError, ValidationFailure};
pub use self::loader::{
    DuplicateEntryPoint, EntryPoints, Export, InitFn, LinkedLoader, ModuleExports, ModuleLoader,
};
pub use self::manifest::{MANIFEST_FILE_NAME, ModuleManifest, RawManifest, SOURCE_EXTENSIONS};
pub use self::report::{ModuleEntry, SetupReport};
pub use self::reporter::{SetupReporter, StructuredSetupReporter};
pub use self::setup::{ModuleSetup, RunState};
