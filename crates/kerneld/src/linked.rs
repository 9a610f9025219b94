//! Modules compiled into the host binary.

use kernel_modules::{EntryPoints, ModuleExports};

const LINKED_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::linked");

/// Name of the built-in status module.
const STATUS_MODULE: &str = "status";

/// Builds the entry point table for every module linked into `kerneld`.
///
/// A module directory on disk is only loadable when its name appears here.
#[must_use]
pub fn linked_entry_points() -> EntryPoints {
    let mut entry_points = EntryPoints::new();
    if let Err(error) = entry_points.register(STATUS_MODULE, || Ok(status_exports())) {
        tracing::warn!(
            target: LINKED_TARGET,
            module = error.name(),
            error = %error,
            "skipping duplicate linked module"
        );
    }
    entry_points
}

fn status_exports() -> ModuleExports {
    ModuleExports::with_init(|| {
        tracing::info!(
            target: LINKED_TARGET,
            module = STATUS_MODULE,
            version = env!("CARGO_PKG_VERSION"),
            "kernel status module ready"
        );
        Ok(())
    })
    .with_value("version", env!("CARGO_PKG_VERSION").into())
}
