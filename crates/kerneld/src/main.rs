//! `kerneld` binary: bootstraps every module linked into the host.

use std::sync::Arc;

use kerneld::{
    BootstrapError, StructuredHealthReporter, SystemConfigLoader, bootstrap_with,
    linked_entry_points,
};

fn main() -> Result<(), BootstrapError> {
    let reporter = Arc::new(StructuredHealthReporter::new());
    let kernel = bootstrap_with(&SystemConfigLoader, reporter, linked_entry_points())?;
    drop(kernel);
    Ok(())
}
