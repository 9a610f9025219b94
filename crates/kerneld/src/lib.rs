//! Host bootstrap for the kernel.
//!
//! `kerneld` wires the module pipeline from [`kernel_modules`] into a process:
//! it loads [`kernel_config::Config`], installs structured telemetry, builds a
//! [`kernel_modules::ModuleSetup`] over the entry points linked into the
//! binary, and runs setup exactly once. Module failures never abort the host;
//! they surface through the setup report and the health reporter. Only
//! configuration and telemetry failures are returned as [`BootstrapError`].

mod bootstrap;
mod health;
mod linked;
mod telemetry;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Kernel, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use linked::linked_entry_points;
pub use telemetry::{TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;
