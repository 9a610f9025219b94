//! Layered configuration for the kernel host.
//!
//! [`Config`] is resolved by `ortho_config` from, lowest precedence first,
//! built-in defaults, a TOML configuration file, `KERNEL_*` environment
//! variables, and command-line flags.
//!
//! ```text
//! kerneld --modules-dir /srv/kernel/modules --log-format compact
//! KERNEL_LOG_FILTER=kernel_modules=debug kerneld
//! ```

mod defaults;
mod logging;


use std::ffi::OsString;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_MODULES_DIR, default_log_filter, default_log_filter_string,
    default_log_format, default_modules_dir,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Host configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "KERNEL")]
pub struct Config {
    /// Directory whose immediate children are module directories.
    #[serde(default = "default_modules_dir")]
    pub modules_dir: Utf8PathBuf,
    /// `tracing` filter directive applied to the host's subscriber.
    #[serde(default = "default_log_filter_string")]
    pub log_filter: String,
    /// Output format of the host's log lines.
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            modules_dir: default_modules_dir(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Resolves the configuration from the process arguments, environment,
    /// and configuration files.
    ///
    /// # Errors
    ///
    /// Returns the `ortho_config` error when any layer fails to parse or merge.
    pub fn load() -> Result<Self, Arc<OrthoError>> {
        <Self as OrthoConfig>::load()
    }

    /// Resolves the configuration using `args` in place of the process
    /// arguments. The first item is the program name.
    ///
    /// # Errors
    ///
    /// Returns the `ortho_config` error when any layer fails to parse or merge.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, Arc<OrthoError>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as OrthoConfig>::load_from_iter(args)
    }

    /// Returns the modules root.
    #[must_use]
    pub fn modules_dir(&self) -> &Utf8Path {
        &self.modules_dir
    }

    /// Returns the log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Returns the log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}
