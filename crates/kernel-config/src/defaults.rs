use camino::Utf8PathBuf;

use crate::logging::LogFormat;

/// Default modules root, relative to the working directory.
pub const DEFAULT_MODULES_DIR: &str = "modules";

/// Default log filter expression used by the host.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default modules root as an owned path.
#[must_use]
pub fn default_modules_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_MODULES_DIR)
}

/// Default log filter expression used by the host.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the host.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}
