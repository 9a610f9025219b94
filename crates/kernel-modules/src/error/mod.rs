//! Domain errors recorded by the module pipeline.
//!
//! Errors are never raised out of [`crate::ModuleSetup::setup`]. Each stage
//! stores them in the diagnostics registry against the owning module, so every
//! variant carries the module name and answers [`ModuleError::stage`].
//! Underlying causes are shared through [`Cause`] so records stay cheap to
//! clone into reports.

use std::any::Any;
use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::diagnostics::Stage;

/// Shared, thread-safe underlying error attached to a module failure.
pub type Cause = Arc<dyn std::error::Error + Send + Sync>;

/// Reasons a manifest fails validation, in check order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    /// A required field is absent or not a string.
    #[error("missing field: {field}")]
    MissingField {
        /// Name of the required field.
        field: &'static str,
    },

    /// The declared name differs from the containing directory.
    #[error("name mismatch: manifest declares '{declared}' in directory '{directory}'")]
    NameMismatch {
        /// Name declared in the manifest.
        declared: String,
        /// Name of the directory holding the manifest.
        directory: String,
    },

    /// The entry is absolute or climbs out of the module directory.
    #[error("entry must be a path inside the module directory, got '{entry}'")]
    EntryOutsideModule {
        /// Entry value as declared.
        entry: String,
    },

    /// The entry does not end in a recognised source extension.
    #[error("entry must be a recognised source file, got '{entry}'")]
    UnrecognisedEntry {
        /// Entry value as declared.
        entry: String,
    },

    /// The entry file is absent from the module directory.
    #[error("entry not found: {path}")]
    EntryNotFound {
        /// Resolved path that was probed.
        path: Utf8PathBuf,
    },
}

/// Errors recorded against a module by the pipeline stage that produced them.
#[derive(Debug, Clone, Error)]
pub enum ModuleError {
    /// The manifest could not be read, parsed, or was not a JSON object.
    #[error("module '{module}' failed discovery: {message}")]
    Discovery {
        /// Directory name of the module.
        module: String,
        /// Human-readable failure description.
        message: String,
        /// Optional underlying I/O or parse error.
        #[source]
        source: Option<Cause>,
    },

    /// The manifest was parsed but does not satisfy the module contract.
    #[error("module '{module}' failed validation: {reason}")]
    Validation {
        /// Directory name of the module.
        module: String,
        /// First contract violation found.
        #[source]
        reason: ValidationFailure,
    },

    /// The entry point could not be resolved or evaluated.
    #[error("module '{module}' failed to load: {message}")]
    Load {
        /// Module name.
        module: String,
        /// Human-readable failure description.
        message: String,
        /// Optional error raised while evaluating the entry point.
        #[source]
        source: Option<Cause>,
    },

    /// The entry point loaded but exports no invocable `init`.
    #[error("module '{module}' does not export an invocable init")]
    MissingInit {
        /// Module name.
        module: String,
    },

    /// The module's `init` returned an error or panicked.
    #[error("module '{module}' failed to initialise: {source}")]
    Initialisation {
        /// Module name.
        module: String,
        /// Failure raised by the initializer.
        #[source]
        source: Cause,
    },
}

impl ModuleError {
    /// Returns the name of the module the error belongs to.
    #[must_use]
    pub fn module(&self) -> &str {
        match self {
            Self::Discovery { module, .. }
            | Self::Validation { module, .. }
            | Self::Load { module, .. }
            | Self::MissingInit { module }
            | Self::Initialisation { module, .. } => module.as_str(),
        }
    }

    /// Returns the pipeline stage at which the error occurred.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        match self {
            Self::Discovery { .. } => Stage::Discovery,
            Self::Validation { .. } => Stage::Validation,
            Self::Load { .. } | Self::MissingInit { .. } => Stage::Loading,
            Self::Initialisation { .. } => Stage::Initialisation,
        }
    }

    /// Returns the validation reason when the error is a validation failure.
    #[must_use]
    pub const fn validation_failure(&self) -> Option<&ValidationFailure> {
        match self {
            Self::Validation { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// Cause recorded when a module's code panics instead of returning an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("panicked: {message}")]
pub struct PanicError {
    message: String,
}

impl PanicError {
    /// Builds an error from a payload captured by `catch_unwind`.
    #[must_use]
    pub fn from_payload(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(text) = payload.downcast_ref::<&str>() {
            (*text).to_owned()
        } else if let Some(text) = payload.downcast_ref::<String>() {
            text.clone()
        } else {
            String::from("non-string panic payload")
        };
        Self { message }
    }

    /// Returns the panic message.
    #[must_use]
    pub const fn message(&self) -> &str {
        self.message.as_str()
    }
}
