//! Per-module status records and the diagnostics registry.
//!
//! A module has exactly one current [`ModuleStatus`]. The record is replaced
//! in place as the module advances, so its [`ModuleStatus::stage`] always
//! reflects the last stage attempted. The [`Diagnostics`] registry keeps these
//! records keyed by module name together with the load order log.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::error::ModuleError;
use crate::manifest::{ModuleManifest, RawManifest};

/// Pipeline stages in execution order.
///
/// Stages are ordered so that cumulative counts can ask whether a module got
/// at least as far as a given stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Directory listing and manifest parsing.
    Discovery,
    /// Manifest contract checks.
    Validation,
    /// Entry point resolution.
    Loading,
    /// Running the module's `init`.
    Initialisation,
}

impl Stage {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Discovery => "discovery",
            Self::Validation => "validation",
            Self::Loading => "loading",
            Self::Initialisation => "initialisation",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Error returned when parsing a stage name fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported stage: {0}")]
pub struct StageParseError(String);

impl FromStr for Stage {
    type Err = StageParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "discovery" => Ok(Self::Discovery),
            "validation" => Ok(Self::Validation),
            "loading" => Ok(Self::Loading),
            "initialisation" | "initialization" => Ok(Self::Initialisation),
            other => Err(StageParseError(other.to_owned())),
        }
    }
}

/// Current outcome for one module.
#[derive(Debug, Clone)]
pub enum ModuleStatus {
    /// The manifest parsed to a JSON object; not yet validated.
    Discovered {
        /// Parsed manifest object.
        raw: RawManifest,
    },
    /// The manifest satisfied the module contract.
    Validated {
        /// Validated manifest.
        manifest: Arc<ModuleManifest>,
    },
    /// The entry point resolved and exposes an `init`.
    Loaded {
        /// Validated manifest.
        manifest: Arc<ModuleManifest>,
    },
    /// The module's `init` completed.
    Initialised {
        /// Validated manifest.
        manifest: Arc<ModuleManifest>,
        /// Wall-clock time spent in `init`.
        elapsed: Duration,
    },
    /// The module stopped at the stage reported by the error.
    Failed {
        /// Failure recorded by the stage.
        error: ModuleError,
    },
}

impl ModuleStatus {
    /// Returns the last stage attempted for the module.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        match self {
            Self::Discovered { .. } => Stage::Discovery,
            Self::Validated { .. } => Stage::Validation,
            Self::Loaded { .. } => Stage::Loading,
            Self::Initialised { .. } => Stage::Initialisation,
            Self::Failed { error } => error.stage(),
        }
    }

    /// Returns `true` unless the record is a failure.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    /// Returns `true` when the module completed `stage` successfully.
    ///
    /// Success at a later stage implies success at every earlier one, and a
    /// failure at a stage implies success at every stage before it.
    #[must_use]
    pub fn reached(&self, stage: Stage) -> bool {
        if self.is_success() {
            self.stage() >= stage
        } else {
            self.stage() > stage
        }
    }

    /// Returns the validated manifest once the module has passed validation.
    #[must_use]
    pub const fn manifest(&self) -> Option<&Arc<ModuleManifest>> {
        match self {
            Self::Validated { manifest }
            | Self::Loaded { manifest }
            | Self::Initialised { manifest, .. } => Some(manifest),
            Self::Discovered { .. } | Self::Failed { .. } => None,
        }
    }

    /// Returns the recorded error for failed modules.
    #[must_use]
    pub const fn error(&self) -> Option<&ModuleError> {
        match self {
            Self::Failed { error } => Some(error),
            _ => None,
        }
    }

    /// Returns the initialisation time for initialised modules.
    #[must_use]
    pub const fn elapsed(&self) -> Option<Duration> {
        match self {
            Self::Initialised { elapsed, .. } => Some(*elapsed),
            _ => None,
        }
    }
}

/// Registry of module outcomes and the order in which modules initialised.
///
/// Records are keyed by module name and iterate in byte order, matching the
/// order in which the pipeline visits modules.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    modules: BTreeMap<String, ModuleStatus>,
    load_order: Vec<String>,
}

impl Diagnostics {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current record for `name`.
    ///
    /// Recording [`ModuleStatus::Initialised`] also appends the name to the
    /// load order log.
    pub fn record(&mut self, name: &str, status: ModuleStatus) {
        if matches!(status, ModuleStatus::Initialised { .. }) {
            self.load_order.push(name.to_owned());
        }
        self.modules.insert(name.to_owned(), status);
    }

    /// Looks up the current record for a module.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ModuleStatus> {
        self.modules.get(name)
    }

    /// Iterates over all records in module name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModuleStatus)> {
        self.modules
            .iter()
            .map(|(name, status)| (name.as_str(), status))
    }

    /// Returns the names of initialised modules in initialisation order.
    #[must_use]
    pub fn load_order(&self) -> &[String] {
        &self.load_order
    }

    /// Counts modules that completed `stage`, including those that went further.
    #[must_use]
    pub fn count_reached(&self, stage: Stage) -> usize {
        self.modules
            .values()
            .filter(|status| status.reached(stage))
            .count()
    }

    /// Returns the errors of all modules whose current record is a failure.
    #[must_use]
    pub fn failures(&self) -> Vec<&ModuleError> {
        self.modules.values().filter_map(ModuleStatus::error).collect()
    }

    /// Returns the manifests of initialised modules in load order.
    #[must_use]
    pub fn initialised_manifests(&self) -> Vec<Arc<ModuleManifest>> {
        self.load_order
            .iter()
            .filter_map(|name| self.modules.get(name))
            .filter(|status| matches!(status, ModuleStatus::Initialised { .. }))
            .filter_map(ModuleStatus::manifest)
            .cloned()
            .collect()
    }

    /// Returns the number of modules with a record.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns `true` when no module has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Drops every record and the load order log.
    pub fn clear(&mut self) {
        self.modules.clear();
        self.load_order.clear();
    }
}
