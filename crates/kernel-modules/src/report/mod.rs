//! Aggregated view over the diagnostics registry.
//!
//! A [`SetupReport`] is a snapshot: it copies the registry at the time it is
//! built and never changes afterwards. Stage counts are cumulative, so a
//! module that initialised also counts as validated and loaded. Every
//! directory found under the modules root counts as discovered, including
//! those whose manifest could not be parsed.

use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::diagnostics::{Diagnostics, ModuleStatus, Stage};
use crate::error::ModuleError;

/// One module's name and current record.
#[derive(Debug, Clone)]
pub struct ModuleEntry {
    name: String,
    status: ModuleStatus,
}

impl ModuleEntry {
    /// Returns the module name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the module's current record.
    #[must_use]
    pub const fn status(&self) -> &ModuleStatus {
        &self.status
    }
}

#[derive(Serialize)]
struct ModuleEntryView<'a> {
    name: &'a str,
    stage: Stage,
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    elapsed_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Serialize for ModuleEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ModuleEntryView {
            name: &self.name,
            stage: self.status.stage(),
            outcome: if self.status.is_success() {
                "succeeded"
            } else {
                "failed"
            },
            elapsed_ms: self.status.elapsed().map(millis),
            error: self.status.error().map(ToString::to_string),
        }
        .serialize(serializer)
    }
}

/// Snapshot of pipeline outcomes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SetupReport {
    discovered: usize,
    validated: usize,
    loaded: usize,
    initialised: usize,
    failed: usize,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    duration: Duration,
    modules: Vec<ModuleEntry>,
    #[serde(serialize_with = "serialize_errors")]
    errors: Vec<ModuleError>,
}

impl SetupReport {
    /// Builds a report from the registry and the total setup duration.
    #[must_use]
    pub fn from_diagnostics(diagnostics: &Diagnostics, duration: Duration) -> Self {
        let errors: Vec<ModuleError> = diagnostics.failures().into_iter().cloned().collect();
        Self {
            discovered: diagnostics.len(),
            validated: diagnostics.count_reached(Stage::Validation),
            loaded: diagnostics.count_reached(Stage::Loading),
            initialised: diagnostics.count_reached(Stage::Initialisation),
            failed: errors.len(),
            duration,
            modules: diagnostics
                .iter()
                .map(|(name, status)| ModuleEntry {
                    name: name.to_owned(),
                    status: status.clone(),
                })
                .collect(),
            errors,
        }
    }

    /// Returns the number of module directories found.
    #[must_use]
    pub const fn discovered(&self) -> usize {
        self.discovered
    }

    /// Returns the number of modules that passed validation.
    #[must_use]
    pub const fn validated(&self) -> usize {
        self.validated
    }

    /// Returns the number of modules whose entry point loaded.
    #[must_use]
    pub const fn loaded(&self) -> usize {
        self.loaded
    }

    /// Returns the number of modules whose `init` completed.
    #[must_use]
    pub const fn initialised(&self) -> usize {
        self.initialised
    }

    /// Returns the number of modules whose current record is a failure.
    #[must_use]
    pub const fn failed(&self) -> usize {
        self.failed
    }

    /// Returns the total setup duration.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Returns every module with its current record, in name order.
    #[must_use]
    pub fn modules(&self) -> &[ModuleEntry] {
        &self.modules
    }

    /// Returns the errors of all failed modules, in name order.
    #[must_use]
    pub fn errors(&self) -> &[ModuleError] {
        &self.errors
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(millis(*duration))
}

fn serialize_errors<S: Serializer>(
    errors: &[ModuleError],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(errors.iter().map(ToString::to_string))
}
