//! Shared fixtures for pipeline tests.

mod entry_points;
mod reporter;
mod tree;

pub use entry_points::{
    CallLog, register_failing, register_panicking, register_recording, register_sleeping,
    register_without_init,
};
pub use reporter::{RecordingSetupReporter, SetupEvent};
pub use tree::{DEFAULT_ENTRY, ModuleTree};
