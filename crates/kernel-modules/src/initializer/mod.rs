//! Runs a module's `init` routine once and times it.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{ModuleError, PanicError};
use crate::loader::InitFn;

/// Invokes `init` on the current thread and waits for it to finish.
///
/// The clock starts immediately before the call. A panic inside `init` is
/// caught and reported like a returned error, so one module cannot unwind
/// through the pipeline.
///
/// # Errors
///
/// Returns [`ModuleError::Initialisation`] when `init` returns an error or
/// panics.
pub fn initialise(module: &str, init: InitFn) -> Result<Duration, ModuleError> {
    let started = Instant::now();
    let outcome = panic::catch_unwind(AssertUnwindSafe(init));
    let elapsed = started.elapsed();

    match outcome {
        Ok(Ok(())) => Ok(elapsed),
        Ok(Err(source)) => Err(ModuleError::Initialisation {
            module: module.to_owned(),
            source,
        }),
        Err(payload) => Err(ModuleError::Initialisation {
            module: module.to_owned(),
            source: Arc::new(PanicError::from_payload(payload.as_ref())),
        }),
    }
}
