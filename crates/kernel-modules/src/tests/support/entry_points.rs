//! Entry point factories with observable initializers.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use serde_json::Value;

use crate::error::Cause;
use crate::loader::{EntryPoints, ModuleExports};

/// Shared log of initializer invocations in call order.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    /// Appends a module name to the log.
    pub fn record(&self, name: &str) {
        self.calls
            .lock()
            .expect("call log mutex poisoned")
            .push(name.to_owned());
    }

    /// Returns a copy of every recorded call.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("call log mutex poisoned").clone()
    }

    /// Returns how often `name` was initialised.
    #[must_use]
    pub fn count(&self, name: &str) -> usize {
        self.calls()
            .iter()
            .filter(|called| called.as_str() == name)
            .count()
    }
}

/// Registers a module whose `init` appends its name to `log`.
pub fn register_recording(entry_points: &mut EntryPoints, name: &str, log: &CallLog) {
    let module = name.to_owned();
    let shared_log = log.clone();
    entry_points
        .register(name, move || {
            let called = module.clone();
            let init_log = shared_log.clone();
            Ok(ModuleExports::with_init(move || {
                init_log.record(&called);
                Ok(())
            }))
        })
        .expect("register recording module");
}

/// Registers a module whose `init` blocks for `delay` before recording.
pub fn register_sleeping(
    entry_points: &mut EntryPoints,
    name: &str,
    delay: Duration,
    log: &CallLog,
) {
    let module = name.to_owned();
    let shared_log = log.clone();
    entry_points
        .register(name, move || {
            let called = module.clone();
            let init_log = shared_log.clone();
            Ok(ModuleExports::with_init(move || {
                thread::sleep(delay);
                init_log.record(&called);
                Ok(())
            }))
        })
        .expect("register sleeping module");
}

/// Registers a module whose `init` returns an error carrying `message`.
pub fn register_failing(entry_points: &mut EntryPoints, name: &str, message: &str) {
    let reason = message.to_owned();
    entry_points
        .register(name, move || {
            let error = std::io::Error::other(reason.clone());
            Ok(ModuleExports::with_init(move || Err(Arc::new(error) as Cause)))
        })
        .expect("register failing module");
}

/// Registers a module whose `init` panics with `message`.
pub fn register_panicking(entry_points: &mut EntryPoints, name: &str, message: &str) {
    let reason = message.to_owned();
    entry_points
        .register(name, move || {
            let payload = reason.clone();
            Ok(ModuleExports::with_init(move || -> Result<(), Cause> {
                panic!("{payload}")
            }))
        })
        .expect("register panicking module");
}

/// Registers a module that exports `init` as a plain value.
pub fn register_without_init(entry_points: &mut EntryPoints, name: &str) {
    entry_points
        .register(name, || {
            Ok(ModuleExports::new().with_value("init", Value::from("not callable")))
        })
        .expect("register module without init");
}
