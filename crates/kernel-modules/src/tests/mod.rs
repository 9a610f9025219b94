//! Test suites for the module pipeline.

pub(crate) mod support;
