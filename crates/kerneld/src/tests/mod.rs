//! Test suites for the kernel host bootstrap.

mod support;
