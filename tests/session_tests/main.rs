//! Session Tests
//!
//! Schema forwarding, single-record operations, lifecycle and configuration.

#[path = "../common/mod.rs"]
mod common;

mod record_tests;
mod lifecycle_tests;
