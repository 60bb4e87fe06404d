//! File Tests
//!
//! Chunked file storage through a session on an in-memory node.

#[path = "../common/mod.rs"]
mod common;

mod delete_tests;
