//! Core abstractions for tasklist: the task model, the derived view, and the
//! key-value storage contract every persistence backend implements.
//! This crate is intentionally small to keep dependency surface minimal.

pub mod storage;
pub mod tasks;
