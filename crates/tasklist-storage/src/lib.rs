//! Concrete storage implementations for tasklist.
//! Values live as one file per key under a data directory, replaced atomically.

pub mod file_store;
