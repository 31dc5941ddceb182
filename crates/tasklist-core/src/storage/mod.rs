//! Storage contracts: the raw string key-value store and the typed JSON
//! adapter layered on top of it.

mod json;
mod kv_store;

pub use json::JsonStore;
pub use kv_store::{InMemoryKeyValueStore, KeyValueStore, StorageError};
