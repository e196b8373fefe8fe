//! Persisted state.
//!
//! Everything this crate saves travels as a [`ConfigNode`] tree: a named node
//! holding ordered `key = value` pairs and child nodes. The tree has a textual
//! form parsed by a pest grammar, read with [`parse_document`] and written
//! with [`write_document`].

mod api;
pub mod node;
pub mod store;
#[cfg(test)]
mod unit_tests;

pub use api::{parse_document, write_document, ConfigNodeParser, Rule};
pub use node::ConfigNode;
pub use store::{assign_new_id, FileStore, KeyValueStore, MemoryStore, SharedStore};
