//! Persistence backends.
//!
//! The loader only needs keyed upserts and point lookups, so a backend is
//! anything that can save an entity under its `id` and find it again.

mod memory;
mod neo4j;

pub use memory::MemoryStore;
pub use neo4j::Neo4jStore;

use crate::models::{Author, Book};
use anyhow::Result;
use std::future::Future;

/// Key-value persistence keyed by entity id. Saving an existing id overwrites it.
pub trait Store: Send + Sync {
    fn save_author(&self, author: &Author) -> impl Future<Output = Result<()>> + Send;

    fn save_book(&self, book: &Book) -> impl Future<Output = Result<()>> + Send;

    fn find_author(&self, id: &str) -> impl Future<Output = Result<Option<Author>>> + Send;

    fn find_book(&self, id: &str) -> impl Future<Output = Result<Option<Book>>> + Send;
}
