use crate::config::NOT_AVAILABLE;
use crate::stats::IngestStats;
use crate::store::Store;
use tracing::warn;

/// Looks up author display names in the store at work-ingestion time.
pub struct AuthorResolver<'a, S> {
    store: &'a S,
    stats: &'a IngestStats,
}

impl<'a, S: Store> AuthorResolver<'a, S> {
    pub fn new(store: &'a S, stats: &'a IngestStats) -> Self {
        Self { store, stats }
    }

    /// Name of the stored author, or `"NA"` when there is none. Never fails:
    /// a store read error is logged and treated as a miss.
    pub async fn resolve(&self, author_id: &str) -> String {
        match self.store.find_author(author_id).await {
            Ok(Some(author)) => author.name,
            Ok(None) => {
                self.stats.inc_unresolved();
                NOT_AVAILABLE.to_string()
            }
            Err(e) => {
                warn!(author_id, error = %e, "Author lookup failed");
                self.stats.inc_store_read_errors();
                self.stats.inc_unresolved();
                NOT_AVAILABLE.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Author, Book};
    use crate::store::MemoryStore;

    struct FailingStore;

    impl Store for FailingStore {
        async fn save_author(&self, _: &Author) -> anyhow::Result<()> {
            anyhow::bail!("read-only")
        }

        async fn save_book(&self, _: &Book) -> anyhow::Result<()> {
            anyhow::bail!("read-only")
        }

        async fn find_author(&self, _: &str) -> anyhow::Result<Option<Author>> {
            anyhow::bail!("connection reset")
        }

        async fn find_book(&self, _: &str) -> anyhow::Result<Option<Book>> {
            anyhow::bail!("connection reset")
        }
    }

    #[tokio::test]
    async fn resolves_stored_name() {
        let store = MemoryStore::new();
        store
            .save_author(&Author {
                id: "OL1A".into(),
                name: "Jane Doe".into(),
            })
            .await
            .unwrap();
        let stats = IngestStats::new();
        let resolver = AuthorResolver::new(&store, &stats);
        assert_eq!(resolver.resolve("OL1A").await, "Jane Doe");
        assert_eq!(stats.unresolved_authors(), 0);
    }

    #[tokio::test]
    async fn unknown_id_is_na() {
        let store = MemoryStore::new();
        let stats = IngestStats::new();
        let resolver = AuthorResolver::new(&store, &stats);
        assert_eq!(resolver.resolve("OL404A").await, "NA");
        assert_eq!(stats.unresolved_authors(), 1);
    }

    #[tokio::test]
    async fn stored_empty_name_is_not_na() {
        let store = MemoryStore::new();
        store
            .save_author(&Author {
                id: "OL2A".into(),
                name: String::new(),
            })
            .await
            .unwrap();
        let stats = IngestStats::new();
        let resolver = AuthorResolver::new(&store, &stats);
        assert_eq!(resolver.resolve("OL2A").await, "");
    }

    #[tokio::test]
    async fn store_failure_is_na() {
        let stats = IngestStats::new();
        let resolver = AuthorResolver::new(&FailingStore, &stats);
        assert_eq!(resolver.resolve("OL1A").await, "NA");
        assert_eq!(stats.store_read_errors(), 1);
        assert_eq!(stats.unresolved_authors(), 1);
    }
}
