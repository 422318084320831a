use super::Store;
use crate::models::{Author, Book};
use anyhow::Result;
use dashmap::DashMap;
use rustc_hash::FxBuildHasher;

/// In-process store, used for dry runs and tests.
#[derive(Default)]
pub struct MemoryStore {
    authors: DashMap<String, Author, FxBuildHasher>,
    books: DashMap<String, Book, FxBuildHasher>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn author_count(&self) -> usize {
        self.authors.len()
    }

    pub fn book_count(&self) -> usize {
        self.books.len()
    }
}

impl Store for MemoryStore {
    async fn save_author(&self, author: &Author) -> Result<()> {
        self.authors.insert(author.id.clone(), author.clone());
        Ok(())
    }

    async fn save_book(&self, book: &Book) -> Result<()> {
        self.books.insert(book.id.clone(), book.clone());
        Ok(())
    }

    async fn find_author(&self, id: &str) -> Result<Option<Author>> {
        Ok(self.authors.get(id).map(|entry| entry.value().clone()))
    }

    async fn find_book(&self, id: &str) -> Result<Option<Book>> {
        Ok(self.books.get(id).map(|entry| entry.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author(id: &str, name: &str) -> Author {
        Author {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn save_then_find() {
        let store = MemoryStore::new();
        store.save_author(&author("OL1A", "Jane Doe")).await.unwrap();
        let found = store.find_author("OL1A").await.unwrap();
        assert_eq!(found, Some(author("OL1A", "Jane Doe")));
        assert_eq!(store.find_author("OL2A").await.unwrap(), None);
    }

    #[tokio::test]
    async fn save_overwrites() {
        let store = MemoryStore::new();
        store.save_author(&author("OL1A", "Old")).await.unwrap();
        store.save_author(&author("OL1A", "New")).await.unwrap();
        assert_eq!(store.author_count(), 1);
        assert_eq!(store.find_author("OL1A").await.unwrap().unwrap().name, "New");
    }

    #[tokio::test]
    async fn books_are_separate_from_authors() {
        let store = MemoryStore::new();
        let book = Book {
            id: "OL1A".to_string(),
            ..Default::default()
        };
        store.save_book(&book).await.unwrap();
        assert_eq!(store.book_count(), 1);
        assert_eq!(store.author_count(), 0);
        assert!(store.find_author("OL1A").await.unwrap().is_none());
        assert_eq!(store.find_book("OL1A").await.unwrap(), Some(book));
    }
}
