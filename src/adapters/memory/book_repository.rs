use crate::domain::{Book, BookFields, BookId};
use crate::ports::book_repository::{BookRepository, RepositoryError, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("in-memory book store lock poisoned")]
struct LockPoisoned;

#[derive(Debug, Default)]
struct Store {
    books: BTreeMap<BookId, Book>,
    last_id: i64,
}

/// In-memory implementation of BookRepository
///
/// Used when no database is configured and as a substitute store in tests.
/// Every operation runs under one lock, so readers never observe a
/// half-written book and ids are never reused.
#[derive(Debug, Default)]
pub struct InMemoryBookRepository {
    store: Mutex<Store>,
}

impl InMemoryBookRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Store>> {
        self.store
            .lock()
            .map_err(|_| RepositoryError::store(LockPoisoned))
    }
}

#[async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn list_all(&self) -> Result<Vec<Book>> {
        let store = self.lock()?;
        let mut books: Vec<Book> = store.books.values().cloned().collect();
        books.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(books)
    }

    async fn create(&self, fields: BookFields) -> Result<Book> {
        let mut store = self.lock()?;
        store.last_id += 1;
        let book = Book::from_fields(BookId::from_i64(store.last_id), fields);
        store.books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn get_by_id(&self, id: BookId) -> Result<Option<Book>> {
        Ok(self.lock()?.books.get(&id).cloned())
    }

    async fn update(&self, id: BookId, fields: BookFields) -> Result<Book> {
        let mut store = self.lock()?;
        let book = store
            .books
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound(id))?;
        *book = Book::from_fields(id, fields);
        Ok(book.clone())
    }

    async fn delete_by_id(&self, id: BookId) -> Result<()> {
        self.lock()?
            .books
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BookDraft, validate_book};

    fn fields(title: &str) -> BookFields {
        validate_book(&BookDraft {
            title: title.to_string(),
            author: "Herbert".to_string(),
            release_date: "1965-08-01".to_string(),
            page_count: "412".to_string(),
            publisher: "Chilton".to_string(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_list_all_empty_store() {
        let repo = InMemoryBookRepository::new();
        assert!(repo.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_all_sorted_by_title() {
        let repo = InMemoryBookRepository::new();
        repo.create(fields("Neuromancer")).await.unwrap();
        repo.create(fields("Dune")).await.unwrap();
        repo.create(fields("Hyperion")).await.unwrap();

        let titles: Vec<String> = repo
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();

        assert_eq!(titles, vec!["Dune", "Hyperion", "Neuromancer"]);
    }

    #[tokio::test]
    async fn test_create_assigns_unique_ids() {
        let repo = InMemoryBookRepository::new();
        let first = repo.create(fields("Dune")).await.unwrap();
        let second = repo.create(fields("Dune")).await.unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let repo = InMemoryBookRepository::new();
        let first = repo.create(fields("Dune")).await.unwrap();
        repo.delete_by_id(first.id).await.unwrap();
        let second = repo.create(fields("Dune")).await.unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_update_overwrites_all_fields() {
        let repo = InMemoryBookRepository::new();
        let book = repo.create(fields("Dune")).await.unwrap();

        let updated = repo.update(book.id, fields("Dune Messiah")).await.unwrap();

        assert_eq!(updated.id, book.id);
        assert_eq!(updated.title, "Dune Messiah");
        assert_eq!(repo.get_by_id(book.id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn test_update_missing_id_is_not_found() {
        let repo = InMemoryBookRepository::new();
        let result = repo.update(BookId::from_i64(99), fields("Dune")).await;
        assert!(matches!(result, Err(RepositoryError::NotFound(id)) if id.value() == 99));
    }

    #[tokio::test]
    async fn test_delete_missing_id_is_not_found() {
        let repo = InMemoryBookRepository::new();
        let result = repo.delete_by_id(BookId::from_i64(1)).await;
        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    }
}
