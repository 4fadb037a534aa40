use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{Book, BookList, InputBook, Pagination};

/// Creation refused because the catalogue already holds `limit` books.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Limit reached. You can only create up to {limit} books. Please delete one book to create a new one.")]
pub struct LimitReached {
    pub limit: usize,
}

/// Storage for books. Absent ids are reported as `None`, not as errors.
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Window of the catalogue in insertion order, with the full count
    async fn list(&self, pagination: Pagination) -> BookList;

    /// Number of stored books
    async fn count(&self) -> usize;

    async fn find_by_id(&self, id: &str) -> Option<Book>;

    /// Store a book under a freshly generated id, appending it to the end
    async fn create(&self, input: InputBook) -> Book;

    /// Like [`BookRepository::create`], refusing once `limit` books exist.
    /// The check and the insert are a single step.
    async fn create_bounded(&self, input: InputBook, limit: usize) -> Result<Book, LimitReached>;

    /// Replace every field but the id, keeping the book's position
    async fn update(&self, id: &str, input: InputBook) -> Option<Book>;

    /// Remove a book, returning what was removed
    async fn delete(&self, id: &str) -> Option<Book>;
}

/// Process-lifetime book storage backed by an ordered vector.
#[derive(Debug, Default)]
pub struct InMemoryBookRepository {
    books: RwLock<Vec<Book>>,
}

impl InMemoryBookRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn new_book(input: InputBook) -> Book {
        Book::from_input(Uuid::new_v4().to_string(), input)
    }
}

#[async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn list(&self, pagination: Pagination) -> BookList {
        let books = self.books.read().await;
        let window = pagination.window(books.len());

        BookList {
            books: books[window].to_vec(),
            total: books.len(),
            offset: pagination.offset,
            limit: pagination.limit,
        }
    }

    async fn count(&self) -> usize {
        self.books.read().await.len()
    }

    async fn find_by_id(&self, id: &str) -> Option<Book> {
        self.books
            .read()
            .await
            .iter()
            .find(|book| book.id == id)
            .cloned()
    }

    async fn create(&self, input: InputBook) -> Book {
        let book = Self::new_book(input);
        self.books.write().await.push(book.clone());
        book
    }

    async fn create_bounded(&self, input: InputBook, limit: usize) -> Result<Book, LimitReached> {
        let mut books = self.books.write().await;
        if books.len() >= limit {
            return Err(LimitReached { limit });
        }

        let book = Self::new_book(input);
        books.push(book.clone());
        Ok(book)
    }

    async fn update(&self, id: &str, input: InputBook) -> Option<Book> {
        let mut books = self.books.write().await;
        let slot = books.iter_mut().find(|book| book.id == id)?;

        *slot = Book::from_input(id, input);
        Some(slot.clone())
    }

    async fn delete(&self, id: &str) -> Option<Book> {
        let mut books = self.books.write().await;
        let index = books.iter().position(|book| book.id == id)?;

        // `remove` keeps the remaining books in insertion order
        Some(books.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn input(title: &str) -> InputBook {
        InputBook {
            title: title.to_string(),
            author: "Andy Hunt".to_string(),
            published_date: "1999-10-30".to_string(),
            genre: "Programming".to_string(),
        }
    }

    async fn seeded(n: usize) -> (InMemoryBookRepository, Vec<Book>) {
        let repository = InMemoryBookRepository::new();
        let mut created = Vec::new();
        for i in 0..n {
            created.push(repository.create(input(&format!("book {i}"))).await);
        }
        (repository, created)
    }

    #[tokio::test]
    async fn create_then_find_returns_input_fields() {
        let repository = InMemoryBookRepository::new();
        let book = repository.create(input("The Pragmatic Programmer")).await;

        let found = repository.find_by_id(&book.id).await.unwrap();
        assert_eq!(found, Book::from_input(book.id.clone(), input("The Pragmatic Programmer")));
        assert!(Uuid::parse_str(&found.id).is_ok());
    }

    #[tokio::test]
    async fn ids_are_unique() {
        let (_, created) = seeded(50).await;
        let ids: HashSet<_> = created.iter().map(|book| book.id.as_str()).collect();
        assert_eq!(ids.len(), 50);
    }

    #[tokio::test]
    async fn list_returns_window_in_insertion_order() {
        let (repository, created) = seeded(15).await;

        let list = repository
            .list(Pagination {
                offset: 5,
                limit: 4,
            })
            .await;

        assert_eq!(list.books, created[5..9].to_vec());
        assert_eq!(list.total, 15);
        assert_eq!((list.offset, list.limit), (5, 4));
    }

    #[tokio::test]
    async fn list_defaults_to_first_ten() {
        let (repository, created) = seeded(12).await;
        let list = repository.list(Pagination::default()).await;
        assert_eq!(list.books, created[..10].to_vec());
        assert_eq!((list.offset, list.limit), (0, 10));
    }

    #[tokio::test]
    async fn total_ignores_window() {
        let (repository, _) = seeded(7).await;
        for (offset, limit) in [(0, 1), (3, 10), (100, 5), (-2, 0)] {
            let list = repository.list(Pagination { offset, limit }).await;
            assert_eq!(list.total, 7);
        }
        let list = repository
            .list(Pagination {
                offset: 100,
                limit: 5,
            })
            .await;
        assert!(list.books.is_empty());
    }

    #[tokio::test]
    async fn update_replaces_fields_in_place() {
        let (repository, created) = seeded(3).await;
        let target = &created[1];

        let updated = repository
            .update(&target.id, input("Second Edition"))
            .await
            .unwrap();
        assert_eq!(updated.id, target.id);
        assert_eq!(updated.title, "Second Edition");

        let list = repository.list(Pagination::default()).await;
        assert_eq!(list.books[1], updated);
        assert_eq!(list.books[0], created[0]);
        assert_eq!(list.books[2], created[2]);
    }

    #[tokio::test]
    async fn update_unknown_id_is_none() {
        let (repository, _) = seeded(2).await;
        assert!(repository.update("missing", input("x")).await.is_none());
        assert_eq!(repository.count().await, 2);
    }

    #[tokio::test]
    async fn delete_removes_and_returns_book() {
        let (repository, created) = seeded(3).await;

        let removed = repository.delete(&created[0].id).await.unwrap();
        assert_eq!(removed, created[0]);
        assert_eq!(repository.count().await, 2);
        assert!(repository.find_by_id(&created[0].id).await.is_none());
        assert!(repository.delete(&created[0].id).await.is_none());

        let list = repository.list(Pagination::default()).await;
        assert_eq!(list.books, created[1..].to_vec());
    }

    #[tokio::test]
    async fn create_bounded_refuses_at_limit() {
        let (repository, created) = seeded(3).await;

        let err = repository.create_bounded(input("extra"), 3).await.unwrap_err();
        assert_eq!(err, LimitReached { limit: 3 });
        assert!(err.to_string().contains("Limit reached"));
        assert!(err.to_string().contains('3'));

        repository.delete(&created[0].id).await;
        assert!(repository.create_bounded(input("extra"), 3).await.is_ok());
        assert_eq!(repository.count().await, 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn create_bounded_never_overshoots_under_contention() {
        let repository = Arc::new(InMemoryBookRepository::new());

        let tasks: Vec<_> = (0..64)
            .map(|i| {
                let repository = repository.clone();
                tokio::spawn(async move {
                    repository
                        .create_bounded(input(&format!("racer {i}")), 10)
                        .await
                        .is_ok()
                })
            })
            .collect();

        let mut accepted = 0;
        for task in tasks {
            if task.await.unwrap() {
                accepted += 1;
            }
        }

        assert_eq!(accepted, 10);
        assert_eq!(repository.count().await, 10);
    }
}
