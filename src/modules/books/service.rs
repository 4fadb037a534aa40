use std::sync::Arc;

use super::models::{Book, BookList, InputBook, Pagination};
use super::repository::{BookRepository, LimitReached};

/// Facade the HTTP handlers talk to; storage stays behind the repository trait.
#[derive(Clone)]
pub struct BookService {
    repository: Arc<dyn BookRepository>,
}

impl BookService {
    pub fn new(repository: Arc<dyn BookRepository>) -> Self {
        Self { repository }
    }

    /// Get a page of books.
    pub async fn list(&self, pagination: Pagination) -> BookList {
        self.repository.list(pagination).await
    }

    /// Get a book by its id.
    pub async fn get(&self, id: &str) -> Option<Book> {
        self.repository.find_by_id(id).await
    }

    /// Create a new book.
    pub async fn add(&self, input: InputBook) -> Book {
        self.repository.create(input).await
    }

    /// Create a new book unless `limit` books already exist.
    pub async fn add_within(&self, input: InputBook, limit: usize) -> Result<Book, LimitReached> {
        self.repository.create_bounded(input, limit).await
    }

    /// Number of books in the catalogue.
    pub async fn count(&self) -> usize {
        self.repository.count().await
    }

    /// Replace a book by its id.
    pub async fn modify(&self, id: &str, input: InputBook) -> Option<Book> {
        self.repository.update(id, input).await
    }

    /// Remove a book by its id.
    pub async fn remove(&self, id: &str) -> Option<Book> {
        self.repository.delete(id).await
    }
}
