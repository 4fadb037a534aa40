use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// A book held in the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Unique identifier for the book, assigned on creation
    pub id: String,
    /// Title of the book
    pub title: String,
    /// Author of the book
    pub author: String,
    /// Publication date, stored verbatim
    pub published_date: String,
    /// Genre of the book
    pub genre: String,
}

impl Book {
    /// Combine an identifier with a full set of input fields.
    pub fn from_input(id: impl Into<String>, input: InputBook) -> Self {
        Self {
            id: id.into(),
            title: input.title,
            author: input.author,
            published_date: input.published_date,
            genre: input.genre,
        }
    }
}

/// Request model for creating or replacing a book. Every field is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InputBook {
    /// Title of the book
    pub title: String,
    /// Author of the book
    pub author: String,
    /// Publication date, stored verbatim
    pub published_date: String,
    /// Genre of the book
    pub genre: String,
}

/// Identifier of a book touched by a write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookReference {
    /// Unique identifier for the book
    pub id: String,
}

impl From<&Book> for BookReference {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id.clone(),
        }
    }
}

/// A window of the catalogue in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookList {
    /// Books inside the requested window
    pub books: Vec<Book>,
    /// Number of books in the whole catalogue
    pub total: usize,
    /// Offset the window starts at, as requested
    pub offset: i64,
    /// Maximum window size, as requested
    pub limit: i64,
}

/// Pagination parameters for listing books.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IntoParams)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub struct Pagination {
    /// Number of books to skip (default 0)
    pub offset: i64,
    /// Maximum number of books to return (default 10)
    pub limit: i64,
}

impl Pagination {
    pub const DEFAULT_OFFSET: i64 = 0;
    pub const DEFAULT_LIMIT: i64 = 10;

    /// Index range of the window within a collection of `len` items.
    ///
    /// Negative values count as zero; the range never exceeds `len`.
    pub fn window(&self, len: usize) -> std::ops::Range<usize> {
        let offset = usize::try_from(self.offset.max(0)).unwrap_or(usize::MAX);
        let limit = usize::try_from(self.limit.max(0)).unwrap_or(usize::MAX);

        let start = offset.min(len);
        let end = offset.saturating_add(limit).min(len);
        start..end.max(start)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: Self::DEFAULT_OFFSET,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}
