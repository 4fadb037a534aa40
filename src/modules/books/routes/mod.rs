//! HTTP handlers for the books catalogue.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use shelf_http::{AppError, AppResult, ErrorBody};
use utoipa_axum::{router::OpenApiRouter, routes};

use super::models::{Book, BookList, BookReference, InputBook, Pagination};
use super::repository::LimitReached;
use super::BooksState;

pub const BOOK_NOT_FOUND: &str = "Book not found";

impl From<LimitReached> for AppError {
    fn from(err: LimitReached) -> Self {
        AppError::forbidden(err.to_string())
    }
}

/// Documented routes for the books module
pub fn router(state: BooksState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_books, create_book))
        .routes(routes!(get_book, update_book, delete_book))
        .with_state(state)
}

fn not_found() -> AppError {
    AppError::not_found(BOOK_NOT_FOUND)
}

/// Get a list of books
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(Pagination),
    responses(
        (status = 200, description = "Window of the catalogue", body = BookList),
        (status = 400, description = "Malformed query string", body = ErrorBody)
    )
)]
pub async fn list_books(
    State(state): State<BooksState>,
    query: Result<Query<Pagination>, QueryRejection>,
) -> AppResult<Json<BookList>> {
    let Query(pagination) = query?;
    Ok(Json(state.service.list(pagination).await))
}

/// Get a book by id
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = String, Path, description = "Book id")),
    responses(
        (status = 200, description = "The book", body = Book),
        (status = 404, description = "No book with this id", body = ErrorBody)
    )
)]
pub async fn get_book(
    State(state): State<BooksState>,
    path: Result<Path<String>, PathRejection>,
) -> AppResult<Json<Book>> {
    let Path(id) = path?;
    state.service.get(&id).await.map(Json).ok_or_else(not_found)
}

/// Create a book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = InputBook,
    responses(
        (status = 201, description = "Book created", body = BookReference),
        (status = 403, description = "Book limit reached", body = ErrorBody),
        (status = 422, description = "Body does not describe a book", body = ErrorBody)
    )
)]
pub async fn create_book(
    State(state): State<BooksState>,
    payload: Result<Json<InputBook>, JsonRejection>,
) -> AppResult<(StatusCode, Json<BookReference>)> {
    let Json(input) = payload?;

    let book = state
        .service
        .add_within(input, state.limit)
        .await
        .inspect_err(|err| tracing::warn!(limit = err.limit, "book limit reached"))?;

    tracing::info!(book_id = %book.id, "book created");
    Ok((StatusCode::CREATED, Json(BookReference::from(&book))))
}

/// Update a book by id
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(("id" = String, Path, description = "Book id")),
    request_body = InputBook,
    responses(
        (status = 201, description = "Book replaced", body = BookReference),
        (status = 404, description = "No book with this id", body = ErrorBody),
        (status = 422, description = "Body does not describe a book", body = ErrorBody)
    )
)]
pub async fn update_book(
    State(state): State<BooksState>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<InputBook>, JsonRejection>,
) -> AppResult<(StatusCode, Json<BookReference>)> {
    let Path(id) = path?;
    let Json(input) = payload?;

    let book = state.service.modify(&id, input).await.ok_or_else(not_found)?;

    tracing::info!(book_id = %book.id, "book updated");
    Ok((StatusCode::CREATED, Json(BookReference::from(&book))))
}

/// Delete a book by id
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(("id" = String, Path, description = "Book id")),
    responses(
        (status = 201, description = "Book deleted", body = BookReference),
        (status = 404, description = "No book with this id", body = ErrorBody)
    )
)]
pub async fn delete_book(
    State(state): State<BooksState>,
    path: Result<Path<String>, PathRejection>,
) -> AppResult<(StatusCode, Json<BookReference>)> {
    let Path(id) = path?;
    let book = state.service.remove(&id).await.ok_or_else(not_found)?;

    tracing::info!(book_id = %book.id, "book deleted");
    Ok((StatusCode::CREATED, Json(BookReference::from(&book))))
}
