pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;
pub mod index;

use axum::{
    extract::{FromRequestParts, Path},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use http::StatusCode;
use library_dal::{
    author::AuthorRepository, book::BookRepository, book_instance::BookInstanceRepository,
    genre::GenreRepository, integrity::IntegrityGuard,
};
use maud::Markup;

use crate::{error::ApiError, repository_from_request, state::AppState, views};

repository_from_request!(AuthorRepository);
repository_from_request!(BookRepository);
repository_from_request!(GenreRepository);
repository_from_request!(BookInstanceRepository);
repository_from_request!(IntegrityGuard);

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index::index))
        .route("/authors", get(author::list))
        .route(
            "/author/create",
            get(author::create_form).post(author::create),
        )
        .route("/author/{id}", get(author::detail))
        .route(
            "/author/{id}/delete",
            get(author::delete_form).post(author::delete),
        )
        .route(
            "/author/{id}/update",
            get(author::update_form).post(author::update),
        )
        .route("/books", get(book::list))
        .route("/book/create", get(book::create_form).post(book::create))
        .route("/book/{id}", get(book::detail))
        .route(
            "/book/{id}/delete",
            get(book::delete_form).post(book::delete),
        )
        .route(
            "/book/{id}/update",
            get(book::update_form).post(book::update),
        )
        .route("/genres", get(genre::list))
        .route("/genre/create", get(genre::create_form).post(genre::create))
        .route("/genre/{id}", get(genre::detail))
        .route(
            "/genre/{id}/delete",
            get(genre::delete_form).post(genre::delete),
        )
        .route(
            "/genre/{id}/update",
            get(genre::update_form).post(genre::update),
        )
        .route("/bookinstances", get(book_instance::list))
        .route(
            "/bookinstance/create",
            get(book_instance::create_form).post(book_instance::create),
        )
        .route("/bookinstance/{id}", get(book_instance::detail))
        .route(
            "/bookinstance/{id}/delete",
            get(book_instance::delete_form).post(book_instance::delete),
        )
        .route(
            "/bookinstance/{id}/update",
            get(book_instance::update_form).post(book_instance::update),
        )
}

/// Record id taken from the path, an id that is not a number cannot resolve
pub struct EntityId(pub i64);

impl<S> FromRequestParts<S> for EntityId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
        raw.parse::<i64>()
            .map(EntityId)
            .map_err(|_| ApiError::NotFound(format!("Record {raw} not found")))
    }
}

/// Form re-rendered with the user's input after a failed validation
fn invalid_form(markup: Markup) -> Response {
    (StatusCode::BAD_REQUEST, views::html(markup)).into_response()
}

/// Delete confirmation shown again, because dependents block the delete
fn blocked_delete(markup: Markup) -> Response {
    (StatusCode::CONFLICT, views::html(markup)).into_response()
}

fn redirect(url: &str) -> Response {
    Redirect::to(url).into_response()
}

/// Missing record becomes `None`, other errors are kept
fn optional<T>(result: library_dal::error::Result<T>) -> library_dal::error::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}
