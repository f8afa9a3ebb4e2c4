use axum::{extract::State, response::Html};
use futures::try_join;
use library_dal::{
    author::AuthorRepository,
    book::BookRepository,
    book_instance::{BookInstanceRepository, BookStatus},
    genre::GenreRepository,
};

use crate::{
    error::ApiResult,
    state::AppState,
    views::{self, index::Counts},
};

pub async fn index(
    State(state): State<AppState>,
    books: BookRepository,
    copies: BookInstanceRepository,
    authors: AuthorRepository,
    genres: GenreRepository,
) -> ApiResult<Html<String>> {
    let (books, copies, copies_available, authors, genres) = try_join!(
        books.count(),
        copies.count(),
        copies.count_by_status(BookStatus::Available),
        authors.count(),
        genres.count()
    )?;
    let counts = Counts {
        books,
        copies,
        copies_available,
        authors,
        genres,
    };
    Ok(views::html(views::index::dashboard(state.menu(), &counts)))
}

#[cfg(test)]
mod tests {
    use crate::catalog::test_support::*;
    use futures::TryStreamExt as _;
    use http::StatusCode;
    use sqlx::Executor as _;

    #[tokio::test]
    async fn test_dashboard_counts() {
        let pool = test_pool().await;
        pool.execute_many(
            "INSERT INTO author (first_name, last_name) VALUES ('Karel', 'Capek');
            INSERT INTO genre (name) VALUES ('Drama');
            INSERT INTO book (title, author_id, summary, isbn) VALUES ('R.U.R.', 1, 'Robots', '1');
            INSERT INTO book_instance (book_id, imprint, status, due_back) VALUES (1, 'A', 'Available', '2020-01-01');
            INSERT INTO book_instance (book_id, imprint, status, due_back) VALUES (1, 'B', 'Loaned', '2020-01-01');",
        )
        .try_collect::<Vec<_>>()
        .await
        .unwrap();
        let app = app(pool);

        let response = get(&app, "/catalog").await;
        assert_eq!(StatusCode::OK, response.status());
        let body = body_text(response).await;
        assert!(body.contains("<strong>Books:</strong> 1"));
        assert!(body.contains("<strong>Copies:</strong> 2"));
        assert!(body.contains("<strong>Copies available:</strong> 1"));
        assert!(body.contains("<strong>Authors:</strong> 1"));
        assert!(body.contains("<strong>Genres:</strong> 1"));
    }
}
