use std::sync::LazyLock;

use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
};
use futures::try_join;
use library_dal::{
    author::AuthorRepository,
    book::{Book, BookRepository, CreateBook},
    book_instance::BookInstanceRepository,
    genre::GenreRepository,
};

use super::{EntityId, invalid_form, optional, redirect};
use crate::{
    error::ApiResult,
    form::{
        sanitize::unescape_html, validate, Checked, FieldError, FieldSpec, FieldValue, FormInput,
        FormModel, Rule, Schema, ValidationFailed,
    },
    state::AppState,
    views,
};

const LIST_URL: &str = "/catalog/books";

static BOOK_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new(vec![
        FieldSpec::one("title")
            .trim()
            .rule(Rule::MinChars(1), "Title must not be empty")
            .rule(Rule::MaxChars(255), "Title must be at most 255 characters long"),
        FieldSpec::one("author")
            .trim()
            .keep()
            .rule(Rule::Reference, "Author must not be empty"),
        FieldSpec::one("summary")
            .trim()
            .rule(Rule::MinChars(2), "Summary must contain at least two characters")
            .rule(Rule::MaxChars(5000), "Summary must be at most 5000 characters long"),
        FieldSpec::one("isbn")
            .trim()
            .rule(Rule::MinChars(2), "ISBN must contain at least two characters")
            .rule(Rule::MaxChars(32), "ISBN must be at most 32 characters long"),
        FieldSpec::many("genre")
            .trim()
            .keep()
            .rule(Rule::Reference, "Invalid genre"),
    ])
});

impl FormModel for CreateBook {
    fn schema() -> &'static Schema {
        &BOOK_SCHEMA
    }

    fn build(checked: &Checked) -> Self {
        CreateBook {
            title: checked.text_or_empty("title"),
            author_id: checked.id("author").unwrap_or_default(),
            summary: checked.text_or_empty("summary"),
            isbn: checked.text_or_empty("isbn"),
            genres: checked.ids("genre"),
        }
    }

    fn form_field(path: &str) -> String {
        if path.starts_with("author_id") {
            "author".to_string()
        } else if path.starts_with("genres") {
            "genre".to_string()
        } else {
            path.to_string()
        }
    }
}

impl From<&Book> for FormInput {
    fn from(book: &Book) -> Self {
        let mut input = FormInput::default();
        input.set("title", FieldValue::Single(unescape_html(&book.title)));
        input.set("author", FieldValue::Single(book.author_id.to_string()));
        input.set("summary", FieldValue::Single(unescape_html(&book.summary)));
        input.set("isbn", FieldValue::Single(unescape_html(&book.isbn)));
        input.set(
            "genre",
            FieldValue::Many(book.genres.iter().map(|id| id.to_string()).collect()),
        );
        input
    }
}

/// Author and genres of the candidate must exist at the time of saving
async fn check_references(
    payload: CreateBook,
    authors: &AuthorRepository,
    genres: &GenreRepository,
) -> ApiResult<Result<CreateBook, ValidationFailed>> {
    let mut errors = Vec::new();
    if optional(authors.get(payload.author_id).await)?.is_none() {
        errors.push(FieldError::new("author", "Selected author does not exist"));
    }
    for genre_id in &payload.genres {
        if optional(genres.get(*genre_id).await)?.is_none() {
            errors.push(FieldError::new(
                "genre",
                format!("Selected genre {genre_id} does not exist"),
            ));
        }
    }
    if errors.is_empty() {
        Ok(Ok(payload))
    } else {
        Ok(Err(ValidationFailed { errors }))
    }
}

async fn checked_book(
    input: &FormInput,
    authors: &AuthorRepository,
    genres: &GenreRepository,
) -> ApiResult<Result<CreateBook, ValidationFailed>> {
    match validate::<CreateBook>(input) {
        Ok(payload) => check_references(payload, authors, genres).await,
        Err(failed) => Ok(Err(failed)),
    }
}

pub async fn list(
    State(state): State<AppState>,
    repository: BookRepository,
) -> ApiResult<Html<String>> {
    let books = repository.list().await?;
    Ok(views::html(views::book::list(state.menu(), &books)))
}

pub async fn detail(
    EntityId(id): EntityId,
    State(state): State<AppState>,
    repository: BookRepository,
    authors: AuthorRepository,
    genres: GenreRepository,
    copies: BookInstanceRepository,
) -> ApiResult<Html<String>> {
    let book = repository.get(id).await?;
    let (author, genres, copies) = try_join!(
        async { optional(authors.get(book.author_id).await) },
        genres.list_for_book(id),
        copies.list_for_book(id)
    )?;
    Ok(views::html(views::book::detail(
        state.menu(),
        &book,
        author.as_ref(),
        &genres,
        &copies,
    )))
}

pub async fn create_form(
    State(state): State<AppState>,
    authors: AuthorRepository,
    genres: GenreRepository,
) -> ApiResult<Html<String>> {
    let (authors, genres) = try_join!(authors.list(), genres.list())?;
    Ok(views::html(views::book::form(
        state.menu(),
        "Create Book",
        &FormInput::default(),
        &authors,
        &genres,
        &[],
    )))
}

pub async fn create(
    State(state): State<AppState>,
    repository: BookRepository,
    authors: AuthorRepository,
    genres: GenreRepository,
    input: FormInput,
) -> ApiResult<Response> {
    match checked_book(&input, &authors, &genres).await? {
        Ok(payload) => {
            let book = repository.create(payload).await?;
            Ok(redirect(&book.url()))
        }
        Err(failed) => {
            let (authors, genres) = try_join!(authors.list(), genres.list())?;
            Ok(invalid_form(views::book::form(
                state.menu(),
                "Create Book",
                &input,
                &authors,
                &genres,
                &failed.errors,
            )))
        }
    }
}

pub async fn delete_form(
    EntityId(id): EntityId,
    State(state): State<AppState>,
    repository: BookRepository,
    copies: BookInstanceRepository,
) -> ApiResult<Response> {
    let (book, copies) = try_join!(
        async { optional(repository.get(id).await) },
        copies.list_for_book(id)
    )?;
    match book {
        Some(book) => {
            Ok(views::html(views::book::delete(state.menu(), &book, &copies)).into_response())
        }
        None => Ok(redirect(LIST_URL)),
    }
}

pub async fn delete(EntityId(id): EntityId, repository: BookRepository) -> ApiResult<Response> {
    optional(repository.delete(id).await)?;
    Ok(redirect(LIST_URL))
}

pub async fn update_form(
    EntityId(id): EntityId,
    State(state): State<AppState>,
    repository: BookRepository,
    authors: AuthorRepository,
    genres: GenreRepository,
) -> ApiResult<Html<String>> {
    let (book, authors, genres) = try_join!(repository.get(id), authors.list(), genres.list())?;
    Ok(views::html(views::book::form(
        state.menu(),
        "Update Book",
        &FormInput::from(&book),
        &authors,
        &genres,
        &[],
    )))
}

pub async fn update(
    EntityId(id): EntityId,
    State(state): State<AppState>,
    repository: BookRepository,
    authors: AuthorRepository,
    genres: GenreRepository,
    input: FormInput,
) -> ApiResult<Response> {
    match checked_book(&input, &authors, &genres).await? {
        Ok(payload) => {
            let book = repository.update(id, payload).await?;
            Ok(redirect(&book.url()))
        }
        Err(failed) => {
            let (authors, genres) = try_join!(authors.list(), genres.list())?;
            Ok(invalid_form(views::book::form(
                state.menu(),
                "Update Book",
                &input,
                &authors,
                &genres,
                &failed.errors,
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_support::*;
    use http::StatusCode;
    use library_dal::{
        author::{Author, CreateAuthor},
        book_instance::{BookInstanceRepositoryImpl, BookStatus, CreateBookInstance},
        genre::{CreateGenre, Genre},
        Pool,
    };
    use time::macros::date;
    use tracing_test::traced_test;

    async fn seed(pool: &Pool) -> (Author, Genre, Genre) {
        let author = AuthorRepository::new(pool.clone())
            .create(CreateAuthor {
                first_name: "Karel".to_string(),
                last_name: "Capek".to_string(),
                date_of_birth: None,
                date_of_death: None,
            })
            .await
            .unwrap();
        let genres = GenreRepository::new(pool.clone());
        let drama = genres
            .create(CreateGenre {
                name: "Drama".to_string(),
            })
            .await
            .unwrap();
        let scifi = genres
            .create(CreateGenre {
                name: "Sci-Fi".to_string(),
            })
            .await
            .unwrap();
        (author, drama, scifi)
    }

    #[test]
    fn test_book_rules() {
        let input = FormInput::from_urlencoded(b"title=R.U.R.&author=1&summary=R&isbn=9");
        let failed = validate::<CreateBook>(&input).unwrap_err();
        let messages: Vec<_> = failed.errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(
            vec![
                "Summary must contain at least two characters",
                "ISBN must contain at least two characters"
            ],
            messages
        );
    }

    #[tokio::test]
    async fn test_check_references() {
        let pool = test_pool().await;
        let (author, drama, _) = seed(&pool).await;
        let authors = AuthorRepository::new(pool.clone());
        let genres = GenreRepository::new(pool.clone());
        let payload = CreateBook {
            title: "R.U.R.".to_string(),
            author_id: author.id,
            summary: "Robots".to_string(),
            isbn: "123".to_string(),
            genres: vec![drama.id],
        };
        assert!(check_references(payload.clone(), &authors, &genres)
            .await
            .unwrap()
            .is_ok());

        let failed = check_references(
            CreateBook {
                author_id: 99,
                genres: vec![drama.id, 98],
                ..payload
            },
            &authors,
            &genres,
        )
        .await
        .unwrap()
        .unwrap_err();
        let fields: Vec<_> = failed.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(vec!["author", "genre"], fields);
        assert_eq!("Selected genre 98 does not exist", failed.errors[1].message);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_create_without_genre() {
        let pool = test_pool().await;
        let (author, _, _) = seed(&pool).await;
        let app = app(pool.clone());

        let body = format!(
            "title=R.U.R.&author={}&summary=Robots+rebel&isbn=978-0-14-118208-0",
            author.id
        );
        let response = post_form(&app, "/catalog/book/create", &body).await;
        assert_eq!(StatusCode::SEE_OTHER, response.status());
        let url = location(&response).to_string();
        let id: i64 = url.rsplit('/').next().unwrap().parse().unwrap();

        let book = BookRepository::new(pool).get(id).await.unwrap();
        assert!(book.genres.is_empty());
        assert_eq!("R.U.R.", book.title);

        let body = body_text(get(&app, &url).await).await;
        assert!(body.contains("Capek"));
        assert!(body.contains("There are no copies of this book"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_create_with_genres_json() {
        let pool = test_pool().await;
        let (author, drama, scifi) = seed(&pool).await;
        let app = app(pool.clone());

        let response = post_json(
            &app,
            "/catalog/book/create",
            serde_json::json!({
                "title": "R.U.R.",
                "author": author.id,
                "summary": "Robots rebel",
                "isbn": "978-0-14-118208-0",
                "genre": drama.id
            }),
        )
        .await;
        assert_eq!(StatusCode::SEE_OTHER, response.status());
        let url = location(&response).to_string();

        let body = body_text(get(&app, &format!("{url}/update")).await).await;
        assert!(body.contains(&format!("value=\"{}\" checked", drama.id)));
        assert!(!body.contains(&format!("value=\"{}\" checked", scifi.id)));

        let response = post_form(
            &app,
            &format!("{url}/update"),
            &format!(
                "title=R.U.R.&author={}&summary=Robots&isbn=978&genre={}&genre={}",
                author.id, drama.id, scifi.id
            ),
        )
        .await;
        assert_eq!(StatusCode::SEE_OTHER, response.status());
        let body = body_text(get(&app, &url).await).await;
        assert!(body.contains("Drama"));
        assert!(body.contains("Sci-Fi"));
    }

    #[tokio::test]
    async fn test_unknown_references() {
        let pool = test_pool().await;
        let (_, drama, _) = seed(&pool).await;
        let app = app(pool.clone());

        let response = post_form(
            &app,
            "/catalog/book/create",
            &format!(
                "title=Lost&author=999&summary=Nothing&isbn=000&genre={}",
                drama.id
            ),
        )
        .await;
        assert_eq!(StatusCode::BAD_REQUEST, response.status());
        let body = body_text(response).await;
        assert!(body.contains("Selected author does not exist"));
        assert!(body.contains("value=\"Lost\""));
        assert_eq!(0, BookRepository::new(pool).count().await.unwrap());
    }

    #[tokio::test]
    #[traced_test]
    async fn test_delete_orphans_copies() {
        let pool = test_pool().await;
        let (author, _, _) = seed(&pool).await;
        let app = app(pool.clone());
        let book = BookRepository::new(pool.clone())
            .create(CreateBook {
                title: "Krakatit".to_string(),
                author_id: author.id,
                summary: "Explosive".to_string(),
                isbn: "80-7185-123-4".to_string(),
                genres: vec![],
            })
            .await
            .unwrap();
        BookInstanceRepositoryImpl::new(pool.clone())
            .create(CreateBookInstance {
                book_id: book.id,
                imprint: "Aventinum 1924".to_string(),
                status: BookStatus::Loaned,
                due_back: date!(2030 - 01 - 01),
            })
            .await
            .unwrap();

        let body = body_text(get(&app, &format!("{}/delete", book.url())).await).await;
        assert!(body.contains("This book has 1 copies"));

        let response = post_form(&app, &format!("{}/delete", book.url()), "").await;
        assert_eq!(StatusCode::SEE_OTHER, response.status());
        assert_eq!(LIST_URL, location(&response));
        assert_eq!(StatusCode::NOT_FOUND, get(&app, &book.url()).await.status());

        let body = body_text(get(&app, "/catalog/bookinstances").await).await;
        assert!(body.contains("(deleted book)"));
        assert!(body.contains("Aventinum 1924"));
    }
}
