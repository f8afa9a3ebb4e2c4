use std::sync::LazyLock;

use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
};
use futures::try_join;
use library_dal::{
    book::BookRepository,
    genre::{CreateGenre, Genre, GenreRepository},
    integrity::{DeleteOutcome, IntegrityGuard},
};

use super::{EntityId, blocked_delete, invalid_form, optional, redirect};
use crate::{
    error::ApiResult,
    form::{
        sanitize::unescape_html, validate, Checked, FieldSpec, FieldValue, FormInput, FormModel,
        Rule, Schema,
    },
    state::AppState,
    views,
};

const LIST_URL: &str = "/catalog/genres";

static GENRE_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new(vec![FieldSpec::one("name")
        .trim()
        .rule(Rule::MinChars(3), "Genre name must contain at least 3 characters")
        .rule(Rule::MaxChars(100), "Genre name must contain at most 100 characters")])
});

impl FormModel for CreateGenre {
    fn schema() -> &'static Schema {
        &GENRE_SCHEMA
    }

    fn build(checked: &Checked) -> Self {
        CreateGenre {
            name: checked.text_or_empty("name"),
        }
    }
}

impl From<&Genre> for FormInput {
    fn from(genre: &Genre) -> Self {
        let mut input = FormInput::default();
        input.set("name", FieldValue::Single(unescape_html(&genre.name)));
        input
    }
}

pub async fn list(
    State(state): State<AppState>,
    repository: GenreRepository,
) -> ApiResult<Html<String>> {
    let genres = repository.list().await?;
    Ok(views::html(views::genre::list(state.menu(), &genres)))
}

pub async fn detail(
    EntityId(id): EntityId,
    State(state): State<AppState>,
    repository: GenreRepository,
    books: BookRepository,
) -> ApiResult<Html<String>> {
    let (genre, books) = try_join!(repository.get(id), books.list_by_genre(id))?;
    Ok(views::html(views::genre::detail(state.menu(), &genre, &books)))
}

pub async fn create_form(State(state): State<AppState>) -> Html<String> {
    views::html(views::genre::form(
        state.menu(),
        "Create Genre",
        &FormInput::default(),
        &[],
    ))
}

pub async fn create(
    State(state): State<AppState>,
    repository: GenreRepository,
    input: FormInput,
) -> ApiResult<Response> {
    match validate::<CreateGenre>(&input) {
        Ok(payload) => {
            let genre = repository.create(payload).await?;
            Ok(redirect(&genre.url()))
        }
        Err(failed) => Ok(invalid_form(views::genre::form(
            state.menu(),
            "Create Genre",
            &input,
            &failed.errors,
        ))),
    }
}

pub async fn delete_form(
    EntityId(id): EntityId,
    State(state): State<AppState>,
    guard: IntegrityGuard,
    repository: GenreRepository,
) -> ApiResult<Response> {
    let (genre, books) = try_join!(
        async { optional(repository.get(id).await) },
        guard.genre_dependents(id)
    )?;
    match genre {
        Some(genre) => {
            Ok(views::html(views::genre::delete(state.menu(), &genre, &books)).into_response())
        }
        None => Ok(redirect(LIST_URL)),
    }
}

pub async fn delete(
    EntityId(id): EntityId,
    State(state): State<AppState>,
    guard: IntegrityGuard,
) -> ApiResult<Response> {
    match optional(guard.delete_genre(id).await)? {
        Some(DeleteOutcome::Blocked { entity, dependents }) => Ok(blocked_delete(
            views::genre::delete(state.menu(), &entity, &dependents),
        )),
        Some(DeleteOutcome::Deleted(_)) | None => Ok(redirect(LIST_URL)),
    }
}

pub async fn update_form(
    EntityId(id): EntityId,
    State(state): State<AppState>,
    repository: GenreRepository,
) -> ApiResult<Html<String>> {
    let genre = repository.get(id).await?;
    Ok(views::html(views::genre::form(
        state.menu(),
        "Update Genre",
        &FormInput::from(&genre),
        &[],
    )))
}

pub async fn update(
    EntityId(id): EntityId,
    State(state): State<AppState>,
    repository: GenreRepository,
    input: FormInput,
) -> ApiResult<Response> {
    match validate::<CreateGenre>(&input) {
        Ok(payload) => {
            let genre = repository.update(id, payload).await?;
            Ok(redirect(&genre.url()))
        }
        Err(failed) => Ok(invalid_form(views::genre::form(
            state.menu(),
            "Update Genre",
            &input,
            &failed.errors,
        ))),
    }
}
