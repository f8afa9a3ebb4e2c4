use std::sync::LazyLock;

use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
};
use futures::try_join;
use library_dal::{
    author::{Author, AuthorRepository, CreateAuthor},
    book::BookRepository,
    integrity::{DeleteOutcome, IntegrityGuard},
};
use tracing::debug;

use super::{EntityId, blocked_delete, invalid_form, optional, redirect};
use crate::{
    error::ApiResult,
    form::{
        sanitize::{date_value, unescape_html},
        validate, Checked, FieldSpec, FieldValue, FormInput, FormModel, Rule, Schema,
    },
    state::AppState,
    views,
};

const LIST_URL: &str = "/catalog/authors";

static AUTHOR_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new(vec![
        FieldSpec::one("first_name")
            .trim()
            .rule(Rule::MinChars(2), "First name must be at least two characters long")
            .rule(Rule::MaxChars(100), "First name must be at most 100 characters long")
            .rule(Rule::Alphanumeric, "First name has non-alphanumeric characters"),
        FieldSpec::one("last_name")
            .trim()
            .rule(Rule::MinChars(2), "Last name must be at least two characters long")
            .rule(Rule::MaxChars(100), "Last name must be at most 100 characters long")
            .rule(Rule::Alphanumeric, "Last name has non-alphanumeric characters"),
        FieldSpec::one("date_of_birth")
            .optional()
            .keep()
            .rule(Rule::IsoDate, "Invalid date of birth"),
        FieldSpec::one("date_of_death")
            .optional()
            .keep()
            .rule(Rule::IsoDate, "Invalid date of death"),
    ])
});

impl FormModel for CreateAuthor {
    fn schema() -> &'static Schema {
        &AUTHOR_SCHEMA
    }

    fn build(checked: &Checked) -> Self {
        CreateAuthor {
            first_name: checked.text_or_empty("first_name"),
            last_name: checked.text_or_empty("last_name"),
            date_of_birth: checked.date("date_of_birth"),
            date_of_death: checked.date("date_of_death"),
        }
    }
}

impl From<&Author> for FormInput {
    fn from(author: &Author) -> Self {
        let mut input = FormInput::default();
        input.set(
            "first_name",
            FieldValue::Single(unescape_html(&author.first_name)),
        );
        input.set(
            "last_name",
            FieldValue::Single(unescape_html(&author.last_name)),
        );
        if let Some(date) = author.date_of_birth {
            input.set("date_of_birth", FieldValue::Single(date_value(date)));
        }
        if let Some(date) = author.date_of_death {
            input.set("date_of_death", FieldValue::Single(date_value(date)));
        }
        input
    }
}

pub async fn list(
    State(state): State<AppState>,
    repository: AuthorRepository,
) -> ApiResult<Html<String>> {
    let authors = repository.list().await?;
    Ok(views::html(views::author::list(state.menu(), &authors)))
}

pub async fn detail(
    EntityId(id): EntityId,
    State(state): State<AppState>,
    repository: AuthorRepository,
    books: BookRepository,
) -> ApiResult<Html<String>> {
    let (author, books) = try_join!(repository.get(id), books.list_by_author(id))?;
    Ok(views::html(views::author::detail(
        state.menu(),
        &author,
        &books,
    )))
}

pub async fn create_form(State(state): State<AppState>) -> Html<String> {
    views::html(views::author::form(
        state.menu(),
        "Create Author",
        &FormInput::default(),
        &[],
    ))
}

pub async fn create(
    State(state): State<AppState>,
    repository: AuthorRepository,
    input: FormInput,
) -> ApiResult<Response> {
    match validate::<CreateAuthor>(&input) {
        Ok(payload) => {
            let author = repository.create(payload).await?;
            Ok(redirect(&author.url()))
        }
        Err(failed) => Ok(invalid_form(views::author::form(
            state.menu(),
            "Create Author",
            &input,
            &failed.errors,
        ))),
    }
}

pub async fn delete_form(
    EntityId(id): EntityId,
    State(state): State<AppState>,
    guard: IntegrityGuard,
    repository: AuthorRepository,
) -> ApiResult<Response> {
    let (author, books) = try_join!(
        async { optional(repository.get(id).await) },
        guard.author_dependents(id)
    )?;
    match author {
        Some(author) => Ok(views::html(views::author::delete(state.menu(), &author, &books))
            .into_response()),
        None => Ok(redirect(LIST_URL)),
    }
}

pub async fn delete(
    EntityId(id): EntityId,
    State(state): State<AppState>,
    guard: IntegrityGuard,
) -> ApiResult<Response> {
    match optional(guard.delete_author(id).await)? {
        Some(DeleteOutcome::Blocked { entity, dependents }) => Ok(blocked_delete(
            views::author::delete(state.menu(), &entity, &dependents),
        )),
        Some(DeleteOutcome::Deleted(_)) => Ok(redirect(LIST_URL)),
        None => {
            debug!(id, "Author already gone");
            Ok(redirect(LIST_URL))
        }
    }
}

pub async fn update_form(
    EntityId(id): EntityId,
    State(state): State<AppState>,
    repository: AuthorRepository,
) -> ApiResult<Html<String>> {
    let author = repository.get(id).await?;
    Ok(views::html(views::author::form(
        state.menu(),
        "Update Author",
        &FormInput::from(&author),
        &[],
    )))
}

pub async fn update(
    EntityId(id): EntityId,
    State(state): State<AppState>,
    repository: AuthorRepository,
    input: FormInput,
) -> ApiResult<Response> {
    match validate::<CreateAuthor>(&input) {
        Ok(payload) => {
            let author = repository.update(id, payload).await?;
            Ok(redirect(&author.url()))
        }
        Err(failed) => Ok(invalid_form(views::author::form(
            state.menu(),
            "Update Author",
            &input,
            &failed.errors,
        ))),
    }
}
