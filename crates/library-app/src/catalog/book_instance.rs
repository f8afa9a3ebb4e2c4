use std::sync::LazyLock;

use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
};
use futures::try_join;
use library_dal::{
    book::BookRepository,
    book_instance::{BookInstance, BookInstanceRepository, BookStatus, CreateBookInstance},
};
use time::OffsetDateTime;

use super::{EntityId, invalid_form, optional, redirect};
use crate::{
    error::ApiResult,
    form::{
        sanitize::{date_value, unescape_html},
        validate, Checked, FieldSpec, FieldValue, FormInput, FormModel, Rule, Schema,
        ValidationFailed,
    },
    state::AppState,
    views,
};

const LIST_URL: &str = "/catalog/bookinstances";

static BOOK_INSTANCE_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new(vec![
        FieldSpec::one("book")
            .trim()
            .keep()
            .rule(Rule::Reference, "Book must be specified"),
        FieldSpec::one("imprint")
            .trim()
            .rule(Rule::MinChars(2), "Imprint must be specified")
            .rule(Rule::MaxChars(255), "Imprint must be at most 255 characters long"),
        FieldSpec::one("status")
            .trim()
            .optional()
            .keep()
            .rule(Rule::OneOf(&BookStatus::NAMES), "Invalid status"),
        FieldSpec::one("due_back")
            .optional()
            .keep()
            .rule(Rule::IsoDate, "Invalid date"),
    ])
});

impl FormModel for CreateBookInstance {
    fn schema() -> &'static Schema {
        &BOOK_INSTANCE_SCHEMA
    }

    fn build(checked: &Checked) -> Self {
        CreateBookInstance {
            book_id: checked.id("book").unwrap_or_default(),
            imprint: checked.text_or_empty("imprint"),
            status: checked
                .text("status")
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            due_back: checked
                .date("due_back")
                .unwrap_or_else(|| OffsetDateTime::now_utc().date()),
        }
    }

    fn form_field(path: &str) -> String {
        if path.starts_with("book_id") {
            "book".to_string()
        } else {
            path.to_string()
        }
    }
}

impl From<&BookInstance> for FormInput {
    fn from(copy: &BookInstance) -> Self {
        let mut input = FormInput::default();
        input.set("book", FieldValue::Single(copy.book_id.to_string()));
        input.set("imprint", FieldValue::Single(unescape_html(&copy.imprint)));
        input.set("status", FieldValue::Single(copy.status.to_string()));
        input.set("due_back", FieldValue::Single(date_value(copy.due_back)));
        input
    }
}

async fn check_book(
    input: &FormInput,
    books: &BookRepository,
) -> ApiResult<Result<CreateBookInstance, ValidationFailed>> {
    let payload = match validate::<CreateBookInstance>(input) {
        Ok(payload) => payload,
        Err(failed) => return Ok(Err(failed)),
    };
    if optional(books.get(payload.book_id).await)?.is_some() {
        Ok(Ok(payload))
    } else {
        Ok(Err(ValidationFailed::field(
            "book",
            "Selected book does not exist",
        )))
    }
}

pub async fn list(
    State(state): State<AppState>,
    repository: BookInstanceRepository,
) -> ApiResult<Html<String>> {
    let copies = repository.list().await?;
    Ok(views::html(views::book_instance::list(state.menu(), &copies)))
}

pub async fn detail(
    EntityId(id): EntityId,
    State(state): State<AppState>,
    repository: BookInstanceRepository,
) -> ApiResult<Html<String>> {
    let copy = repository.get_item(id).await?;
    Ok(views::html(views::book_instance::detail(state.menu(), &copy)))
}

pub async fn create_form(
    State(state): State<AppState>,
    books: BookRepository,
) -> ApiResult<Html<String>> {
    let books = books.list().await?;
    Ok(views::html(views::book_instance::form(
        state.menu(),
        "Create BookInstance",
        &FormInput::default(),
        &books,
        &[],
    )))
}

pub async fn create(
    State(state): State<AppState>,
    repository: BookInstanceRepository,
    books: BookRepository,
    input: FormInput,
) -> ApiResult<Response> {
    match check_book(&input, &books).await? {
        Ok(payload) => {
            let copy = repository.create(payload).await?;
            Ok(redirect(&copy.url()))
        }
        Err(failed) => {
            let books = books.list().await?;
            Ok(invalid_form(views::book_instance::form(
                state.menu(),
                "Create BookInstance",
                &input,
                &books,
                &failed.errors,
            )))
        }
    }
}

pub async fn delete_form(
    EntityId(id): EntityId,
    State(state): State<AppState>,
    repository: BookInstanceRepository,
) -> ApiResult<Response> {
    match optional(repository.get_item(id).await)? {
        Some(copy) => {
            Ok(views::html(views::book_instance::delete(state.menu(), &copy)).into_response())
        }
        None => Ok(redirect(LIST_URL)),
    }
}

pub async fn delete(
    EntityId(id): EntityId,
    repository: BookInstanceRepository,
) -> ApiResult<Response> {
    optional(repository.delete(id).await)?;
    Ok(redirect(LIST_URL))
}

pub async fn update_form(
    EntityId(id): EntityId,
    State(state): State<AppState>,
    repository: BookInstanceRepository,
    books: BookRepository,
) -> ApiResult<Html<String>> {
    let (copy, books) = try_join!(repository.get(id), books.list())?;
    Ok(views::html(views::book_instance::form(
        state.menu(),
        "Update BookInstance",
        &FormInput::from(&copy),
        &books,
        &[],
    )))
}

pub async fn update(
    EntityId(id): EntityId,
    State(state): State<AppState>,
    repository: BookInstanceRepository,
    books: BookRepository,
    input: FormInput,
) -> ApiResult<Response> {
    match check_book(&input, &books).await? {
        Ok(payload) => {
            let copy = repository.update(id, payload).await?;
            Ok(redirect(&copy.url()))
        }
        Err(failed) => {
            let books = books.list().await?;
            Ok(invalid_form(views::book_instance::form(
                state.menu(),
                "Update BookInstance",
                &input,
                &books,
                &failed.errors,
            )))
        }
    }
}
