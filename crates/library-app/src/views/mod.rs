//! HTML pages.
//!
//! Text fields of stored records are kept HTML escaped, so they are rendered
//! with [PreEscaped]. Raw form input is rendered through the normal escaping.

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;
pub mod index;

use axum::response::Html;
use http::StatusCode;
use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::{
    form::{FieldError, FormInput},
    menu::Menu,
};

pub fn html(markup: Markup) -> Html<String> {
    Html(markup.into_string())
}

/// Stored (already escaped) text
pub(crate) fn stored(text: &str) -> PreEscaped<&str> {
    PreEscaped(text)
}

pub fn page(menu: &Menu, title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " | " (menu.title) }
            }
            body {
                nav .sidebar {
                    ul .sidebar-nav {
                        @for item in menu.items {
                            li { a href=(item.href) { (item.label) } }
                        }
                    }
                }
                main .content {
                    (content)
                }
            }
        }
    }
}

pub fn error_page(menu: &Menu, status: StatusCode, message: &str) -> Markup {
    let title = status.canonical_reason().unwrap_or("Error");
    page(
        menu,
        title,
        html! {
            h1 { (title) }
            p .error-message { (message) }
            p .status { "Status: " (status.as_u16()) }
        },
    )
}

pub(crate) fn error_list(errors: &[FieldError]) -> Markup {
    html! {
        @if !errors.is_empty() {
            ul .errors {
                @for error in errors {
                    li data-field=(error.field) { (error.message) }
                }
            }
        }
    }
}

pub(crate) fn text_input(label: &str, name: &str, input: &FormInput, placeholder: &str) -> Markup {
    html! {
        div .form-group {
            label for=(name) { (label) ":" }
            input .form-control id=(name) type="text" name=(name)
                placeholder=(placeholder) value=(input.value(name));
        }
    }
}

pub(crate) fn text_area(label: &str, name: &str, input: &FormInput, placeholder: &str) -> Markup {
    html! {
        div .form-group {
            label for=(name) { (label) ":" }
            textarea .form-control id=(name) name=(name) placeholder=(placeholder) {
                (input.value(name))
            }
        }
    }
}

pub(crate) fn date_input(label: &str, name: &str, input: &FormInput) -> Markup {
    html! {
        div .form-group {
            label for=(name) { (label) ":" }
            input .form-control id=(name) type="date" name=(name) value=(input.value(name));
        }
    }
}

pub(crate) fn submit_button(label: &str) -> Markup {
    html! {
        button .btn.btn-primary type="submit" { (label) }
    }
}

/// Select box options, labels are stored text
pub(crate) fn select_input(
    label: &str,
    name: &str,
    input: &FormInput,
    placeholder: &str,
    options: impl IntoIterator<Item = (String, String)>,
) -> Markup {
    let selected = input.value(name);
    html! {
        div .form-group {
            label for=(name) { (label) ":" }
            select .form-control id=(name) name=(name) {
                option value="" { (placeholder) }
                @for (value, text) in options {
                    option value=(value) selected[value == selected] { (stored(&text)) }
                }
            }
        }
    }
}
