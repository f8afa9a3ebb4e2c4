use library_dal::{
    book::BookListItem,
    book_instance::{BookInstanceListItem, BookStatus},
};
use maud::{html, Markup};

use super::{book::status_class, date_input, error_list, page, select_input, stored, submit_button, text_input};
use crate::{
    form::{FieldError, FormInput},
    menu::Menu,
};

fn book_link(copy: &BookInstanceListItem) -> Markup {
    html! {
        @match &copy.book_title {
            Some(title) => { a href=(copy.book_url()) { (stored(title)) } }
            None => { "(deleted book)" }
        }
    }
}

pub fn list(menu: &Menu, copies: &[BookInstanceListItem]) -> Markup {
    page(
        menu,
        "Book Instance List",
        html! {
            h1 { "Book Instance List" }
            @if copies.is_empty() {
                p { "There are no book copies in this library." }
            } @else {
                ul .bookinstances {
                    @for copy in copies {
                        li {
                            a href=(copy.url()) {
                                @match &copy.book_title {
                                    Some(title) => { (stored(title)) }
                                    None => { "(deleted book)" }
                                }
                                " : " (stored(&copy.imprint))
                            }
                            " - "
                            span class=(status_class(copy.status)) { (copy.status.as_str()) }
                            @if copy.status != BookStatus::Available {
                                span { " (Due: " (copy.due_back_formatted()) ")" }
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn detail(menu: &Menu, copy: &BookInstanceListItem) -> Markup {
    page(
        menu,
        "Book Instance Detail",
        html! {
            h1 { "ID: " (copy.id) }
            p { strong { "Title: " } (book_link(copy)) }
            p { strong { "Imprint: " } (stored(&copy.imprint)) }
            p {
                strong { "Status: " }
                span class=(status_class(copy.status)) { (copy.status.as_str()) }
            }
            @if copy.status != BookStatus::Available {
                p { strong { "Due back: " } (copy.due_back_formatted()) }
            }
            hr;
            p { a href=(format!("{}/delete", copy.url())) { "Delete BookInstance" } }
            p { a href=(format!("{}/update", copy.url())) { "Update BookInstance" } }
        },
    )
}

pub fn form(
    menu: &Menu,
    title: &str,
    input: &FormInput,
    books: &[BookListItem],
    errors: &[FieldError],
) -> Markup {
    page(
        menu,
        title,
        html! {
            h1 { (title) }
            form method="POST" action="" {
                (select_input(
                    "Book",
                    "book",
                    input,
                    "Select book",
                    books.iter().map(|b| (b.id.to_string(), b.title.clone())),
                ))
                (text_input("Imprint", "imprint", input, "Publisher and date information"))
                (date_input("Date when book available", "due_back", input))
                (select_input(
                    "Status",
                    "status",
                    input,
                    "Select status",
                    BookStatus::NAMES
                        .iter()
                        .map(|name| (name.to_string(), name.to_string())),
                ))
                (submit_button("Submit"))
            }
            (error_list(errors))
        },
    )
}

pub fn delete(menu: &Menu, copy: &BookInstanceListItem) -> Markup {
    page(
        menu,
        "Delete BookInstance",
        html! {
            h1 { "Delete BookInstance" }
            p { "Do you really want to delete this BookInstance?" }
            p { strong { "ID: " } (copy.id) }
            p { strong { "Title: " } (book_link(copy)) }
            p { strong { "Imprint: " } (stored(&copy.imprint)) }
            p { strong { "Status: " } (copy.status.as_str()) }
            form method="POST" action="" {
                input type="hidden" name="id" value=(copy.id);
                (submit_button("Delete"))
            }
        },
    )
}
