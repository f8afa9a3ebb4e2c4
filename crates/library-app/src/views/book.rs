use library_dal::{
    author::{author_url, Author},
    book::{Book, BookListItem},
    book_instance::{BookInstance, BookStatus},
    genre::Genre,
};
use maud::{html, Markup};

use super::{error_list, page, select_input, stored, submit_button, text_area, text_input};
use crate::{
    form::{FieldError, FormInput},
    menu::Menu,
};

pub(crate) fn status_class(status: BookStatus) -> &'static str {
    match status {
        BookStatus::Available => "text-success",
        BookStatus::Maintenance => "text-danger",
        BookStatus::Loaned | BookStatus::Reserved => "text-warning",
    }
}

pub fn list(menu: &Menu, books: &[BookListItem]) -> Markup {
    page(
        menu,
        "Book List",
        html! {
            h1 { "Book List" }
            @if books.is_empty() {
                p { "There are no books." }
            } @else {
                ul .books {
                    @for book in books {
                        li {
                            a href=(book.url()) { (stored(&book.title)) }
                            " ("
                            @match book.author_name() {
                                Some(name) => { (stored(&name)) }
                                None => { "(deleted author)" }
                            }
                            ")"
                        }
                    }
                }
            }
        },
    )
}

fn copies_section(copies: &[BookInstance]) -> Markup {
    html! {
        h4 { "Copies" }
        @if copies.is_empty() {
            p { "There are no copies of this book in the library." }
        } @else {
            @for copy in copies {
                hr;
                p class=(status_class(copy.status)) { (copy.status.as_str()) }
                p { strong { "Imprint: " } (stored(&copy.imprint)) }
                @if copy.status != BookStatus::Available {
                    p { strong { "Due back: " } (copy.due_back_formatted()) }
                }
                p { strong { "Id: " } a href=(copy.url()) { (copy.id) } }
            }
        }
    }
}

pub fn detail(
    menu: &Menu,
    book: &Book,
    author: Option<&Author>,
    genres: &[Genre],
    copies: &[BookInstance],
) -> Markup {
    page(
        menu,
        "Book Detail",
        html! {
            h1 { "Title: " (stored(&book.title)) }
            p {
                strong { "Author: " }
                @match author {
                    Some(author) => {
                        a href=(author.url()) { (stored(&author.name())) }
                    }
                    None => {
                        a href=(author_url(book.author_id)) { "(deleted author)" }
                    }
                }
            }
            p { strong { "Summary: " } (stored(&book.summary)) }
            p { strong { "ISBN: " } (stored(&book.isbn)) }
            p {
                strong { "Genre: " }
                @for (i, genre) in genres.iter().enumerate() {
                    @if i > 0 { ", " }
                    a href=(genre.url()) { (stored(&genre.name)) }
                }
            }
            div .copies-section { (copies_section(copies)) }
            hr;
            p { a href=(format!("{}/delete", book.url())) { "Delete book" } }
            p { a href=(format!("{}/update", book.url())) { "Update book" } }
        },
    )
}

pub fn form(
    menu: &Menu,
    title: &str,
    input: &FormInput,
    authors: &[Author],
    genres: &[Genre],
    errors: &[FieldError],
) -> Markup {
    page(
        menu,
        title,
        html! {
            h1 { (title) }
            form method="POST" action="" {
                (text_input("Title", "title", input, "Name of book"))
                (select_input(
                    "Author",
                    "author",
                    input,
                    "Select author",
                    authors
                        .iter()
                        .map(|a| (a.id.to_string(), format!("{}, {}", a.last_name, a.first_name))),
                ))
                (text_area("Summary", "summary", input, "Summary"))
                (text_input("ISBN", "isbn", input, "ISBN13"))
                div .form-group {
                    label { "Genre:" }
                    div {
                        @for genre in genres {
                            @let id = genre.id.to_string();
                            @let field_id = format!("genre-{}", genre.id);
                            div .checkbox-item {
                                input type="checkbox" name="genre" id=(field_id) value=(id)
                                    checked[input.contains_value("genre", &id)];
                                label for=(field_id) { (stored(&genre.name)) }
                            }
                        }
                    }
                }
                (submit_button("Submit"))
            }
            (error_list(errors))
        },
    )
}

pub fn delete(menu: &Menu, book: &Book, copies: &[BookInstance]) -> Markup {
    page(
        menu,
        "Delete Book",
        html! {
            h1 { "Delete Book: " (stored(&book.title)) }
            p { (stored(&book.summary)) }
            @if !copies.is_empty() {
                p .warning {
                    strong {
                        "This book has " (copies.len())
                        " copies, they will stay in the catalog without a book."
                    }
                }
                ul .copies {
                    @for copy in copies {
                        li { a href=(copy.url()) { (stored(&copy.imprint)) } " - " (copy.status.as_str()) }
                    }
                }
            }
            p { "Do you really want to delete this Book?" }
            form method="POST" action="" {
                input type="hidden" name="id" value=(book.id);
                (submit_button("Delete"))
            }
        },
    )
}
