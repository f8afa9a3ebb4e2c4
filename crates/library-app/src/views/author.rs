use library_dal::{author::Author, book::BookShort};
use maud::{html, Markup};

use super::{date_input, error_list, page, stored, submit_button, text_input};
use crate::{
    form::{FieldError, FormInput},
    menu::Menu,
};

fn full_name(author: &Author) -> Markup {
    html! { (stored(&author.last_name)) ", " (stored(&author.first_name)) }
}

pub fn list(menu: &Menu, authors: &[Author]) -> Markup {
    page(
        menu,
        "Author List",
        html! {
            h1 { "Author List" }
            @if authors.is_empty() {
                p { "There are no authors." }
            } @else {
                ul .authors {
                    @for author in authors {
                        li {
                            a href=(author.url()) { (full_name(author)) }
                            " (" (author.life_span()) ")"
                        }
                    }
                }
            }
        },
    )
}

fn books_section(books: &[BookShort]) -> Markup {
    html! {
        h4 { "Books" }
        @if books.is_empty() {
            p { "This author has no books." }
        } @else {
            dl .books {
                @for book in books {
                    dt { a href=(book.url()) { (stored(&book.title)) } }
                    dd { (stored(&book.summary)) }
                }
            }
        }
    }
}

pub fn detail(menu: &Menu, author: &Author, books: &[BookShort]) -> Markup {
    page(
        menu,
        "Author Detail",
        html! {
            h1 { "Author: " (full_name(author)) }
            p { (author.life_span()) }
            div .books-section { (books_section(books)) }
            hr;
            p {
                a href=(format!("{}/delete", author.url())) { "Delete author" }
            }
            p {
                a href=(format!("{}/update", author.url())) { "Update author" }
            }
        },
    )
}

pub fn form(menu: &Menu, title: &str, input: &FormInput, errors: &[FieldError]) -> Markup {
    page(
        menu,
        title,
        html! {
            h1 { (title) }
            form method="POST" action="" {
                (text_input("First Name", "first_name", input, "First name"))
                (text_input("Last Name", "last_name", input, "Last name"))
                (date_input("Date of birth", "date_of_birth", input))
                (date_input("Date of death", "date_of_death", input))
                (submit_button("Submit"))
            }
            (error_list(errors))
        },
    )
}

pub fn delete(menu: &Menu, author: &Author, books: &[BookShort]) -> Markup {
    page(
        menu,
        "Delete Author",
        html! {
            h1 { "Delete Author: " (full_name(author)) }
            p { (author.life_span()) }
            @if books.is_empty() {
                p { "Do you really want to delete this Author?" }
                form method="POST" action="" {
                    input type="hidden" name="id" value=(author.id);
                    (submit_button("Delete"))
                }
            } @else {
                p .blocked {
                    strong {
                        "Delete the following books before attempting to delete this author ("
                        (books.len()) " dependent book(s))."
                    }
                }
                (books_section(books))
            }
        },
    )
}
