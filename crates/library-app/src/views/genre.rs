use library_dal::{book::BookShort, genre::Genre};
use maud::{html, Markup};

use super::{error_list, page, stored, submit_button, text_input};
use crate::{
    form::{FieldError, FormInput},
    menu::Menu,
};

pub fn list(menu: &Menu, genres: &[Genre]) -> Markup {
    page(
        menu,
        "Genre List",
        html! {
            h1 { "Genre List" }
            @if genres.is_empty() {
                p { "There are no genres." }
            } @else {
                ul .genres {
                    @for genre in genres {
                        li { a href=(genre.url()) { (stored(&genre.name)) } }
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
            p { "This genre has no books." }
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

pub fn detail(menu: &Menu, genre: &Genre, books: &[BookShort]) -> Markup {
    page(
        menu,
        "Genre Detail",
        html! {
            h1 { "Genre: " (stored(&genre.name)) }
            div .books-section { (books_section(books)) }
            hr;
            p { a href=(format!("{}/delete", genre.url())) { "Delete genre" } }
            p { a href=(format!("{}/update", genre.url())) { "Update genre" } }
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
                (text_input("Genre", "name", input, "Fantasy, Poetry etc."))
                (submit_button("Submit"))
            }
            (error_list(errors))
        },
    )
}

pub fn delete(menu: &Menu, genre: &Genre, books: &[BookShort]) -> Markup {
    page(
        menu,
        "Delete Genre",
        html! {
            h1 { "Delete Genre: " (stored(&genre.name)) }
            @if books.is_empty() {
                p { "Do you really want to delete this Genre?" }
                form method="POST" action="" {
                    input type="hidden" name="id" value=(genre.id);
                    (submit_button("Delete"))
                }
            } @else {
                p .blocked {
                    strong {
                        "Delete the following books before attempting to delete this genre ("
                        (books.len()) " dependent book(s))."
                    }
                }
                (books_section(books))
            }
        },
    )
}
