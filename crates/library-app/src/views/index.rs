use maud::{html, Markup};

use super::page;
use crate::menu::Menu;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub books: i64,
    pub copies: i64,
    pub copies_available: i64,
    pub authors: i64,
    pub genres: i64,
}

pub fn dashboard(menu: &Menu, counts: &Counts) -> Markup {
    page(
        menu,
        "Local Library Home",
        html! {
            h1 { "Local Library Home" }
            p {
                "Welcome to " em { (menu.title) } ", a very basic website."
            }
            h2 { "Dynamic content" }
            p { "The library has the following record counts:" }
            ul .counts {
                li { strong { "Books:" } " " (counts.books) }
                li { strong { "Copies:" } " " (counts.copies) }
                li { strong { "Copies available:" } " " (counts.copies_available) }
                li { strong { "Authors:" } " " (counts.authors) }
                li { strong { "Genres:" } " " (counts.genres) }
            }
        },
    )
}
