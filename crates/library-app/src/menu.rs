#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    pub href: &'static str,
    pub label: &'static str,
}

/// Navigation shown on every page
#[derive(Debug)]
pub struct Menu {
    pub title: &'static str,
    pub items: &'static [MenuItem],
}

const fn item(href: &'static str, label: &'static str) -> MenuItem {
    MenuItem { href, label }
}

pub static CATALOG_MENU: Menu = Menu {
    title: "Local Library",
    items: &[
        item("/catalog", "Home"),
        item("/catalog/books", "All books"),
        item("/catalog/authors", "All authors"),
        item("/catalog/genres", "All genres"),
        item("/catalog/bookinstances", "All book-instances"),
        item("/catalog/author/create", "Create new author"),
        item("/catalog/genre/create", "Create new genre"),
        item("/catalog/book/create", "Create new book"),
        item("/catalog/bookinstance/create", "Create new book instance (copy)"),
    ],
};
