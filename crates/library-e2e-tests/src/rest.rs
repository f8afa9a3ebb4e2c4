use anyhow::{anyhow, Result};
use reqwest::{StatusCode, Url};
use tracing::info;

use crate::location;

async fn submit(client: &reqwest::Client, url: Url, form: &[(&str, &str)]) -> Result<String> {
    let response = client.post(url).form(form).send().await?;
    info!("Create response: {:#?}", response);
    if response.status() != StatusCode::SEE_OTHER {
        return Err(anyhow!("Form rejected with status {}", response.status()));
    }
    location(&response)
}

/// Returns path of the new author detail page
pub async fn create_author(
    client: &reqwest::Client,
    base_url: &Url,
    first_name: &str,
    last_name: &str,
) -> Result<String> {
    let url = base_url.join("catalog/author/create")?;
    submit(
        client,
        url,
        &[("first_name", first_name), ("last_name", last_name)],
    )
    .await
}

pub async fn create_genre(client: &reqwest::Client, base_url: &Url, name: &str) -> Result<String> {
    let url = base_url.join("catalog/genre/create")?;
    submit(client, url, &[("name", name)]).await
}

pub async fn create_book(
    client: &reqwest::Client,
    base_url: &Url,
    title: &str,
    author_id: &str,
    genres: &[&str],
) -> Result<String> {
    let url = base_url.join("catalog/book/create")?;
    let mut form = vec![
        ("title", title),
        ("author", author_id),
        ("summary", "Summary of the book"),
        ("isbn", "978-0-00-000000-0"),
    ];
    form.extend(genres.iter().map(|g| ("genre", *g)));
    submit(client, url, &form).await
}

pub async fn create_copy(
    client: &reqwest::Client,
    base_url: &Url,
    book_id: &str,
    imprint: &str,
) -> Result<String> {
    let url = base_url.join("catalog/bookinstance/create")?;
    submit(client, url, &[("book", book_id), ("imprint", imprint)]).await
}

/// Id is the last segment of a detail path
pub fn id_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or_default()
}

pub async fn page_text(client: &reqwest::Client, base_url: &Url, path: &str) -> Result<String> {
    let url = base_url.join(path.trim_start_matches('/'))?;
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(anyhow!("GET {path} failed with status {}", response.status()));
    }
    Ok(response.text().await?)
}
