use futures::{StreamExt as _, TryStreamExt as _};
use garde::Validate;
use serde::{Deserialize, Serialize};
use sqlx::{Acquire, Executor, Pool, SqliteConnection};
use tracing::debug;

use crate::{
    ChosenDB, MAX_LIMIT,
    error::{Error, Result},
};

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct CreateBook {
    #[garde(length(min = 1, max = 2000))]
    pub title: String,
    #[garde(range(min = 1))]
    pub author_id: i64,
    #[garde(length(min = 1, max = 30000))]
    pub summary: String,
    #[garde(length(min = 1, max = 255))]
    pub isbn: String,
    #[garde(inner(range(min = 1)))]
    pub genres: Vec<i64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author_id: i64,
    pub summary: String,
    pub isbn: String,
    /// Linked genre ids, always present (empty when the book has no genre)
    #[sqlx(skip)]
    pub genres: Vec<i64>,
}

impl Book {
    pub fn url(&self) -> String {
        book_url(self.id)
    }
}

pub fn book_url(id: i64) -> String {
    format!("/catalog/book/{id}")
}

/// Book as shown in dependents listings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct BookShort {
    pub id: i64,
    pub title: String,
    pub summary: String,
}

impl BookShort {
    pub fn url(&self) -> String {
        book_url(self.id)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct BookListItem {
    pub id: i64,
    pub title: String,
    pub author_id: i64,
    pub author_first_name: Option<String>,
    pub author_last_name: Option<String>,
}

impl BookListItem {
    pub fn url(&self) -> String {
        book_url(self.id)
    }

    /// None when the referenced author no longer exists
    pub fn author_name(&self) -> Option<String> {
        match (&self.author_first_name, &self.author_last_name) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            _ => None,
        }
    }
}

fn unique_genres(genres: &[i64]) -> Vec<i64> {
    let mut genres = genres.to_vec();
    genres.sort_unstable();
    genres.dedup();
    genres
}

async fn link_genres(conn: &mut SqliteConnection, book_id: i64, genres: &[i64]) -> Result<()> {
    for genre_id in unique_genres(genres) {
        sqlx::query("INSERT INTO book_genre (book_id, genre_id) VALUES (?, ?)")
            .bind(book_id)
            .bind(genre_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

pub type BookRepository = BookRepositoryImpl<Pool<ChosenDB>>;

pub struct BookRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> BookRepositoryImpl<E>
where
    for<'a> &'a E: Executor<'c, Database = ChosenDB> + Acquire<'c, Database = ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn create(&self, payload: CreateBook) -> Result<Book> {
        let mut tx = self.executor.begin().await?;

        let result =
            sqlx::query("INSERT INTO book (title, author_id, summary, isbn) VALUES (?, ?, ?, ?)")
                .bind(&payload.title)
                .bind(payload.author_id)
                .bind(&payload.summary)
                .bind(&payload.isbn)
                .execute(&mut *tx)
                .await?;
        let id = result.last_insert_rowid();
        link_genres(&mut tx, id, &payload.genres).await?;
        tx.commit().await?;

        debug!(id, "Created book");
        self.get(id).await
    }

    /// Replaces all fields of the record, including its genre links
    pub async fn update(&self, id: i64, payload: CreateBook) -> Result<Book> {
        let mut tx = self.executor.begin().await?;

        let result = sqlx::query(
            "UPDATE book SET title = ?, author_id = ?, summary = ?, isbn = ? WHERE id = ?",
        )
        .bind(&payload.title)
        .bind(payload.author_id)
        .bind(&payload.summary)
        .bind(&payload.isbn)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::RecordNotFound("Book".to_string()));
        }

        sqlx::query("DELETE FROM book_genre WHERE book_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        link_genres(&mut tx, id, &payload.genres).await?;
        tx.commit().await?;

        debug!(id, "Updated book");
        self.get(id).await
    }

    pub async fn get(&self, id: i64) -> Result<Book> {
        let mut book = sqlx::query_as::<_, Book>(
            "SELECT id, title, author_id, summary, isbn FROM book WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.executor)
        .await?
        .ok_or_else(|| Error::RecordNotFound("Book".to_string()))?;

        book.genres = sqlx::query_scalar(
            "SELECT genre_id FROM book_genre WHERE book_id = ? ORDER BY genre_id",
        )
        .bind(id)
        .fetch_all(&self.executor)
        .await?;
        Ok(book)
    }

    /// All books with their author's name, ordered by title
    pub async fn list(&self) -> Result<Vec<BookListItem>> {
        let records = sqlx::query_as::<_, BookListItem>(
            "SELECT b.id, b.title, b.author_id, a.first_name AS author_first_name, a.last_name AS author_last_name
            FROM book b LEFT JOIN author a ON b.author_id = a.id
            ORDER BY b.title, b.id",
        )
        .fetch(&self.executor)
        .take(MAX_LIMIT)
        .try_collect::<Vec<_>>()
        .await?;
        Ok(records)
    }

    pub async fn list_by_author(&self, author_id: i64) -> Result<Vec<BookShort>> {
        list_by_author(author_id, &self.executor).await
    }

    pub async fn list_by_genre(&self, genre_id: i64) -> Result<Vec<BookShort>> {
        list_by_genre(genre_id, &self.executor).await
    }

    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM book")
            .fetch_one(&self.executor)
            .await?;
        Ok(count)
    }

    /// Removes the book and its genre links. Copies of the book are left in place.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let mut tx = self.executor.begin().await?;

        sqlx::query("DELETE FROM book_genre WHERE book_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let res = sqlx::query("DELETE FROM book WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if res.rows_affected() == 0 {
            Err(Error::RecordNotFound("Book".to_string()))
        } else {
            tx.commit().await?;
            debug!(id, "Deleted book");
            Ok(())
        }
    }
}

pub(crate) async fn list_by_author<'c, E>(author_id: i64, executor: E) -> Result<Vec<BookShort>>
where
    E: sqlx::Executor<'c, Database = ChosenDB>,
{
    let records = sqlx::query_as::<_, BookShort>(
        "SELECT id, title, summary FROM book WHERE author_id = ? ORDER BY title, id",
    )
    .bind(author_id)
    .fetch(executor)
    .take(MAX_LIMIT)
    .try_collect::<Vec<_>>()
    .await?;
    Ok(records)
}

pub(crate) async fn list_by_genre<'c, E>(genre_id: i64, executor: E) -> Result<Vec<BookShort>>
where
    E: sqlx::Executor<'c, Database = ChosenDB>,
{
    let records = sqlx::query_as::<_, BookShort>(
        "SELECT b.id, b.title, b.summary FROM book b JOIN book_genre bg ON bg.book_id = b.id
        WHERE bg.genre_id = ? ORDER BY b.title, b.id",
    )
    .bind(genre_id)
    .fetch(executor)
    .take(MAX_LIMIT)
    .try_collect::<Vec<_>>()
    .await?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_genres() {
        assert_eq!(vec![1, 2, 5], unique_genres(&[5, 1, 2, 5, 1]));
        assert!(unique_genres(&[]).is_empty());
    }

    #[test]
    fn test_author_name_of_orphan() {
        let item = BookListItem {
            id: 1,
            title: "Krakatit".to_string(),
            author_id: 42,
            author_first_name: None,
            author_last_name: None,
        };
        assert_eq!(None, item.author_name());
        assert_eq!("/catalog/book/1", item.url());
    }
}
