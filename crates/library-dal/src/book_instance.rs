use std::{fmt::Display, str::FromStr};

use futures::{StreamExt as _, TryStreamExt as _};
use garde::Validate;
use serde::{Deserialize, Serialize};
use sqlx::Pool;
use time::Date;
use tracing::debug;

use crate::{
    ChosenDB, MAX_LIMIT,
    book::book_url,
    dates::format_date,
    error::{Error, Result},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BookStatus {
    Available,
    #[default]
    Maintenance,
    Loaned,
    Reserved,
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown book status: {0}")]
pub struct UnknownStatus(String);

impl BookStatus {
    pub const ALL: [BookStatus; 4] = [
        BookStatus::Available,
        BookStatus::Maintenance,
        BookStatus::Loaned,
        BookStatus::Reserved,
    ];

    pub const NAMES: [&'static str; 4] = ["Available", "Maintenance", "Loaned", "Reserved"];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Available => "Available",
            BookStatus::Maintenance => "Maintenance",
            BookStatus::Loaned => "Loaned",
            BookStatus::Reserved => "Reserved",
        }
    }
}

impl AsRef<str> for BookStatus {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Display for BookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

impl TryFrom<String> for BookStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct CreateBookInstance {
    #[garde(range(min = 1))]
    pub book_id: i64,
    #[garde(length(min = 1, max = 2000))]
    pub imprint: String,
    #[garde(skip)]
    pub status: BookStatus,
    #[garde(skip)]
    pub due_back: Date,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct BookInstance {
    pub id: i64,
    pub book_id: i64,
    pub imprint: String,
    #[sqlx(try_from = "String")]
    pub status: BookStatus,
    pub due_back: Date,
}

impl BookInstance {
    pub fn url(&self) -> String {
        book_instance_url(self.id)
    }

    pub fn due_back_formatted(&self) -> String {
        format_date(self.due_back)
    }
}

pub fn book_instance_url(id: i64) -> String {
    format!("/catalog/bookinstance/{id}")
}

/// Copy joined with the title of its book, title is None for orphaned copies
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct BookInstanceListItem {
    pub id: i64,
    pub book_id: i64,
    pub book_title: Option<String>,
    pub imprint: String,
    #[sqlx(try_from = "String")]
    pub status: BookStatus,
    pub due_back: Date,
}

impl BookInstanceListItem {
    pub fn url(&self) -> String {
        book_instance_url(self.id)
    }

    pub fn book_url(&self) -> String {
        book_url(self.book_id)
    }

    pub fn due_back_formatted(&self) -> String {
        format_date(self.due_back)
    }
}

const SELECT_LIST_ITEMS: &str = "SELECT i.id, i.book_id, b.title AS book_title, i.imprint, i.status, i.due_back
FROM book_instance i LEFT JOIN book b ON i.book_id = b.id";

pub type BookInstanceRepository = BookInstanceRepositoryImpl<Pool<ChosenDB>>;

pub struct BookInstanceRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> BookInstanceRepositoryImpl<E>
where
    for<'a> &'a E: sqlx::Executor<'c, Database = ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn create(&self, payload: CreateBookInstance) -> Result<BookInstance> {
        let result = sqlx::query(
            "INSERT INTO book_instance (book_id, imprint, status, due_back) VALUES (?, ?, ?, ?)",
        )
        .bind(payload.book_id)
        .bind(&payload.imprint)
        .bind(payload.status.as_str())
        .bind(payload.due_back)
        .execute(&self.executor)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id, "Created book instance");
        self.get(id).await
    }

    pub async fn update(&self, id: i64, payload: CreateBookInstance) -> Result<BookInstance> {
        let result = sqlx::query(
            "UPDATE book_instance SET book_id = ?, imprint = ?, status = ?, due_back = ? WHERE id = ?",
        )
        .bind(payload.book_id)
        .bind(&payload.imprint)
        .bind(payload.status.as_str())
        .bind(payload.due_back)
        .bind(id)
        .execute(&self.executor)
        .await?;

        if result.rows_affected() == 0 {
            Err(Error::RecordNotFound("BookInstance".to_string()))
        } else {
            debug!(id, "Updated book instance");
            self.get(id).await
        }
    }

    pub async fn get(&self, id: i64) -> Result<BookInstance> {
        sqlx::query_as::<_, BookInstance>(
            "SELECT id, book_id, imprint, status, due_back FROM book_instance WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.executor)
        .await?
        .ok_or_else(|| Error::RecordNotFound("BookInstance".to_string()))
    }

    /// Copy with the title of its book
    pub async fn get_item(&self, id: i64) -> Result<BookInstanceListItem> {
        sqlx::query_as::<_, BookInstanceListItem>(&format!("{SELECT_LIST_ITEMS} WHERE i.id = ?"))
            .bind(id)
            .fetch_optional(&self.executor)
            .await?
            .ok_or_else(|| Error::RecordNotFound("BookInstance".to_string()))
    }

    pub async fn list(&self) -> Result<Vec<BookInstanceListItem>> {
        let records = sqlx::query_as::<_, BookInstanceListItem>(&format!(
            "{SELECT_LIST_ITEMS} ORDER BY b.title, i.id"
        ))
        .fetch(&self.executor)
        .take(MAX_LIMIT)
        .try_collect::<Vec<_>>()
        .await?;
        Ok(records)
    }

    pub async fn list_for_book(&self, book_id: i64) -> Result<Vec<BookInstance>> {
        let records = sqlx::query_as::<_, BookInstance>(
            "SELECT id, book_id, imprint, status, due_back FROM book_instance WHERE book_id = ? ORDER BY id",
        )
        .bind(book_id)
        .fetch(&self.executor)
        .take(MAX_LIMIT)
        .try_collect::<Vec<_>>()
        .await?;
        Ok(records)
    }

    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM book_instance")
            .fetch_one(&self.executor)
            .await?;
        Ok(count)
    }

    pub async fn count_by_status(&self, status: BookStatus) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM book_instance WHERE status = ?")
            .bind(status.as_str())
            .fetch_one(&self.executor)
            .await?;
        Ok(count)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let res = sqlx::query("DELETE FROM book_instance WHERE id = ?")
            .bind(id)
            .execute(&self.executor)
            .await?;

        if res.rows_affected() == 0 {
            Err(Error::RecordNotFound("BookInstance".to_string()))
        } else {
            debug!(id, "Deleted book instance");
            Ok(())
        }
    }
}
