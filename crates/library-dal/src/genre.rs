use futures::{StreamExt as _, TryStreamExt as _};
use garde::Validate;
use serde::{Deserialize, Serialize};
use sqlx::Pool;
use tracing::debug;

use crate::{
    ChosenDB, MAX_LIMIT,
    error::{Error, Result},
};

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct CreateGenre {
    #[garde(length(min = 3, max = 600))]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

impl Genre {
    pub fn url(&self) -> String {
        format!("/catalog/genre/{}", self.id)
    }
}

pub type GenreRepository = GenreRepositoryImpl<Pool<ChosenDB>>;

pub struct GenreRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> GenreRepositoryImpl<E>
where
    for<'a> &'a E: sqlx::Executor<'c, Database = ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn create(&self, payload: CreateGenre) -> Result<Genre> {
        let result = sqlx::query("INSERT INTO genre (name) VALUES (?)")
            .bind(&payload.name)
            .execute(&self.executor)
            .await?;

        let id = result.last_insert_rowid();
        debug!(id, "Created genre");
        self.get(id).await
    }

    pub async fn update(&self, id: i64, payload: CreateGenre) -> Result<Genre> {
        let result = sqlx::query("UPDATE genre SET name = ? WHERE id = ?")
            .bind(&payload.name)
            .bind(id)
            .execute(&self.executor)
            .await?;

        if result.rows_affected() == 0 {
            Err(Error::RecordNotFound("Genre".to_string()))
        } else {
            debug!(id, "Updated genre");
            self.get(id).await
        }
    }

    pub async fn get(&self, id: i64) -> Result<Genre> {
        get(id, &self.executor).await
    }

    pub async fn list(&self) -> Result<Vec<Genre>> {
        let records =
            sqlx::query_as::<_, Genre>("SELECT id, name FROM genre ORDER BY name, id")
                .fetch(&self.executor)
                .take(MAX_LIMIT)
                .try_collect::<Vec<_>>()
                .await?;
        Ok(records)
    }

    /// Genres linked to the book, ordered by name
    pub async fn list_for_book(&self, book_id: i64) -> Result<Vec<Genre>> {
        let records = sqlx::query_as::<_, Genre>(
            "SELECT g.id, g.name FROM genre g JOIN book_genre bg ON bg.genre_id = g.id WHERE bg.book_id = ? ORDER BY g.name, g.id",
        )
        .bind(book_id)
        .fetch(&self.executor)
        .take(MAX_LIMIT)
        .try_collect::<Vec<_>>()
        .await?;
        Ok(records)
    }

    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM genre")
            .fetch_one(&self.executor)
            .await?;
        Ok(count)
    }
}

pub(crate) async fn get<'c, E>(id: i64, executor: E) -> Result<Genre>
where
    E: sqlx::Executor<'c, Database = ChosenDB>,
{
    sqlx::query_as::<_, Genre>("SELECT id, name FROM genre WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| Error::RecordNotFound("Genre".to_string()))
}

pub(crate) async fn delete<'c, E>(id: i64, executor: E) -> Result<()>
where
    E: sqlx::Executor<'c, Database = ChosenDB>,
{
    let res = sqlx::query("DELETE FROM genre WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;

    if res.rows_affected() == 0 {
        Err(Error::RecordNotFound("Genre".to_string()))
    } else {
        Ok(())
    }
}
