use futures::{StreamExt as _, TryStreamExt as _};
use garde::Validate;
use serde::{Deserialize, Serialize};
use sqlx::Pool;
use time::Date;
use tracing::debug;

use crate::{
    ChosenDB, MAX_LIMIT,
    dates::format_date,
    error::{Error, Result},
};

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct CreateAuthor {
    #[garde(length(min = 2, max = 100))]
    pub first_name: String,
    #[garde(length(min = 2, max = 100))]
    pub last_name: String,
    #[garde(skip)]
    pub date_of_birth: Option<Date>,
    #[garde(skip)]
    pub date_of_death: Option<Date>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Author {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<Date>,
    pub date_of_death: Option<Date>,
}

impl Author {
    pub fn name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn life_span(&self) -> String {
        let birth = self
            .date_of_birth
            .map(format_date)
            .unwrap_or_else(|| "Not Available".to_string());
        let death = self
            .date_of_death
            .map(format_date)
            .unwrap_or_else(|| "Alive / Not Available".to_string());
        format!("{birth} - {death}")
    }

    pub fn url(&self) -> String {
        author_url(self.id)
    }
}

pub fn author_url(id: i64) -> String {
    format!("/catalog/author/{id}")
}

pub type AuthorRepository = AuthorRepositoryImpl<Pool<ChosenDB>>;

pub struct AuthorRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> AuthorRepositoryImpl<E>
where
    for<'a> &'a E: sqlx::Executor<'c, Database = ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn create(&self, payload: CreateAuthor) -> Result<Author> {
        let result = sqlx::query(
            "INSERT INTO author (first_name, last_name, date_of_birth, date_of_death) VALUES (?, ?, ?, ?)",
        )
        .bind(&payload.first_name)
        .bind(&payload.last_name)
        .bind(payload.date_of_birth)
        .bind(payload.date_of_death)
        .execute(&self.executor)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id, "Created author");
        self.get(id).await
    }

    /// Replaces all fields of the record
    pub async fn update(&self, id: i64, payload: CreateAuthor) -> Result<Author> {
        let result = sqlx::query(
            "UPDATE author SET first_name = ?, last_name = ?, date_of_birth = ?, date_of_death = ? WHERE id = ?",
        )
        .bind(&payload.first_name)
        .bind(&payload.last_name)
        .bind(payload.date_of_birth)
        .bind(payload.date_of_death)
        .bind(id)
        .execute(&self.executor)
        .await?;

        if result.rows_affected() == 0 {
            Err(Error::RecordNotFound("Author".to_string()))
        } else {
            debug!(id, "Updated author");
            self.get(id).await
        }
    }

    pub async fn get(&self, id: i64) -> Result<Author> {
        get(id, &self.executor).await
    }

    /// All authors ordered by last name, then first name
    pub async fn list(&self) -> Result<Vec<Author>> {
        let records = sqlx::query_as::<_, Author>(
            "SELECT id, first_name, last_name, date_of_birth, date_of_death FROM author ORDER BY last_name, first_name, id",
        )
        .fetch(&self.executor)
        .take(MAX_LIMIT)
        .try_collect::<Vec<_>>()
        .await?;
        Ok(records)
    }

    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM author")
            .fetch_one(&self.executor)
            .await?;
        Ok(count)
    }
}

pub(crate) async fn get<'c, E>(id: i64, executor: E) -> Result<Author>
where
    E: sqlx::Executor<'c, Database = ChosenDB>,
{
    sqlx::query_as::<_, Author>(
        "SELECT id, first_name, last_name, date_of_birth, date_of_death FROM author WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| Error::RecordNotFound("Author".to_string()))
}

pub(crate) async fn delete<'c, E>(id: i64, executor: E) -> Result<()>
where
    E: sqlx::Executor<'c, Database = ChosenDB>,
{
    let res = sqlx::query("DELETE FROM author WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;

    if res.rows_affected() == 0 {
        Err(Error::RecordNotFound("Author".to_string()))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn author(date_of_birth: Option<Date>, date_of_death: Option<Date>) -> Author {
        Author {
            id: 7,
            first_name: "Karel".to_string(),
            last_name: "Capek".to_string(),
            date_of_birth,
            date_of_death,
        }
    }

    #[test]
    fn test_derived_fields() {
        let a = author(Some(date!(1890 - 01 - 09)), Some(date!(1938 - 12 - 25)));
        assert_eq!("Karel Capek", a.name());
        assert_eq!("/catalog/author/7", a.url());
        assert_eq!("January 9th, 1890 - December 25th, 1938", a.life_span());
    }

    #[test]
    fn test_life_span_missing_dates() {
        let a = author(None, None);
        assert_eq!("Not Available - Alive / Not Available", a.life_span());
        let a = author(Some(date!(1971 - 06 - 02)), None);
        assert_eq!("June 2nd, 1971 - Alive / Not Available", a.life_span());
    }

    #[test]
    fn test_create_author_constraints() {
        let valid = CreateAuthor {
            first_name: "Al".to_string(),
            last_name: "Bo".to_string(),
            date_of_birth: None,
            date_of_death: None,
        };
        assert!(valid.validate().is_ok());
        let invalid = CreateAuthor {
            first_name: "A".to_string(),
            ..valid
        };
        assert!(invalid.validate().is_err());
    }
}
