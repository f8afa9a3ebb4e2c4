//! Delete guard for entities that books point to.
//!
//! An author or a genre can only be removed while no book references it. The
//! check and the delete are separate statements, a book created in between is
//! not detected.

use sqlx::Pool;
use tracing::{debug, info};

use crate::{
    ChosenDB,
    author::{self, Author},
    book::{self, BookShort},
    error::Result,
    genre::{self, Genre},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome<T> {
    Deleted(T),
    /// Nothing was removed, `dependents` lists the books that block the delete
    Blocked { entity: T, dependents: Vec<BookShort> },
}

impl<T> DeleteOutcome<T> {
    pub fn is_deleted(&self) -> bool {
        matches!(self, DeleteOutcome::Deleted(_))
    }
}

pub type IntegrityGuard = IntegrityGuardImpl<Pool<ChosenDB>>;

pub struct IntegrityGuardImpl<E> {
    executor: E,
}

impl<'c, E> IntegrityGuardImpl<E>
where
    for<'a> &'a E: sqlx::Executor<'c, Database = ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn author_dependents(&self, author_id: i64) -> Result<Vec<BookShort>> {
        book::list_by_author(author_id, &self.executor).await
    }

    pub async fn genre_dependents(&self, genre_id: i64) -> Result<Vec<BookShort>> {
        book::list_by_genre(genre_id, &self.executor).await
    }

    pub async fn delete_author(&self, id: i64) -> Result<DeleteOutcome<Author>> {
        let entity = author::get(id, &self.executor).await?;
        let dependents = self.author_dependents(id).await?;
        if !dependents.is_empty() {
            info!(id, books = dependents.len(), "Author has books, not deleting");
            return Ok(DeleteOutcome::Blocked { entity, dependents });
        }
        author::delete(id, &self.executor).await?;
        debug!(id, "Deleted author");
        Ok(DeleteOutcome::Deleted(entity))
    }

    pub async fn delete_genre(&self, id: i64) -> Result<DeleteOutcome<Genre>> {
        let entity = genre::get(id, &self.executor).await?;
        let dependents = self.genre_dependents(id).await?;
        if !dependents.is_empty() {
            info!(id, books = dependents.len(), "Genre is used by books, not deleting");
            return Ok(DeleteOutcome::Blocked { entity, dependents });
        }
        genre::delete(id, &self.executor).await?;
        debug!(id, "Deleted genre");
        Ok(DeleteOutcome::Deleted(entity))
    }
}
