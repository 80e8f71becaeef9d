use futures::TryStreamExt as _;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub summary: String,
    pub isbn: String,
    pub genre_id: Option<i64>,
}

/// Projection used when books are listed under a genre.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct BookShort {
    pub id: i64,
    pub title: String,
    pub summary: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreateBook {
    pub title: String,
    pub summary: String,
    pub isbn: String,
    pub genre_id: Option<i64>,
}

#[derive(Clone)]
pub struct BookRepository {
    executor: crate::Pool,
}

impl BookRepository {
    pub fn new(executor: crate::Pool) -> Self {
        Self { executor }
    }

    pub async fn create(&self, payload: CreateBook) -> Result<Book> {
        let result =
            sqlx::query("INSERT INTO book (title, summary, isbn, genre_id) VALUES (?, ?, ?, ?)")
                .bind(&payload.title)
                .bind(&payload.summary)
                .bind(&payload.isbn)
                .bind(payload.genre_id)
                .execute(&self.executor)
                .await?;
        self.get(result.last_insert_rowid()).await
    }

    pub async fn get(&self, id: i64) -> Result<Book> {
        sqlx::query_as::<_, Book>(
            "SELECT id, title, summary, isbn, genre_id FROM book WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.executor)
        .await?
        .ok_or_else(|| Error::RecordNotFound("Book".to_string()))
    }

    pub async fn list_by_genre(&self, genre_id: i64) -> Result<Vec<BookShort>> {
        let records = sqlx::query_as::<_, BookShort>(
            "SELECT id, title, summary FROM book WHERE genre_id = ? ORDER BY title",
        )
        .bind(genre_id)
        .fetch(&self.executor)
        .try_collect::<Vec<_>>()
        .await?;
        Ok(records)
    }
}
