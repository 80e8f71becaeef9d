use futures::TryStreamExt as _;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// Genre as submitted for creation, name is expected to be already sanitized.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CreateGenre {
    pub name: String,
}

#[derive(Clone)]
pub struct GenreRepository {
    executor: crate::Pool,
}

impl GenreRepository {
    pub fn new(executor: crate::Pool) -> Self {
        Self { executor }
    }

    /// All genres ordered by name, using the store's binary collation.
    pub async fn list_all(&self) -> Result<Vec<Genre>> {
        let records = sqlx::query_as::<_, Genre>("SELECT id, name FROM genre ORDER BY name ASC")
            .fetch(&self.executor)
            .try_collect::<Vec<_>>()
            .await?;
        Ok(records)
    }

    pub async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM genre")
            .fetch_one(&self.executor)
            .await?;
        Ok(count as u64)
    }

    pub async fn find(&self, id: i64) -> Result<Option<Genre>> {
        let record = sqlx::query_as::<_, Genre>("SELECT id, name FROM genre WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.executor)
            .await?;
        Ok(record)
    }

    pub async fn get(&self, id: i64) -> Result<Genre> {
        self.find(id)
            .await?
            .ok_or_else(|| Error::RecordNotFound("Genre".to_string()))
    }

    /// Exact, case sensitive match on name.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Genre>> {
        let record =
            sqlx::query_as::<_, Genre>("SELECT id, name FROM genre WHERE name = ? LIMIT 1")
                .bind(name)
                .fetch_optional(&self.executor)
                .await?;
        Ok(record)
    }

    pub async fn create(&self, payload: CreateGenre) -> Result<Genre> {
        let result = sqlx::query("INSERT INTO genre (name) VALUES (?)")
            .bind(&payload.name)
            .execute(&self.executor)
            .await?;
        let id = result.last_insert_rowid();
        debug!("Inserted genre {id}");
        Ok(Genre {
            id,
            name: payload.name,
        })
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let res = sqlx::query("DELETE FROM genre WHERE id = ?")
            .bind(id)
            .execute(&self.executor)
            .await?;

        if res.rows_affected() == 0 {
            Err(Error::RecordNotFound("Genre".to_string()))
        } else {
            Ok(())
        }
    }
}
