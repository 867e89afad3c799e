//! Repository for gamertag data access operations.

use crate::entities::{Gamertag, Platform};
use crate::types::{LibraryError, LibraryResult};
use sqlx::{Row, SqlitePool};
use tracing::info;

/// Repository for gamertag database operations
pub struct GamertagRepository {
    pool: SqlitePool,
}

impl GamertagRepository {
    /// Create a new gamertag repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find all gamertags registered by a user
    pub async fn find_by_owner(&self, owner_id: i64) -> LibraryResult<Vec<Gamertag>> {
        let rows = sqlx::query(
            "SELECT id, owner_id, platform, tag, created_at
             FROM gamertags WHERE owner_id = ? ORDER BY platform ASC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| LibraryError::DatabaseError(e.to_string()))?;

        let tags = rows
            .into_iter()
            .map(|row| {
                let platform_str: String = row
                    .try_get("platform")
                    .map_err(|e| LibraryError::DatabaseError(e.to_string()))?;

                Ok(Gamertag {
                    id: row
                        .try_get("id")
                        .map_err(|e| LibraryError::DatabaseError(e.to_string()))?,
                    owner_id: row
                        .try_get("owner_id")
                        .map_err(|e| LibraryError::DatabaseError(e.to_string()))?,
                    platform: Platform::from(platform_str.as_str()),
                    tag: row
                        .try_get("tag")
                        .map_err(|e| LibraryError::DatabaseError(e.to_string()))?,
                    created_at: row
                        .try_get("created_at")
                        .map_err(|e| LibraryError::DatabaseError(e.to_string()))?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tags)
    }

    /// Register a gamertag. One tag per platform per user.
    pub async fn create(&self, owner_id: i64, platform: Platform, tag: &str) -> LibraryResult<Gamertag> {
        let gamertag = Gamertag::new(owner_id, platform, tag.to_string());
        gamertag.validate().map_err(LibraryError::ValidationError)?;

        let result = sqlx::query(
            "INSERT INTO gamertags (owner_id, platform, tag, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(gamertag.owner_id)
        .bind(String::from(gamertag.platform))
        .bind(&gamertag.tag)
        .bind(&gamertag.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_unique_violation() => LibraryError::GamertagAlreadyRegistered,
            _ => LibraryError::DatabaseError(e.to_string()),
        })?;

        let gamertag_id = result.last_insert_rowid();

        info!(
            gamertag_id = gamertag_id,
            owner_id = owner_id,
            platform = %String::from(platform),
            "registered gamertag"
        );

        Ok(Gamertag { id: gamertag_id, ..gamertag })
    }

    /// Remove a gamertag
    pub async fn delete(&self, id: i64, owner_id: i64) -> LibraryResult<()> {
        let result = sqlx::query("DELETE FROM gamertags WHERE id = ? AND owner_id = ?")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(|e| LibraryError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(LibraryError::GamertagNotFound);
        }

        info!(gamertag_id = id, owner_id = owner_id, "removed gamertag");
        Ok(())
    }
}
