//! Repository for game-library data access operations.

use crate::entities::{CreateGameRequest, GameRecord, OwnershipStatus, Platform, UpdateGameRequest};
use crate::types::{LibraryError, LibraryResult};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{info, warn};

/// Repository for game-library database operations
pub struct GameRepository {
    pool: SqlitePool,
}

fn map_game_row(row: &SqliteRow) -> LibraryResult<GameRecord> {
    let platform_str: String = row
        .try_get("platform")
        .map_err(|e| LibraryError::DatabaseError(e.to_string()))?;
    let ownership_str: String = row
        .try_get("ownership")
        .map_err(|e| LibraryError::DatabaseError(e.to_string()))?;
    let genres_json: String = row
        .try_get("genres")
        .map_err(|e| LibraryError::DatabaseError(e.to_string()))?;

    Ok(GameRecord {
        id: row
            .try_get("id")
            .map_err(|e| LibraryError::DatabaseError(e.to_string()))?,
        owner_id: row
            .try_get("owner_id")
            .map_err(|e| LibraryError::DatabaseError(e.to_string()))?,
        external_id: row
            .try_get("external_id")
            .map_err(|e| LibraryError::DatabaseError(e.to_string()))?,
        name: row
            .try_get("name")
            .map_err(|e| LibraryError::DatabaseError(e.to_string()))?,
        platform: Platform::from(platform_str.as_str()),
        genres: serde_json::from_str(&genres_json).unwrap_or_default(),
        ownership: OwnershipStatus::from(ownership_str.as_str()),
        rating: row
            .try_get("rating")
            .map_err(|e| LibraryError::DatabaseError(e.to_string()))?,
        favorite: row
            .try_get("favorite")
            .map_err(|e| LibraryError::DatabaseError(e.to_string()))?,
        created_at: row
            .try_get("created_at")
            .map_err(|e| LibraryError::DatabaseError(e.to_string()))?,
        updated_at: row
            .try_get("updated_at")
            .map_err(|e| LibraryError::DatabaseError(e.to_string()))?,
    })
}

const GAME_COLUMNS: &str =
    "id, owner_id, external_id, name, platform, genres, ownership, rating, favorite, created_at, updated_at";

impl GameRepository {
    /// Create a new game repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a library entry by ID
    pub async fn find_by_id(&self, id: i64) -> LibraryResult<Option<GameRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {GAME_COLUMNS} FROM game_records WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| LibraryError::DatabaseError(e.to_string()))?;

        row.as_ref().map(map_game_row).transpose()
    }

    /// Find all library entries for a user
    pub async fn find_by_owner(&self, owner_id: i64) -> LibraryResult<Vec<GameRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {GAME_COLUMNS} FROM game_records WHERE owner_id = ? ORDER BY name ASC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| LibraryError::DatabaseError(e.to_string()))?;

        rows.iter().map(map_game_row).collect()
    }

    /// Find a user's owned games, the input to compatibility comparison
    pub async fn find_owned_by_owner(&self, owner_id: i64) -> LibraryResult<Vec<GameRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {GAME_COLUMNS} FROM game_records WHERE owner_id = ? AND ownership = 'owned' ORDER BY name ASC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| LibraryError::DatabaseError(e.to_string()))?;

        rows.iter().map(map_game_row).collect()
    }

    /// Look for an entry with the same lowercased name and platform. Used for
    /// a soft duplicate warning in the UI, never as an enforced constraint.
    pub async fn find_name_duplicate(
        &self,
        owner_id: i64,
        name: &str,
        platform: Platform,
    ) -> LibraryResult<Option<GameRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {GAME_COLUMNS} FROM game_records
             WHERE owner_id = ? AND LOWER(name) = LOWER(?) AND platform = ?"
        ))
        .bind(owner_id)
        .bind(name)
        .bind(String::from(platform))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| LibraryError::DatabaseError(e.to_string()))?;

        row.as_ref().map(map_game_row).transpose()
    }

    /// Add a game to a user's library
    pub async fn create(&self, owner_id: i64, request: &CreateGameRequest) -> LibraryResult<GameRecord> {
        let game = GameRecord::new(owner_id, request);
        game.validate().map_err(LibraryError::ValidationError)?;

        let genres_json = serde_json::to_string(&game.genres)
            .map_err(|e| LibraryError::DatabaseError(e.to_string()))?;

        let result = sqlx::query(
            "INSERT INTO game_records (owner_id, external_id, name, platform, genres, ownership, rating, favorite, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(game.owner_id)
        .bind(game.external_id)
        .bind(&game.name)
        .bind(String::from(game.platform))
        .bind(&genres_json)
        .bind(String::from(game.ownership))
        .bind(game.rating)
        .bind(game.favorite)
        .bind(&game.created_at)
        .bind(&game.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_unique_violation() => LibraryError::DuplicateGame,
            _ => LibraryError::DatabaseError(e.to_string()),
        })?;

        let game_id = result.last_insert_rowid();

        info!(
            game_id = game_id,
            owner_id = owner_id,
            name = %game.name,
            platform = %String::from(game.platform),
            "added game to library"
        );

        Ok(GameRecord { id: game_id, ..game })
    }

    /// Edit a library entry. Absent request fields are left untouched.
    pub async fn update(&self, id: i64, owner_id: i64, request: &UpdateGameRequest) -> LibraryResult<GameRecord> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or(LibraryError::GameNotFound)?;

        if existing.owner_id != owner_id {
            warn!(game_id = id, owner_id = owner_id, "rejected edit of another user's game");
            return Err(LibraryError::GameNotFound);
        }

        let mut updated = existing;
        if let Some(ref name) = request.name {
            updated.name = name.clone();
        }
        if let Some(ref platform) = request.platform {
            updated.platform = Platform::from(platform.as_str());
        }
        if let Some(ref genres) = request.genres {
            updated.genres = genres.clone();
        }
        if let Some(ref ownership) = request.ownership {
            updated.ownership = OwnershipStatus::from(ownership.as_str());
        }
        if let Some(rating) = request.rating {
            updated.rating = rating;
        }
        if let Some(favorite) = request.favorite {
            updated.favorite = favorite;
        }
        updated.updated_at = chrono::Utc::now().to_rfc3339();

        updated.validate().map_err(LibraryError::ValidationError)?;

        let genres_json = serde_json::to_string(&updated.genres)
            .map_err(|e| LibraryError::DatabaseError(e.to_string()))?;

        sqlx::query(
            "UPDATE game_records
             SET name = ?, platform = ?, genres = ?, ownership = ?, rating = ?, favorite = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&updated.name)
        .bind(String::from(updated.platform))
        .bind(&genres_json)
        .bind(String::from(updated.ownership))
        .bind(updated.rating)
        .bind(updated.favorite)
        .bind(&updated.updated_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| LibraryError::DatabaseError(e.to_string()))?;

        info!(game_id = id, owner_id = owner_id, "updated library entry");

        Ok(updated)
    }

    /// Remove a library entry. No cascading effects elsewhere.
    pub async fn delete(&self, id: i64, owner_id: i64) -> LibraryResult<()> {
        let result = sqlx::query("DELETE FROM game_records WHERE id = ? AND owner_id = ?")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(|e| LibraryError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(LibraryError::GameNotFound);
        }

        info!(game_id = id, owner_id = owner_id, "removed game from library");
        Ok(())
    }

    /// Count a user's owned games
    pub async fn count_owned(&self, owner_id: i64) -> LibraryResult<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) as count FROM game_records WHERE owner_id = ? AND ownership = 'owned'",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| LibraryError::DatabaseError(e.to_string()))?;

        row.try_get("count")
            .map_err(|e| LibraryError::DatabaseError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::test_support::create_test_pool;

    fn halo_request() -> CreateGameRequest {
        CreateGameRequest {
            external_id: Some(1),
            name: "Halo Infinite".to_string(),
            platform: "xbox".to_string(),
            genres: vec!["Shooter".to_string()],
            ownership: None,
            rating: Some(9),
            favorite: true,
        }
    }

    #[tokio::test]
    async fn test_create_and_find_game() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = GameRepository::new(pool);

        let created = repo.create(1, &halo_request()).await.unwrap();
        assert!(created.id > 0);
        assert_eq!(created.ownership, OwnershipStatus::Owned);

        let found = repo.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Halo Infinite");
        assert_eq!(found.platform, Platform::Xbox);
        assert_eq!(found.genres, vec!["Shooter".to_string()]);
        assert_eq!(found.rating, Some(9));
        assert!(found.favorite);
    }

    #[tokio::test]
    async fn test_duplicate_external_id_rejected() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = GameRepository::new(pool);

        repo.create(1, &halo_request()).await.unwrap();
        let result = repo.create(1, &halo_request()).await;
        assert!(matches!(result, Err(LibraryError::DuplicateGame)));

        // The same catalog entry on another platform is a separate record
        let mut on_pc = halo_request();
        on_pc.platform = "pc".to_string();
        assert!(repo.create(1, &on_pc).await.is_ok());

        // Another user may hold the same game
        assert!(repo.create(2, &halo_request()).await.is_ok());
    }

    #[tokio::test]
    async fn test_manual_entries_may_repeat_names() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = GameRepository::new(pool);

        let mut manual = halo_request();
        manual.external_id = None;

        repo.create(1, &manual).await.unwrap();
        // No enforced uniqueness without an external id
        repo.create(1, &manual).await.unwrap();

        let duplicate = repo
            .find_name_duplicate(1, "halo infinite", Platform::Xbox)
            .await
            .unwrap();
        assert!(duplicate.is_some());
    }

    #[tokio::test]
    async fn test_find_owned_excludes_wishlist() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = GameRepository::new(pool);

        repo.create(1, &halo_request()).await.unwrap();

        let mut wishlist = halo_request();
        wishlist.external_id = Some(2);
        wishlist.name = "Starfield".to_string();
        wishlist.ownership = Some("wishlist".to_string());
        repo.create(1, &wishlist).await.unwrap();

        let owned = repo.find_owned_by_owner(1).await.unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].name, "Halo Infinite");
        assert_eq!(repo.count_owned(1).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_game() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = GameRepository::new(pool);

        let created = repo.create(1, &halo_request()).await.unwrap();

        let request = UpdateGameRequest {
            ownership: Some("completed".to_string()),
            rating: Some(Some(10)),
            ..Default::default()
        };
        let updated = repo.update(created.id, 1, &request).await.unwrap();

        assert_eq!(updated.ownership, OwnershipStatus::Completed);
        assert_eq!(updated.rating, Some(10));
        assert_eq!(updated.name, "Halo Infinite");
    }

    #[tokio::test]
    async fn test_update_rejects_foreign_owner() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = GameRepository::new(pool);

        let created = repo.create(1, &halo_request()).await.unwrap();
        let request = UpdateGameRequest {
            favorite: Some(false),
            ..Default::default()
        };

        let result = repo.update(created.id, 2, &request).await;
        assert!(matches!(result, Err(LibraryError::GameNotFound)));
    }

    #[tokio::test]
    async fn test_delete_game() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = GameRepository::new(pool);

        let created = repo.create(1, &halo_request()).await.unwrap();
        repo.delete(created.id, 1).await.unwrap();

        assert!(repo.find_by_id(created.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(created.id, 1).await,
            Err(LibraryError::GameNotFound)
        ));
    }

    #[tokio::test]
    async fn test_invalid_rating_rejected() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = GameRepository::new(pool);

        let mut request = halo_request();
        request.rating = Some(11);
        assert!(repo.create(1, &request).await.is_err());
    }
}
