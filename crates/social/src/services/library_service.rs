//! Library service: game collections, gamertags, and compatibility comparison.

use gamelink_database::{
    CreateGameRequest, CreateGamertagRequest, GameRecord, GameRepository, Gamertag,
    GamertagRepository, Platform, UpdateGameRequest,
};
use sqlx::SqlitePool;
use tracing::info;

use crate::compatibility::{score_compatibility, CompatibilityReport};
use crate::types::{SocialError, SocialResult};
use crate::utils::Validator;

/// Result of adding a game, with an optional soft-duplicate warning for the UI
#[derive(Debug, Clone)]
pub struct AddGameOutcome {
    pub game: GameRecord,
    /// Set when an entry with the same name and platform already exists.
    /// Purely informational; the insert still happened.
    pub duplicate_warning: Option<String>,
}

/// Service for managing a user's game library and gamertags
pub struct LibraryService {
    games: GameRepository,
    gamertags: GamertagRepository,
}

impl LibraryService {
    /// Create a new library service instance
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            games: GameRepository::new(pool.clone()),
            gamertags: GamertagRepository::new(pool),
        }
    }

    /// Add a game to a user's library, surfacing a soft duplicate warning
    /// when an entry with the same name and platform already exists
    pub async fn add_game(&self, owner_id: i64, request: &CreateGameRequest) -> SocialResult<AddGameOutcome> {
        Validator::game_name(&request.name)?;
        if let Some(rating) = request.rating {
            Validator::rating(rating)?;
        }

        let platform = Platform::from(request.platform.as_str());
        let duplicate = self
            .games
            .find_name_duplicate(owner_id, &request.name, platform)
            .await?;

        let game = self.games.create(owner_id, request).await?;

        let duplicate_warning = duplicate.map(|existing| {
            format!(
                "You already have \"{}\" on {} in your library.",
                existing.name,
                existing.platform.display_name()
            )
        });

        Ok(AddGameOutcome {
            game,
            duplicate_warning,
        })
    }

    /// List a user's full library
    pub async fn list_games(&self, owner_id: i64) -> SocialResult<Vec<GameRecord>> {
        Ok(self.games.find_by_owner(owner_id).await?)
    }

    /// Edit a library entry
    pub async fn update_game(
        &self,
        game_id: i64,
        owner_id: i64,
        request: &UpdateGameRequest,
    ) -> SocialResult<GameRecord> {
        if let Some(ref name) = request.name {
            Validator::game_name(name)?;
        }
        if let Some(Some(rating)) = request.rating {
            Validator::rating(rating)?;
        }

        Ok(self.games.update(game_id, owner_id, request).await?)
    }

    /// Remove a library entry
    pub async fn remove_game(&self, game_id: i64, owner_id: i64) -> SocialResult<()> {
        Ok(self.games.delete(game_id, owner_id).await?)
    }

    /// Compare two users' owned games and produce a compatibility report.
    /// Comparing a user with themselves is rejected before any loading.
    pub async fn compare_libraries(&self, user_id: i64, other_user_id: i64) -> SocialResult<CompatibilityReport> {
        if user_id == other_user_id {
            return Err(SocialError::SelfComparison);
        }

        let first = self.games.find_owned_by_owner(user_id).await?;
        let second = self.games.find_owned_by_owner(other_user_id).await?;

        let report = score_compatibility(&first, &second);

        info!(
            user_id = user_id,
            other_user_id = other_user_id,
            score = report.score,
            rating = report.rating.label(),
            "computed library compatibility"
        );

        Ok(report)
    }

    /// Register a gamertag for a platform
    pub async fn register_gamertag(&self, owner_id: i64, request: &CreateGamertagRequest) -> SocialResult<Gamertag> {
        Validator::gamertag(&request.tag)?;

        let platform = Platform::from(request.platform.as_str());
        Ok(self.gamertags.create(owner_id, platform, request.tag.trim()).await?)
    }

    /// List a user's gamertags
    pub async fn list_gamertags(&self, owner_id: i64) -> SocialResult<Vec<Gamertag>> {
        Ok(self.gamertags.find_by_owner(owner_id).await?)
    }

    /// Remove a gamertag
    pub async fn remove_gamertag(&self, gamertag_id: i64, owner_id: i64) -> SocialResult<()> {
        Ok(self.gamertags.delete(gamertag_id, owner_id).await?)
    }
}
