//! Repository for session-invite data access operations.

use crate::entities::{InviteStatus, SessionInvite, SessionParticipant};
use crate::types::{SessionError, SessionResult};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

/// Repository for session-invite database operations
pub struct InviteRepository {
    pool: SqlitePool,
}

const INVITE_COLUMNS: &str =
    "id, public_id, session_id, inviter_id, invited_user_id, status, message, created_at, responded_at";

fn map_invite_row(row: &SqliteRow) -> SessionResult<SessionInvite> {
    let status_str: String = row
        .try_get("status")
        .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

    Ok(SessionInvite {
        id: row
            .try_get("id")
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?,
        public_id: row
            .try_get("public_id")
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?,
        session_id: row
            .try_get("session_id")
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?,
        inviter_id: row
            .try_get("inviter_id")
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?,
        invited_user_id: row
            .try_get("invited_user_id")
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?,
        status: InviteStatus::from(status_str.as_str()),
        message: row
            .try_get("message")
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?,
        created_at: row
            .try_get("created_at")
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?,
        responded_at: row
            .try_get("responded_at")
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?,
    })
}

impl InviteRepository {
    /// Create a new invite repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find an invite by public ID
    pub async fn find_by_public_id(&self, public_id: &str) -> SessionResult<Option<SessionInvite>> {
        let row = sqlx::query(&format!(
            "SELECT {INVITE_COLUMNS} FROM session_invites WHERE public_id = ?"
        ))
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        row.as_ref().map(map_invite_row).transpose()
    }

    /// Find all invites for a session
    pub async fn find_by_session(&self, session_id: i64) -> SessionResult<Vec<SessionInvite>> {
        let rows = sqlx::query(&format!(
            "SELECT {INVITE_COLUMNS} FROM session_invites WHERE session_id = ? ORDER BY created_at DESC"
        ))
        .bind(session_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        rows.iter().map(map_invite_row).collect()
    }

    /// Find pending invites addressed to a user
    pub async fn find_pending_for_user(&self, user_id: i64) -> SessionResult<Vec<SessionInvite>> {
        let rows = sqlx::query(&format!(
            "SELECT {INVITE_COLUMNS} FROM session_invites
             WHERE invited_user_id = ? AND status = 'pending' ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        rows.iter().map(map_invite_row).collect()
    }

    /// Find an invite for a user in a session carrying a given status.
    /// Invite-only join checks look for an accepted one.
    pub async fn find_by_session_user_status(
        &self,
        session_id: i64,
        user_id: i64,
        status: InviteStatus,
    ) -> SessionResult<Option<SessionInvite>> {
        let row = sqlx::query(&format!(
            "SELECT {INVITE_COLUMNS} FROM session_invites
             WHERE session_id = ? AND invited_user_id = ? AND status = ?
             ORDER BY created_at DESC LIMIT 1"
        ))
        .bind(session_id)
        .bind(user_id)
        .bind(String::from(status))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        row.as_ref().map(map_invite_row).transpose()
    }

    /// Create a new invite
    pub async fn create(
        &self,
        session_id: i64,
        inviter_id: i64,
        invited_user_id: i64,
        message: Option<String>,
    ) -> SessionResult<SessionInvite> {
        let invite = SessionInvite::new(session_id, inviter_id, invited_user_id, message);

        let result = sqlx::query(
            "INSERT INTO session_invites (public_id, session_id, inviter_id, invited_user_id, status, message, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&invite.public_id)
        .bind(invite.session_id)
        .bind(invite.inviter_id)
        .bind(invite.invited_user_id)
        .bind(String::from(invite.status))
        .bind(&invite.message)
        .bind(&invite.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        let invite_id = result.last_insert_rowid();

        info!(
            invite_id = invite_id,
            public_id = %invite.public_id,
            session_id = session_id,
            inviter_id = inviter_id,
            invited_user_id = invited_user_id,
            "created session invite"
        );

        Ok(SessionInvite { id: invite_id, ..invite })
    }

    /// Accept a pending invite and insert the joined participant row in one
    /// transaction, so concurrent readers never observe one without the other.
    pub async fn accept_and_join(&self, invite: &SessionInvite) -> SessionResult<(SessionInvite, SessionParticipant)> {
        if !invite.is_pending() {
            return Err(SessionError::InviteAlreadyResponded);
        }

        let now = chrono::Utc::now().to_rfc3339();
        let participant = SessionParticipant::new(invite.session_id, invite.invited_user_id);

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        // Re-check pending-ness inside the transaction; a racing accept loses here.
        let updated = sqlx::query(
            "UPDATE session_invites SET status = 'accepted', responded_at = ? WHERE id = ? AND status = 'pending'",
        )
        .bind(&now)
        .bind(invite.id)
        .execute(&mut *tx)
        .await
        .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        if updated.rows_affected() == 0 {
            return Err(SessionError::InviteAlreadyResponded);
        }

        let result = sqlx::query(
            "INSERT INTO session_participants (session_id, user_id, status, joined_at) VALUES (?, ?, ?, ?)",
        )
        .bind(participant.session_id)
        .bind(participant.user_id)
        .bind(String::from(participant.status))
        .bind(&participant.joined_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_unique_violation() => SessionError::AlreadyParticipant,
            _ => SessionError::DatabaseError(e.to_string()),
        })?;

        tx.commit()
            .await
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        info!(
            invite_id = invite.id,
            session_id = invite.session_id,
            user_id = invite.invited_user_id,
            "invite accepted, participant joined"
        );

        let mut accepted = invite.clone();
        accepted.status = InviteStatus::Accepted;
        accepted.responded_at = Some(now);

        let participant = SessionParticipant {
            id: result.last_insert_rowid(),
            ..participant
        };

        Ok((accepted, participant))
    }

    /// Decline a pending invite. No side effects.
    pub async fn decline(&self, invite: &SessionInvite) -> SessionResult<SessionInvite> {
        if !invite.is_pending() {
            return Err(SessionError::InviteAlreadyResponded);
        }

        let now = chrono::Utc::now().to_rfc3339();

        let updated = sqlx::query(
            "UPDATE session_invites SET status = 'declined', responded_at = ? WHERE id = ? AND status = 'pending'",
        )
        .bind(&now)
        .bind(invite.id)
        .execute(&self.pool)
        .await
        .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        if updated.rows_affected() == 0 {
            return Err(SessionError::InviteAlreadyResponded);
        }

        info!(invite_id = invite.id, session_id = invite.session_id, "invite declined");

        let mut declined = invite.clone();
        declined.status = InviteStatus::Declined;
        declined.responded_at = Some(now);
        Ok(declined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::test_support::create_test_pool;
    use crate::repos::ParticipantRepository;

    async fn create_session(pool: &SqlitePool, host_id: i64) -> i64 {
        let repo = crate::repos::SessionRepository::new(pool.clone());
        let request = crate::entities::CreateSessionRequest {
            title: "invite test".to_string(),
            game_name: "Valheim".to_string(),
            platform: None,
            scheduled_at: (chrono::Utc::now() + chrono::Duration::hours(1)).to_rfc3339(),
            max_participants: Some(4),
            privacy: Some("invite_only".to_string()),
            invited_user_ids: vec![],
        };
        repo.create(host_id, &request, 4).await.unwrap().id
    }

    #[tokio::test]
    async fn test_create_and_find_invite() {
        let (pool, _temp_dir) = create_test_pool().await;
        let session_id = create_session(&pool, 1).await;
        let repo = InviteRepository::new(pool);

        let created = repo.create(session_id, 1, 2, Some("come play".to_string())).await.unwrap();
        assert!(created.id > 0);
        assert_eq!(created.status, InviteStatus::Pending);

        let found = repo.find_by_public_id(&created.public_id).await.unwrap().unwrap();
        assert_eq!(found.invited_user_id, 2);
        assert_eq!(found.message.as_deref(), Some("come play"));

        let pending = repo.find_pending_for_user(2).await.unwrap();
        assert_eq!(pending.len(), 1);
    }

    #[tokio::test]
    async fn test_accept_creates_participant() {
        let (pool, _temp_dir) = create_test_pool().await;
        let session_id = create_session(&pool, 1).await;
        let invites = InviteRepository::new(pool.clone());
        let participants = ParticipantRepository::new(pool);

        let invite = invites.create(session_id, 1, 2, None).await.unwrap();
        let (accepted, participant) = invites.accept_and_join(&invite).await.unwrap();

        assert_eq!(accepted.status, InviteStatus::Accepted);
        assert!(accepted.responded_at.is_some());
        assert_eq!(participant.session_id, session_id);
        assert_eq!(participant.user_id, 2);
        assert_eq!(participants.count_joined(session_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_double_accept_fails_without_duplicate_row() {
        let (pool, _temp_dir) = create_test_pool().await;
        let session_id = create_session(&pool, 1).await;
        let invites = InviteRepository::new(pool.clone());
        let participants = ParticipantRepository::new(pool);

        let invite = invites.create(session_id, 1, 2, None).await.unwrap();
        let (accepted, _) = invites.accept_and_join(&invite).await.unwrap();

        // A second call fails softly whether we pass the stale or updated row
        assert!(matches!(
            invites.accept_and_join(&invite).await,
            Err(SessionError::InviteAlreadyResponded)
        ));
        assert!(matches!(
            invites.accept_and_join(&accepted).await,
            Err(SessionError::InviteAlreadyResponded)
        ));

        assert_eq!(participants.count_joined(session_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_decline_has_no_side_effects() {
        let (pool, _temp_dir) = create_test_pool().await;
        let session_id = create_session(&pool, 1).await;
        let invites = InviteRepository::new(pool.clone());
        let participants = ParticipantRepository::new(pool);

        let invite = invites.create(session_id, 1, 2, None).await.unwrap();
        let declined = invites.decline(&invite).await.unwrap();

        assert_eq!(declined.status, InviteStatus::Declined);
        assert_eq!(participants.count_joined(session_id).await.unwrap(), 0);

        assert!(matches!(
            invites.decline(&declined).await,
            Err(SessionError::InviteAlreadyResponded)
        ));
    }

    #[tokio::test]
    async fn test_find_by_session_user_status() {
        let (pool, _temp_dir) = create_test_pool().await;
        let session_id = create_session(&pool, 1).await;
        let invites = InviteRepository::new(pool);

        let invite = invites.create(session_id, 1, 2, None).await.unwrap();

        assert!(invites
            .find_by_session_user_status(session_id, 2, InviteStatus::Accepted)
            .await
            .unwrap()
            .is_none());

        invites.accept_and_join(&invite).await.unwrap();

        assert!(invites
            .find_by_session_user_status(session_id, 2, InviteStatus::Accepted)
            .await
            .unwrap()
            .is_some());
    }
}
