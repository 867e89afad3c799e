//! Message service for session chat.

use std::sync::Arc;

use gamelink_database::{
    CreateMessageRequest, GamingSession, MessageKind, MessageRepository, ParticipantRepository,
    SessionError, SessionMessage, SessionRepository,
};
use sqlx::SqlitePool;

use crate::types::{NotificationSink, NullSink, SocialEvent, SocialResult};
use crate::utils::{PermissionChecker, Validator};

/// Default number of messages returned when listing a chat
const DEFAULT_MESSAGE_LIMIT: i64 = 100;

/// Service for managing session chat messages
pub struct MessageService {
    sessions: SessionRepository,
    participants: ParticipantRepository,
    messages: MessageRepository,
    sink: Arc<dyn NotificationSink>,
}

impl MessageService {
    /// Create a new message service instance
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_sink(pool, Arc::new(NullSink))
    }

    /// Create a message service with a notification sink
    pub fn with_sink(pool: SqlitePool, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            sessions: SessionRepository::new(pool.clone()),
            participants: ParticipantRepository::new(pool.clone()),
            messages: MessageRepository::new(pool),
            sink,
        }
    }

    /// Post a message into a session's chat. Hosts and joined participants
    /// only; announcements are host-only.
    pub async fn post_message(
        &self,
        session_public_id: &str,
        actor_id: i64,
        request: &CreateMessageRequest,
    ) -> SocialResult<SessionMessage> {
        Validator::message_body(&request.body)?;

        let session = self.require_session(session_public_id).await?;
        let is_active_participant = self
            .participants
            .find_active(session.id, actor_id)
            .await?
            .is_some();

        PermissionChecker::can_post_message(&session, actor_id, is_active_participant)?;

        let kind = request.kind.as_deref().map(MessageKind::from).unwrap_or(MessageKind::Text);
        if kind == MessageKind::Announcement && !session.is_host(actor_id) {
            return Err(SessionError::Unauthorized.into());
        }

        let message = self
            .messages
            .create(session.id, actor_id, &request.body, kind)
            .await?;

        let participant_ids: Vec<i64> = self
            .participants
            .find_joined_by_session(session.id)
            .await?
            .iter()
            .map(|p| p.user_id)
            .collect();

        self.sink.deliver(&SocialEvent::MessagePosted {
            session_public_id: session.public_id.clone(),
            message: message.clone(),
            participant_ids,
        });

        Ok(message)
    }

    /// List a session's chat, oldest first
    pub async fn list_messages(
        &self,
        session_public_id: &str,
        actor_id: i64,
        limit: Option<i64>,
    ) -> SocialResult<Vec<SessionMessage>> {
        let session = self.require_session(session_public_id).await?;

        let is_participant = self
            .participants
            .find_active(session.id, actor_id)
            .await?
            .is_some();
        PermissionChecker::can_view_session(&session, actor_id, is_participant, false)?;

        Ok(self
            .messages
            .find_by_session(session.id, limit.unwrap_or(DEFAULT_MESSAGE_LIMIT))
            .await?)
    }

    /// Edit a message. Author only; the old body is discarded.
    pub async fn edit_message(
        &self,
        message_public_id: &str,
        actor_id: i64,
        new_body: &str,
    ) -> SocialResult<SessionMessage> {
        Validator::message_body(new_body)?;

        let message = self.require_message(message_public_id).await?;
        PermissionChecker::can_edit_message(&message, actor_id)?;

        Ok(self.messages.update_body(message.id, new_body).await?)
    }

    /// Delete a message. Author, or the session host moderating their chat.
    pub async fn delete_message(&self, message_public_id: &str, actor_id: i64) -> SocialResult<()> {
        let message = self.require_message(message_public_id).await?;
        let session = self
            .sessions
            .find_by_id(message.session_id)
            .await?
            .ok_or(SessionError::SessionNotFound)?;

        PermissionChecker::can_delete_message(&message, &session, actor_id)?;

        Ok(self.messages.delete(message.id).await?)
    }

    async fn require_session(&self, public_id: &str) -> SocialResult<GamingSession> {
        Ok(self
            .sessions
            .find_by_public_id(public_id)
            .await?
            .ok_or(SessionError::SessionNotFound)?)
    }

    async fn require_message(&self, public_id: &str) -> SocialResult<SessionMessage> {
        Ok(self
            .messages
            .find_by_public_id(public_id)
            .await?
            .ok_or(SessionError::MessageNotFound)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::SessionService;
    use crate::types::SocialError;
    use gamelink_config::SessionsConfig;
    use gamelink_database::CreateSessionRequest;

    async fn create_test_pool() -> (SqlitePool, tempfile::TempDir) {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let config = gamelink_config::DatabaseConfig {
            url: format!("sqlite://{}", db_path.display()),
            max_connections: 1,
        };
        let pool = gamelink_database::initialize_database(&config).await.unwrap();
        (pool, temp_dir)
    }

    async fn create_session_with_member(pool: &SqlitePool) -> String {
        let sessions = SessionService::new(pool.clone(), SessionsConfig::default());
        let request = CreateSessionRequest {
            title: "chat test".to_string(),
            game_name: "Lethal Company".to_string(),
            platform: None,
            scheduled_at: (chrono::Utc::now() + chrono::Duration::hours(1)).to_rfc3339(),
            max_participants: Some(4),
            privacy: None,
            invited_user_ids: vec![],
        };
        let session = sessions.create_session(1, &request).await.unwrap();
        sessions.join_session(&session.public_id, 2).await.unwrap();
        session.public_id
    }

    fn text(body: &str) -> CreateMessageRequest {
        CreateMessageRequest {
            body: body.to_string(),
            kind: None,
        }
    }

    #[tokio::test]
    async fn test_participants_and_host_may_post() {
        let (pool, _temp_dir) = create_test_pool().await;
        let public_id = create_session_with_member(&pool).await;
        let service = MessageService::new(pool);

        service.post_message(&public_id, 1, &text("welcome")).await.unwrap();
        service.post_message(&public_id, 2, &text("hi all")).await.unwrap();

        let result = service.post_message(&public_id, 9, &text("let me in")).await;
        assert!(matches!(
            result,
            Err(SocialError::Session(SessionError::AccessDenied))
        ));

        let messages = service.list_messages(&public_id, 1, None).await.unwrap();
        assert_eq!(messages.len(), 2);
    }

    #[tokio::test]
    async fn test_announcements_are_host_only() {
        let (pool, _temp_dir) = create_test_pool().await;
        let public_id = create_session_with_member(&pool).await;
        let service = MessageService::new(pool);

        let announcement = CreateMessageRequest {
            body: "starting in five".to_string(),
            kind: Some("announcement".to_string()),
        };

        let message = service.post_message(&public_id, 1, &announcement).await.unwrap();
        assert_eq!(message.kind, MessageKind::Announcement);

        let result = service.post_message(&public_id, 2, &announcement).await;
        assert!(matches!(
            result,
            Err(SocialError::Session(SessionError::Unauthorized))
        ));
    }

    #[tokio::test]
    async fn test_edit_is_author_only() {
        let (pool, _temp_dir) = create_test_pool().await;
        let public_id = create_session_with_member(&pool).await;
        let service = MessageService::new(pool);

        let message = service.post_message(&public_id, 2, &text("typo")).await.unwrap();

        // The host cannot edit someone else's message
        assert!(matches!(
            service.edit_message(&message.public_id, 1, "fixed").await,
            Err(SocialError::Session(SessionError::Unauthorized))
        ));

        let edited = service.edit_message(&message.public_id, 2, "fixed").await.unwrap();
        assert_eq!(edited.body, "fixed");
        assert!(edited.edited_at.is_some());
    }

    #[tokio::test]
    async fn test_host_may_delete_any_message() {
        let (pool, _temp_dir) = create_test_pool().await;
        let public_id = create_session_with_member(&pool).await;
        let service = MessageService::new(pool);

        let message = service.post_message(&public_id, 2, &text("spam")).await.unwrap();

        // A stranger cannot delete it
        assert!(matches!(
            service.delete_message(&message.public_id, 9).await,
            Err(SocialError::Session(SessionError::Unauthorized))
        ));

        // The host moderating their session can
        service.delete_message(&message.public_id, 1).await.unwrap();
        assert!(service.list_messages(&public_id, 1, None).await.unwrap().is_empty());
    }
}
