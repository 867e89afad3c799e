//! Session service: lifecycle, membership, and invitations.

use std::sync::Arc;

use chrono::Utc;
use gamelink_config::SessionsConfig;
use gamelink_database::{
    CreateInviteRequest, CreateSessionRequest, GamingSession, InviteRepository, InviteStatus,
    ParticipantRepository, SessionError, SessionInvite, SessionParticipant, SessionPrivacy,
    SessionRepository, SessionStatus, UpdateSessionRequest,
};
use sqlx::SqlitePool;

use crate::coordination::{evaluate_join, evaluate_kick, evaluate_leave, evaluate_transition, JoinContext};
use crate::types::{NotificationSink, NullSink, SocialEvent, SocialResult};
use crate::utils::{PermissionChecker, Validator};

/// Service for managing gaming sessions
pub struct SessionService {
    sessions: SessionRepository,
    participants: ParticipantRepository,
    invites: InviteRepository,
    config: SessionsConfig,
    sink: Arc<dyn NotificationSink>,
}

impl SessionService {
    /// Create a new session service instance
    pub fn new(pool: SqlitePool, config: SessionsConfig) -> Self {
        Self::with_sink(pool, config, Arc::new(NullSink))
    }

    /// Create a session service with a notification sink
    pub fn with_sink(pool: SqlitePool, config: SessionsConfig, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            sessions: SessionRepository::new(pool.clone()),
            participants: ParticipantRepository::new(pool.clone()),
            invites: InviteRepository::new(pool),
            config,
            sink,
        }
    }

    /// Create a session and send any initial invitations
    pub async fn create_session(&self, host_id: i64, request: &CreateSessionRequest) -> SocialResult<GamingSession> {
        Validator::title(&request.title)?;
        Validator::game_name(&request.game_name)?;
        Validator::schedule(&request.scheduled_at, Utc::now())?;
        if let Some(max) = request.max_participants {
            Validator::max_participants(max, i64::from(self.config.participant_ceiling))?;
        }

        let session = self
            .sessions
            .create(host_id, request, i64::from(self.config.default_max_participants))
            .await?;

        for invited_user_id in &request.invited_user_ids {
            if *invited_user_id == host_id {
                continue;
            }
            let invite = self
                .invites
                .create(session.id, host_id, *invited_user_id, None)
                .await?;
            self.sink.deliver(&SocialEvent::SessionInviteSent {
                session_public_id: session.public_id.clone(),
                invite,
            });
        }

        Ok(session)
    }

    /// Fetch a session, enforcing view permissions
    pub async fn get_session(&self, public_id: &str, actor_id: i64) -> SocialResult<GamingSession> {
        let session = self.require_session(public_id).await?;

        let is_participant = self
            .participants
            .find_active(session.id, actor_id)
            .await?
            .is_some();
        let has_invite = if session.privacy == SessionPrivacy::InviteOnly {
            self.invite_on_file(&session, actor_id).await?
        } else {
            false
        };

        PermissionChecker::can_view_session(&session, actor_id, is_participant, has_invite)?;
        Ok(session)
    }

    /// Edit a session. Host only.
    pub async fn update_session(
        &self,
        public_id: &str,
        actor_id: i64,
        request: &UpdateSessionRequest,
    ) -> SocialResult<GamingSession> {
        let session = self.require_session(public_id).await?;
        PermissionChecker::can_manage_session(&session, actor_id)?;

        if let Some(ref title) = request.title {
            Validator::title(title)?;
        }
        if let Some(max) = request.max_participants {
            Validator::max_participants(max, i64::from(self.config.participant_ceiling))?;
        }

        Ok(self.sessions.update(session.id, request).await?)
    }

    /// Mark the session active. Host only, from scheduled.
    pub async fn start_session(&self, public_id: &str, actor_id: i64) -> SocialResult<GamingSession> {
        let session = self.require_session(public_id).await?;
        evaluate_transition(&session, actor_id, SessionStatus::Active)?;
        Ok(self.sessions.update_status(session.id, SessionStatus::Active).await?)
    }

    /// Mark the session completed. Host only, from active.
    pub async fn complete_session(&self, public_id: &str, actor_id: i64) -> SocialResult<GamingSession> {
        let session = self.require_session(public_id).await?;
        evaluate_transition(&session, actor_id, SessionStatus::Completed)?;
        Ok(self.sessions.update_status(session.id, SessionStatus::Completed).await?)
    }

    /// Cancel the session. Host only; this is the host's only way out.
    pub async fn cancel_session(&self, public_id: &str, actor_id: i64) -> SocialResult<GamingSession> {
        let session = self.require_session(public_id).await?;
        evaluate_transition(&session, actor_id, SessionStatus::Cancelled)?;

        let cancelled = self.sessions.update_status(session.id, SessionStatus::Cancelled).await?;

        let participant_ids: Vec<i64> = self
            .participants
            .find_joined_by_session(session.id)
            .await?
            .iter()
            .map(|p| p.user_id)
            .collect();

        self.sink.deliver(&SocialEvent::SessionCancelled {
            session_public_id: cancelled.public_id.clone(),
            participant_ids,
        });

        Ok(cancelled)
    }

    /// Join a session directly
    pub async fn join_session(&self, public_id: &str, actor_id: i64) -> SocialResult<SessionParticipant> {
        let session = self.require_session(public_id).await?;
        let ctx = self.load_join_context(&session, actor_id).await?;

        evaluate_join(&session, actor_id, &ctx, Utc::now())?;

        let participant = self.participants.create(session.id, actor_id).await?;

        self.sink.deliver(&SocialEvent::ParticipantJoined {
            session_public_id: session.public_id.clone(),
            host_id: session.host_id,
            participant: participant.clone(),
        });

        Ok(participant)
    }

    /// Check join eligibility without joining
    pub async fn can_user_join(&self, public_id: &str, actor_id: i64) -> SocialResult<bool> {
        let session = self.require_session(public_id).await?;
        let ctx = self.load_join_context(&session, actor_id).await?;
        Ok(evaluate_join(&session, actor_id, &ctx, Utc::now()).is_ok())
    }

    /// Leave a session. The host may not leave, only cancel.
    pub async fn leave_session(&self, public_id: &str, actor_id: i64) -> SocialResult<SessionParticipant> {
        let session = self.require_session(public_id).await?;

        let is_active = self
            .participants
            .find_active(session.id, actor_id)
            .await?
            .is_some();
        evaluate_leave(&session, actor_id, is_active)?;

        let participant = self.participants.mark_left(session.id, actor_id).await?;

        self.sink.deliver(&SocialEvent::ParticipantLeft {
            session_public_id: session.public_id.clone(),
            host_id: session.host_id,
            user_id: actor_id,
        });

        Ok(participant)
    }

    /// Remove a participant. Host only.
    pub async fn kick_participant(
        &self,
        public_id: &str,
        actor_id: i64,
        target_user_id: i64,
    ) -> SocialResult<SessionParticipant> {
        let session = self.require_session(public_id).await?;
        evaluate_kick(&session, actor_id, target_user_id)?;

        let participant = self.participants.mark_kicked(session.id, target_user_id).await?;

        self.sink.deliver(&SocialEvent::ParticipantKicked {
            session_public_id: session.public_id.clone(),
            user_id: target_user_id,
        });

        Ok(participant)
    }

    /// List a session's joined participants
    pub async fn list_participants(&self, public_id: &str) -> SocialResult<Vec<SessionParticipant>> {
        let session = self.require_session(public_id).await?;
        Ok(self.participants.find_joined_by_session(session.id).await?)
    }

    /// Invite a user to a session. Host only.
    pub async fn invite_user(
        &self,
        public_id: &str,
        actor_id: i64,
        request: &CreateInviteRequest,
    ) -> SocialResult<SessionInvite> {
        let session = self.require_session(public_id).await?;
        PermissionChecker::can_manage_session(&session, actor_id)?;

        if session.is_cancelled() {
            return Err(SessionError::SessionCancelled.into());
        }

        if request.invited_user_id == session.host_id {
            return Err(SessionError::AlreadyParticipant.into());
        }

        if self
            .participants
            .find_active(session.id, request.invited_user_id)
            .await?
            .is_some()
        {
            return Err(SessionError::AlreadyParticipant.into());
        }

        let invite = self
            .invites
            .create(session.id, actor_id, request.invited_user_id, request.message.clone())
            .await?;

        self.sink.deliver(&SocialEvent::SessionInviteSent {
            session_public_id: session.public_id.clone(),
            invite: invite.clone(),
        });

        Ok(invite)
    }

    /// Accept an invitation. Adds the invitee as a joined participant in the
    /// same transaction as the status flip.
    pub async fn accept_invite(&self, invite_public_id: &str, actor_id: i64) -> SocialResult<SessionParticipant> {
        let invite = self.require_invite(invite_public_id).await?;

        if invite.invited_user_id != actor_id {
            return Err(SessionError::Unauthorized.into());
        }
        if !invite.is_pending() {
            return Err(SessionError::InviteAlreadyResponded.into());
        }

        let session = self
            .sessions
            .find_by_id(invite.session_id)
            .await?
            .ok_or(SessionError::SessionNotFound)?;

        if session.is_cancelled() {
            return Err(SessionError::SessionCancelled.into());
        }

        // Acceptance still honors the capacity invariant
        let joined_count = self.participants.count_joined(session.id).await?;
        if session.is_full(joined_count) {
            return Err(SessionError::SessionFull.into());
        }

        let (accepted, participant) = self.invites.accept_and_join(&invite).await?;

        self.sink.deliver(&SocialEvent::SessionInviteAccepted {
            session_public_id: session.public_id.clone(),
            invite: accepted,
            participant: participant.clone(),
        });

        Ok(participant)
    }

    /// Decline an invitation. No side effects beyond the status flip.
    pub async fn decline_invite(&self, invite_public_id: &str, actor_id: i64) -> SocialResult<SessionInvite> {
        let invite = self.require_invite(invite_public_id).await?;

        if invite.invited_user_id != actor_id {
            return Err(SessionError::Unauthorized.into());
        }

        let declined = self.invites.decline(&invite).await?;

        let session_public_id = self
            .sessions
            .find_by_id(invite.session_id)
            .await?
            .map(|s| s.public_id)
            .unwrap_or_default();

        self.sink.deliver(&SocialEvent::SessionInviteDeclined {
            session_public_id,
            invite: declined.clone(),
        });

        Ok(declined)
    }

    /// List pending invitations addressed to a user
    pub async fn list_pending_invites(&self, user_id: i64) -> SocialResult<Vec<SessionInvite>> {
        Ok(self.invites.find_pending_for_user(user_id).await?)
    }

    /// List every invitation for a session. Host only.
    pub async fn list_session_invites(&self, public_id: &str, actor_id: i64) -> SocialResult<Vec<SessionInvite>> {
        let session = self.require_session(public_id).await?;
        PermissionChecker::can_manage_session(&session, actor_id)?;
        Ok(self.invites.find_by_session(session.id).await?)
    }

    /// List upcoming public sessions
    pub async fn list_upcoming_public(&self, limit: i64) -> SocialResult<Vec<GamingSession>> {
        Ok(self.sessions.find_upcoming_public(limit).await?)
    }

    /// List the sessions a user hosts, newest schedule first
    pub async fn list_hosted_by(&self, host_id: i64) -> SocialResult<Vec<GamingSession>> {
        Ok(self.sessions.find_by_host(host_id).await?)
    }

    async fn load_join_context(&self, session: &GamingSession, actor_id: i64) -> SocialResult<JoinContext> {
        let already_joined = self
            .participants
            .find_active(session.id, actor_id)
            .await?
            .is_some();
        let joined_count = self.participants.count_joined(session.id).await?;
        let has_accepted_invite = if session.privacy == SessionPrivacy::InviteOnly {
            self.invites
                .find_by_session_user_status(session.id, actor_id, InviteStatus::Accepted)
                .await?
                .is_some()
        } else {
            false
        };

        Ok(JoinContext {
            joined_count,
            already_joined,
            has_accepted_invite,
        })
    }

    async fn invite_on_file(&self, session: &GamingSession, actor_id: i64) -> SocialResult<bool> {
        for status in [InviteStatus::Pending, InviteStatus::Accepted] {
            if self
                .invites
                .find_by_session_user_status(session.id, actor_id, status)
                .await?
                .is_some()
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn require_session(&self, public_id: &str) -> SocialResult<GamingSession> {
        Ok(self
            .sessions
            .find_by_public_id(public_id)
            .await?
            .ok_or(SessionError::SessionNotFound)?)
    }

    async fn require_invite(&self, public_id: &str) -> SocialResult<SessionInvite> {
        Ok(self
            .invites
            .find_by_public_id(public_id)
            .await?
            .ok_or(SessionError::InviteNotFound)?)
    }
}
