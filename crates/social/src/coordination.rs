//! Session coordination rules.
//!
//! Pure decision logic for joining, leaving, and kicking. Callers load the
//! relevant state into a [`JoinContext`] snapshot and pass the acting user
//! explicitly; nothing here reads ambient identity or touches the database.

use chrono::{DateTime, Utc};
use gamelink_database::{GamingSession, SessionError, SessionPrivacy, SessionStatus};

/// Snapshot of the state a join decision depends on
#[derive(Debug, Clone, Copy, Default)]
pub struct JoinContext {
    /// Participant rows currently in `joined` status
    pub joined_count: i64,
    /// Whether the acting user already holds a live membership
    pub already_joined: bool,
    /// Whether the acting user has an accepted invite for this session
    pub has_accepted_invite: bool,
}

/// Decide whether `actor_id` may join the session. Rules are evaluated in
/// a fixed order and the first match wins.
pub fn evaluate_join(
    session: &GamingSession,
    actor_id: i64,
    ctx: &JoinContext,
    now: DateTime<Utc>,
) -> Result<(), SessionError> {
    if ctx.already_joined {
        return Err(SessionError::AlreadyParticipant);
    }

    if session.is_full(ctx.joined_count) {
        return Err(SessionError::SessionFull);
    }

    if session.is_cancelled() {
        return Err(SessionError::SessionCancelled);
    }

    if session.is_past(now) {
        return Err(SessionError::SessionInPast);
    }

    // The host bypasses privacy, though capacity and the checks above still
    // apply to them.
    if session.is_host(actor_id) {
        return Ok(());
    }

    match session.privacy {
        SessionPrivacy::Public => Ok(()),
        // Friendship verification is not implemented; friends_only currently
        // behaves exactly like public.
        SessionPrivacy::FriendsOnly => Ok(()),
        SessionPrivacy::InviteOnly => {
            if ctx.has_accepted_invite {
                Ok(())
            } else {
                Err(SessionError::AccessDenied)
            }
        }
    }
}

/// Decide whether `actor_id` may leave the session. The host may never
/// leave their own session; their only exit is cancelling it outright.
pub fn evaluate_leave(
    session: &GamingSession,
    actor_id: i64,
    is_active_participant: bool,
) -> Result<(), SessionError> {
    if session.is_host(actor_id) {
        return Err(SessionError::HostCannotLeave);
    }

    if !is_active_participant {
        return Err(SessionError::ParticipantNotFound);
    }

    Ok(())
}

/// Decide whether `actor_id` may kick `target_id` from the session
pub fn evaluate_kick(session: &GamingSession, actor_id: i64, target_id: i64) -> Result<(), SessionError> {
    if !session.is_host(actor_id) {
        return Err(SessionError::Unauthorized);
    }

    if actor_id == target_id {
        return Err(SessionError::HostCannotLeave);
    }

    Ok(())
}

/// Decide whether `actor_id` may move the session to `next`. Only the host
/// drives transitions, and only along the legal edges.
pub fn evaluate_transition(
    session: &GamingSession,
    actor_id: i64,
    next: SessionStatus,
) -> Result<(), SessionError> {
    if !session.is_host(actor_id) {
        return Err(SessionError::Unauthorized);
    }

    if !session.status.can_transition_to(next) {
        return Err(SessionError::InvalidTransition {
            from: String::from(session.status),
            to: String::from(next),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamelink_database::CreateSessionRequest;

    const HOST: i64 = 1;
    const GUEST: i64 = 2;

    fn session_with(privacy: &str, max_participants: i64) -> GamingSession {
        let request = CreateSessionRequest {
            title: "coordination test".to_string(),
            game_name: "Overcooked 2".to_string(),
            platform: None,
            scheduled_at: (Utc::now() + chrono::Duration::hours(2)).to_rfc3339(),
            max_participants: Some(max_participants),
            privacy: Some(privacy.to_string()),
            invited_user_ids: vec![],
        };
        GamingSession::new(HOST, &request, 4)
    }

    fn open_context() -> JoinContext {
        JoinContext::default()
    }

    #[test]
    fn public_session_allows_anyone() {
        let session = session_with("public", 4);
        assert!(evaluate_join(&session, GUEST, &open_context(), Utc::now()).is_ok());
    }

    #[test]
    fn already_joined_denied_first() {
        let session = session_with("public", 4);
        let ctx = JoinContext {
            already_joined: true,
            // Even over capacity, the membership check fires first
            joined_count: 10,
            ..Default::default()
        };
        assert!(matches!(
            evaluate_join(&session, GUEST, &ctx, Utc::now()),
            Err(SessionError::AlreadyParticipant)
        ));
    }

    #[test]
    fn full_session_denies_join_but_reports_full() {
        // max 2, host joined plus one participant
        let session = session_with("public", 2);
        let ctx = JoinContext {
            joined_count: 2,
            ..Default::default()
        };

        assert!(session.is_full(2));
        assert!(matches!(
            evaluate_join(&session, 3, &ctx, Utc::now()),
            Err(SessionError::SessionFull)
        ));
    }

    #[test]
    fn capacity_applies_to_host_too() {
        let session = session_with("invite_only", 2);
        let ctx = JoinContext {
            joined_count: 2,
            ..Default::default()
        };
        assert!(matches!(
            evaluate_join(&session, HOST, &ctx, Utc::now()),
            Err(SessionError::SessionFull)
        ));
    }

    #[test]
    fn cancelled_session_blocks_everyone() {
        let mut session = session_with("public", 4);
        session.status = SessionStatus::Cancelled;

        assert!(matches!(
            evaluate_join(&session, GUEST, &open_context(), Utc::now()),
            Err(SessionError::SessionCancelled)
        ));
        assert!(matches!(
            evaluate_join(&session, HOST, &open_context(), Utc::now()),
            Err(SessionError::SessionCancelled)
        ));
    }

    #[test]
    fn past_session_blocks_join() {
        let mut session = session_with("public", 4);
        session.scheduled_at = (Utc::now() - chrono::Duration::minutes(5)).to_rfc3339();

        assert!(matches!(
            evaluate_join(&session, GUEST, &open_context(), Utc::now()),
            Err(SessionError::SessionInPast)
        ));
    }

    #[test]
    fn host_bypasses_invite_only_privacy() {
        let session = session_with("invite_only", 4);
        assert!(evaluate_join(&session, HOST, &open_context(), Utc::now()).is_ok());
    }

    #[test]
    fn invite_only_requires_accepted_invite() {
        let session = session_with("invite_only", 4);

        // Pending or missing invite: denied
        assert!(matches!(
            evaluate_join(&session, GUEST, &open_context(), Utc::now()),
            Err(SessionError::AccessDenied)
        ));

        // Accepted invite: allowed
        let ctx = JoinContext {
            has_accepted_invite: true,
            ..Default::default()
        };
        assert!(evaluate_join(&session, GUEST, &ctx, Utc::now()).is_ok());
    }

    #[test]
    fn friends_only_currently_behaves_as_public() {
        let session = session_with("friends_only", 4);
        assert!(evaluate_join(&session, GUEST, &open_context(), Utc::now()).is_ok());
    }

    #[test]
    fn host_cannot_leave_but_guest_can() {
        let session = session_with("public", 4);

        assert!(matches!(
            evaluate_leave(&session, HOST, true),
            Err(SessionError::HostCannotLeave)
        ));
        assert!(evaluate_leave(&session, GUEST, true).is_ok());
        assert!(matches!(
            evaluate_leave(&session, GUEST, false),
            Err(SessionError::ParticipantNotFound)
        ));
    }

    #[test]
    fn only_host_may_kick() {
        let session = session_with("public", 4);

        assert!(evaluate_kick(&session, HOST, GUEST).is_ok());
        assert!(matches!(
            evaluate_kick(&session, GUEST, 3),
            Err(SessionError::Unauthorized)
        ));
        assert!(matches!(
            evaluate_kick(&session, HOST, HOST),
            Err(SessionError::HostCannotLeave)
        ));
    }

    #[test]
    fn transitions_are_host_only_and_legal() {
        let session = session_with("public", 4);

        assert!(evaluate_transition(&session, HOST, SessionStatus::Active).is_ok());
        assert!(evaluate_transition(&session, HOST, SessionStatus::Cancelled).is_ok());
        assert!(matches!(
            evaluate_transition(&session, HOST, SessionStatus::Completed),
            Err(SessionError::InvalidTransition { .. })
        ));
        assert!(matches!(
            evaluate_transition(&session, GUEST, SessionStatus::Active),
            Err(SessionError::Unauthorized)
        ));
    }
}
