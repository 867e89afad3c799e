//! Notification event types.
//!
//! Every notification kind is its own variant carrying a strongly-typed
//! payload. The core constructs events and hands them to a sink; delivery is
//! fire-and-forget and owned by the surrounding application.

use gamelink_database::{
    Connection, GroupInvite, GroupMember, SessionInvite, SessionMessage, SessionParticipant,
};
use serde::{Deserialize, Serialize};

/// Main social event type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SocialEvent {
    /// A session invitation was sent
    SessionInviteSent {
        session_public_id: String,
        invite: SessionInvite,
    },

    /// A session invitation was accepted; the invitee is now a participant
    SessionInviteAccepted {
        session_public_id: String,
        invite: SessionInvite,
        participant: SessionParticipant,
    },

    /// A session invitation was declined
    SessionInviteDeclined {
        session_public_id: String,
        invite: SessionInvite,
    },

    /// A user joined a session directly
    ParticipantJoined {
        session_public_id: String,
        host_id: i64,
        participant: SessionParticipant,
    },

    /// A participant left a session
    ParticipantLeft {
        session_public_id: String,
        host_id: i64,
        user_id: i64,
    },

    /// A participant was removed by the host
    ParticipantKicked {
        session_public_id: String,
        user_id: i64,
    },

    /// The host cancelled the session
    SessionCancelled {
        session_public_id: String,
        participant_ids: Vec<i64>,
    },

    /// A chat message was posted to a session
    MessagePosted {
        session_public_id: String,
        message: SessionMessage,
        participant_ids: Vec<i64>,
    },

    /// A connection request was sent
    ConnectionRequested { connection: Connection },

    /// A connection request was accepted
    ConnectionAccepted { connection: Connection },

    /// A group invitation was sent
    GroupInviteSent {
        group_public_id: String,
        invite: GroupInvite,
    },

    /// A group invitation was accepted; the invitee is now a member
    GroupInviteAccepted {
        group_public_id: String,
        invite: GroupInvite,
        member: GroupMember,
    },

    /// A group invitation was declined
    GroupInviteDeclined {
        group_public_id: String,
        invite: GroupInvite,
    },
}

impl SocialEvent {
    /// The user IDs that should be notified of this event
    pub fn recipients(&self) -> Vec<i64> {
        match self {
            SocialEvent::SessionInviteSent { invite, .. } => vec![invite.invited_user_id],
            SocialEvent::SessionInviteAccepted { invite, .. } => vec![invite.inviter_id],
            SocialEvent::SessionInviteDeclined { invite, .. } => vec![invite.inviter_id],
            SocialEvent::ParticipantJoined { host_id, .. } => vec![*host_id],
            SocialEvent::ParticipantLeft { host_id, .. } => vec![*host_id],
            SocialEvent::ParticipantKicked { user_id, .. } => vec![*user_id],
            SocialEvent::SessionCancelled { participant_ids, .. } => participant_ids.clone(),
            SocialEvent::MessagePosted {
                message,
                participant_ids,
                ..
            } => participant_ids
                .iter()
                .copied()
                .filter(|id| *id != message.sender_id)
                .collect(),
            SocialEvent::ConnectionRequested { connection } => vec![connection.recipient_id],
            SocialEvent::ConnectionAccepted { connection } => vec![connection.requester_id],
            SocialEvent::GroupInviteSent { invite, .. } => vec![invite.invited_user_id],
            SocialEvent::GroupInviteAccepted { invite, .. } => vec![invite.inviter_id],
            SocialEvent::GroupInviteDeclined { invite, .. } => vec![invite.inviter_id],
        }
    }

    /// Get event type name for logging/metrics
    pub fn event_name(&self) -> &'static str {
        match self {
            SocialEvent::SessionInviteSent { .. } => "session_invite_sent",
            SocialEvent::SessionInviteAccepted { .. } => "session_invite_accepted",
            SocialEvent::SessionInviteDeclined { .. } => "session_invite_declined",
            SocialEvent::ParticipantJoined { .. } => "participant_joined",
            SocialEvent::ParticipantLeft { .. } => "participant_left",
            SocialEvent::ParticipantKicked { .. } => "participant_kicked",
            SocialEvent::SessionCancelled { .. } => "session_cancelled",
            SocialEvent::MessagePosted { .. } => "message_posted",
            SocialEvent::ConnectionRequested { .. } => "connection_requested",
            SocialEvent::ConnectionAccepted { .. } => "connection_accepted",
            SocialEvent::GroupInviteSent { .. } => "group_invite_sent",
            SocialEvent::GroupInviteAccepted { .. } => "group_invite_accepted",
            SocialEvent::GroupInviteDeclined { .. } => "group_invite_declined",
        }
    }
}

/// Delivery seam for notifications. The core constructs payloads and fires
/// them; it never awaits delivery confirmation.
pub trait NotificationSink: Send + Sync {
    fn deliver(&self, event: &SocialEvent);
}

/// Sink that drops everything. Default when the caller wires no delivery.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn deliver(&self, _event: &SocialEvent) {}
}

/// Sink that logs events, useful in development
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingSink;

impl NotificationSink for LoggingSink {
    fn deliver(&self, event: &SocialEvent) {
        tracing::info!(
            event = event.event_name(),
            recipients = ?event.recipients(),
            "notification dispatched"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamelink_database::MessageKind;

    #[test]
    fn test_invite_events_target_the_right_side() {
        let invite = SessionInvite::new(1, 10, 20, None);

        let sent = SocialEvent::SessionInviteSent {
            session_public_id: "s1".to_string(),
            invite: invite.clone(),
        };
        assert_eq!(sent.recipients(), vec![20]);
        assert_eq!(sent.event_name(), "session_invite_sent");

        let declined = SocialEvent::SessionInviteDeclined {
            session_public_id: "s1".to_string(),
            invite,
        };
        assert_eq!(declined.recipients(), vec![10]);
    }

    #[test]
    fn test_message_posted_excludes_sender() {
        let message = SessionMessage::new(1, 2, "hello".to_string(), MessageKind::Text);
        let event = SocialEvent::MessagePosted {
            session_public_id: "s1".to_string(),
            message,
            participant_ids: vec![2, 3, 4],
        };
        assert_eq!(event.recipients(), vec![3, 4]);
    }

    #[test]
    fn test_session_cancelled_notifies_all_participants() {
        let event = SocialEvent::SessionCancelled {
            session_public_id: "s1".to_string(),
            participant_ids: vec![2, 3],
        };
        assert_eq!(event.recipients(), vec![2, 3]);
        assert_eq!(event.event_name(), "session_cancelled");
    }

    #[test]
    fn test_connection_events() {
        let connection = Connection::new(1, 2, None);

        let requested = SocialEvent::ConnectionRequested {
            connection: connection.clone(),
        };
        assert_eq!(requested.recipients(), vec![2]);

        let accepted = SocialEvent::ConnectionAccepted { connection };
        assert_eq!(accepted.recipients(), vec![1]);
    }

    #[test]
    fn test_events_serialize_with_type_tag() {
        let event = SocialEvent::SessionCancelled {
            session_public_id: "s1".to_string(),
            participant_ids: vec![],
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"SessionCancelled\""));
    }
}
