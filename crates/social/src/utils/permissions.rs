//! Permission checking utilities.

use gamelink_database::{
    GamingSession, GroupError, GroupMember, SessionError, SessionMessage, SessionPrivacy,
};

/// Permission checking utilities. Every check takes the acting user
/// explicitly along with snapshots of the state the decision needs.
pub struct PermissionChecker;

impl PermissionChecker {
    /// Check if a user may view a session and its chat
    pub fn can_view_session(
        session: &GamingSession,
        user_id: i64,
        is_participant: bool,
        has_invite: bool,
    ) -> Result<(), SessionError> {
        match session.privacy {
            SessionPrivacy::Public | SessionPrivacy::FriendsOnly => Ok(()),
            SessionPrivacy::InviteOnly => {
                if session.is_host(user_id) || is_participant || has_invite {
                    Ok(())
                } else {
                    Err(SessionError::AccessDenied)
                }
            }
        }
    }

    /// Check if a user may post a message into a session's chat
    pub fn can_post_message(
        session: &GamingSession,
        user_id: i64,
        is_active_participant: bool,
    ) -> Result<(), SessionError> {
        if session.is_host(user_id) || is_active_participant {
            Ok(())
        } else {
            Err(SessionError::AccessDenied)
        }
    }

    /// Check if a user may edit a message. Editing is author-only.
    pub fn can_edit_message(message: &SessionMessage, user_id: i64) -> Result<(), SessionError> {
        if message.sender_id != user_id {
            return Err(SessionError::Unauthorized);
        }
        Ok(())
    }

    /// Check if a user may delete a message: the author, or the host
    /// moderating their session
    pub fn can_delete_message(
        message: &SessionMessage,
        session: &GamingSession,
        user_id: i64,
    ) -> Result<(), SessionError> {
        if message.sender_id == user_id || session.is_host(user_id) {
            Ok(())
        } else {
            Err(SessionError::Unauthorized)
        }
    }

    /// Check if a user may edit or cancel a session
    pub fn can_manage_session(session: &GamingSession, user_id: i64) -> Result<(), SessionError> {
        if !session.is_host(user_id) {
            return Err(SessionError::Unauthorized);
        }
        Ok(())
    }

    /// Check if a group member may invite others
    pub fn can_invite_to_group(member: &GroupMember) -> Result<(), GroupError> {
        if !member.can_manage_members() {
            return Err(GroupError::Unauthorized);
        }
        Ok(())
    }

    /// Check if a group member may remove another member
    pub fn can_remove_group_member(actor: &GroupMember, target: &GroupMember) -> Result<(), GroupError> {
        if actor.user_id == target.user_id {
            // Leaving is not a removal
            return Err(GroupError::Unauthorized);
        }

        if target.is_owner() {
            return Err(GroupError::Unauthorized);
        }

        if !actor.can_manage_members() {
            return Err(GroupError::Unauthorized);
        }

        Ok(())
    }
}
