//! Group service: communities, membership, and group invitations.

use std::sync::Arc;

use gamelink_database::{
    CreateGroupRequest, GamingGroup, GroupError, GroupInvite, GroupMember, GroupPrivacy,
    GroupRepository, GroupRole,
};
use sqlx::SqlitePool;

use crate::types::{NotificationSink, NullSink, SocialEvent, SocialResult};
use crate::utils::{PermissionChecker, Validator};

/// Fallback member cap when a group is created without one
const DEFAULT_MAX_MEMBERS: i64 = 25;

/// Service for managing gaming groups
pub struct GroupService {
    groups: GroupRepository,
    sink: Arc<dyn NotificationSink>,
}

impl GroupService {
    /// Create a new group service instance
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_sink(pool, Arc::new(NullSink))
    }

    /// Create a group service with a notification sink
    pub fn with_sink(pool: SqlitePool, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            groups: GroupRepository::new(pool),
            sink,
        }
    }

    /// Create a group; the creator becomes its owner member
    pub async fn create_group(&self, owner_id: i64, request: &CreateGroupRequest) -> SocialResult<GamingGroup> {
        Validator::title(&request.name)?;
        Ok(self.groups.create(owner_id, request, DEFAULT_MAX_MEMBERS).await?)
    }

    /// Fetch a group by public ID
    pub async fn get_group(&self, public_id: &str) -> SocialResult<GamingGroup> {
        self.require_group(public_id).await
    }

    /// List a group's members
    pub async fn list_members(&self, public_id: &str) -> SocialResult<Vec<GroupMember>> {
        let group = self.require_group(public_id).await?;
        Ok(self.groups.find_members(group.id).await?)
    }

    /// Join a public group directly
    pub async fn join_group(&self, public_id: &str, actor_id: i64) -> SocialResult<GroupMember> {
        let group = self.require_group(public_id).await?;

        if group.privacy == GroupPrivacy::InviteOnly {
            return Err(GroupError::Unauthorized.into());
        }

        self.check_capacity(&group).await?;

        Ok(self.groups.add_member(group.id, actor_id, GroupRole::Member).await?)
    }

    /// Leave a group. The owner cannot leave their own group.
    pub async fn leave_group(&self, public_id: &str, actor_id: i64) -> SocialResult<()> {
        let group = self.require_group(public_id).await?;

        if group.owner_id == actor_id {
            return Err(GroupError::OwnerCannotLeave.into());
        }

        Ok(self.groups.remove_member(group.id, actor_id).await?)
    }

    /// Remove a member. Owners and moderators only; the owner is immovable.
    pub async fn remove_member(&self, public_id: &str, actor_id: i64, target_user_id: i64) -> SocialResult<()> {
        let group = self.require_group(public_id).await?;

        let actor = self
            .groups
            .find_member(group.id, actor_id)
            .await?
            .ok_or(GroupError::MemberNotFound)?;
        let target = self
            .groups
            .find_member(group.id, target_user_id)
            .await?
            .ok_or(GroupError::MemberNotFound)?;

        PermissionChecker::can_remove_group_member(&actor, &target)?;

        Ok(self.groups.remove_member(group.id, target_user_id).await?)
    }

    /// Invite a user to a group. Owners and moderators only.
    pub async fn invite_member(
        &self,
        public_id: &str,
        actor_id: i64,
        invited_user_id: i64,
        message: Option<String>,
    ) -> SocialResult<GroupInvite> {
        let group = self.require_group(public_id).await?;

        let actor = self
            .groups
            .find_member(group.id, actor_id)
            .await?
            .ok_or(GroupError::MemberNotFound)?;
        PermissionChecker::can_invite_to_group(&actor)?;

        if self.groups.find_member(group.id, invited_user_id).await?.is_some() {
            return Err(GroupError::AlreadyMember.into());
        }

        self.check_capacity(&group).await?;

        let invite = self
            .groups
            .create_invite(group.id, actor_id, invited_user_id, message)
            .await?;

        self.sink.deliver(&SocialEvent::GroupInviteSent {
            group_public_id: group.public_id.clone(),
            invite: invite.clone(),
        });

        Ok(invite)
    }

    /// Accept a group invitation; membership lands in the same transaction
    pub async fn accept_invite(&self, invite_public_id: &str, actor_id: i64) -> SocialResult<GroupMember> {
        let invite = self.require_invite(invite_public_id).await?;

        if invite.invited_user_id != actor_id {
            return Err(GroupError::Unauthorized.into());
        }
        if !invite.is_pending() {
            return Err(GroupError::InviteAlreadyResponded.into());
        }

        let group = self
            .groups
            .find_by_id(invite.group_id)
            .await?
            .ok_or(GroupError::GroupNotFound)?;

        self.check_capacity(&group).await?;

        let (accepted, member) = self.groups.accept_invite(&invite).await?;

        self.sink.deliver(&SocialEvent::GroupInviteAccepted {
            group_public_id: group.public_id.clone(),
            invite: accepted,
            member: member.clone(),
        });

        Ok(member)
    }

    /// Decline a group invitation
    pub async fn decline_invite(&self, invite_public_id: &str, actor_id: i64) -> SocialResult<GroupInvite> {
        let invite = self.require_invite(invite_public_id).await?;

        if invite.invited_user_id != actor_id {
            return Err(GroupError::Unauthorized.into());
        }

        let declined = self.groups.decline_invite(&invite).await?;

        let group = self
            .groups
            .find_by_id(invite.group_id)
            .await?
            .ok_or(GroupError::GroupNotFound)?;

        self.sink.deliver(&SocialEvent::GroupInviteDeclined {
            group_public_id: group.public_id,
            invite: declined.clone(),
        });

        Ok(declined)
    }

    /// Cancel a still-pending invitation. Inviter only.
    pub async fn cancel_invite(&self, invite_public_id: &str, actor_id: i64) -> SocialResult<GroupInvite> {
        let invite = self.require_invite(invite_public_id).await?;

        if invite.inviter_id != actor_id {
            return Err(GroupError::Unauthorized.into());
        }

        Ok(self.groups.cancel_invite(&invite).await?)
    }

    async fn check_capacity(&self, group: &GamingGroup) -> SocialResult<()> {
        let member_count = self.groups.count_members(group.id).await?;
        if group.is_full(member_count) {
            return Err(GroupError::GroupFull.into());
        }
        Ok(())
    }

    async fn require_group(&self, public_id: &str) -> SocialResult<GamingGroup> {
        Ok(self
            .groups
            .find_by_public_id(public_id)
            .await?
            .ok_or(GroupError::GroupNotFound)?)
    }

    async fn require_invite(&self, public_id: &str) -> SocialResult<GroupInvite> {
        Ok(self
            .groups
            .find_invite_by_public_id(public_id)
            .await?
            .ok_or(GroupError::InviteNotFound)?)
    }
}
