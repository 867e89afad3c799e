use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A persistent player community
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GamingGroup {
    /// Database primary key
    pub id: i64,
    /// Publicly accessible ID
    pub public_id: String,
    /// User who owns the group
    pub owner_id: i64,
    /// Group name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Maximum member count
    pub max_members: i64,
    /// Who may join
    pub privacy: GroupPrivacy,
    /// Creation timestamp
    pub created_at: String,
}

/// Group privacy enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum GroupPrivacy {
    Public,
    InviteOnly,
}

impl From<&str> for GroupPrivacy {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "invite_only" => GroupPrivacy::InviteOnly,
            _ => GroupPrivacy::Public,
        }
    }
}

impl From<GroupPrivacy> for String {
    fn from(privacy: GroupPrivacy) -> Self {
        match privacy {
            GroupPrivacy::Public => "public".to_string(),
            GroupPrivacy::InviteOnly => "invite_only".to_string(),
        }
    }
}

/// Membership record in a group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupMember {
    /// Database primary key
    pub id: i64,
    /// Group this member belongs to
    pub group_id: i64,
    /// User ID of the member
    pub user_id: i64,
    /// Member role in the group
    pub role: GroupRole,
    /// When the member joined
    pub joined_at: String,
}

/// Group role enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum GroupRole {
    Owner,
    Moderator,
    Member,
}

impl From<&str> for GroupRole {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "owner" => GroupRole::Owner,
            "moderator" => GroupRole::Moderator,
            _ => GroupRole::Member,
        }
    }
}

impl From<GroupRole> for String {
    fn from(role: GroupRole) -> Self {
        match role {
            GroupRole::Owner => "owner".to_string(),
            GroupRole::Moderator => "moderator".to_string(),
            GroupRole::Member => "member".to_string(),
        }
    }
}

/// A group invitation. Unlike session invitations these may also be
/// cancelled by the inviter while still pending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupInvite {
    /// Database primary key
    pub id: i64,
    /// Publicly accessible ID
    pub public_id: String,
    /// Group this invitation is for
    pub group_id: i64,
    /// User who created the invitation
    pub inviter_id: i64,
    /// User who is invited
    pub invited_user_id: i64,
    /// Invitation status
    pub status: GroupInviteStatus,
    /// Personal message from inviter
    pub message: Option<String>,
    /// Creation timestamp
    pub created_at: String,
    /// When the invitation was responded to
    pub responded_at: Option<String>,
}

/// Group invitation status enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum GroupInviteStatus {
    Pending,
    Accepted,
    Declined,
    Cancelled,
}

impl From<&str> for GroupInviteStatus {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "accepted" => GroupInviteStatus::Accepted,
            "declined" => GroupInviteStatus::Declined,
            "cancelled" => GroupInviteStatus::Cancelled,
            _ => GroupInviteStatus::Pending,
        }
    }
}

impl From<GroupInviteStatus> for String {
    fn from(status: GroupInviteStatus) -> Self {
        match status {
            GroupInviteStatus::Pending => "pending".to_string(),
            GroupInviteStatus::Accepted => "accepted".to_string(),
            GroupInviteStatus::Declined => "declined".to_string(),
            GroupInviteStatus::Cancelled => "cancelled".to_string(),
        }
    }
}

/// Request to create a group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    pub description: Option<String>,
    pub max_members: Option<i64>,
    pub privacy: Option<String>,
}

impl GamingGroup {
    /// Create a new group instance
    pub fn new(owner_id: i64, request: &CreateGroupRequest, default_max_members: i64) -> Self {
        Self {
            id: 0, // Will be set by database
            public_id: cuid2::cuid(),
            owner_id,
            name: request.name.clone(),
            description: request.description.clone(),
            max_members: request.max_members.unwrap_or(default_max_members),
            privacy: request
                .privacy
                .as_deref()
                .map(GroupPrivacy::from)
                .unwrap_or(GroupPrivacy::Public),
            created_at: Utc::now().to_rfc3339(),
        }
    }

    /// Whether the member count has reached capacity
    pub fn is_full(&self, member_count: i64) -> bool {
        member_count >= self.max_members
    }

    /// Validate group data
    pub fn validate(&self) -> Result<(), String> {
        if self.owner_id <= 0 {
            return Err("Invalid owner ID".to_string());
        }

        if self.name.trim().is_empty() {
            return Err("Group name cannot be empty".to_string());
        }

        if self.name.len() > 255 {
            return Err("Group name too long (max 255 characters)".to_string());
        }

        if self.max_members < 2 {
            return Err("A group needs at least 2 members".to_string());
        }

        Ok(())
    }
}

impl GroupMember {
    pub fn new(group_id: i64, user_id: i64, role: GroupRole) -> Self {
        Self {
            id: 0, // Will be set by database
            group_id,
            user_id,
            role,
            joined_at: Utc::now().to_rfc3339(),
        }
    }

    pub fn is_owner(&self) -> bool {
        matches!(self.role, GroupRole::Owner)
    }

    /// Check if the member can invite and remove others
    pub fn can_manage_members(&self) -> bool {
        matches!(self.role, GroupRole::Owner | GroupRole::Moderator)
    }
}

impl GroupInvite {
    pub fn new(group_id: i64, inviter_id: i64, invited_user_id: i64, message: Option<String>) -> Self {
        Self {
            id: 0, // Will be set by database
            public_id: cuid2::cuid(),
            group_id,
            inviter_id,
            invited_user_id,
            status: GroupInviteStatus::Pending,
            message,
            created_at: Utc::now().to_rfc3339(),
            responded_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.status, GroupInviteStatus::Pending)
    }

    /// Accept the invitation
    pub fn accept(&mut self) -> Result<(), String> {
        if !self.is_pending() {
            return Err("Invitation is not pending".to_string());
        }
        self.status = GroupInviteStatus::Accepted;
        self.responded_at = Some(Utc::now().to_rfc3339());
        Ok(())
    }

    /// Decline the invitation
    pub fn decline(&mut self) -> Result<(), String> {
        if !self.is_pending() {
            return Err("Invitation is not pending".to_string());
        }
        self.status = GroupInviteStatus::Declined;
        self.responded_at = Some(Utc::now().to_rfc3339());
        Ok(())
    }

    /// Cancel the invitation (inviter only, checked by the caller)
    pub fn cancel(&mut self) -> Result<(), String> {
        if !self.is_pending() {
            return Err("Invitation is not pending".to_string());
        }
        self.status = GroupInviteStatus::Cancelled;
        self.responded_at = Some(Utc::now().to_rfc3339());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> CreateGroupRequest {
        CreateGroupRequest {
            name: "Night Owls".to_string(),
            description: Some("Late-night co-op".to_string()),
            max_members: Some(10),
            privacy: Some("invite_only".to_string()),
        }
    }

    #[test]
    fn test_group_creation() {
        let group = GamingGroup::new(1, &sample_request(), 25);

        assert_eq!(group.owner_id, 1);
        assert_eq!(group.max_members, 10);
        assert_eq!(group.privacy, GroupPrivacy::InviteOnly);
        assert!(group.validate().is_ok());
    }

    #[test]
    fn test_group_is_full() {
        let group = GamingGroup::new(1, &sample_request(), 25);
        assert!(!group.is_full(9));
        assert!(group.is_full(10));
    }

    #[test]
    fn test_member_roles() {
        let owner = GroupMember::new(1, 1, GroupRole::Owner);
        let moderator = GroupMember::new(1, 2, GroupRole::Moderator);
        let member = GroupMember::new(1, 3, GroupRole::Member);

        assert!(owner.is_owner());
        assert!(owner.can_manage_members());
        assert!(moderator.can_manage_members());
        assert!(!member.can_manage_members());
    }

    #[test]
    fn test_group_invite_lifecycle() {
        let mut invite = GroupInvite::new(1, 1, 2, None);
        assert!(invite.is_pending());

        assert!(invite.accept().is_ok());
        assert_eq!(invite.status, GroupInviteStatus::Accepted);
        assert!(invite.accept().is_err());
        assert!(invite.cancel().is_err());
    }

    #[test]
    fn test_group_invite_cancel() {
        let mut invite = GroupInvite::new(1, 1, 2, None);

        assert!(invite.cancel().is_ok());
        assert_eq!(invite.status, GroupInviteStatus::Cancelled);
        assert!(invite.decline().is_err());
    }

    #[test]
    fn test_group_invite_status_conversion() {
        assert_eq!(GroupInviteStatus::from("cancelled"), GroupInviteStatus::Cancelled);
        assert_eq!(GroupInviteStatus::from("unknown"), GroupInviteStatus::Pending);
        assert_eq!(String::from(GroupInviteStatus::Cancelled), "cancelled");
    }
}
