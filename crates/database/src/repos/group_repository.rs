//! Repository for group, group-member, and group-invite data access operations.

use crate::entities::{
    CreateGroupRequest, GamingGroup, GroupInvite, GroupInviteStatus, GroupMember, GroupPrivacy,
    GroupRole,
};
use crate::types::{GroupError, GroupResult};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

/// Repository for group database operations
pub struct GroupRepository {
    pool: SqlitePool,
}

const GROUP_COLUMNS: &str = "id, public_id, owner_id, name, description, max_members, privacy, created_at";
const MEMBER_COLUMNS: &str = "id, group_id, user_id, role, joined_at";
const INVITE_COLUMNS: &str =
    "id, public_id, group_id, inviter_id, invited_user_id, status, message, created_at, responded_at";

fn map_group_row(row: &SqliteRow) -> GroupResult<GamingGroup> {
    let privacy_str: String = row
        .try_get("privacy")
        .map_err(|e| GroupError::DatabaseError(e.to_string()))?;

    Ok(GamingGroup {
        id: row
            .try_get("id")
            .map_err(|e| GroupError::DatabaseError(e.to_string()))?,
        public_id: row
            .try_get("public_id")
            .map_err(|e| GroupError::DatabaseError(e.to_string()))?,
        owner_id: row
            .try_get("owner_id")
            .map_err(|e| GroupError::DatabaseError(e.to_string()))?,
        name: row
            .try_get("name")
            .map_err(|e| GroupError::DatabaseError(e.to_string()))?,
        description: row
            .try_get("description")
            .map_err(|e| GroupError::DatabaseError(e.to_string()))?,
        max_members: row
            .try_get("max_members")
            .map_err(|e| GroupError::DatabaseError(e.to_string()))?,
        privacy: GroupPrivacy::from(privacy_str.as_str()),
        created_at: row
            .try_get("created_at")
            .map_err(|e| GroupError::DatabaseError(e.to_string()))?,
    })
}

fn map_member_row(row: &SqliteRow) -> GroupResult<GroupMember> {
    let role_str: String = row
        .try_get("role")
        .map_err(|e| GroupError::DatabaseError(e.to_string()))?;

    Ok(GroupMember {
        id: row
            .try_get("id")
            .map_err(|e| GroupError::DatabaseError(e.to_string()))?,
        group_id: row
            .try_get("group_id")
            .map_err(|e| GroupError::DatabaseError(e.to_string()))?,
        user_id: row
            .try_get("user_id")
            .map_err(|e| GroupError::DatabaseError(e.to_string()))?,
        role: GroupRole::from(role_str.as_str()),
        joined_at: row
            .try_get("joined_at")
            .map_err(|e| GroupError::DatabaseError(e.to_string()))?,
    })
}

fn map_invite_row(row: &SqliteRow) -> GroupResult<GroupInvite> {
    let status_str: String = row
        .try_get("status")
        .map_err(|e| GroupError::DatabaseError(e.to_string()))?;

    Ok(GroupInvite {
        id: row
            .try_get("id")
            .map_err(|e| GroupError::DatabaseError(e.to_string()))?,
        public_id: row
            .try_get("public_id")
            .map_err(|e| GroupError::DatabaseError(e.to_string()))?,
        group_id: row
            .try_get("group_id")
            .map_err(|e| GroupError::DatabaseError(e.to_string()))?,
        inviter_id: row
            .try_get("inviter_id")
            .map_err(|e| GroupError::DatabaseError(e.to_string()))?,
        invited_user_id: row
            .try_get("invited_user_id")
            .map_err(|e| GroupError::DatabaseError(e.to_string()))?,
        status: GroupInviteStatus::from(status_str.as_str()),
        message: row
            .try_get("message")
            .map_err(|e| GroupError::DatabaseError(e.to_string()))?,
        created_at: row
            .try_get("created_at")
            .map_err(|e| GroupError::DatabaseError(e.to_string()))?,
        responded_at: row
            .try_get("responded_at")
            .map_err(|e| GroupError::DatabaseError(e.to_string()))?,
    })
}

impl GroupRepository {
    /// Create a new group repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a group and its owner membership row in one transaction
    pub async fn create(
        &self,
        owner_id: i64,
        request: &CreateGroupRequest,
        default_max_members: i64,
    ) -> GroupResult<GamingGroup> {
        let group = GamingGroup::new(owner_id, request, default_max_members);
        group.validate().map_err(GroupError::ValidationError)?;

        let owner_member = GroupMember::new(0, owner_id, GroupRole::Owner);

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| GroupError::DatabaseError(e.to_string()))?;

        let result = sqlx::query(
            "INSERT INTO gaming_groups (public_id, owner_id, name, description, max_members, privacy, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&group.public_id)
        .bind(group.owner_id)
        .bind(&group.name)
        .bind(&group.description)
        .bind(group.max_members)
        .bind(String::from(group.privacy))
        .bind(&group.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| GroupError::DatabaseError(e.to_string()))?;

        let group_id = result.last_insert_rowid();

        sqlx::query("INSERT INTO group_members (group_id, user_id, role, joined_at) VALUES (?, ?, ?, ?)")
            .bind(group_id)
            .bind(owner_member.user_id)
            .bind(String::from(owner_member.role))
            .bind(&owner_member.joined_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| GroupError::DatabaseError(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| GroupError::DatabaseError(e.to_string()))?;

        info!(
            group_id = group_id,
            public_id = %group.public_id,
            owner_id = owner_id,
            name = %group.name,
            "created gaming group"
        );

        Ok(GamingGroup { id: group_id, ..group })
    }

    /// Find a group by ID
    pub async fn find_by_id(&self, id: i64) -> GroupResult<Option<GamingGroup>> {
        let row = sqlx::query(&format!(
            "SELECT {GROUP_COLUMNS} FROM gaming_groups WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| GroupError::DatabaseError(e.to_string()))?;

        row.as_ref().map(map_group_row).transpose()
    }

    /// Find a group by public ID
    pub async fn find_by_public_id(&self, public_id: &str) -> GroupResult<Option<GamingGroup>> {
        let row = sqlx::query(&format!(
            "SELECT {GROUP_COLUMNS} FROM gaming_groups WHERE public_id = ?"
        ))
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| GroupError::DatabaseError(e.to_string()))?;

        row.as_ref().map(map_group_row).transpose()
    }

    /// Find all members of a group
    pub async fn find_members(&self, group_id: i64) -> GroupResult<Vec<GroupMember>> {
        let rows = sqlx::query(&format!(
            "SELECT {MEMBER_COLUMNS} FROM group_members WHERE group_id = ? ORDER BY joined_at ASC"
        ))
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GroupError::DatabaseError(e.to_string()))?;

        rows.iter().map(map_member_row).collect()
    }

    /// Find a specific member
    pub async fn find_member(&self, group_id: i64, user_id: i64) -> GroupResult<Option<GroupMember>> {
        let row = sqlx::query(&format!(
            "SELECT {MEMBER_COLUMNS} FROM group_members WHERE group_id = ? AND user_id = ?"
        ))
        .bind(group_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| GroupError::DatabaseError(e.to_string()))?;

        row.as_ref().map(map_member_row).transpose()
    }

    /// Count members of a group
    pub async fn count_members(&self, group_id: i64) -> GroupResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM group_members WHERE group_id = ?")
            .bind(group_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| GroupError::DatabaseError(e.to_string()))?;

        row.try_get("count")
            .map_err(|e| GroupError::DatabaseError(e.to_string()))
    }

    /// Add a member. The caller has already checked capacity and privacy.
    pub async fn add_member(&self, group_id: i64, user_id: i64, role: GroupRole) -> GroupResult<GroupMember> {
        let member = GroupMember::new(group_id, user_id, role);

        let result = sqlx::query(
            "INSERT INTO group_members (group_id, user_id, role, joined_at) VALUES (?, ?, ?, ?)",
        )
        .bind(member.group_id)
        .bind(member.user_id)
        .bind(String::from(member.role))
        .bind(&member.joined_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_unique_violation() => GroupError::AlreadyMember,
            _ => GroupError::DatabaseError(e.to_string()),
        })?;

        let member_id = result.last_insert_rowid();

        info!(
            member_id = member_id,
            group_id = group_id,
            user_id = user_id,
            "added group member"
        );

        Ok(GroupMember { id: member_id, ..member })
    }

    /// Remove a member from a group
    pub async fn remove_member(&self, group_id: i64, user_id: i64) -> GroupResult<()> {
        let result = sqlx::query("DELETE FROM group_members WHERE group_id = ? AND user_id = ?")
            .bind(group_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| GroupError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(GroupError::MemberNotFound);
        }

        info!(group_id = group_id, user_id = user_id, "removed group member");
        Ok(())
    }

    /// Create a group invite
    pub async fn create_invite(
        &self,
        group_id: i64,
        inviter_id: i64,
        invited_user_id: i64,
        message: Option<String>,
    ) -> GroupResult<GroupInvite> {
        let invite = GroupInvite::new(group_id, inviter_id, invited_user_id, message);

        let result = sqlx::query(
            "INSERT INTO group_invites (public_id, group_id, inviter_id, invited_user_id, status, message, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&invite.public_id)
        .bind(invite.group_id)
        .bind(invite.inviter_id)
        .bind(invite.invited_user_id)
        .bind(String::from(invite.status))
        .bind(&invite.message)
        .bind(&invite.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| GroupError::DatabaseError(e.to_string()))?;

        let invite_id = result.last_insert_rowid();

        info!(
            invite_id = invite_id,
            group_id = group_id,
            inviter_id = inviter_id,
            invited_user_id = invited_user_id,
            "created group invite"
        );

        Ok(GroupInvite { id: invite_id, ..invite })
    }

    /// Find a group invite by public ID
    pub async fn find_invite_by_public_id(&self, public_id: &str) -> GroupResult<Option<GroupInvite>> {
        let row = sqlx::query(&format!(
            "SELECT {INVITE_COLUMNS} FROM group_invites WHERE public_id = ?"
        ))
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| GroupError::DatabaseError(e.to_string()))?;

        row.as_ref().map(map_invite_row).transpose()
    }

    /// Accept a pending group invite and add the membership row in one
    /// transaction.
    pub async fn accept_invite(&self, invite: &GroupInvite) -> GroupResult<(GroupInvite, GroupMember)> {
        if !invite.is_pending() {
            return Err(GroupError::InviteAlreadyResponded);
        }

        let now = chrono::Utc::now().to_rfc3339();
        let member = GroupMember::new(invite.group_id, invite.invited_user_id, GroupRole::Member);

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| GroupError::DatabaseError(e.to_string()))?;

        let updated = sqlx::query(
            "UPDATE group_invites SET status = 'accepted', responded_at = ? WHERE id = ? AND status = 'pending'",
        )
        .bind(&now)
        .bind(invite.id)
        .execute(&mut *tx)
        .await
        .map_err(|e| GroupError::DatabaseError(e.to_string()))?;

        if updated.rows_affected() == 0 {
            return Err(GroupError::InviteAlreadyResponded);
        }

        let result = sqlx::query(
            "INSERT INTO group_members (group_id, user_id, role, joined_at) VALUES (?, ?, ?, ?)",
        )
        .bind(member.group_id)
        .bind(member.user_id)
        .bind(String::from(member.role))
        .bind(&member.joined_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_unique_violation() => GroupError::AlreadyMember,
            _ => GroupError::DatabaseError(e.to_string()),
        })?;

        tx.commit()
            .await
            .map_err(|e| GroupError::DatabaseError(e.to_string()))?;

        info!(
            invite_id = invite.id,
            group_id = invite.group_id,
            user_id = invite.invited_user_id,
            "group invite accepted, member added"
        );

        let mut accepted = invite.clone();
        accepted.status = GroupInviteStatus::Accepted;
        accepted.responded_at = Some(now);

        let member = GroupMember {
            id: result.last_insert_rowid(),
            ..member
        };

        Ok((accepted, member))
    }

    /// Decline a pending group invite
    pub async fn decline_invite(&self, invite: &GroupInvite) -> GroupResult<GroupInvite> {
        self.settle_invite(invite, GroupInviteStatus::Declined).await
    }

    /// Cancel a pending group invite. The inviter-only rule is the caller's.
    pub async fn cancel_invite(&self, invite: &GroupInvite) -> GroupResult<GroupInvite> {
        self.settle_invite(invite, GroupInviteStatus::Cancelled).await
    }

    async fn settle_invite(&self, invite: &GroupInvite, status: GroupInviteStatus) -> GroupResult<GroupInvite> {
        if !invite.is_pending() {
            return Err(GroupError::InviteAlreadyResponded);
        }

        let now = chrono::Utc::now().to_rfc3339();

        let updated = sqlx::query(
            "UPDATE group_invites SET status = ?, responded_at = ? WHERE id = ? AND status = 'pending'",
        )
        .bind(String::from(status))
        .bind(&now)
        .bind(invite.id)
        .execute(&self.pool)
        .await
        .map_err(|e| GroupError::DatabaseError(e.to_string()))?;

        if updated.rows_affected() == 0 {
            return Err(GroupError::InviteAlreadyResponded);
        }

        info!(
            invite_id = invite.id,
            group_id = invite.group_id,
            status = %String::from(status),
            "group invite settled"
        );

        let mut settled = invite.clone();
        settled.status = status;
        settled.responded_at = Some(now);
        Ok(settled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::test_support::create_test_pool;

    fn sample_request() -> CreateGroupRequest {
        CreateGroupRequest {
            name: "Night Owls".to_string(),
            description: None,
            max_members: Some(3),
            privacy: Some("invite_only".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_group_adds_owner_member() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = GroupRepository::new(pool);

        let group = repo.create(1, &sample_request(), 25).await.unwrap();
        assert!(group.id > 0);

        let members = repo.find_members(group.id).await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].user_id, 1);
        assert!(members[0].is_owner());

        let found = repo.find_by_public_id(&group.public_id).await.unwrap().unwrap();
        assert_eq!(found.name, "Night Owls");
    }

    #[tokio::test]
    async fn test_add_and_remove_member() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = GroupRepository::new(pool);

        let group = repo.create(1, &sample_request(), 25).await.unwrap();
        repo.add_member(group.id, 2, GroupRole::Member).await.unwrap();

        assert_eq!(repo.count_members(group.id).await.unwrap(), 2);
        assert!(matches!(
            repo.add_member(group.id, 2, GroupRole::Member).await,
            Err(GroupError::AlreadyMember)
        ));

        repo.remove_member(group.id, 2).await.unwrap();
        assert_eq!(repo.count_members(group.id).await.unwrap(), 1);
        assert!(matches!(
            repo.remove_member(group.id, 2).await,
            Err(GroupError::MemberNotFound)
        ));
    }

    #[tokio::test]
    async fn test_invite_accept_adds_member() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = GroupRepository::new(pool);

        let group = repo.create(1, &sample_request(), 25).await.unwrap();
        let invite = repo.create_invite(group.id, 1, 2, Some("join us".to_string())).await.unwrap();

        let (accepted, member) = repo.accept_invite(&invite).await.unwrap();
        assert_eq!(accepted.status, GroupInviteStatus::Accepted);
        assert_eq!(member.role, GroupRole::Member);
        assert_eq!(repo.count_members(group.id).await.unwrap(), 2);

        // Second accept fails without duplicating the membership
        assert!(matches!(
            repo.accept_invite(&invite).await,
            Err(GroupError::InviteAlreadyResponded)
        ));
        assert_eq!(repo.count_members(group.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_invite_cancel() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = GroupRepository::new(pool);

        let group = repo.create(1, &sample_request(), 25).await.unwrap();
        let invite = repo.create_invite(group.id, 1, 2, None).await.unwrap();

        let cancelled = repo.cancel_invite(&invite).await.unwrap();
        assert_eq!(cancelled.status, GroupInviteStatus::Cancelled);

        assert!(matches!(
            repo.accept_invite(&invite).await,
            Err(GroupError::InviteAlreadyResponded)
        ));
        assert_eq!(repo.count_members(group.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_invite_decline() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = GroupRepository::new(pool);

        let group = repo.create(1, &sample_request(), 25).await.unwrap();
        let invite = repo.create_invite(group.id, 1, 2, None).await.unwrap();

        let declined = repo.decline_invite(&invite).await.unwrap();
        assert_eq!(declined.status, GroupInviteStatus::Declined);
        assert_eq!(repo.count_members(group.id).await.unwrap(), 1);
    }
}
