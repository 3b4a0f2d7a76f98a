//! Chat Space Repository Implementation
//!
//! PostgreSQL implementation of the ChatSpaceRepository trait, covering both
//! `chat_spaces` and `chat_space_members`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{
    ChatSpace, ChatSpaceMember, ChatSpaceMemberView, ChatSpaceRepository, ChatSpaceRole, ChatSpaceStatus,
    RequestToJoinStatus, Visibility,
};
use crate::shared::error::AppError;
use crate::shared::pagination::SearchRequest;

const CHAT_SPACE_COLUMNS: &str = r#"
    cs.id, cs.title, cs.description, cs.tags, cs.guidelines_or_rules, cs.visibility, cs.status,
    cs.organizer_id, cs.external_id_or_name, cs.space_link, cs.total_members,
    cs.total_request_to_join, cs.total_likes, cs.is_deleted, cs.created_at, cs.updated_at
"#;

const MEMBER_VIEW_COLUMNS: &str = r#"
    csm.id, csm.chat_space_id, csm.member_id, csm.role, csm.request_to_join_status,
    csm.join_reason, csm.decision_reason, csm.left_space, csm.removed, csm.created_at,
    csm.updated_at, m.first_name, m.last_name, m.username, m.profile_photo_url
"#;

#[derive(Debug, sqlx::FromRow)]
struct ChatSpaceRow {
    id: i64,
    title: String,
    description: String,
    tags: Option<String>,
    guidelines_or_rules: Option<String>,
    visibility: String,
    status: String,
    organizer_id: i64,
    external_id_or_name: Option<String>,
    space_link: Option<String>,
    total_members: i64,
    total_request_to_join: i64,
    total_likes: i64,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ChatSpaceRow> for ChatSpace {
    type Error = AppError;

    fn try_from(row: ChatSpaceRow) -> Result<Self, Self::Error> {
        Ok(ChatSpace {
            id: row.id,
            title: row.title,
            description: row.description,
            tags: row.tags,
            guidelines_or_rules: row.guidelines_or_rules,
            visibility: Visibility::from_db(&row.visibility)?,
            status: ChatSpaceStatus::from_db(&row.status)?,
            organizer_id: row.organizer_id,
            external_id_or_name: row.external_id_or_name,
            space_link: row.space_link,
            total_members: row.total_members,
            total_request_to_join: row.total_request_to_join,
            total_likes: row.total_likes,
            is_deleted: row.is_deleted,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MembershipRow {
    id: i64,
    chat_space_id: i64,
    member_id: i64,
    role: String,
    request_to_join_status: String,
    join_reason: Option<String>,
    decision_reason: Option<String>,
    left_space: bool,
    removed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MembershipRow> for ChatSpaceMember {
    type Error = AppError;

    fn try_from(row: MembershipRow) -> Result<Self, Self::Error> {
        Ok(ChatSpaceMember {
            id: row.id,
            chat_space_id: row.chat_space_id,
            member_id: row.member_id,
            role: ChatSpaceRole::from_db(&row.role)?,
            request_to_join_status: RequestToJoinStatus::from_db(&row.request_to_join_status)?,
            join_reason: row.join_reason,
            decision_reason: row.decision_reason,
            left: row.left_space,
            removed: row.removed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MembershipViewRow {
    #[sqlx(flatten)]
    membership: MembershipRow,
    first_name: String,
    last_name: String,
    username: String,
    profile_photo_url: Option<String>,
}

impl TryFrom<MembershipViewRow> for ChatSpaceMemberView {
    type Error = AppError;

    fn try_from(row: MembershipViewRow) -> Result<Self, Self::Error> {
        Ok(ChatSpaceMemberView {
            membership: row.membership.try_into()?,
            full_name: format!("{} {}", row.first_name, row.last_name).trim().to_string(),
            username: row.username,
            profile_photo_url: row.profile_photo_url,
        })
    }
}

fn into_spaces(rows: Vec<ChatSpaceRow>) -> Result<Vec<ChatSpace>, AppError> {
    rows.into_iter().map(ChatSpace::try_from).collect()
}

fn into_views(rows: Vec<MembershipViewRow>) -> Result<Vec<ChatSpaceMemberView>, AppError> {
    rows.into_iter().map(ChatSpaceMemberView::try_from).collect()
}

#[derive(Clone)]
pub struct PgChatSpaceRepository {
    pool: PgPool,
}

impl PgChatSpaceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_membership_views(
        &self,
        chat_space_id: i64,
        filter: &str,
        request: &SearchRequest,
    ) -> Result<(Vec<ChatSpaceMemberView>, i64), AppError> {
        let from = format!(
            r#"
            FROM chat_space_members csm
            JOIN members m ON m.id = csm.member_id
            WHERE csm.chat_space_id = $1 AND {}
              AND (m.first_name || ' ' || m.last_name ILIKE $2 OR m.username ILIKE $2)
            "#,
            filter
        );
        let pattern = request.pattern();

        let rows = sqlx::query_as::<_, MembershipViewRow>(&format!(
            "SELECT {} {} ORDER BY csm.created_at ASC LIMIT $3 OFFSET $4",
            MEMBER_VIEW_COLUMNS, from
        ))
        .bind(chat_space_id)
        .bind(&pattern)
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) {}", from))
            .bind(chat_space_id)
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await?;

        Ok((into_views(rows)?, total))
    }
}

#[async_trait]
impl ChatSpaceRepository for PgChatSpaceRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<ChatSpace>, AppError> {
        let row = sqlx::query_as::<_, ChatSpaceRow>(&format!(
            "SELECT {} FROM chat_spaces cs WHERE cs.id = $1 AND cs.is_deleted = FALSE",
            CHAT_SPACE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ChatSpace::try_from).transpose()
    }

    async fn create(&self, chat_space: &ChatSpace, organizer: &ChatSpaceMember) -> Result<ChatSpace, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO chat_spaces (
                id, title, description, tags, guidelines_or_rules, visibility, status, organizer_id,
                external_id_or_name, space_link, total_members, total_request_to_join, total_likes,
                is_deleted, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 0, 0, FALSE, $12, $13)
            "#,
        )
        .bind(chat_space.id)
        .bind(&chat_space.title)
        .bind(&chat_space.description)
        .bind(&chat_space.tags)
        .bind(&chat_space.guidelines_or_rules)
        .bind(chat_space.visibility.as_str())
        .bind(chat_space.status.as_str())
        .bind(chat_space.organizer_id)
        .bind(&chat_space.external_id_or_name)
        .bind(&chat_space.space_link)
        .bind(chat_space.total_members)
        .bind(chat_space.created_at)
        .bind(chat_space.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO chat_space_members (
                id, chat_space_id, member_id, role, request_to_join_status, left_space, removed,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, FALSE, FALSE, $6, $7)
            "#,
        )
        .bind(organizer.id)
        .bind(organizer.chat_space_id)
        .bind(organizer.member_id)
        .bind(organizer.role.as_str())
        .bind(organizer.request_to_join_status.as_str())
        .bind(organizer.created_at)
        .bind(organizer.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.find_by_id(chat_space.id)
            .await?
            .ok_or_else(|| AppError::Internal("chat space missing after insert".into()))
    }

    async fn update(&self, chat_space: &ChatSpace) -> Result<ChatSpace, AppError> {
        let row = sqlx::query_as::<_, ChatSpaceRow>(&format!(
            r#"
            UPDATE chat_spaces cs
            SET title = $2, description = $3, tags = $4, guidelines_or_rules = $5, visibility = $6,
                status = $7, external_id_or_name = $8, space_link = $9, updated_at = NOW()
            WHERE cs.id = $1 AND cs.is_deleted = FALSE
            RETURNING {}
            "#,
            CHAT_SPACE_COLUMNS
        ))
        .bind(chat_space.id)
        .bind(&chat_space.title)
        .bind(&chat_space.description)
        .bind(&chat_space.tags)
        .bind(&chat_space.guidelines_or_rules)
        .bind(chat_space.visibility.as_str())
        .bind(chat_space.status.as_str())
        .bind(&chat_space.external_id_or_name)
        .bind(&chat_space.space_link)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("chat.space.not.found".into()))?;

        row.try_into()
    }

    async fn soft_delete(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("UPDATE chat_spaces SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn search(&self, request: &SearchRequest) -> Result<(Vec<ChatSpace>, i64), AppError> {
        let filter = r#"
            cs.is_deleted = FALSE AND cs.status = 'ACTIVE'
            AND (cs.title ILIKE $1 OR cs.description ILIKE $1 OR COALESCE(cs.tags, '') ILIKE $1)
        "#;
        let pattern = request.pattern();

        let rows = sqlx::query_as::<_, ChatSpaceRow>(&format!(
            "SELECT {} FROM chat_spaces cs WHERE {} ORDER BY cs.created_at DESC LIMIT $2 OFFSET $3",
            CHAT_SPACE_COLUMNS, filter
        ))
        .bind(&pattern)
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM chat_spaces cs WHERE {}", filter))
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await?;

        Ok((into_spaces(rows)?, total))
    }

    async fn find_by_member(&self, member_id: i64, request: &SearchRequest) -> Result<(Vec<ChatSpace>, i64), AppError> {
        let filter = r#"
            cs.is_deleted = FALSE AND cs.title ILIKE $2
            AND (cs.organizer_id = $1 OR EXISTS (
                SELECT 1 FROM chat_space_members csm
                WHERE csm.chat_space_id = cs.id AND csm.member_id = $1
                  AND csm.request_to_join_status = 'APPROVED'
                  AND csm.left_space = FALSE AND csm.removed = FALSE
            ))
        "#;
        let pattern = request.pattern();

        let rows = sqlx::query_as::<_, ChatSpaceRow>(&format!(
            "SELECT {} FROM chat_spaces cs WHERE {} ORDER BY cs.created_at DESC LIMIT $3 OFFSET $4",
            CHAT_SPACE_COLUMNS, filter
        ))
        .bind(member_id)
        .bind(&pattern)
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM chat_spaces cs WHERE {}", filter))
            .bind(member_id)
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await?;

        Ok((into_spaces(rows)?, total))
    }

    async fn adjust_counters(&self, id: i64, members_delta: i64, requests_delta: i64) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE chat_spaces
            SET total_members = GREATEST(total_members + $2, 0),
                total_request_to_join = GREATEST(total_request_to_join + $3, 0),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(members_delta)
        .bind(requests_delta)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_member(&self, chat_space_id: i64, member_id: i64) -> Result<Option<ChatSpaceMember>, AppError> {
        let row = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT id, chat_space_id, member_id, role, request_to_join_status, join_reason,
                   decision_reason, left_space, removed, created_at, updated_at
            FROM chat_space_members
            WHERE chat_space_id = $1 AND member_id = $2
            "#,
        )
        .bind(chat_space_id)
        .bind(member_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ChatSpaceMember::try_from).transpose()
    }

    async fn save_member(&self, membership: &ChatSpaceMember) -> Result<ChatSpaceMember, AppError> {
        let row = sqlx::query_as::<_, MembershipRow>(
            r#"
            INSERT INTO chat_space_members (
                id, chat_space_id, member_id, role, request_to_join_status, join_reason,
                decision_reason, left_space, removed, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW())
            ON CONFLICT (chat_space_id, member_id) DO UPDATE
            SET role = EXCLUDED.role,
                request_to_join_status = EXCLUDED.request_to_join_status,
                join_reason = EXCLUDED.join_reason,
                decision_reason = EXCLUDED.decision_reason,
                left_space = EXCLUDED.left_space,
                removed = EXCLUDED.removed,
                updated_at = NOW()
            RETURNING id, chat_space_id, member_id, role, request_to_join_status, join_reason,
                      decision_reason, left_space, removed, created_at, updated_at
            "#,
        )
        .bind(membership.id)
        .bind(membership.chat_space_id)
        .bind(membership.member_id)
        .bind(membership.role.as_str())
        .bind(membership.request_to_join_status.as_str())
        .bind(&membership.join_reason)
        .bind(&membership.decision_reason)
        .bind(membership.left)
        .bind(membership.removed)
        .bind(membership.created_at)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn find_members(
        &self,
        chat_space_id: i64,
        request: &SearchRequest,
    ) -> Result<(Vec<ChatSpaceMemberView>, i64), AppError> {
        self.find_membership_views(
            chat_space_id,
            "csm.request_to_join_status = 'APPROVED' AND csm.left_space = FALSE AND csm.removed = FALSE",
            request,
        )
        .await
    }

    async fn find_join_requests(
        &self,
        chat_space_id: i64,
        request: &SearchRequest,
    ) -> Result<(Vec<ChatSpaceMemberView>, i64), AppError> {
        self.find_membership_views(
            chat_space_id,
            "csm.request_to_join_status = 'PENDING' AND csm.removed = FALSE",
            request,
        )
        .await
    }
}
