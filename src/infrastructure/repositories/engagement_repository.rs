//! Repositories for records attached to a parent: likes, bookmarks, links
//! and reviews.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{
    Bookmark, BookmarkRepository, Like, LikeRepository, LikeType, Link, LinkRepository, LinkType, ParentType,
    Review, ReviewRepository, ReviewView,
};
use crate::shared::error::AppError;
use crate::shared::pagination::SearchRequest;

/// Table holding parents of the given type.
fn parent_table(parent_type: ParentType) -> &'static str {
    match parent_type {
        ParentType::ChatSpace => "chat_spaces",
        ParentType::Stream => "streams",
        ParentType::SoftAsk => "soft_asks",
        ParentType::Business => "businesses",
    }
}

async fn parent_exists(pool: &PgPool, parent_type: ParentType, parent_id: i64) -> Result<bool, AppError> {
    let sql = format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1 AND is_deleted = FALSE)",
        parent_table(parent_type)
    );
    let exists = sqlx::query_scalar::<_, bool>(&sql)
        .bind(parent_id)
        .fetch_one(pool)
        .await?;
    Ok(exists)
}

#[derive(Debug, sqlx::FromRow)]
struct LikeRow {
    id: i64,
    member_id: i64,
    parent_type: String,
    parent_id: i64,
    like_type: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<LikeRow> for Like {
    type Error = AppError;

    fn try_from(row: LikeRow) -> Result<Self, Self::Error> {
        Ok(Like {
            id: row.id,
            member_id: row.member_id,
            parent_type: ParentType::from_db(&row.parent_type)?,
            parent_id: row.parent_id,
            like_type: LikeType::from_db(&row.like_type)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct PgLikeRepository {
    pool: PgPool,
}

impl PgLikeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LikeRepository for PgLikeRepository {
    async fn find(&self, member_id: i64, parent_type: ParentType, parent_id: i64) -> Result<Option<Like>, AppError> {
        let row = sqlx::query_as::<_, LikeRow>(
            r#"
            SELECT id, member_id, parent_type, parent_id, like_type, created_at, updated_at
            FROM likes WHERE member_id = $1 AND parent_type = $2 AND parent_id = $3
            "#,
        )
        .bind(member_id)
        .bind(parent_type.as_str())
        .bind(parent_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Like::try_from).transpose()
    }

    async fn upsert(&self, like: &Like) -> Result<Like, AppError> {
        let row = sqlx::query_as::<_, LikeRow>(
            r#"
            INSERT INTO likes (id, member_id, parent_type, parent_id, like_type, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
            ON CONFLICT (member_id, parent_type, parent_id) DO UPDATE
            SET like_type = EXCLUDED.like_type, updated_at = NOW()
            RETURNING id, member_id, parent_type, parent_id, like_type, created_at, updated_at
            "#,
        )
        .bind(like.id)
        .bind(like.member_id)
        .bind(like.parent_type.as_str())
        .bind(like.parent_id)
        .bind(like.like_type.as_str())
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn adjust_parent_total(&self, parent_type: ParentType, parent_id: i64, delta: i64) -> Result<i64, AppError> {
        let sql = format!(
            "UPDATE {} SET total_likes = GREATEST(total_likes + $2, 0) WHERE id = $1 RETURNING total_likes",
            parent_table(parent_type)
        );
        let total = sqlx::query_scalar::<_, i64>(&sql)
            .bind(parent_id)
            .bind(delta)
            .fetch_optional(&self.pool)
            .await?
            .unwrap_or(0);
        Ok(total)
    }

    async fn parent_exists(&self, parent_type: ParentType, parent_id: i64) -> Result<bool, AppError> {
        parent_exists(&self.pool, parent_type, parent_id).await
    }

    async fn find_liked(
        &self,
        member_id: i64,
        parent_type: ParentType,
        request: &SearchRequest,
    ) -> Result<(Vec<Like>, i64), AppError> {
        let rows = sqlx::query_as::<_, LikeRow>(
            r#"
            SELECT id, member_id, parent_type, parent_id, like_type, created_at, updated_at
            FROM likes
            WHERE member_id = $1 AND parent_type = $2 AND like_type = 'LIKE'
            ORDER BY updated_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(member_id)
        .bind(parent_type.as_str())
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM likes WHERE member_id = $1 AND parent_type = $2 AND like_type = 'LIKE'",
        )
        .bind(member_id)
        .bind(parent_type.as_str())
        .fetch_one(&self.pool)
        .await?;

        let likes = rows.into_iter().map(Like::try_from).collect::<Result<Vec<_>, _>>()?;
        Ok((likes, total))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct BookmarkRow {
    id: i64,
    member_id: i64,
    parent_type: String,
    parent_id: i64,
    parent_title: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<BookmarkRow> for Bookmark {
    type Error = AppError;

    fn try_from(row: BookmarkRow) -> Result<Self, Self::Error> {
        Ok(Bookmark {
            id: row.id,
            member_id: row.member_id,
            parent_type: ParentType::from_db(&row.parent_type)?,
            parent_id: row.parent_id,
            parent_title: row.parent_title,
            created_at: row.created_at,
        })
    }
}

#[derive(Clone)]
pub struct PgBookmarkRepository {
    pool: PgPool,
}

impl PgBookmarkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookmarkRepository for PgBookmarkRepository {
    async fn exists(&self, member_id: i64, parent_type: ParentType, parent_id: i64) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM bookmarks WHERE member_id = $1 AND parent_type = $2 AND parent_id = $3)",
        )
        .bind(member_id)
        .bind(parent_type.as_str())
        .bind(parent_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn create(&self, bookmark: &Bookmark) -> Result<Bookmark, AppError> {
        sqlx::query(
            "INSERT INTO bookmarks (id, member_id, parent_type, parent_id, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(bookmark.id)
        .bind(bookmark.member_id)
        .bind(bookmark.parent_type.as_str())
        .bind(bookmark.parent_id)
        .bind(bookmark.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "bookmark.already.exists"))?;

        Ok(bookmark.clone())
    }

    async fn delete(&self, member_id: i64, parent_type: ParentType, parent_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM bookmarks WHERE member_id = $1 AND parent_type = $2 AND parent_id = $3")
            .bind(member_id)
            .bind(parent_type.as_str())
            .bind(parent_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn parent_exists(&self, parent_type: ParentType, parent_id: i64) -> Result<bool, AppError> {
        parent_exists(&self.pool, parent_type, parent_id).await
    }

    async fn find_by_member(
        &self,
        member_id: i64,
        parent_type: Option<ParentType>,
        request: &SearchRequest,
    ) -> Result<(Vec<Bookmark>, i64), AppError> {
        let titles = ParentType::ALL
            .iter()
            .map(|p| {
                format!(
                    "WHEN '{}' THEN (SELECT title FROM {} WHERE id = b.parent_id)",
                    p.as_str(),
                    parent_table(*p)
                )
            })
            .collect::<Vec<_>>()
            .join(" ");
        let filter = "b.member_id = $1 AND ($2::varchar IS NULL OR b.parent_type = $2)";
        let parent = parent_type.map(|p| p.as_str());

        let rows = sqlx::query_as::<_, BookmarkRow>(&format!(
            r#"
            SELECT b.id, b.member_id, b.parent_type, b.parent_id,
                   CASE b.parent_type {} END AS parent_title, b.created_at
            FROM bookmarks b
            WHERE {}
            ORDER BY b.created_at DESC
            LIMIT $3 OFFSET $4
            "#,
            titles, filter
        ))
        .bind(member_id)
        .bind(parent)
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM bookmarks b WHERE {}", filter))
            .bind(member_id)
            .bind(parent)
            .fetch_one(&self.pool)
            .await?;

        let bookmarks = rows.into_iter().map(Bookmark::try_from).collect::<Result<Vec<_>, _>>()?;
        Ok((bookmarks, total))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LinkRow {
    id: i64,
    parent_type: String,
    parent_id: i64,
    link_type: String,
    url: String,
}

impl TryFrom<LinkRow> for Link {
    type Error = AppError;

    fn try_from(row: LinkRow) -> Result<Self, Self::Error> {
        Ok(Link {
            id: row.id,
            parent_type: ParentType::from_db(&row.parent_type)?,
            parent_id: row.parent_id,
            link_type: LinkType::from_db(&row.link_type)?,
            url: row.url,
        })
    }
}

#[derive(Clone)]
pub struct PgLinkRepository {
    pool: PgPool,
}

impl PgLinkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn find_by_parent(&self, parent_type: ParentType, parent_id: i64) -> Result<Vec<Link>, AppError> {
        let rows = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, parent_type, parent_id, link_type, url FROM links
            WHERE parent_type = $1 AND parent_id = $2
            ORDER BY link_type
            "#,
        )
        .bind(parent_type.as_str())
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Link::try_from).collect()
    }

    async fn replace_all(&self, parent_type: ParentType, parent_id: i64, links: &[Link]) -> Result<Vec<Link>, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM links WHERE parent_type = $1 AND parent_id = $2")
            .bind(parent_type.as_str())
            .bind(parent_id)
            .execute(&mut *tx)
            .await?;

        for link in links {
            sqlx::query("INSERT INTO links (id, parent_type, parent_id, link_type, url) VALUES ($1, $2, $3, $4, $5)")
                .bind(link.id)
                .bind(parent_type.as_str())
                .bind(parent_id)
                .bind(link.link_type.as_str())
                .bind(&link.url)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        self.find_by_parent(parent_type, parent_id).await
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: i64,
    reviewer_id: i64,
    parent_type: String,
    parent_id: i64,
    rating: i16,
    comment: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = AppError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        Ok(Review {
            id: row.id,
            reviewer_id: row.reviewer_id,
            parent_type: ParentType::from_db(&row.parent_type)?,
            parent_id: row.parent_id,
            rating: row.rating,
            comment: row.comment,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ReviewViewRow {
    #[sqlx(flatten)]
    review: ReviewRow,
    first_name: String,
    last_name: String,
    profile_photo_url: Option<String>,
}

impl TryFrom<ReviewViewRow> for ReviewView {
    type Error = AppError;

    fn try_from(row: ReviewViewRow) -> Result<Self, Self::Error> {
        Ok(ReviewView {
            review: row.review.try_into()?,
            reviewer_name: format!("{} {}", row.first_name, row.last_name).trim().to_string(),
            reviewer_photo_url: row.profile_photo_url,
        })
    }
}

const REVIEW_VIEW_SELECT: &str = r#"
    SELECT r.id, r.reviewer_id, r.parent_type, r.parent_id, r.rating, r.comment, r.created_at,
           r.updated_at, m.first_name, m.last_name, m.profile_photo_url
    FROM reviews r JOIN members m ON m.id = r.reviewer_id
"#;

#[derive(Clone)]
pub struct PgReviewRepository {
    pool: PgPool,
}

impl PgReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewRepository for PgReviewRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Review>, AppError> {
        let row = sqlx::query_as::<_, ReviewRow>(
            r#"
            SELECT id, reviewer_id, parent_type, parent_id, rating, comment, created_at, updated_at
            FROM reviews WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Review::try_from).transpose()
    }

    async fn exists(&self, reviewer_id: i64, parent_type: ParentType, parent_id: i64) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM reviews WHERE reviewer_id = $1 AND parent_type = $2 AND parent_id = $3)",
        )
        .bind(reviewer_id)
        .bind(parent_type.as_str())
        .bind(parent_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn create(&self, review: &Review) -> Result<Review, AppError> {
        let row = sqlx::query_as::<_, ReviewRow>(
            r#"
            INSERT INTO reviews (id, reviewer_id, parent_type, parent_id, rating, comment, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, reviewer_id, parent_type, parent_id, rating, comment, created_at, updated_at
            "#,
        )
        .bind(review.id)
        .bind(review.reviewer_id)
        .bind(review.parent_type.as_str())
        .bind(review.parent_id)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.created_at)
        .bind(review.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "review.already.exists"))?;

        row.try_into()
    }

    async fn update(&self, review: &Review) -> Result<Review, AppError> {
        let row = sqlx::query_as::<_, ReviewRow>(
            r#"
            UPDATE reviews SET rating = $2, comment = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, reviewer_id, parent_type, parent_id, rating, comment, created_at, updated_at
            "#,
        )
        .bind(review.id)
        .bind(review.rating)
        .bind(&review.comment)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("review.not.found".into()))?;

        row.try_into()
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_by_parent(
        &self,
        parent_type: ParentType,
        parent_id: i64,
        request: &SearchRequest,
    ) -> Result<(Vec<ReviewView>, i64), AppError> {
        let rows = sqlx::query_as::<_, ReviewViewRow>(&format!(
            "{} WHERE r.parent_type = $1 AND r.parent_id = $2 ORDER BY r.created_at DESC LIMIT $3 OFFSET $4",
            REVIEW_VIEW_SELECT
        ))
        .bind(parent_type.as_str())
        .bind(parent_id)
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reviews WHERE parent_type = $1 AND parent_id = $2")
            .bind(parent_type.as_str())
            .bind(parent_id)
            .fetch_one(&self.pool)
            .await?;

        let reviews = rows.into_iter().map(ReviewView::try_from).collect::<Result<Vec<_>, _>>()?;
        Ok((reviews, total))
    }

    async fn average_rating(&self, parent_type: ParentType, parent_id: i64) -> Result<Option<f64>, AppError> {
        let average = sqlx::query_scalar::<_, Option<f64>>(
            "SELECT AVG(rating)::float8 FROM reviews WHERE parent_type = $1 AND parent_id = $2",
        )
        .bind(parent_type.as_str())
        .bind(parent_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(average)
    }

    async fn find_by_reviewer(&self, reviewer_id: i64, request: &SearchRequest) -> Result<(Vec<ReviewView>, i64), AppError> {
        let rows = sqlx::query_as::<_, ReviewViewRow>(&format!(
            "{} WHERE r.reviewer_id = $1 ORDER BY r.created_at DESC LIMIT $2 OFFSET $3",
            REVIEW_VIEW_SELECT
        ))
        .bind(reviewer_id)
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reviews WHERE reviewer_id = $1")
            .bind(reviewer_id)
            .fetch_one(&self.pool)
            .await?;

        let reviews = rows.into_iter().map(ReviewView::try_from).collect::<Result<Vec<_>, _>>()?;
        Ok((reviews, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(ParentType::ChatSpace, "chat_spaces")]
    #[test_case(ParentType::Stream, "streams")]
    #[test_case(ParentType::SoftAsk, "soft_asks")]
    #[test_case(ParentType::Business, "businesses")]
    fn test_parent_table(parent_type: ParentType, table: &str) {
        assert_eq!(parent_table(parent_type), table);
    }
}
