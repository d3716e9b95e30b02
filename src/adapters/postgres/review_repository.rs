//! PostgreSQL implementation of ReviewRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::db_error;
use crate::domain::foundation::{
    CustomerId, DomainError, ErrorCode, ProviderId, RequestId, ReviewId, Timestamp,
};
use crate::domain::marketplace::Review;
use crate::ports::ReviewRepository;

#[derive(Clone)]
pub struct PostgresReviewRepository {
    pool: PgPool,
}

impl PostgresReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: Uuid,
    provider_id: Uuid,
    customer_id: Uuid,
    request_id: Uuid,
    rating: i16,
    comment: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = DomainError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        let rating = u8::try_from(row.rating)
            .ok()
            .filter(|r| (1..=5).contains(r))
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Invalid review rating: {}", row.rating),
                )
            })?;

        Ok(Review {
            id: ReviewId::from_uuid(row.id),
            provider_id: ProviderId::from_uuid(row.provider_id),
            customer_id: CustomerId::from_uuid(row.customer_id),
            request_id: RequestId::from_uuid(row.request_id),
            rating,
            comment: row.comment,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

#[async_trait]
impl ReviewRepository for PostgresReviewRepository {
    async fn find_by_id(&self, id: &ReviewId) -> Result<Option<Review>, DomainError> {
        let row: Option<ReviewRow> = sqlx::query_as(
            r#"
            SELECT id, provider_id, customer_id, request_id, rating, comment, created_at
            FROM reviews WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("fetch review"))?;

        row.map(Review::try_from).transpose()
    }

    async fn delete(&self, id: &ReviewId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_error("delete review"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::ReviewNotFound,
                format!("Review not found: {}", id),
            ));
        }
        Ok(())
    }

    async fn count_for_provider_between(
        &self,
        id: &ProviderId,
        from: Timestamp,
        until: Timestamp,
    ) -> Result<u64, DomainError> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM reviews
            WHERE provider_id = $1 AND created_at >= $2 AND created_at < $3
            "#,
        )
        .bind(id.as_uuid())
        .bind(from.as_datetime())
        .bind(until.as_datetime())
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("count provider reviews"))?;

        Ok(count as u64)
    }
}
