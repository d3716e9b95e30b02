//! PostgreSQL implementations of RequestRepository and BidRepository.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::db_error;
use crate::domain::foundation::{
    BidId, CustomerId, DomainError, ErrorCode, ProviderId, RequestId, ReviewId, Timestamp,
};
use crate::domain::marketplace::{Bid, GeoPoint, RequestDetails, RequestState, ServiceRequest};
use crate::ports::{BidRepository, RequestRepository};

#[derive(Clone)]
pub struct PostgresRequestRepository {
    pool: PgPool,
}

impl PostgresRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RequestRow {
    id: Uuid,
    customer_id: Uuid,
    provider_id: Option<Uuid>,
    category: String,
    service: String,
    description: String,
    budget: f64,
    price: Option<f64>,
    date: NaiveDate,
    latitude: Option<f64>,
    longitude: Option<f64>,
    state: String,
    paid: bool,
    review_id: Option<Uuid>,
    details: Json<RequestDetails>,
    created_at: DateTime<Utc>,
}

impl TryFrom<RequestRow> for ServiceRequest {
    type Error = DomainError;

    fn try_from(row: RequestRow) -> Result<Self, Self::Error> {
        let state = RequestState::parse(&row.state).ok_or_else(|| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid request state: {}", row.state),
            )
        })?;

        let location = match (row.latitude, row.longitude) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon).map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Invalid stored location: {}", e),
                )
            })?),
            _ => None,
        };

        Ok(ServiceRequest {
            id: RequestId::from_uuid(row.id),
            customer_id: CustomerId::from_uuid(row.customer_id),
            provider_id: row.provider_id.map(ProviderId::from_uuid),
            category: row.category,
            service: row.service,
            description: row.description,
            budget: row.budget,
            price: row.price,
            date: row.date,
            location,
            state,
            paid: row.paid,
            review_id: row.review_id.map(ReviewId::from_uuid),
            details: row.details.0,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

const REQUEST_COLUMNS: &str = "id, customer_id, provider_id, category, service, description, \
     budget, price, date, latitude, longitude, state, paid, review_id, details, created_at";

fn into_requests(rows: Vec<RequestRow>) -> Result<Vec<ServiceRequest>, DomainError> {
    rows.into_iter().map(ServiceRequest::try_from).collect()
}

#[async_trait]
impl RequestRepository for PostgresRequestRepository {
    async fn save(&self, request: &ServiceRequest) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO requests (
                id, customer_id, provider_id, category, service, description,
                budget, price, date, latitude, longitude, state, paid, review_id,
                details, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(request.id.as_uuid())
        .bind(request.customer_id.as_uuid())
        .bind(request.provider_id.map(|p| *p.as_uuid()))
        .bind(&request.category)
        .bind(&request.service)
        .bind(&request.description)
        .bind(request.budget)
        .bind(request.price)
        .bind(request.date)
        .bind(request.location.map(|l| l.latitude))
        .bind(request.location.map(|l| l.longitude))
        .bind(request.state.as_str())
        .bind(request.paid)
        .bind(request.review_id.map(|r| *r.as_uuid()))
        .bind(Json(&request.details))
        .bind(request.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("insert request"))?;

        Ok(())
    }

    async fn update(&self, request: &ServiceRequest) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE requests SET
                provider_id = $2,
                description = $3,
                budget = $4,
                price = $5,
                date = $6,
                latitude = $7,
                longitude = $8,
                state = $9,
                paid = $10,
                review_id = $11,
                details = $12
            WHERE id = $1
            "#,
        )
        .bind(request.id.as_uuid())
        .bind(request.provider_id.map(|p| *p.as_uuid()))
        .bind(&request.description)
        .bind(request.budget)
        .bind(request.price)
        .bind(request.date)
        .bind(request.location.map(|l| l.latitude))
        .bind(request.location.map(|l| l.longitude))
        .bind(request.state.as_str())
        .bind(request.paid)
        .bind(request.review_id.map(|r| *r.as_uuid()))
        .bind(Json(&request.details))
        .execute(&self.pool)
        .await
        .map_err(db_error("update request"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::RequestNotFound,
                format!("Request not found: {}", request.id),
            ));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &RequestId) -> Result<Option<ServiceRequest>, DomainError> {
        let row: Option<RequestRow> = sqlx::query_as(&format!(
            "SELECT {} FROM requests WHERE id = $1",
            REQUEST_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("fetch request"))?;

        row.map(ServiceRequest::try_from).transpose()
    }

    async fn delete(&self, id: &RequestId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM requests WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_error("delete request"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::RequestNotFound,
                format!("Request not found: {}", id),
            ));
        }
        Ok(())
    }

    async fn list_for_customer(&self, id: &CustomerId) -> Result<Vec<ServiceRequest>, DomainError> {
        let rows: Vec<RequestRow> = sqlx::query_as(&format!(
            "SELECT {} FROM requests WHERE customer_id = $1 ORDER BY created_at ASC",
            REQUEST_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("list customer requests"))?;

        into_requests(rows)
    }

    async fn list_for_provider(&self, id: &ProviderId) -> Result<Vec<ServiceRequest>, DomainError> {
        let rows: Vec<RequestRow> = sqlx::query_as(&format!(
            "SELECT {} FROM requests WHERE provider_id = $1 ORDER BY created_at ASC",
            REQUEST_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("list provider requests"))?;

        into_requests(rows)
    }

    async fn oldest_open(&self) -> Result<Option<ServiceRequest>, DomainError> {
        let row: Option<RequestRow> = sqlx::query_as(&format!(
            "SELECT {} FROM requests \
             WHERE provider_id IS NULL AND state = 'in-progress' \
             ORDER BY created_at ASC LIMIT 1",
            REQUEST_COLUMNS
        ))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("fetch oldest open request"))?;

        row.map(ServiceRequest::try_from).transpose()
    }
}

#[derive(Clone)]
pub struct PostgresBidRepository {
    pool: PgPool,
}

impl PostgresBidRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct BidRow {
    id: Uuid,
    provider_id: Uuid,
    request_id: Uuid,
    price: f64,
    description: String,
    created_at: DateTime<Utc>,
}

impl From<BidRow> for Bid {
    fn from(row: BidRow) -> Self {
        Bid {
            id: BidId::from_uuid(row.id),
            provider_id: ProviderId::from_uuid(row.provider_id),
            request_id: RequestId::from_uuid(row.request_id),
            price: row.price,
            description: row.description,
            created_at: Timestamp::from_datetime(row.created_at),
        }
    }
}

#[async_trait]
impl BidRepository for PostgresBidRepository {
    async fn save(&self, bid: &Bid) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO bids (id, provider_id, request_id, price, description, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(bid.id.as_uuid())
        .bind(bid.provider_id.as_uuid())
        .bind(bid.request_id.as_uuid())
        .bind(bid.price)
        .bind(&bid.description)
        .bind(bid.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("insert bid"))?;

        Ok(())
    }

    async fn list_for_request(&self, id: &RequestId) -> Result<Vec<Bid>, DomainError> {
        let rows: Vec<BidRow> = sqlx::query_as(
            r#"
            SELECT id, provider_id, request_id, price, description, created_at
            FROM bids WHERE request_id = $1 ORDER BY created_at ASC
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("list bids"))?;

        Ok(rows.into_iter().map(Bid::from).collect())
    }
}
