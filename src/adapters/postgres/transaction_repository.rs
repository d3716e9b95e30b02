//! PostgreSQL implementation of TransactionRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::db_error;
use crate::domain::foundation::{
    CustomerId, DomainError, ErrorCode, RequestId, Timestamp, TransactionId,
};
use crate::domain::marketplace::{Transaction, TransactionStatus};
use crate::ports::TransactionRepository;

#[derive(Clone)]
pub struct PostgresTransactionRepository {
    pool: PgPool,
}

impl PostgresTransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    customer_id: Uuid,
    request_id: Uuid,
    amount: f64,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = DomainError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let status = TransactionStatus::parse(&row.status).ok_or_else(|| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid transaction status: {}", row.status),
            )
        })?;

        Ok(Transaction {
            id: TransactionId::from_uuid(row.id),
            customer_id: CustomerId::from_uuid(row.customer_id),
            request_id: RequestId::from_uuid(row.request_id),
            amount: row.amount,
            status,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

#[async_trait]
impl TransactionRepository for PostgresTransactionRepository {
    async fn latest_for_customer(
        &self,
        id: &CustomerId,
    ) -> Result<Option<Transaction>, DomainError> {
        let row: Option<TransactionRow> = sqlx::query_as(
            r#"
            SELECT id, customer_id, request_id, amount, status, created_at
            FROM transactions WHERE customer_id = $1
            ORDER BY created_at DESC LIMIT 1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("fetch latest transaction"))?;

        row.map(Transaction::try_from).transpose()
    }

    async fn update(&self, transaction: &Transaction) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE transactions SET amount = $2, status = $3 WHERE id = $1")
            .bind(transaction.id.as_uuid())
            .bind(transaction.amount)
            .bind(transaction.status.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_error("update transaction"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::TransactionNotFound,
                format!("Transaction not found: {}", transaction.id),
            ));
        }
        Ok(())
    }
}
