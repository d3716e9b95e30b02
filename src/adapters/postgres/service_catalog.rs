//! PostgreSQL implementation of ServiceCatalog.

use async_trait::async_trait;
use sqlx::PgPool;

use super::db_error;
use crate::domain::foundation::DomainError;
use crate::domain::marketplace::ServiceOffering;
use crate::ports::ServiceCatalog;

#[derive(Clone)]
pub struct PostgresServiceCatalog {
    pool: PgPool,
}

impl PostgresServiceCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OfferingRow {
    name: String,
    category: String,
}

#[async_trait]
impl ServiceCatalog for PostgresServiceCatalog {
    async fn list_offerings(&self) -> Result<Vec<ServiceOffering>, DomainError> {
        let rows: Vec<OfferingRow> =
            sqlx::query_as("SELECT name, category FROM services ORDER BY position ASC")
                .fetch_all(&self.pool)
                .await
                .map_err(db_error("list services"))?;

        Ok(rows
            .into_iter()
            .map(|row| ServiceOffering::new(row.name, row.category))
            .collect())
    }
}
