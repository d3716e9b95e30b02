//! PostgreSQL implementation of AccountRepository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::db_error;
use crate::domain::foundation::{CustomerId, DomainError, ErrorCode, ProviderId};
use crate::domain::marketplace::{normalize_email, Customer, Provider};
use crate::ports::AccountRepository;

#[derive(Clone)]
pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: Uuid,
    email: String,
    first_name: String,
    last_name: String,
    phone: Option<String>,
    location: Option<String>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer {
            id: CustomerId::from_uuid(row.id),
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            phone: row.phone,
            location: row.location,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProviderRow {
    id: Uuid,
    email: String,
    name: String,
    phone: Option<String>,
    rating: Option<f64>,
}

impl From<ProviderRow> for Provider {
    fn from(row: ProviderRow) -> Self {
        Provider {
            id: ProviderId::from_uuid(row.id),
            email: row.email,
            name: row.name,
            phone: row.phone,
            rating: row.rating,
        }
    }
}

const CUSTOMER_COLUMNS: &str = "id, email, first_name, last_name, phone, location";
const PROVIDER_COLUMNS: &str = "id, email, name, phone, rating";

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn find_customer_by_email(&self, email: &str) -> Result<Option<Customer>, DomainError> {
        let row: Option<CustomerRow> = sqlx::query_as(&format!(
            "SELECT {} FROM customers WHERE lower(email) = $1",
            CUSTOMER_COLUMNS
        ))
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("fetch customer by email"))?;

        Ok(row.map(Customer::from))
    }

    async fn find_provider_by_email(&self, email: &str) -> Result<Option<Provider>, DomainError> {
        let row: Option<ProviderRow> = sqlx::query_as(&format!(
            "SELECT {} FROM providers WHERE lower(email) = $1",
            PROVIDER_COLUMNS
        ))
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("fetch provider by email"))?;

        Ok(row.map(Provider::from))
    }

    async fn find_customer(&self, id: &CustomerId) -> Result<Option<Customer>, DomainError> {
        let row: Option<CustomerRow> = sqlx::query_as(&format!(
            "SELECT {} FROM customers WHERE id = $1",
            CUSTOMER_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("fetch customer"))?;

        Ok(row.map(Customer::from))
    }

    async fn find_provider(&self, id: &ProviderId) -> Result<Option<Provider>, DomainError> {
        let row: Option<ProviderRow> = sqlx::query_as(&format!(
            "SELECT {} FROM providers WHERE id = $1",
            PROVIDER_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("fetch provider"))?;

        Ok(row.map(Provider::from))
    }

    async fn update_customer(&self, customer: &Customer) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE customers SET
                first_name = $2,
                last_name = $3,
                phone = $4,
                location = $5
            WHERE id = $1
            "#,
        )
        .bind(customer.id.as_uuid())
        .bind(&customer.first_name)
        .bind(&customer.last_name)
        .bind(&customer.phone)
        .bind(&customer.location)
        .execute(&self.pool)
        .await
        .map_err(db_error("update customer"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::CustomerNotFound,
                format!("Customer not found: {}", customer.id),
            ));
        }
        Ok(())
    }
}
