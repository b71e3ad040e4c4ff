use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::customer::{CustomerError, CustomerRepository, CustomerResult, PageRequest};
use crate::models::Customer;

// ============================================================================
// PostgreSQL Customer Repository
// ============================================================================
//
// Relies on the `customers_merchant_phone_key` unique constraint for phone
// uniqueness and on a single UPDATE for the loyalty increment. Only that
// constraint name maps to `Conflict`.
//
// ============================================================================

const SELECT_COLUMNS: &str = "SELECT id, merchant_id, name, phone, email, address, \
     loyalty_points, created_at, updated_at FROM customers";

#[derive(Clone)]
pub struct PgCustomerRepository {
    pool: PgPool,
}

impl PgCustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const MERCHANT_PHONE_CONSTRAINT: &str = "customers_merchant_phone_key";

/// Map a write failure. Only a violation of the merchant/phone constraint is a
/// `Conflict`; any other failure, a duplicate primary key included, is storage.
fn map_write_error(err: sqlx::Error, customer: &Customer) -> CustomerError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.constraint() == Some(MERCHANT_PHONE_CONSTRAINT) {
            return CustomerError::Conflict {
                merchant_id: customer.merchant_id,
                phone: customer.phone.clone(),
            };
        }
    }
    CustomerError::storage(err)
}

/// Escape LIKE metacharacters so the search term matches literally.
fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for ch in search.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

fn push_list_filter(qb: &mut QueryBuilder<'_, Postgres>, merchant_id: Uuid, search: &str) {
    qb.push(" WHERE merchant_id = ").push_bind(merchant_id);

    if !search.is_empty() {
        let pattern = like_pattern(search);
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR phone ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[async_trait]
impl CustomerRepository for PgCustomerRepository {
    async fn create(&self, customer: &Customer) -> CustomerResult<()> {
        sqlx::query(
            r#"
            INSERT INTO customers (
                id, merchant_id, name, phone, email, address,
                loyalty_points, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(customer.id)
        .bind(customer.merchant_id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(&customer.address)
        .bind(customer.loyalty_points)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, customer))?;

        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> CustomerResult<Option<Customer>> {
        let query = format!("{SELECT_COLUMNS} WHERE id = $1");

        sqlx::query_as::<_, Customer>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(CustomerError::storage)
    }

    async fn get_by_phone(&self, merchant_id: Uuid, phone: &str) -> CustomerResult<Option<Customer>> {
        let query = format!("{SELECT_COLUMNS} WHERE merchant_id = $1 AND phone = $2");

        sqlx::query_as::<_, Customer>(&query)
            .bind(merchant_id)
            .bind(phone)
            .fetch_optional(&self.pool)
            .await
            .map_err(CustomerError::storage)
    }

    async fn list(
        &self,
        merchant_id: Uuid,
        page: PageRequest,
        search: &str,
    ) -> CustomerResult<(Vec<Customer>, i64)> {
        let mut select = QueryBuilder::<Postgres>::new(SELECT_COLUMNS);
        push_list_filter(&mut select, merchant_id, search);
        select
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(page.page_size)
            .push(" OFFSET ")
            .push_bind(page.offset());

        let customers = select
            .build_query_as::<Customer>()
            .fetch_all(&self.pool)
            .await
            .map_err(CustomerError::storage)?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM customers");
        push_list_filter(&mut count, merchant_id, search);

        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(CustomerError::storage)?;

        Ok((customers, total))
    }

    async fn update(&self, customer: &Customer) -> CustomerResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name = $2,
                phone = $3,
                email = $4,
                address = $5,
                updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(customer.id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(&customer.address)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, customer))?;

        if result.rows_affected() == 0 {
            return Err(CustomerError::NotFound(customer.id));
        }

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> CustomerResult<()> {
        sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(CustomerError::storage)?;

        Ok(())
    }

    async fn add_loyalty_points(&self, id: Uuid, delta: i32) -> CustomerResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE customers
            SET loyalty_points = loyalty_points + $1, updated_at = $2
            WHERE id = $3
            "#,
        )
        .bind(delta)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(CustomerError::storage)?;

        if result.rows_affected() == 0 {
            return Err(CustomerError::NotFound(id));
        }

        Ok(())
    }
}
