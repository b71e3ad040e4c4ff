use async_trait::async_trait;
use uuid::Uuid;

use crate::models::Customer;
use super::errors::CustomerResult;
use super::value_objects::PageRequest;

// ============================================================================
// Customer Repository Port
// ============================================================================
//
// Storage-agnostic persistence contract used by the use case layer.
// Absence is reported as `Ok(None)`, never as an error.
//
// ============================================================================

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Insert a new customer.
    ///
    /// Fails with `Conflict` when `(merchant_id, phone)` is taken.
    async fn create(&self, customer: &Customer) -> CustomerResult<()>;

    async fn get_by_id(&self, id: Uuid) -> CustomerResult<Option<Customer>>;

    async fn get_by_phone(&self, merchant_id: Uuid, phone: &str) -> CustomerResult<Option<Customer>>;

    /// Page of a merchant's customers, newest first, with the total number of
    /// matches ignoring pagination. A non-empty `search` matches name or phone
    /// case-insensitively as a substring.
    async fn list(
        &self,
        merchant_id: Uuid,
        page: PageRequest,
        search: &str,
    ) -> CustomerResult<(Vec<Customer>, i64)>;

    /// Persist name, phone, email, address and `updated_at`.
    ///
    /// Loyalty points and merchant are never written here.
    async fn update(&self, customer: &Customer) -> CustomerResult<()>;

    /// Deleting an unknown id is not an error.
    async fn delete(&self, id: Uuid) -> CustomerResult<()>;

    /// Add `delta` to the stored balance and refresh `updated_at` in a single
    /// storage operation. Fails with `NotFound` when no customer matched.
    async fn add_loyalty_points(&self, id: Uuid, delta: i32) -> CustomerResult<()>;
}
