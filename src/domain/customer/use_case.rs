use std::sync::Arc;
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::models::{Customer, CustomerPage, CustomerUpdate, NewCustomer};
use super::errors::{CustomerError, CustomerResult};
use super::repository::CustomerRepository;
use super::value_objects::{parse_customer_id, parse_merchant_id, PageRequest};

// ============================================================================
// Customer Use Case
// ============================================================================
//
// Single place where customer business rules live. The HTTP handlers and the
// order event listener both go through `CustomerService`.
//
// Orchestrates: Input → Validation/Normalization → Repository
//
// ============================================================================

#[async_trait]
pub trait CustomerService: Send + Sync {
    async fn create_customer(&self, input: NewCustomer) -> CustomerResult<Customer>;

    /// Fetch by id without a merchant check.
    ///
    /// Any caller holding a valid id can read a customer of another merchant.
    /// Tenant-facing callers should use [`CustomerService::get_customer_for_merchant`].
    async fn get_customer(&self, id: &str) -> CustomerResult<Customer>;

    /// Fetch by id, reporting `NotFound` when the customer belongs to a
    /// different merchant.
    async fn get_customer_for_merchant(&self, merchant_id: &str, id: &str) -> CustomerResult<Customer>;

    async fn find_customer_by_phone(&self, merchant_id: &str, phone: &str) -> CustomerResult<Customer>;

    async fn list_customers(
        &self,
        merchant_id: &str,
        page: i64,
        page_size: i64,
        search: &str,
    ) -> CustomerResult<CustomerPage>;

    async fn update_customer(&self, input: CustomerUpdate) -> CustomerResult<Customer>;

    async fn delete_customer(&self, id: &str) -> CustomerResult<()>;

    /// Credit points and return the confirmed new balance.
    async fn add_loyalty_points(&self, customer_id: &str, points: i32) -> CustomerResult<i32>;
}

pub struct CustomerUseCase {
    repo: Arc<dyn CustomerRepository>,
}

impl CustomerUseCase {
    pub fn new(repo: Arc<dyn CustomerRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl CustomerService for CustomerUseCase {
    async fn create_customer(&self, input: NewCustomer) -> CustomerResult<Customer> {
        let now = Utc::now();
        let customer = Customer {
            id: input.id.filter(|id| !id.is_nil()).unwrap_or_else(Uuid::new_v4),
            merchant_id: input.merchant_id,
            name: input.name,
            phone: input.phone,
            email: input.email,
            address: input.address,
            loyalty_points: 0,
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = self.repo.create(&customer).await {
            tracing::error!(
                merchant_id = %customer.merchant_id,
                error = %e,
                "Failed to create customer"
            );
            return Err(e);
        }

        tracing::info!(
            customer_id = %customer.id,
            merchant_id = %customer.merchant_id,
            "Customer created"
        );
        Ok(customer)
    }

    async fn get_customer(&self, id: &str) -> CustomerResult<Customer> {
        let id = parse_customer_id(id)?;

        match self.repo.get_by_id(id).await {
            Ok(Some(customer)) => Ok(customer),
            Ok(None) => Err(CustomerError::NotFound(id)),
            Err(e) => {
                tracing::error!(customer_id = %id, error = %e, "Failed to get customer");
                Err(e)
            }
        }
    }

    async fn get_customer_for_merchant(&self, merchant_id: &str, id: &str) -> CustomerResult<Customer> {
        let merchant_id = parse_merchant_id(merchant_id)?;
        let customer = self.get_customer(id).await?;

        if customer.merchant_id != merchant_id {
            tracing::warn!(
                customer_id = %customer.id,
                merchant_id = %merchant_id,
                "Customer lookup across merchants rejected"
            );
            return Err(CustomerError::NotFound(customer.id));
        }
        Ok(customer)
    }

    async fn find_customer_by_phone(&self, merchant_id: &str, phone: &str) -> CustomerResult<Customer> {
        let merchant_id = parse_merchant_id(merchant_id)?;
        let phone = phone.trim();
        if phone.is_empty() {
            return Err(CustomerError::invalid_argument("phone must not be empty"));
        }

        match self.repo.get_by_phone(merchant_id, phone).await {
            Ok(Some(customer)) => Ok(customer),
            Ok(None) => Err(CustomerError::PhoneNotFound {
                merchant_id,
                phone: phone.to_string(),
            }),
            Err(e) => {
                tracing::error!(merchant_id = %merchant_id, error = %e, "Failed to find customer by phone");
                Err(e)
            }
        }
    }

    async fn list_customers(
        &self,
        merchant_id: &str,
        page: i64,
        page_size: i64,
        search: &str,
    ) -> CustomerResult<CustomerPage> {
        let merchant_id = parse_merchant_id(merchant_id)?;
        let page_request = PageRequest::normalize(page, page_size);

        let (customers, total) = self
            .repo
            .list(merchant_id, page_request, search)
            .await
            .map_err(|e| {
                tracing::error!(merchant_id = %merchant_id, error = %e, "Failed to list customers");
                e
            })?;

        Ok(CustomerPage {
            customers,
            total,
            page: page_request.page,
            page_size: page_request.page_size,
        })
    }

    async fn update_customer(&self, input: CustomerUpdate) -> CustomerResult<Customer> {
        let mut existing = match self.repo.get_by_id(input.id).await {
            Ok(Some(customer)) => customer,
            Ok(None) => return Err(CustomerError::NotFound(input.id)),
            Err(e) => {
                tracing::error!(customer_id = %input.id, error = %e, "Failed to load customer for update");
                return Err(e);
            }
        };

        existing.name = input.name;
        existing.phone = input.phone;
        existing.email = input.email;
        existing.address = input.address;
        existing.updated_at = Utc::now();

        if let Err(e) = self.repo.update(&existing).await {
            tracing::error!(customer_id = %existing.id, error = %e, "Failed to update customer");
            return Err(e);
        }

        tracing::info!(customer_id = %existing.id, "Customer updated");
        Ok(existing)
    }

    async fn delete_customer(&self, id: &str) -> CustomerResult<()> {
        let id = parse_customer_id(id)?;

        if let Err(e) = self.repo.delete(id).await {
            tracing::error!(customer_id = %id, error = %e, "Failed to delete customer");
            return Err(e);
        }

        tracing::info!(customer_id = %id, "Customer deleted");
        Ok(())
    }

    async fn add_loyalty_points(&self, customer_id: &str, points: i32) -> CustomerResult<i32> {
        let id = parse_customer_id(customer_id)?;
        if points < 1 {
            return Err(CustomerError::invalid_argument(format!(
                "loyalty points must be positive, got {points}"
            )));
        }

        if let Err(e) = self.repo.add_loyalty_points(id, points).await {
            tracing::error!(customer_id = %id, points, error = %e, "Failed to add loyalty points");
            return Err(e);
        }

        // The increment has committed; a failed read-back is reported but not
        // compensated.
        match self.repo.get_by_id(id).await {
            Ok(Some(customer)) => Ok(customer.loyalty_points),
            Ok(None) => Err(CustomerError::ConfirmationFailed {
                customer_id: id,
                reason: "customer not found after update".to_string(),
            }),
            Err(e) => {
                tracing::error!(
                    customer_id = %id,
                    points,
                    error = %e,
                    "Loyalty points added but reading the new balance failed"
                );
                Err(CustomerError::ConfirmationFailed {
                    customer_id: id,
                    reason: e.to_string(),
                })
            }
        }
    }
}
