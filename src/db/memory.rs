use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::customer::{CustomerError, CustomerRepository, CustomerResult, PageRequest};
use crate::models::Customer;

// ============================================================================
// In-Memory Customer Repository
// ============================================================================
//
// Same contract as the PostgreSQL repository. The whole store sits behind one
// write lock, so the loyalty increment is a critical section rather than a
// read-modify-write across awaits.
//
// ============================================================================

#[derive(Default)]
pub struct InMemoryCustomerRepository {
    customers: RwLock<HashMap<Uuid, Customer>>,
}

impl InMemoryCustomerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.customers.read().await.len()
    }
}

fn phone_taken(
    customers: &HashMap<Uuid, Customer>,
    merchant_id: Uuid,
    phone: &str,
    except: Option<Uuid>,
) -> bool {
    customers.values().any(|c| {
        c.merchant_id == merchant_id && c.phone == phone && Some(c.id) != except
    })
}

fn matches_search(customer: &Customer, needle: &str) -> bool {
    needle.is_empty()
        || customer.name.to_lowercase().contains(needle)
        || customer.phone.to_lowercase().contains(needle)
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn create(&self, customer: &Customer) -> CustomerResult<()> {
        let mut customers = self.customers.write().await;

        if customers.contains_key(&customer.id) {
            return Err(CustomerError::storage(anyhow::anyhow!(
                "duplicate primary key: {}",
                customer.id
            )));
        }
        if phone_taken(&customers, customer.merchant_id, &customer.phone, None) {
            return Err(CustomerError::Conflict {
                merchant_id: customer.merchant_id,
                phone: customer.phone.clone(),
            });
        }

        customers.insert(customer.id, customer.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> CustomerResult<Option<Customer>> {
        Ok(self.customers.read().await.get(&id).cloned())
    }

    async fn get_by_phone(&self, merchant_id: Uuid, phone: &str) -> CustomerResult<Option<Customer>> {
        Ok(self
            .customers
            .read()
            .await
            .values()
            .find(|c| c.merchant_id == merchant_id && c.phone == phone)
            .cloned())
    }

    async fn list(
        &self,
        merchant_id: Uuid,
        page: PageRequest,
        search: &str,
    ) -> CustomerResult<(Vec<Customer>, i64)> {
        let needle = search.to_lowercase();
        let customers = self.customers.read().await;

        let mut matching: Vec<&Customer> = customers
            .values()
            .filter(|c| c.merchant_id == merchant_id && matches_search(c, &needle))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as i64;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.page_size).unwrap_or(usize::MAX);

        let page_items = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        Ok((page_items, total))
    }

    async fn update(&self, customer: &Customer) -> CustomerResult<()> {
        let mut customers = self.customers.write().await;

        if !customers.contains_key(&customer.id) {
            return Err(CustomerError::NotFound(customer.id));
        }

        let merchant_id = customers[&customer.id].merchant_id;
        if phone_taken(&customers, merchant_id, &customer.phone, Some(customer.id)) {
            return Err(CustomerError::Conflict {
                merchant_id,
                phone: customer.phone.clone(),
            });
        }

        if let Some(stored) = customers.get_mut(&customer.id) {
            stored.name = customer.name.clone();
            stored.phone = customer.phone.clone();
            stored.email = customer.email.clone();
            stored.address = customer.address.clone();
            stored.updated_at = customer.updated_at;
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> CustomerResult<()> {
        self.customers.write().await.remove(&id);
        Ok(())
    }

    async fn add_loyalty_points(&self, id: Uuid, delta: i32) -> CustomerResult<()> {
        let mut customers = self.customers.write().await;
        let customer = customers.get_mut(&id).ok_or(CustomerError::NotFound(id))?;

        let balance = customer.loyalty_points.checked_add(delta).ok_or_else(|| {
            CustomerError::storage(anyhow::anyhow!("loyalty balance overflow for customer {id}"))
        })?;
        if balance < 0 {
            return Err(CustomerError::storage(anyhow::anyhow!(
                "loyalty balance of customer {id} would become negative"
            )));
        }

        customer.loyalty_points = balance;
        customer.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::sync::Arc;

    fn customer(merchant_id: Uuid, name: &str, phone: &str) -> Customer {
        let now = Utc::now();
        Customer {
            id: Uuid::new_v4(),
            merchant_id,
            name: name.to_string(),
            phone: phone.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            address: "Jl. Merdeka 1".to_string(),
            loyalty_points: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_and_fetch() {
        let repo = InMemoryCustomerRepository::new();
        let merchant_id = Uuid::new_v4();
        let c = customer(merchant_id, "Ann", "0811");

        repo.create(&c).await.unwrap();

        assert_eq!(repo.get_by_id(c.id).await.unwrap(), Some(c.clone()));
        assert_eq!(repo.get_by_phone(merchant_id, "0811").await.unwrap(), Some(c));
        assert_eq!(repo.get_by_phone(Uuid::new_v4(), "0811").await.unwrap(), None);
        assert_eq!(repo.get_by_id(Uuid::new_v4()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_phone_per_merchant_conflicts() {
        let repo = InMemoryCustomerRepository::new();
        let merchant_a = Uuid::new_v4();
        let merchant_b = Uuid::new_v4();

        repo.create(&customer(merchant_a, "Ann", "0811")).await.unwrap();

        let result = repo.create(&customer(merchant_a, "Bob", "0811")).await;
        assert!(matches!(result, Err(CustomerError::Conflict { .. })));

        repo.create(&customer(merchant_b, "Bob", "0811")).await.unwrap();
        assert_eq!(repo.len().await, 2);
    }

    #[tokio::test]
    async fn test_list_orders_newest_first_and_paginates() {
        let repo = InMemoryCustomerRepository::new();
        let merchant_id = Uuid::new_v4();
        let base = Utc::now();

        for i in 0..5 {
            let mut c = customer(merchant_id, &format!("Customer {i}"), &format!("08{i}"));
            c.created_at = base + Duration::seconds(i);
            repo.create(&c).await.unwrap();
        }
        repo.create(&customer(Uuid::new_v4(), "Other", "0999")).await.unwrap();

        let (first, total) = repo
            .list(merchant_id, PageRequest::normalize(1, 2), "")
            .await
            .unwrap();
        assert_eq!(total, 5);
        assert_eq!(
            first.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            vec!["Customer 4", "Customer 3"]
        );

        let (last, total) = repo
            .list(merchant_id, PageRequest::normalize(3, 2), "")
            .await
            .unwrap();
        assert_eq!(total, 5);
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].name, "Customer 0");
    }

    #[tokio::test]
    async fn test_list_search_is_case_insensitive_on_name_or_phone() {
        let repo = InMemoryCustomerRepository::new();
        let merchant_id = Uuid::new_v4();
        repo.create(&customer(merchant_id, "Annabel", "0811")).await.unwrap();
        repo.create(&customer(merchant_id, "Bob", "0822")).await.unwrap();

        let (by_name, total) = repo.list(merchant_id, PageRequest::default(), "ANNA").await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(by_name[0].name, "Annabel");

        let (by_phone, _) = repo.list(merchant_id, PageRequest::default(), "822").await.unwrap();
        assert_eq!(by_phone[0].name, "Bob");

        let (none, total) = repo.list(merchant_id, PageRequest::default(), "zzz").await.unwrap();
        assert!(none.is_empty());
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_update_ignores_loyalty_points_and_merchant() {
        let repo = InMemoryCustomerRepository::new();
        let merchant_id = Uuid::new_v4();
        let c = customer(merchant_id, "Ann", "0811");
        repo.create(&c).await.unwrap();
        repo.add_loyalty_points(c.id, 7).await.unwrap();

        let mut changed = c.clone();
        changed.name = "Ann Lee".to_string();
        changed.loyalty_points = 999;
        changed.merchant_id = Uuid::new_v4();
        repo.update(&changed).await.unwrap();

        let stored = repo.get_by_id(c.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Ann Lee");
        assert_eq!(stored.loyalty_points, 7);
        assert_eq!(stored.merchant_id, merchant_id);
    }

    #[tokio::test]
    async fn test_update_to_taken_phone_conflicts() {
        let repo = InMemoryCustomerRepository::new();
        let merchant_id = Uuid::new_v4();
        repo.create(&customer(merchant_id, "Ann", "0811")).await.unwrap();
        let bob = customer(merchant_id, "Bob", "0822");
        repo.create(&bob).await.unwrap();

        let mut changed = bob.clone();
        changed.phone = "0811".to_string();
        assert!(matches!(repo.update(&changed).await, Err(CustomerError::Conflict { .. })));

        // keeping your own phone is fine
        repo.update(&bob).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let repo = InMemoryCustomerRepository::new();
        let c = customer(Uuid::new_v4(), "Ann", "0811");
        repo.create(&c).await.unwrap();

        repo.delete(c.id).await.unwrap();
        repo.delete(c.id).await.unwrap();
        repo.delete(Uuid::new_v4()).await.unwrap();
        assert_eq!(repo.len().await, 0);
    }

    #[tokio::test]
    async fn test_add_loyalty_points_unknown_customer() {
        let repo = InMemoryCustomerRepository::new();
        let result = repo.add_loyalty_points(Uuid::new_v4(), 5).await;
        assert!(matches!(result, Err(CustomerError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_concurrent_increments_are_not_lost() {
        let repo = Arc::new(InMemoryCustomerRepository::new());
        let c = customer(Uuid::new_v4(), "Ann", "0811");
        repo.create(&c).await.unwrap();
        let id = c.id;

        let mut handles = Vec::new();
        for delta in 1..=50 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.add_loyalty_points(id, delta).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stored = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.loyalty_points, (1..=50).sum::<i32>());
    }
}
