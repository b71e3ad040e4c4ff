use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

// ============================================================================
// Domain Models
// ============================================================================

/// A customer owned by exactly one merchant.
///
/// `loyalty_points` is only ever changed through the repository's atomic
/// increment. Profile updates carry no balance.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, sqlx::FromRow)]
pub struct Customer {
    pub id: Uuid,
    pub merchant_id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub loyalty_points: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for registering a customer. `id` is optional, the use case assigns one
/// when absent.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct NewCustomer {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub merchant_id: Uuid,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
}

/// Mutable profile fields of an existing customer.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CustomerUpdate {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
}

/// One page of a merchant's customers plus the unpaginated match count.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CustomerPage {
    pub customers: Vec<Customer>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

// ============================================================================
// Inbound Order Events
// These are produced by the order service and consumed for loyalty accrual
// ============================================================================

pub const ORDER_CREATED: &str = "OrderCreated";

/// Envelope of every event on the orders topic.
///
/// The payload is kept raw so that foreign event types with a different shape
/// are skipped instead of failing to decode.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderEventEnvelope {
    #[serde(default)]
    pub event_id: Option<String>,
    pub event_type: String,
    #[serde(default)]
    pub payload: serde_json::Value,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderCreatedPayload {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
    pub total_amount: f64,
}

impl OrderCreatedPayload {
    /// The customer to credit, `None` for guest orders.
    pub fn customer_id(&self) -> Option<&str> {
        self.customer_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    pub fn order_id(&self) -> &str {
        self.id.as_deref().unwrap_or("")
    }
}
