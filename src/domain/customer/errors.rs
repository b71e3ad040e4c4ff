use uuid::Uuid;

// ============================================================================
// Customer Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CustomerError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Customer not found: {0}")]
    NotFound(Uuid),

    #[error("No customer with phone {phone} for merchant {merchant_id}")]
    PhoneNotFound { merchant_id: Uuid, phone: String },

    #[error("Phone {phone} is already registered for merchant {merchant_id}")]
    Conflict { merchant_id: Uuid, phone: String },

    #[error("Storage error: {0}")]
    Storage(#[source] anyhow::Error),

    /// The increment committed but the balance could not be read back.
    #[error("Loyalty points added to customer {customer_id} but the new total could not be confirmed: {reason}")]
    ConfirmationFailed { customer_id: Uuid, reason: String },
}

impl CustomerError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn storage(err: impl Into<anyhow::Error>) -> Self {
        Self::Storage(err.into())
    }

    /// Short machine-readable kind, used for log fields and API bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::NotFound(_) | Self::PhoneNotFound { .. } => "not_found",
            Self::Conflict { .. } => "conflict",
            Self::Storage(_) => "storage_error",
            Self::ConfirmationFailed { .. } => "confirmation_failed",
        }
    }
}

pub type CustomerResult<T> = Result<T, CustomerError>;
