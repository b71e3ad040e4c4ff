use uuid::Uuid;

use super::errors::CustomerError;

// ============================================================================
// Customer Value Objects
// ============================================================================

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Currency units spent per loyalty point.
pub const CURRENCY_UNITS_PER_POINT: f64 = 10.0;

/// Normalized pagination request. Both fields are always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl PageRequest {
    /// Non-positive values fall back to the defaults.
    pub fn normalize(page: i64, page_size: i64) -> Self {
        Self {
            page: if page < 1 { DEFAULT_PAGE } else { page },
            page_size: if page_size < 1 { DEFAULT_PAGE_SIZE } else { page_size },
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::normalize(DEFAULT_PAGE, DEFAULT_PAGE_SIZE)
    }
}

pub fn parse_customer_id(raw: &str) -> Result<Uuid, CustomerError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| CustomerError::invalid_argument(format!("invalid customer id: {raw:?}")))
}

pub fn parse_merchant_id(raw: &str) -> Result<Uuid, CustomerError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| CustomerError::invalid_argument(format!("invalid merchant id: {raw:?}")))
}

/// Points earned for an order total: one point per 10 whole currency units.
///
/// Negative, NaN and sub-10 totals earn nothing.
pub fn loyalty_award(total_amount: f64) -> i32 {
    let points = (total_amount / CURRENCY_UNITS_PER_POINT).floor();
    if points.is_nan() || points < 1.0 {
        return 0;
    }
    // `as` saturates at i32::MAX
    points as i32
}
