// ============================================================================
// Event Consumers
// ============================================================================
//
// Background listeners that turn inbound events into use case calls.
//
// ============================================================================

mod loyalty_listener;

pub use loyalty_listener::LoyaltyListener;
