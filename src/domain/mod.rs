// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Domain types, ports and use cases. Nothing in here knows about PostgreSQL,
// Kafka or HTTP.
//
// ============================================================================

pub mod customer;
