// ============================================================================
// Customer Domain
// ============================================================================
//
// Everything customer-specific lives here:
// - Errors (CustomerError)
// - Value objects (pagination, id parsing, loyalty award rule)
// - Repository port (CustomerRepository)
// - Use case (CustomerService / CustomerUseCase)
//
// Storage adapters live in `crate::db`, delivery adapters in `crate::api`
// and `crate::consumer`.
//
// ============================================================================

pub mod errors;
pub mod value_objects;
pub mod repository;
pub mod use_case;

pub use errors::*;
pub use value_objects::*;
pub use repository::*;
pub use use_case::*;
