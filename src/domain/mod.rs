//! Domain layer - Entity contract and the values that flow through repositories
//!
//! Contains: the `Entity` trait, the absent-input gate, predicates,
//! store-level validation results and the sample `Product` entity.

pub mod entity;
pub mod gate;
pub mod predicate;
pub mod product;
pub mod validation;

pub use entity::{Entity, EntityId};
pub use gate::Gate;
pub use predicate::Predicate;
pub use product::Product;
pub use validation::{FieldError, ValidationFailure};
