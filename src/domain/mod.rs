//! Domain layer - Pure business abstractions
//!
//! This layer contains NO framework dependencies (no SeaORM, no Axum) apart
//! from the `DbErr` conversion in `errors`.
//! Entities, trait definitions and domain error types.

pub mod entities;
pub mod errors;
pub mod repositories;

pub use entities::*;
pub use errors::{DomainError, StorageError};
pub use repositories::*;
