//! Domain layer
//!
//! Storage contracts for books and branches plus the error type they share.
//! Nothing here knows about SeaORM or Axum.

pub mod errors;
pub mod repositories;

pub use errors::DomainError;
pub use repositories::{BookRepository, BranchRepository};
