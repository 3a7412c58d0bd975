//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;

use super::DomainError;
use crate::models::{AvailabilityEntry, Book, Branch};

/// Repository trait for the `books` table, keyed by Goodreads book id
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Insert or overwrite `title`, `author` and `brn` for each book.
    /// Stored availability is never touched. Returns the number of rows written.
    async fn upsert_many(&self, books: &[Book]) -> Result<u64, DomainError>;

    /// Record a catalogue match, replacing any previous availability list
    async fn update_enrichment(
        &self,
        book_id: &str,
        brn: &str,
        availability: &[AvailabilityEntry],
    ) -> Result<(), DomainError>;

    /// Find a single book by its Goodreads id
    async fn find_by_id(&self, book_id: &str) -> Result<Option<Book>, DomainError>;

    /// Every stored book, ordered by title
    async fn find_all(&self) -> Result<Vec<Book>, DomainError>;

    /// Books that have been through enrichment (availability not null)
    async fn find_with_availability(&self) -> Result<Vec<Book>, DomainError>;
}

/// Repository trait for the `libraries` table, keyed by branch code
#[async_trait]
pub trait BranchRepository: Send + Sync {
    /// Insert or overwrite each branch. Returns the number of rows written.
    async fn upsert_many(&self, branches: &[Branch]) -> Result<u64, DomainError>;

    /// Branches that are not closed, ordered by name
    async fn find_open(&self) -> Result<Vec<Branch>, DomainError>;
}
