//! Book Service - import and availability lookups over the book repository

use crate::domain::{BookRepository, DomainError};
use crate::models::Book;

/// Store freshly imported books. Existing rows keep their availability.
pub async fn import_books(repo: &dyn BookRepository, books: &[Book]) -> Result<u64, DomainError> {
    let written = repo.upsert_many(books).await?;
    tracing::info!("Imported {} books ({} rows written)", books.len(), written);
    Ok(written)
}

/// Enriched books with at least one copy on the shelf at `branch_code`
pub async fn available_at(
    repo: &dyn BookRepository,
    branch_code: &str,
) -> Result<Vec<Book>, DomainError> {
    if branch_code.trim().is_empty() {
        return Err(DomainError::Validation("branch code is required".to_string()));
    }

    let books: Vec<Book> = repo
        .find_with_availability()
        .await?
        .into_iter()
        .filter(|book| book.is_available_at(branch_code))
        .collect();

    tracing::debug!("{} books available at {}", books.len(), branch_code);
    Ok(books)
}

pub async fn list_books(repo: &dyn BookRepository) -> Result<Vec<Book>, DomainError> {
    repo.find_all().await
}
