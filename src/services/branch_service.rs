//! Branch Service - keeps the `libraries` table in step with the catalogue

use crate::domain::{BranchRepository, DomainError};
use crate::models::Branch;
use crate::modules::integrations::Catalogue;

/// Fetch every branch from the catalogue and store it, closed ones included.
pub async fn refresh_branches(
    catalogue: &dyn Catalogue,
    repo: &dyn BranchRepository,
) -> Result<Vec<Branch>, DomainError> {
    let branches = catalogue.fetch_branches().await?;
    let written = repo.upsert_many(&branches).await?;

    let closed = branches.iter().filter(|b| b.closed).count();
    tracing::info!(
        "Refreshed {} branches ({} closed, {} rows written)",
        branches.len(),
        closed,
        written
    );
    Ok(branches)
}

pub async fn list_open(repo: &dyn BranchRepository) -> Result<Vec<Branch>, DomainError> {
    repo.find_open().await
}
