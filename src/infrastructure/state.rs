//! Application state containing repositories and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::domain::{BookRepository, BranchRepository};
use crate::infrastructure::config::Config;
use crate::infrastructure::{SeaOrmBookRepository, SeaOrmBranchRepository};
use crate::modules::integrations::{Catalogue, CatalogueError, NlbCatalogueClient};
use crate::services::{Clock, EnrichmentOptions, TokioClock, UiController};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    pub book_repo: Arc<dyn BookRepository>,
    pub branch_repo: Arc<dyn BranchRepository>,
    pub catalogue: Arc<dyn Catalogue>,
    pub controller: UiController,
}

impl AppState {
    /// Wire the SeaORM repositories and the catalogue client from `config`
    pub fn new(db: DatabaseConnection, config: &Config) -> Result<Self, CatalogueError> {
        let catalogue = Arc::new(NlbCatalogueClient::new(config.catalogue.clone())?);
        Ok(Self::with_catalogue(
            db,
            catalogue,
            Arc::new(TokioClock::new()),
            config.enrichment_options(),
        ))
    }

    /// Same wiring with an injected catalogue and clock
    pub fn with_catalogue(
        db: DatabaseConnection,
        catalogue: Arc<dyn Catalogue>,
        clock: Arc<dyn Clock>,
        options: EnrichmentOptions,
    ) -> Self {
        let book_repo: Arc<dyn BookRepository> = Arc::new(SeaOrmBookRepository::new(db.clone()));
        let branch_repo: Arc<dyn BranchRepository> =
            Arc::new(SeaOrmBranchRepository::new(db.clone()));
        let controller = UiController::new(
            book_repo.clone(),
            branch_repo.clone(),
            catalogue.clone(),
            clock,
            options,
        );

        Self {
            db,
            book_repo,
            branch_repo,
            catalogue,
            controller,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}
