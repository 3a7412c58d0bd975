//! UI controller
//!
//! Holds what the browser page shows (selected file and branch, branch list,
//! progress, results) and runs the user actions against the services.
//! State lives behind a synchronous lock; no guard is held across an await.

use serde::Serialize;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::domain::{BookRepository, BranchRepository, DomainError};
use crate::models::{Book, Branch};
use crate::modules::import::{parse_goodreads_csv, ImportError};
use crate::modules::integrations::Catalogue;
use crate::services::enrichment::{
    EnrichmentOptions, EnrichmentPipeline, EnrichmentReport, Progress,
};
use crate::services::rate_limiter::Clock;
use crate::services::{book_service, branch_service};

#[derive(Debug, Clone, Default, Serialize)]
pub struct UiState {
    pub selected_file: Option<String>,
    pub selected_branch: Option<String>,
    /// Result of the last availability check
    pub books: Vec<Book>,
    pub branches: Vec<Branch>,
    /// Number of to-read books parsed from the selected file
    pub imported_count: usize,
    pub progress: Option<Progress>,
    pub running: bool,
    /// RFC 3339 timestamp of the last `process` call
    pub run_started: Option<String>,
    pub last_report: Option<EnrichmentReport>,
    pub error: Option<String>,
    pub loading: bool,
    #[serde(skip)]
    pending_import: Vec<Book>,
    #[serde(skip)]
    started_at: Option<Duration>,
    #[serde(skip)]
    finished_at: Option<Duration>,
}

/// Progress of the current (or last) run with timing, in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressView {
    pub running: bool,
    pub current: usize,
    pub total: usize,
    pub elapsed_ms: u64,
    pub remaining_ms: Option<u64>,
}

#[derive(Debug)]
pub enum ControllerError {
    NoFileSelected,
    NoBranchSelected,
    AlreadyRunning,
    Import(ImportError),
    Domain(DomainError),
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerError::NoFileSelected => write!(f, "Select a Goodreads CSV export first"),
            ControllerError::NoBranchSelected => write!(f, "Select a library branch first"),
            ControllerError::AlreadyRunning => write!(f, "Processing is already running"),
            ControllerError::Import(e) => write!(f, "{}", e),
            ControllerError::Domain(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ControllerError {}

impl From<ImportError> for ControllerError {
    fn from(e: ImportError) -> Self {
        ControllerError::Import(e)
    }
}

impl From<DomainError> for ControllerError {
    fn from(e: DomainError) -> Self {
        ControllerError::Domain(e)
    }
}

#[derive(Clone)]
pub struct UiController {
    state: Arc<RwLock<UiState>>,
    books: Arc<dyn BookRepository>,
    branches: Arc<dyn BranchRepository>,
    catalogue: Arc<dyn Catalogue>,
    clock: Arc<dyn Clock>,
    options: EnrichmentOptions,
}

impl UiController {
    pub fn new(
        books: Arc<dyn BookRepository>,
        branches: Arc<dyn BranchRepository>,
        catalogue: Arc<dyn Catalogue>,
        clock: Arc<dyn Clock>,
        options: EnrichmentOptions,
    ) -> Self {
        Self {
            state: Arc::new(RwLock::new(UiState::default())),
            books,
            branches,
            catalogue,
            clock,
            options,
        }
    }

    pub fn snapshot(&self) -> UiState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn progress(&self) -> ProgressView {
        let state = self.snapshot();
        let progress = state.progress.unwrap_or(Progress {
            current: 0,
            total: state.imported_count,
        });

        let elapsed = match state.started_at {
            Some(started) => state
                .finished_at
                .unwrap_or_else(|| self.clock.now())
                .saturating_sub(started),
            None => Duration::ZERO,
        };
        let remaining = if state.running {
            progress.estimate_remaining(elapsed)
        } else {
            None
        };

        ProgressView {
            running: state.running,
            current: progress.current,
            total: progress.total,
            elapsed_ms: elapsed.as_millis() as u64,
            remaining_ms: remaining.map(|d| d.as_millis() as u64),
        }
    }

    /// Open branches from storage, as shown on page load
    pub async fn load_branches(&self) -> Result<Vec<Branch>, ControllerError> {
        self.update(|s| s.loading = true);
        let result = branch_service::list_open(self.branches.as_ref()).await;
        self.update(|s| s.loading = false);

        let branches = self.record(result.map_err(ControllerError::from))?;
        self.update(|s| s.branches = branches.clone());
        Ok(branches)
    }

    /// Parse `content` and remember it as the file to process. Returns the
    /// number of to-read books found.
    pub fn select_file(&self, name: &str, content: &[u8]) -> Result<usize, ControllerError> {
        let books = self.record(parse_goodreads_csv(content).map_err(ControllerError::from))?;
        let count = books.len();

        tracing::info!("Selected {} ({} to-read books)", name, count);
        self.update(|s| {
            s.selected_file = Some(name.to_string());
            s.imported_count = count;
            s.pending_import = books;
            s.error = None;
        });
        Ok(count)
    }

    pub fn select_branch(&self, branch_code: &str) -> Result<(), ControllerError> {
        let code = branch_code.trim();
        if code.is_empty() {
            return self.record(Err(ControllerError::NoBranchSelected));
        }

        self.update(|s| {
            s.selected_branch = Some(code.to_string());
            s.error = None;
        });
        Ok(())
    }

    /// Store the selected books, then enrich them on a background task.
    pub async fn process(&self) -> Result<JoinHandle<()>, ControllerError> {
        let books = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            if state.running {
                drop(state);
                return self.record(Err(ControllerError::AlreadyRunning));
            }
            if state.selected_file.is_none() {
                drop(state);
                return self.record(Err(ControllerError::NoFileSelected));
            }

            state.running = true;
            state.error = None;
            state.last_report = None;
            state.progress = Some(Progress {
                current: 0,
                total: state.pending_import.len(),
            });
            state.run_started = Some(chrono::Utc::now().to_rfc3339());
            state.started_at = Some(self.clock.now());
            state.finished_at = None;
            state.pending_import.clone()
        };

        if let Err(e) = book_service::import_books(self.books.as_ref(), &books).await {
            self.update(|s| {
                s.running = false;
                s.finished_at = Some(self.clock.now());
            });
            return self.record(Err(e.into()));
        }

        let pipeline = EnrichmentPipeline::new(
            self.catalogue.clone(),
            self.books.clone(),
            self.clock.clone(),
            self.options.clone(),
        );
        let state = self.state.clone();
        let clock = self.clock.clone();

        Ok(tokio::spawn(async move {
            let progress_state = state.clone();
            let mut on_progress = move |progress: Progress| {
                progress_state
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .progress = Some(progress);
            };

            let result = pipeline.run(&books, &mut on_progress).await;

            let mut state = state.write().unwrap_or_else(PoisonError::into_inner);
            state.running = false;
            state.finished_at = Some(clock.now());
            match result {
                Ok(report) => {
                    if report.stopped_by_rate_limit {
                        state.error = Some(format!(
                            "Catalogue rate limit reached after {} of {} books",
                            report.processed, report.total
                        ));
                    }
                    state.last_report = Some(report);
                }
                Err(e) => {
                    tracing::error!("Enrichment run failed: {}", e);
                    state.error = Some(e.to_string());
                }
            }
        }))
    }

    /// Books with a copy on the shelf at the selected branch
    pub async fn check_availability(&self) -> Result<Vec<Book>, ControllerError> {
        let Some(branch) = self.snapshot().selected_branch else {
            return self.record(Err(ControllerError::NoBranchSelected));
        };

        self.update(|s| s.loading = true);
        let result = book_service::available_at(self.books.as_ref(), &branch).await;
        self.update(|s| s.loading = false);

        let books = self.record(result.map_err(ControllerError::from))?;
        self.update(|s| {
            s.books = books.clone();
            s.error = None;
        });
        Ok(books)
    }

    /// Refresh branches from the catalogue, then reload the open ones
    pub async fn update_branches(&self) -> Result<Vec<Branch>, ControllerError> {
        self.update(|s| s.loading = true);
        let refreshed =
            branch_service::refresh_branches(self.catalogue.as_ref(), self.branches.as_ref()).await;
        if let Err(e) = refreshed {
            self.update(|s| s.loading = false);
            return self.record(Err(e.into()));
        }

        self.load_branches().await
    }

    fn update(&self, f: impl FnOnce(&mut UiState)) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut state);
    }

    fn record<T>(&self, result: Result<T, ControllerError>) -> Result<T, ControllerError> {
        if let Err(e) = &result {
            tracing::warn!("{}", e);
            let message = e.to_string();
            self.update(|s| s.error = Some(message));
        }
        result
    }
}
