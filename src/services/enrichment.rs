//! Enrichment pipeline
//!
//! Walks the imported books one at a time: search the catalogue, take the
//! first acceptable candidate, fetch its availability and store both on the
//! book. Every catalogue call goes through the rate limiter and each book is
//! followed by a fixed pause.

use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{BookRepository, DomainError};
use crate::models::Book;
use crate::modules::integrations::{Catalogue, CatalogueError};
use crate::services::matching::{select_best_match, MatchTarget};
use crate::services::rate_limiter::{Clock, RateLimiter};

/// Books completed so far out of the run total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
}

impl Progress {
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.current)
    }

    /// `elapsed / current * remaining`; `None` before the first book completes.
    pub fn estimate_remaining(&self, elapsed: Duration) -> Option<Duration> {
        if self.current == 0 {
            return None;
        }
        let per_book = elapsed / self.current as u32;
        Some(per_book * self.remaining() as u32)
    }
}

/// What to do when the catalogue answers 429
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitPolicy {
    /// Stop the whole run at once
    Abort,
    /// Wait `pause` and retry the same call, stopping after `max_pauses`
    /// consecutive rate-limit answers
    PauseAndResume { pause: Duration, max_pauses: u32 },
}

#[derive(Debug, Clone)]
pub struct EnrichmentOptions {
    /// `Limit` passed to the availability endpoint
    pub availability_limit: u32,
    /// Minimum spacing between catalogue calls
    pub call_interval: Duration,
    /// Pause after every book
    pub item_delay: Duration,
    pub on_rate_limit: RateLimitPolicy,
}

impl Default for EnrichmentOptions {
    fn default() -> Self {
        Self {
            availability_limit: 50,
            call_interval: Duration::from_secs(5),
            item_delay: Duration::from_secs(5),
            on_rate_limit: RateLimitPolicy::Abort,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnrichmentReport {
    pub total: usize,
    /// Books that completed (matched, unmatched or failed)
    pub processed: usize,
    pub matched: usize,
    pub unmatched: usize,
    /// Books skipped after a network or HTTP error
    pub failed: usize,
    pub stopped_by_rate_limit: bool,
}

enum ItemOutcome {
    Matched,
    Unmatched,
    Failed,
    Stop,
}

enum CallFailure {
    Stop,
    Failed(CatalogueError),
}

pub struct EnrichmentPipeline {
    catalogue: Arc<dyn Catalogue>,
    books: Arc<dyn BookRepository>,
    clock: Arc<dyn Clock>,
    limiter: RateLimiter,
    options: EnrichmentOptions,
}

impl EnrichmentPipeline {
    pub fn new(
        catalogue: Arc<dyn Catalogue>,
        books: Arc<dyn BookRepository>,
        clock: Arc<dyn Clock>,
        options: EnrichmentOptions,
    ) -> Self {
        let limiter = RateLimiter::fixed_interval(options.call_interval, clock.clone());
        Self {
            catalogue,
            books,
            clock,
            limiter,
            options,
        }
    }

    /// Enrich `books` in order, calling `on_progress` once per completed book.
    ///
    /// Stops early (without error) on a rate-limit signal; a storage failure
    /// aborts the run with that error.
    pub async fn run(
        &self,
        books: &[Book],
        on_progress: &mut (dyn FnMut(Progress) + Send),
    ) -> Result<EnrichmentReport, DomainError> {
        let total = books.len();
        let mut report = EnrichmentReport {
            total,
            ..Default::default()
        };

        tracing::info!("Enriching {} books", total);

        for (index, book) in books.iter().enumerate() {
            match self.enrich_one(book).await? {
                ItemOutcome::Matched => report.matched += 1,
                ItemOutcome::Unmatched => report.unmatched += 1,
                ItemOutcome::Failed => report.failed += 1,
                ItemOutcome::Stop => {
                    tracing::warn!(
                        book_id = %book.book_id,
                        "Rate limited; abandoning the remaining {} books",
                        total - index
                    );
                    report.stopped_by_rate_limit = true;
                    break;
                }
            }

            report.processed += 1;
            self.clock.sleep(self.options.item_delay).await;
            on_progress(Progress {
                current: index + 1,
                total,
            });
        }

        tracing::info!(
            matched = report.matched,
            unmatched = report.unmatched,
            failed = report.failed,
            "Enrichment finished ({} of {} books)",
            report.processed,
            total
        );
        Ok(report)
    }

    async fn enrich_one(&self, book: &Book) -> Result<ItemOutcome, DomainError> {
        let target = MatchTarget::new(&book.title, &book.author);
        let catalogue = &self.catalogue;

        let candidates = match self
            .call(|| catalogue.search_titles(&target.title, &target.author))
            .await
        {
            Ok(candidates) => candidates,
            Err(CallFailure::Stop) => return Ok(ItemOutcome::Stop),
            Err(CallFailure::Failed(e)) => {
                tracing::warn!(book_id = %book.book_id, "{}", e);
                return Ok(ItemOutcome::Failed);
            }
        };

        let Some(found) = select_best_match(&target, &candidates) else {
            tracing::info!(
                book_id = %book.book_id,
                "No catalogue match for {:?} by {:?} ({} candidates)",
                book.title,
                book.author,
                candidates.len()
            );
            return Ok(ItemOutcome::Unmatched);
        };

        let brn = found.brn.as_str();
        let limit = self.options.availability_limit;
        let availability = match self
            .call(|| catalogue.fetch_availability(brn, limit))
            .await
        {
            Ok(entries) => entries,
            Err(CallFailure::Stop) => return Ok(ItemOutcome::Stop),
            Err(CallFailure::Failed(e)) => {
                tracing::warn!(book_id = %book.book_id, brn, "{}", e);
                return Ok(ItemOutcome::Failed);
            }
        };

        self.books
            .update_enrichment(&book.book_id, brn, &availability)
            .await
            .inspect_err(|e| {
                tracing::error!(book_id = %book.book_id, "Failed to store enrichment: {}", e)
            })?;

        tracing::debug!(
            book_id = %book.book_id,
            brn,
            copies = availability.len(),
            "Book enriched"
        );
        Ok(ItemOutcome::Matched)
    }

    /// One throttled catalogue call with the rate-limit policy applied
    async fn call<T, F, Fut>(&self, mut attempt: F) -> Result<T, CallFailure>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CatalogueError>>,
    {
        let mut pauses = 0u32;

        loop {
            self.limiter.acquire().await;

            match attempt().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_rate_limited() => match self.options.on_rate_limit {
                    RateLimitPolicy::Abort => return Err(CallFailure::Stop),
                    RateLimitPolicy::PauseAndResume { pause, max_pauses } => {
                        if pauses >= max_pauses {
                            return Err(CallFailure::Stop);
                        }
                        pauses += 1;
                        tracing::warn!(
                            "{}; pausing {:?} (pause {} of {})",
                            e,
                            pause,
                            pauses,
                            max_pauses
                        );
                        self.clock.sleep(pause).await;
                    }
                },
                Err(e) => return Err(CallFailure::Failed(e)),
            }
        }
    }
}
