mod common;

use book_hound::domain::BookRepository;
use book_hound::infrastructure::{SeaOrmBookRepository, SeaOrmBranchRepository};
use book_hound::services::{
    ControllerError, EnrichmentOptions, ManualClock, RateLimitPolicy, UiController,
};
use common::{goodreads_csv, setup_test_db, FakeCatalogue, SearchScript};
use std::sync::Arc;
use std::time::Duration;

struct Setup {
    controller: UiController,
    catalogue: Arc<FakeCatalogue>,
    books: Arc<SeaOrmBookRepository>,
}

async fn setup(script: &[(usize, SearchScript)]) -> Setup {
    let db = setup_test_db().await;
    let clock = Arc::new(ManualClock::new());
    let mut fake = FakeCatalogue::new(clock.clone());
    for (call, s) in script {
        fake = fake.script(*call, *s);
    }
    let catalogue = Arc::new(fake);
    let books = Arc::new(SeaOrmBookRepository::new(db.clone()));

    let controller = UiController::new(
        books.clone(),
        Arc::new(SeaOrmBranchRepository::new(db)),
        catalogue.clone(),
        clock,
        EnrichmentOptions {
            availability_limit: 50,
            call_interval: Duration::from_secs(5),
            item_delay: Duration::from_secs(5),
            on_rate_limit: RateLimitPolicy::Abort,
        },
    );

    Setup {
        controller,
        catalogue,
        books,
    }
}

fn sample_csv() -> String {
    goodreads_csv(&[
        ("1", "Dune (Dune #1)", "Herbert, Frank", "to-read"),
        ("2", "Emma", "Austen, Jane", "read"),
        ("3", "Piranesi", "Clarke, Susanna", "to-read"),
    ])
}

#[tokio::test]
async fn test_process_without_file_is_rejected() {
    let s = setup(&[]).await;

    let result = s.controller.process().await;

    assert!(matches!(result, Err(ControllerError::NoFileSelected)));
    let state = s.controller.snapshot();
    assert!(!state.running);
    assert_eq!(
        state.error.as_deref(),
        Some("Select a Goodreads CSV export first")
    );
}

#[tokio::test]
async fn test_select_file_counts_to_read_books() {
    let s = setup(&[]).await;

    let count = s
        .controller
        .select_file("goodreads_library_export.csv", sample_csv().as_bytes())
        .unwrap();

    assert_eq!(count, 2);
    let state = s.controller.snapshot();
    assert_eq!(
        state.selected_file.as_deref(),
        Some("goodreads_library_export.csv")
    );
    assert_eq!(state.imported_count, 2);
    assert!(state.error.is_none());
}

#[tokio::test]
async fn test_select_file_records_parse_error() {
    let s = setup(&[]).await;
    let mut bytes = b"Book Id,Title,Author l-f,Exclusive Shelf\n".to_vec();
    bytes.extend_from_slice(b"1,\xff,x,to-read\n");

    let result = s.controller.select_file("broken.csv", &bytes);

    assert!(matches!(result, Err(ControllerError::Import(_))));
    let state = s.controller.snapshot();
    assert!(state.selected_file.is_none());
    assert!(state.error.unwrap().starts_with("CSV parse error"));
}

#[tokio::test]
async fn test_process_imports_and_enriches() {
    let s = setup(&[]).await;
    s.controller
        .select_file("export.csv", sample_csv().as_bytes())
        .unwrap();

    let handle = s.controller.process().await.unwrap();
    handle.await.unwrap();

    let state = s.controller.snapshot();
    assert!(!state.running);
    assert!(state.run_started.is_some());
    let report = state.last_report.unwrap();
    assert_eq!(report.total, 2);
    assert_eq!(report.matched, 2);

    let progress = s.controller.progress();
    assert_eq!((progress.current, progress.total), (2, 2));
    assert!(!progress.running);
    assert_eq!(progress.remaining_ms, None);
    assert_eq!(progress.elapsed_ms, 20_000);

    let dune = s.books.find_by_id("1").await.unwrap().unwrap();
    assert_eq!(dune.title, "Dune");
    assert_eq!(dune.brn.as_deref(), Some("brn-dune"));
    assert!(s.books.find_by_id("2").await.unwrap().is_none());
}

#[tokio::test]
async fn test_second_process_while_running_is_rejected() {
    let s = setup(&[]).await;
    s.controller
        .select_file("export.csv", sample_csv().as_bytes())
        .unwrap();

    let handle = s.controller.process().await.unwrap();
    let second = s.controller.process().await;
    assert!(matches!(second, Err(ControllerError::AlreadyRunning)));

    handle.await.unwrap();
    assert_eq!(s.catalogue.search_count(), 2);
}

#[tokio::test]
async fn test_rate_limited_run_reports_error() {
    let s = setup(&[(1, SearchScript::RateLimited)]).await;
    s.controller
        .select_file("export.csv", sample_csv().as_bytes())
        .unwrap();

    s.controller.process().await.unwrap().await.unwrap();

    let state = s.controller.snapshot();
    assert!(state.last_report.unwrap().stopped_by_rate_limit);
    assert_eq!(
        state.error.as_deref(),
        Some("Catalogue rate limit reached after 0 of 2 books")
    );
}

#[tokio::test]
async fn test_check_availability_needs_branch() {
    let s = setup(&[]).await;

    let result = s.controller.check_availability().await;

    assert!(matches!(result, Err(ControllerError::NoBranchSelected)));
}

#[tokio::test]
async fn test_check_availability_after_processing() {
    let s = setup(&[(2, SearchScript::NoMatch)]).await;
    s.controller
        .select_file("export.csv", sample_csv().as_bytes())
        .unwrap();
    s.controller.process().await.unwrap().await.unwrap();

    s.controller.select_branch(" AMKPL ").unwrap();
    let books = s.controller.check_availability().await.unwrap();

    assert_eq!(books.len(), 1);
    assert_eq!(books[0].book_id, "1");
    assert_eq!(s.controller.snapshot().books, books);

    s.controller.select_branch("QUEPL").unwrap();
    assert!(s.controller.check_availability().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_branches_then_load_open_only() {
    let s = setup(&[]).await;
    assert!(s.controller.load_branches().await.unwrap().is_empty());

    let open = s.controller.update_branches().await.unwrap();

    assert_eq!(open.len(), 1);
    assert_eq!(open[0].branch_code, "AMKPL");
    let state = s.controller.snapshot();
    assert_eq!(state.branches, open);
    assert!(!state.loading);
    assert_eq!(s.catalogue.calls(), vec!["branches"]);
}
