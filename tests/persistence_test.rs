use book_hound::db;
use book_hound::domain::{BookRepository, BranchRepository, DomainError};
use book_hound::infrastructure::{SeaOrmBookRepository, SeaOrmBranchRepository};
use book_hound::models::{AvailabilityEntry, Book, Branch};
use book_hound::services::book_service;
use sea_orm::DatabaseConnection;

// Helper to create a test database
async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

fn book(id: &str, title: &str, author: &str) -> Book {
    Book::imported(id.to_string(), title.to_string(), author.to_string())
}

fn branch(code: &str, name: &str, closed: bool) -> Branch {
    Branch {
        branch_code: code.to_string(),
        branch_name: name.to_string(),
        closed,
    }
}

fn entry(library: &str, avail: bool) -> AvailabilityEntry {
    AvailabilityEntry {
        library: library.to_string(),
        avail,
        code: "English HER -[SF]".to_string(),
        category: "Adult Lending".to_string(),
    }
}

#[tokio::test]
async fn test_book_upsert_is_idempotent() {
    let repo = SeaOrmBookRepository::new(setup_test_db().await);
    let books = vec![
        book("1", "Dune", "Herbert, Frank"),
        book("2", "Piranesi", "Clarke, Susanna"),
    ];

    repo.upsert_many(&books).await.unwrap();
    repo.upsert_many(&books).await.unwrap();

    let stored = repo.find_all().await.unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].title, "Dune");
    assert_eq!(stored[1].title, "Piranesi");
}

#[tokio::test]
async fn test_reimport_overwrites_fields_but_keeps_availability() {
    let repo = SeaOrmBookRepository::new(setup_test_db().await);
    repo.upsert_many(&[book("1", "Dune", "Herbert, Frank")])
        .await
        .unwrap();
    repo.update_enrichment("1", "12345", &[entry("AMKPL", true)])
        .await
        .unwrap();

    repo.upsert_many(&[book("1", "Dune (Deluxe)", "Herbert, Frank")])
        .await
        .unwrap();

    assert_eq!(repo.find_all().await.unwrap().len(), 1);
    let stored = repo.find_by_id("1").await.unwrap().unwrap();
    assert_eq!(stored.title, "Dune (Deluxe)");
    assert_eq!(stored.brn, None);
    assert_eq!(stored.availability, Some(vec![entry("AMKPL", true)]));
}

#[tokio::test]
async fn test_update_enrichment_replaces_availability() {
    let repo = SeaOrmBookRepository::new(setup_test_db().await);
    repo.upsert_many(&[book("1", "Dune", "Herbert, Frank")])
        .await
        .unwrap();

    repo.update_enrichment("1", "12345", &[entry("AMKPL", true), entry("TPPL", false)])
        .await
        .unwrap();
    repo.update_enrichment("1", "12345", &[entry("BIPL", true)])
        .await
        .unwrap();

    let stored = repo.find_by_id("1").await.unwrap().unwrap();
    assert_eq!(stored.brn.as_deref(), Some("12345"));
    assert_eq!(stored.availability, Some(vec![entry("BIPL", true)]));
}

#[tokio::test]
async fn test_update_enrichment_unknown_book_is_not_found() {
    let repo = SeaOrmBookRepository::new(setup_test_db().await);

    let result = repo.update_enrichment("404", "1", &[]).await;

    assert!(matches!(result, Err(DomainError::NotFound(_))));
}

#[tokio::test]
async fn test_find_with_availability_skips_unenriched() {
    let repo = SeaOrmBookRepository::new(setup_test_db().await);
    repo.upsert_many(&[
        book("1", "Dune", "Herbert, Frank"),
        book("2", "Emma", "Austen, Jane"),
    ])
    .await
    .unwrap();
    repo.update_enrichment("2", "77", &[]).await.unwrap();

    let enriched = repo.find_with_availability().await.unwrap();

    assert_eq!(enriched.len(), 1);
    assert_eq!(enriched[0].book_id, "2");
    assert_eq!(enriched[0].availability, Some(vec![]));
}

#[tokio::test]
async fn test_available_at_filters_by_branch_and_avail() {
    let repo = SeaOrmBookRepository::new(setup_test_db().await);
    repo.upsert_many(&[
        book("1", "Dune", "Herbert, Frank"),
        book("2", "Emma", "Austen, Jane"),
        book("3", "Piranesi", "Clarke, Susanna"),
        book("4", "Beloved", "Morrison, Toni"),
    ])
    .await
    .unwrap();
    repo.update_enrichment("1", "10", &[entry("AMKPL", true)])
        .await
        .unwrap();
    repo.update_enrichment("2", "20", &[entry("AMKPL", false), entry("TPPL", true)])
        .await
        .unwrap();
    repo.update_enrichment("3", "30", &[entry("TPPL", false), entry("AMKPL", true)])
        .await
        .unwrap();

    let books = book_service::available_at(&repo, "AMKPL").await.unwrap();
    let ids: Vec<&str> = books.iter().map(|b| b.book_id.as_str()).collect();

    assert_eq!(ids, vec!["1", "3"]);
}

#[tokio::test]
async fn test_available_at_requires_branch() {
    let repo = SeaOrmBookRepository::new(setup_test_db().await);

    let result = book_service::available_at(&repo, "  ").await;

    assert!(matches!(result, Err(DomainError::Validation(_))));
}

#[tokio::test]
async fn test_branch_upsert_and_find_open() {
    let repo = SeaOrmBranchRepository::new(setup_test_db().await);

    repo.upsert_many(&[
        branch("TPPL", "Toa Payoh Public Library", false),
        branch("QUEPL", "Queenstown Public Library", true),
        branch("AMKPL", "Ang Mo Kio Public Library", false),
    ])
    .await
    .unwrap();

    // Queenstown reopens, Toa Payoh closes
    repo.upsert_many(&[
        branch("QUEPL", "Queenstown Public Library", false),
        branch("TPPL", "Toa Payoh Public Library", true),
    ])
    .await
    .unwrap();

    let open = repo.find_open().await.unwrap();
    let codes: Vec<&str> = open.iter().map(|b| b.branch_code.as_str()).collect();

    assert_eq!(codes, vec!["AMKPL", "QUEPL"]);
    assert!(open.iter().all(|b| !b.closed));
}

#[tokio::test]
async fn test_branch_upsert_empty_is_noop() {
    let repo = SeaOrmBranchRepository::new(setup_test_db().await);

    assert_eq!(repo.upsert_many(&[]).await.unwrap(), 0);
    assert!(repo.find_open().await.unwrap().is_empty());
}
