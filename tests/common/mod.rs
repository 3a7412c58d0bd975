// Shared fixtures: a scripted catalogue and an in-memory database.
#![allow(dead_code)]

use async_trait::async_trait;
use book_hound::db;
use book_hound::models::{AvailabilityEntry, Book, Branch};
use book_hound::modules::integrations::{Catalogue, CatalogueError, TitleCandidate};
use book_hound::services::{Clock, ManualClock};
use sea_orm::DatabaseConnection;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

/// Scripted answer for the nth search call (1-based)
#[derive(Debug, Clone, Copy)]
pub enum SearchScript {
    RateLimited,
    NetworkError,
    NoMatch,
}

/// Catalogue fake. Every search matches unless scripted otherwise; every
/// availability lookup reports one copy on the shelf at AMKPL.
pub struct FakeCatalogue {
    clock: Arc<ManualClock>,
    calls: Mutex<Vec<(Duration, String)>>,
    scripts: Mutex<HashMap<usize, SearchScript>>,
    searches: Mutex<usize>,
    branches: Vec<Branch>,
}

impl FakeCatalogue {
    pub fn new(clock: Arc<ManualClock>) -> Self {
        Self {
            clock,
            calls: Mutex::new(Vec::new()),
            scripts: Mutex::new(HashMap::new()),
            searches: Mutex::new(0),
            branches: vec![
                Branch {
                    branch_code: "AMKPL".to_string(),
                    branch_name: "Ang Mo Kio Public Library".to_string(),
                    closed: false,
                },
                Branch {
                    branch_code: "QUEPL".to_string(),
                    branch_name: "Queenstown Public Library".to_string(),
                    closed: true,
                },
            ],
        }
    }

    pub fn script(self, search_call: usize, script: SearchScript) -> Self {
        self.scripts.lock().unwrap().insert(search_call, script);
        self
    }

    /// Calls in order, as `search:<title>` or `availability:<brn>`
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, c)| c.clone())
            .collect()
    }

    pub fn call_times(&self) -> Vec<Duration> {
        self.calls.lock().unwrap().iter().map(|(t, _)| *t).collect()
    }

    pub fn search_count(&self) -> usize {
        *self.searches.lock().unwrap()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push((self.clock.now(), call));
    }
}

#[async_trait]
impl Catalogue for FakeCatalogue {
    async fn fetch_branches(&self) -> Result<Vec<Branch>, CatalogueError> {
        self.record("branches".to_string());
        Ok(self.branches.clone())
    }

    async fn search_titles(
        &self,
        title: &str,
        author: &str,
    ) -> Result<Vec<TitleCandidate>, CatalogueError> {
        self.record(format!("search:{}", title));
        let n = {
            let mut searches = self.searches.lock().unwrap();
            *searches += 1;
            *searches
        };

        match self.scripts.lock().unwrap().get(&n) {
            Some(SearchScript::RateLimited) => {
                return Err(CatalogueError::RateLimited {
                    operation: "search titles",
                });
            }
            Some(SearchScript::NetworkError) => {
                return Err(CatalogueError::Network {
                    operation: "search titles",
                    message: "connection reset".to_string(),
                });
            }
            Some(SearchScript::NoMatch) => return Ok(Vec::new()),
            None => {}
        }

        Ok(vec![TitleCandidate {
            brn: format!("brn-{}", title.replace(' ', "-")),
            title: title.to_string(),
            author: author.to_string(),
            format: "Book".to_string(),
            languages: vec!["English".to_string()],
        }])
    }

    async fn fetch_availability(
        &self,
        brn: &str,
        _limit: u32,
    ) -> Result<Vec<AvailabilityEntry>, CatalogueError> {
        self.record(format!("availability:{}", brn));
        Ok(vec![AvailabilityEntry {
            library: "AMKPL".to_string(),
            avail: true,
            code: "English -[FIC]".to_string(),
            category: "Adult Lending".to_string(),
        }])
    }
}

pub fn numbered_books(count: usize) -> Vec<Book> {
    (1..=count)
        .map(|i| {
            Book::imported(
                i.to_string(),
                format!("Book {}", i),
                "Herbert, Frank".to_string(),
            )
        })
        .collect()
}

pub fn goodreads_csv(books: &[(&str, &str, &str, &str)]) -> String {
    let mut csv = String::from("Book Id,Title,Author,Author l-f,Exclusive Shelf\n");
    for (id, title, author_lf, shelf) in books {
        csv.push_str(&format!("{},{},x,\"{}\",{}\n", id, title, author_lf, shelf));
    }
    csv
}
