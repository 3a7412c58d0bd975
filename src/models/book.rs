use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
    /// Goodreads "Book Id"
    #[sea_orm(primary_key, auto_increment = false)]
    pub book_id: String,
    pub title: String,
    pub author: String,
    pub brn: Option<String>,
    pub availability: Option<String>, // JSON array of AvailabilityEntry
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// One copy of a title at one branch, as reported by the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityEntry {
    /// Branch code
    pub library: String,
    pub avail: bool,
    /// Shelf call number
    pub code: String,
    /// Usage / loan category
    pub category: String,
}

// DTO for API responses and the enrichment pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub book_id: String,
    pub title: String,
    pub author: String,
    pub brn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<Vec<AvailabilityEntry>>,
}

impl Book {
    /// A freshly imported book, not yet matched against the catalogue.
    pub fn imported(book_id: String, title: String, author: String) -> Self {
        Self {
            book_id,
            title,
            author,
            brn: None,
            availability: None,
        }
    }

    /// True when some copy is on the shelf at `branch_code`.
    pub fn is_available_at(&self, branch_code: &str) -> bool {
        self.availability
            .as_ref()
            .is_some_and(|entries| entries.iter().any(|e| e.avail && e.library == branch_code))
    }
}

impl From<Model> for Book {
    fn from(model: Model) -> Self {
        let availability: Option<Vec<AvailabilityEntry>> = model.availability.map(|s| {
            serde_json::from_str(&s).unwrap_or_else(|e| {
                tracing::warn!(
                    "Unreadable availability stored for book {}: {}",
                    model.book_id,
                    e
                );
                Vec::new()
            })
        });

        Self {
            book_id: model.book_id,
            title: model.title,
            author: model.author,
            brn: model.brn,
            availability,
        }
    }
}

// Upsert payload: availability is left NotSet so re-imports never clear it
impl From<&Book> for ActiveModel {
    fn from(book: &Book) -> Self {
        Self {
            book_id: Set(book.book_id.clone()),
            title: Set(book.title.clone()),
            author: Set(book.author.clone()),
            brn: Set(book.brn.clone()),
            ..Default::default()
        }
    }
}
