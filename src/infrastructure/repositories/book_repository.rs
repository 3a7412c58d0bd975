//! SeaORM implementation of BookRepository

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use crate::domain::{BookRepository, DomainError};
use crate::models::book::{ActiveModel, Column, Entity as BookEntity};
use crate::models::{AvailabilityEntry, Book};

// Keeps each multi-row INSERT well under SQLite's bound-parameter limit
const UPSERT_CHUNK: usize = 100;

/// SeaORM-based implementation of BookRepository
pub struct SeaOrmBookRepository {
    db: DatabaseConnection,
}

impl SeaOrmBookRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BookRepository for SeaOrmBookRepository {
    async fn upsert_many(&self, books: &[Book]) -> Result<u64, DomainError> {
        let mut written = 0;

        for chunk in books.chunks(UPSERT_CHUNK) {
            let models: Vec<ActiveModel> = chunk.iter().map(ActiveModel::from).collect();

            let rows = BookEntity::insert_many(models)
                .on_conflict(
                    OnConflict::column(Column::BookId)
                        .update_columns([Column::Title, Column::Author, Column::Brn])
                        .to_owned(),
                )
                .exec_without_returning(&self.db)
                .await
                .map_err(|e| {
                    tracing::error!("Error upserting books: {}", e);
                    DomainError::from(e)
                })?;

            written += rows;
        }

        tracing::debug!("Upserted {} books", written);
        Ok(written)
    }

    async fn update_enrichment(
        &self,
        book_id: &str,
        brn: &str,
        availability: &[AvailabilityEntry],
    ) -> Result<(), DomainError> {
        let availability_json = serde_json::to_string(availability)?;

        let result = BookEntity::update_many()
            .col_expr(Column::Brn, Expr::value(brn.to_string()))
            .col_expr(Column::Availability, Expr::value(availability_json))
            .filter(Column::BookId.eq(book_id))
            .exec(&self.db)
            .await
            .map_err(|e| {
                tracing::error!("Error updating book {}: {}", book_id, e);
                DomainError::from(e)
            })?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound(format!("book {}", book_id)));
        }

        Ok(())
    }

    async fn find_by_id(&self, book_id: &str) -> Result<Option<Book>, DomainError> {
        let model = BookEntity::find_by_id(book_id.to_string())
            .one(&self.db)
            .await?;

        Ok(model.map(Book::from))
    }

    async fn find_all(&self) -> Result<Vec<Book>, DomainError> {
        let books = BookEntity::find()
            .order_by_asc(Column::Title)
            .all(&self.db)
            .await?;

        Ok(books.into_iter().map(Book::from).collect())
    }

    async fn find_with_availability(&self) -> Result<Vec<Book>, DomainError> {
        let books = BookEntity::find()
            .filter(Column::Availability.is_not_null())
            .order_by_asc(Column::Title)
            .all(&self.db)
            .await
            .map_err(|e| {
                tracing::error!("Error selecting books with availability: {}", e);
                DomainError::from(e)
            })?;

        Ok(books.into_iter().map(Book::from).collect())
    }
}
