//! SeaORM implementation of BranchRepository

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use crate::domain::{BranchRepository, DomainError};
use crate::models::Branch;
use crate::models::branch::{ActiveModel, Column, Entity as BranchEntity};

pub struct SeaOrmBranchRepository {
    db: DatabaseConnection,
}

impl SeaOrmBranchRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BranchRepository for SeaOrmBranchRepository {
    async fn upsert_many(&self, branches: &[Branch]) -> Result<u64, DomainError> {
        if branches.is_empty() {
            return Ok(0);
        }

        let models: Vec<ActiveModel> = branches.iter().map(ActiveModel::from).collect();

        let written = BranchEntity::insert_many(models)
            .on_conflict(
                OnConflict::column(Column::BranchCode)
                    .update_columns([Column::BranchName, Column::Closed])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| {
                tracing::error!("Error upserting branches: {}", e);
                DomainError::from(e)
            })?;

        Ok(written)
    }

    async fn find_open(&self) -> Result<Vec<Branch>, DomainError> {
        let branches = BranchEntity::find()
            .filter(Column::Closed.eq(false))
            .order_by_asc(Column::BranchName)
            .all(&self.db)
            .await
            .map_err(|e| {
                tracing::error!("Error selecting branches: {}", e);
                DomainError::from(e)
            })?;

        Ok(branches
            .into_iter()
            .map(|model| Branch {
                closed: false,
                ..Branch::from(model)
            })
            .collect())
    }
}
