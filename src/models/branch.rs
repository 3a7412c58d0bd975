use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "libraries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub branch_code: String,
    pub branch_name: String,
    pub closed: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// A physical library location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub branch_code: String,
    pub branch_name: String,
    pub closed: bool,
}

impl From<Model> for Branch {
    fn from(model: Model) -> Self {
        Self {
            branch_code: model.branch_code,
            branch_name: model.branch_name,
            closed: model.closed,
        }
    }
}

impl From<&Branch> for ActiveModel {
    fn from(branch: &Branch) -> Self {
        Self {
            branch_code: Set(branch.branch_code.clone()),
            branch_name: Set(branch.branch_name.clone()),
            closed: Set(branch.closed),
        }
    }
}
