use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Tenant ledger mapping: which chart of account a feature posts to
/// (e.g. feature "purchase", name "account payable").
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "setting_journals")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub feature: String,
    pub name: String,
    pub description: Option<String>,
    pub chart_of_account_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
