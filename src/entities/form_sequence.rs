use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-(prefix, month) numbering counter behind form number allocation.
/// `increment_group` is the YYYYMM of the form date; the pair is unique.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "form_sequences")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub prefix: String,
    pub increment_group: i32,
    pub last_number: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
