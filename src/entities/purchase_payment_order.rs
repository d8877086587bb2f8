use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment order header. `amount` is the grand total at creation time; the
/// line items live in `payment_order_details`, the lifecycle in `forms`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchase_payment_orders")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub payment_type: String,
    pub supplier_id: i64,
    pub supplier_name: String,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::payment_order_detail::Entity")]
    PaymentOrderDetails,
}

impl Related<super::payment_order_detail::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentOrderDetails.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
