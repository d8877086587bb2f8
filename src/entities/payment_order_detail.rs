use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One payment order line. Settlement lines carry the polymorphic
/// `referenceable_id`/`referenceable_type` pair; free-form "other" lines
/// carry a chart of account, an allocation, and optional notes. Exactly one
/// of the two shapes applies per row.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_order_details")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub purchase_payment_order_id: i64,
    pub amount: Decimal,
    pub referenceable_id: Option<i64>,
    pub referenceable_type: Option<String>,
    pub chart_of_account_id: Option<i64>,
    pub allocation_id: Option<i64>,
    pub notes: Option<String>,
}

impl Model {
    /// True for settlement lines pointing at an invoice, down payment, or
    /// return.
    pub fn is_reference(&self) -> bool {
        self.referenceable_id.is_some()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::purchase_payment_order::Entity",
        from = "Column::PurchasePaymentOrderId",
        to = "super::purchase_payment_order::Column::Id"
    )]
    PurchasePaymentOrder,
}

impl Related<super::purchase_payment_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchasePaymentOrder.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
