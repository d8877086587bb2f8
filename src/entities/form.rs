use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Approval status values. A form is created pending and moves exactly once
/// to approved or rejected.
pub const APPROVAL_PENDING: i16 = 0;
pub const APPROVAL_APPROVED: i16 = 1;
pub const APPROVAL_REJECTED: i16 = -1;

/// Cancellation status values, only meaningful once a cancellation has been
/// requested on an approved form.
pub const CANCELLATION_PENDING: i16 = 0;
pub const CANCELLATION_APPROVED: i16 = 1;
pub const CANCELLATION_REJECTED: i16 = -1;

/// Formable type tags for the polymorphic `formable_id`/`formable_type` pair.
pub const FORMABLE_PURCHASE_INVOICE: &str = "PurchaseInvoice";
pub const FORMABLE_PURCHASE_DOWN_PAYMENT: &str = "PurchaseDownPayment";
pub const FORMABLE_PURCHASE_RETURN: &str = "PurchaseReturn";
pub const FORMABLE_PURCHASE_PAYMENT_ORDER: &str = "PurchasePaymentOrder";

/// Generic form envelope owned by every formable document: human-readable
/// number, maker/approver bookkeeping, and the approval and cancellation
/// state-machine fields.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "forms")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub branch_id: i64,
    pub formable_id: i64,
    pub formable_type: String,
    #[sea_orm(unique)]
    pub number: String,
    pub edited_number: Option<String>,
    pub edited_notes: Option<String>,
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_by: i64,
    pub updated_by: i64,
    pub done: bool,
    pub increment_number: i32,
    pub increment_group: i32,
    pub request_approval_to: i64,
    pub approval_by: Option<i64>,
    pub approval_at: Option<DateTime<Utc>>,
    pub approval_reason: Option<String>,
    pub approval_status: i16,
    pub request_cancellation_to: Option<i64>,
    pub request_cancellation_by: Option<i64>,
    pub request_cancellation_at: Option<DateTime<Utc>>,
    pub request_cancellation_reason: Option<String>,
    pub cancellation_approval_at: Option<DateTime<Utc>>,
    pub cancellation_approval_by: Option<i64>,
    pub cancellation_approval_reason: Option<String>,
    pub cancellation_status: Option<i16>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
