//! Balance ledger resolution for referenceable documents.
//!
//! A purchase invoice, down payment, or return has a fixed `amount` and a
//! derived, never-persisted `available` balance: the amount minus everything
//! already allocated to it by payment orders that are still alive (not
//! rejected, not cancellation-approved). Pending orders consume balance the
//! moment they are created; a rejection or approved cancellation releases it
//! again.

use crate::entities::{
    form, payment_order_detail, purchase_down_payment, purchase_invoice, purchase_return,
};
use crate::errors::ServiceError;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter, Set,
};

/// Tagged union over the document kinds a payment order line can settle
/// against. Gives the resolver one dispatch point for amount, form lookup,
/// and the wire type tag.
#[derive(Debug, Clone)]
pub enum Referenceable {
    Invoice(purchase_invoice::Model),
    DownPayment(purchase_down_payment::Model),
    Return(purchase_return::Model),
}

impl Referenceable {
    pub async fn load_invoice<C: ConnectionTrait>(
        conn: &C,
        id: i64,
    ) -> Result<Option<Self>, ServiceError> {
        Ok(purchase_invoice::Entity::find_by_id(id)
            .one(conn)
            .await?
            .map(Referenceable::Invoice))
    }

    pub async fn load_down_payment<C: ConnectionTrait>(
        conn: &C,
        id: i64,
    ) -> Result<Option<Self>, ServiceError> {
        Ok(purchase_down_payment::Entity::find_by_id(id)
            .one(conn)
            .await?
            .map(Referenceable::DownPayment))
    }

    pub async fn load_return<C: ConnectionTrait>(
        conn: &C,
        id: i64,
    ) -> Result<Option<Self>, ServiceError> {
        Ok(purchase_return::Entity::find_by_id(id)
            .one(conn)
            .await?
            .map(Referenceable::Return))
    }

    /// Resolve by the polymorphic type tag stored on a detail row.
    pub async fn load<C: ConnectionTrait>(
        conn: &C,
        referenceable_type: &str,
        id: i64,
    ) -> Result<Option<Self>, ServiceError> {
        match referenceable_type {
            form::FORMABLE_PURCHASE_INVOICE => Self::load_invoice(conn, id).await,
            form::FORMABLE_PURCHASE_DOWN_PAYMENT => Self::load_down_payment(conn, id).await,
            form::FORMABLE_PURCHASE_RETURN => Self::load_return(conn, id).await,
            other => Err(ServiceError::InternalError(format!(
                "unknown referenceable type {other}"
            ))),
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Referenceable::Invoice(model) => model.id,
            Referenceable::DownPayment(model) => model.id,
            Referenceable::Return(model) => model.id,
        }
    }

    pub fn amount(&self) -> Decimal {
        match self {
            Referenceable::Invoice(model) => model.amount,
            Referenceable::DownPayment(model) => model.amount,
            Referenceable::Return(model) => model.amount,
        }
    }

    pub fn referenceable_type(&self) -> &'static str {
        match self {
            Referenceable::Invoice(_) => form::FORMABLE_PURCHASE_INVOICE,
            Referenceable::DownPayment(_) => form::FORMABLE_PURCHASE_DOWN_PAYMENT,
            Referenceable::Return(_) => form::FORMABLE_PURCHASE_RETURN,
        }
    }

    /// The form envelope owned by this document. Every referenceable row is
    /// created together with its form, so a missing form is data corruption.
    pub async fn form<C: ConnectionTrait>(&self, conn: &C) -> Result<form::Model, ServiceError> {
        form::Entity::find()
            .filter(form::Column::FormableType.eq(self.referenceable_type()))
            .filter(form::Column::FormableId.eq(self.id()))
            .one(conn)
            .await?
            .ok_or_else(|| {
                ServiceError::InternalError(format!(
                    "form missing for {} {}",
                    self.referenceable_type(),
                    self.id()
                ))
            })
    }
}

/// `available(document)`: amount minus the sum of detail amounts allocated by
/// payment orders whose form is neither rejected nor cancellation-approved.
/// Pure read; calling it twice with no intervening writes yields the same
/// value.
pub async fn available<C: ConnectionTrait>(
    conn: &C,
    document: &Referenceable,
) -> Result<Decimal, ServiceError> {
    let details = payment_order_detail::Entity::find()
        .filter(payment_order_detail::Column::ReferenceableType.eq(document.referenceable_type()))
        .filter(payment_order_detail::Column::ReferenceableId.eq(document.id()))
        .all(conn)
        .await?;

    let mut consumed = Decimal::ZERO;
    for detail in details {
        let order_form = form::Entity::find()
            .filter(form::Column::FormableType.eq(form::FORMABLE_PURCHASE_PAYMENT_ORDER))
            .filter(form::Column::FormableId.eq(detail.purchase_payment_order_id))
            .one(conn)
            .await?;
        let Some(order_form) = order_form else {
            continue;
        };
        if order_form.approval_status == form::APPROVAL_REJECTED {
            continue;
        }
        if order_form.cancellation_status == Some(form::CANCELLATION_APPROVED) {
            continue;
        }
        consumed += detail.amount;
    }

    Ok(document.amount() - consumed)
}

/// Re-derive the document's `done` flag from its current available balance:
/// done iff fully settled. Returns the flag. Idempotent.
pub async fn recompute_done<C: ConnectionTrait>(
    conn: &C,
    document: &Referenceable,
) -> Result<bool, ServiceError> {
    let remaining = available(conn, document).await?;
    let done = remaining.is_zero();

    let form_row = document.form(conn).await?;
    if form_row.done != done {
        let mut active = form_row.into_active_model();
        active.done = Set(done);
        active.update(conn).await?;
    }
    Ok(done)
}
