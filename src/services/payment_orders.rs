//! Payment order aggregate: creation (validation, numbering, journal gate)
//! and the approval/cancellation lifecycle operations.

use crate::auth::ApprovalTokenService;
use crate::db::DbPool;
use crate::entities::{
    branch_user, form, payment_order_detail, purchase_payment_order, supplier,
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::availability::{self, Referenceable};
use crate::services::notifications::NotificationDispatcher;
use crate::services::{activity, journal, lifecycle, numbering};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{instrument, warn};
use validator::Validate;

/// Settlement line in maker input: which document, how much of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceLine {
    pub id: i64,
    pub amount: Decimal,
}

/// Free-form "other" line: adjustment posted to a chart of account under an
/// allocation bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtherLine {
    pub coa_id: i64,
    pub allocation_id: i64,
    pub amount: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentOrderRequest {
    pub payment_type: String,
    pub supplier_id: i64,
    pub date: DateTime<Utc>,
    pub request_approval_to: i64,
    #[validate(length(min = 1, message = "\"invoices\" is required"))]
    pub invoices: Vec<ReferenceLine>,
    #[serde(default)]
    pub down_payments: Vec<ReferenceLine>,
    #[serde(default)]
    pub returns: Vec<ReferenceLine>,
    #[serde(default)]
    pub others: Vec<OtherLine>,
    pub total_invoice_amount: Decimal,
    pub total_down_payment_amount: Decimal,
    pub total_return_amount: Decimal,
    /// Signed net of the "other" lines: debit-polarity accounts count
    /// positive, credit-polarity negative.
    pub total_other_amount: Decimal,
    pub total_amount: Decimal,
    pub notes: Option<String>,
}

/// Serialized order + form + lines, split the way the API exposes them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOrderView {
    pub id: i64,
    pub payment_type: String,
    pub supplier_id: i64,
    pub supplier_name: String,
    pub amount: Decimal,
    pub invoices: Vec<payment_order_detail::Model>,
    pub down_payments: Vec<payment_order_detail::Model>,
    pub returns: Vec<payment_order_detail::Model>,
    pub others: Vec<payment_order_detail::Model>,
    pub form: form::Model,
}

type ReferenceKey = (String, i64);

/// Service for creating payment orders and driving their form lifecycle.
#[derive(Clone)]
pub struct PaymentOrderService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    tokens: ApprovalTokenService,
    dispatcher: Arc<dyn NotificationDispatcher>,
    /// Serializes the available-balance check-and-reserve per referenced
    /// document across concurrent submissions.
    reference_locks: Arc<DashMap<ReferenceKey, Arc<Mutex<()>>>>,
    number_prefix: String,
}

impl PaymentOrderService {
    pub fn new(
        db: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        tokens: ApprovalTokenService,
        dispatcher: Arc<dyn NotificationDispatcher>,
        number_prefix: impl Into<String>,
    ) -> Self {
        Self {
            db,
            event_sender,
            tokens,
            dispatcher,
            reference_locks: Arc::new(DashMap::new()),
            number_prefix: number_prefix.into(),
        }
    }

    /// Validate and assemble a payment order from maker input, then persist
    /// the form, the order, and its lines atomically. The journal balance
    /// check runs inside the same transaction; an imbalance rolls everything
    /// back.
    #[instrument(skip(self, request), fields(supplier_id = request.supplier_id))]
    pub async fn create(
        &self,
        maker_id: i64,
        request: CreatePaymentOrderRequest,
    ) -> Result<PaymentOrderView, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        validate_line_amounts(&request)?;
        let notes = normalize_notes(request.notes.as_deref())?;

        // Lock every referenced document (sorted, deduplicated) so that two
        // concurrent orders cannot both pass the over-allocation check.
        let _guards = self.lock_references(&request).await;

        let txn = self.db.begin().await?;

        let maker_branch = branch_user::Entity::find()
            .filter(branch_user::Column::UserId.eq(maker_id))
            .filter(branch_user::Column::IsDefault.eq(true))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::Conflict("please set default branch to create this form".into())
            })?;

        // Referenced documents must exist; checked invoices first, then down
        // payments, then returns.
        let mut references: Vec<(Referenceable, Decimal)> = Vec::new();
        for line in &request.invoices {
            let document = Referenceable::load_invoice(&txn, line.id).await?.ok_or_else(|| {
                ServiceError::NotFound(format!("purchase invoice with id {} not exist", line.id))
            })?;
            references.push((document, line.amount));
        }
        for line in &request.down_payments {
            let document = Referenceable::load_down_payment(&txn, line.id)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!(
                        "purchase down payment with id {} not exist",
                        line.id
                    ))
                })?;
            references.push((document, line.amount));
        }
        for line in &request.returns {
            let document = Referenceable::load_return(&txn, line.id).await?.ok_or_else(|| {
                ServiceError::NotFound(format!("purchase return with id {} not exist", line.id))
            })?;
            references.push((document, line.amount));
        }

        let supplier_row = supplier::Entity::find_by_id(request.supplier_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound("supplier not exist".into()))?;

        // Over-allocation: ordered amounts are aggregated per document first,
        // so duplicate lines referencing the same document cannot jointly
        // exceed its remaining balance.
        let mut ordered_totals: HashMap<ReferenceKey, Decimal> = HashMap::new();
        for (document, ordered) in &references {
            *ordered_totals
                .entry((document.referenceable_type().to_string(), document.id()))
                .or_insert(Decimal::ZERO) += *ordered;
        }
        let mut checked: HashSet<ReferenceKey> = HashSet::new();
        for (document, _) in &references {
            let key = (document.referenceable_type().to_string(), document.id());
            if !checked.insert(key.clone()) {
                continue;
            }
            let ordered = ordered_totals[&key];
            let available = availability::available(&txn, document).await?;
            if ordered > available {
                let document_form = document.form(&txn).await?;
                return Err(ServiceError::Conflict(format!(
                    "form {} order more than available, available {} ordered {}",
                    document_form.number, available, ordered
                )));
            }
        }

        // Declared subtotals must match the line sums exactly, then the
        // grand total must match the subtotal identity.
        let invoice_sum: Decimal = request.invoices.iter().map(|l| l.amount).sum();
        ensure_subtotal("total invoice amount", invoice_sum, request.total_invoice_amount)?;
        let down_payment_sum: Decimal = request.down_payments.iter().map(|l| l.amount).sum();
        ensure_subtotal(
            "total down payment amount",
            down_payment_sum,
            request.total_down_payment_amount,
        )?;
        let return_sum: Decimal = request.returns.iter().map(|l| l.amount).sum();
        ensure_subtotal("total return amount", return_sum, request.total_return_amount)?;

        let mut other_sum = Decimal::ZERO;
        for line in &request.others {
            let account = crate::entities::chart_of_account::Entity::find_by_id(line.coa_id)
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!(
                        "chart of account with id {} not exist",
                        line.coa_id
                    ))
                })?;
            if account.is_debit {
                other_sum += line.amount;
            } else {
                other_sum -= line.amount;
            }
        }
        ensure_subtotal("total other amount", other_sum, request.total_other_amount)?;

        let expected_total = request.total_invoice_amount - request.total_down_payment_amount
            - request.total_return_amount
            + request.total_other_amount;
        ensure_subtotal("total amount", expected_total, request.total_amount)?;

        if request.total_down_payment_amount > request.total_invoice_amount {
            return Err(ServiceError::Conflict(format!(
                "total down payment more than total invoice, total down payment: {} > total invoice: {}",
                request.total_down_payment_amount, request.total_invoice_amount
            )));
        }
        if request.total_return_amount > request.total_invoice_amount {
            return Err(ServiceError::Conflict(format!(
                "total return more than total invoice, total return: {} > total invoice: {}",
                request.total_return_amount, request.total_invoice_amount
            )));
        }

        journal::find_setting_journal(&txn, journal::FEATURE_PURCHASE, journal::ACCOUNT_PAYABLE)
            .await?;

        let allocated =
            numbering::next_form_number(&txn, &self.number_prefix, request.date).await?;
        let now = Utc::now();

        let order = purchase_payment_order::ActiveModel {
            id: NotSet,
            payment_type: Set(request.payment_type.clone()),
            supplier_id: Set(supplier_row.id),
            supplier_name: Set(supplier_row.name.clone()),
            amount: Set(request.total_amount),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        for (document, amount) in &references {
            payment_order_detail::ActiveModel {
                id: NotSet,
                purchase_payment_order_id: Set(order.id),
                amount: Set(*amount),
                referenceable_id: Set(Some(document.id())),
                referenceable_type: Set(Some(document.referenceable_type().to_string())),
                chart_of_account_id: Set(None),
                allocation_id: Set(None),
                notes: Set(None),
            }
            .insert(&txn)
            .await?;
        }
        for line in &request.others {
            payment_order_detail::ActiveModel {
                id: NotSet,
                purchase_payment_order_id: Set(order.id),
                amount: Set(line.amount),
                referenceable_id: Set(None),
                referenceable_type: Set(None),
                chart_of_account_id: Set(Some(line.coa_id)),
                allocation_id: Set(Some(line.allocation_id)),
                notes: Set(line.notes.clone()),
            }
            .insert(&txn)
            .await?;
        }

        let form_row = form::ActiveModel {
            id: NotSet,
            branch_id: Set(maker_branch.branch_id),
            formable_id: Set(order.id),
            formable_type: Set(form::FORMABLE_PURCHASE_PAYMENT_ORDER.to_string()),
            number: Set(allocated.number.clone()),
            edited_number: Set(None),
            edited_notes: Set(None),
            date: Set(request.date),
            notes: Set(notes),
            created_by: Set(maker_id),
            updated_by: Set(maker_id),
            done: Set(false),
            increment_number: Set(allocated.increment_number),
            increment_group: Set(allocated.increment_group),
            request_approval_to: Set(request.request_approval_to),
            approval_by: Set(None),
            approval_at: Set(None),
            approval_reason: Set(None),
            approval_status: Set(form::APPROVAL_PENDING),
            request_cancellation_to: Set(None),
            request_cancellation_by: Set(None),
            request_cancellation_at: Set(None),
            request_cancellation_reason: Set(None),
            cancellation_approval_at: Set(None),
            cancellation_approval_by: Set(None),
            cancellation_approval_reason: Set(None),
            cancellation_status: Set(None),
        }
        .insert(&txn)
        .await?;

        // Journal gate: the order may only exist if its postings balance.
        let postings: Vec<journal::OtherPosting> = request
            .others
            .iter()
            .map(|line| journal::OtherPosting {
                chart_of_account_id: line.coa_id,
                amount: line.amount,
            })
            .collect();
        let journal_check = journal::check(
            &txn,
            request.total_amount,
            request.total_invoice_amount,
            request.total_down_payment_amount,
            request.total_return_amount,
            &postings,
        )
        .await?;
        if !journal_check.is_balance {
            return Err(ServiceError::JournalImbalance {
                debit: journal_check.debit,
                credit: journal_check.credit,
            });
        }

        // The new pending order consumes balance immediately.
        for (document, _) in &references {
            availability::recompute_done(&txn, document).await?;
        }

        activity::record(&txn, &allocated.number, maker_id, "Created").await?;
        txn.commit().await?;

        if let Err(e) = self
            .event_sender
            .send(Event::PaymentOrderCreated(order.id))
            .await
        {
            warn!(error = %e, order_id = order.id, "failed to send created event");
        }
        self.notify_approver(&form_row, request.request_approval_to, order.id);

        self.get(order.id).await
    }

    #[instrument(skip(self))]
    pub async fn approve(
        &self,
        payment_order_id: i64,
        acting_user: i64,
    ) -> Result<PaymentOrderView, ServiceError> {
        let txn = self.db.begin().await?;
        let (order, form_row) = load_order_with_form(&txn, payment_order_id, true).await?;

        let form_row = lifecycle::approve(&txn, form_row, acting_user).await?;
        self.recompute_references(&txn, order.id).await?;
        activity::record(&txn, &form_row.number, acting_user, "Approved").await?;
        txn.commit().await?;

        if let Err(e) = self
            .event_sender
            .send(Event::PaymentOrderApproved(order.id))
            .await
        {
            warn!(error = %e, order_id = order.id, "failed to send approved event");
        }
        self.get(payment_order_id).await
    }

    #[instrument(skip(self, reason))]
    pub async fn reject(
        &self,
        payment_order_id: i64,
        acting_user: i64,
        reason: &str,
    ) -> Result<PaymentOrderView, ServiceError> {
        let reason = validate_reason(reason)?;

        let txn = self.db.begin().await?;
        let (order, form_row) = load_order_with_form(&txn, payment_order_id, true).await?;

        let form_row = lifecycle::reject(&txn, form_row, acting_user, reason).await?;
        // Rejection releases whatever the pending order had reserved.
        self.recompute_references(&txn, order.id).await?;
        activity::record(&txn, &form_row.number, acting_user, "Rejected").await?;
        txn.commit().await?;

        if let Err(e) = self
            .event_sender
            .send(Event::PaymentOrderRejected {
                payment_order_id: order.id,
                by_email: false,
            })
            .await
        {
            warn!(error = %e, order_id = order.id, "failed to send rejected event");
        }
        self.get(payment_order_id).await
    }

    /// Out-of-band rejection via the signed token from the approval email.
    /// Same transition as `reject`, different authorization source; the form
    /// and every referenced document are additionally stamped with
    /// `edited_number`/`edited_notes` to mark them released.
    #[instrument(skip(self, token, reason))]
    pub async fn reject_by_token(
        &self,
        token: &str,
        reason: &str,
    ) -> Result<PaymentOrderView, ServiceError> {
        let claims = self.tokens.verify(token)?;
        let reason = validate_reason(reason)?;

        let txn = self.db.begin().await?;
        let (order, form_row) = load_order_with_form(&txn, claims.payment_order_id, true).await?;

        lifecycle::ensure_pending_approval(&form_row)?;
        lifecycle::ensure_selected_approver_for_form(&form_row, claims.user_id)?;

        let form_row = lifecycle::apply_rejection(&txn, form_row, claims.user_id, reason).await?;
        let edited_number = form_row.number.clone();
        let mut active = form_row.into_active_model();
        active.edited_number = Set(Some(edited_number.clone()));
        active.edited_notes = Set(Some(reason.to_string()));
        active.update(&txn).await?;

        let references = self.recompute_references(&txn, order.id).await?;
        for document in &references {
            let document_form = document.form(&txn).await?;
            let released_number = document_form.number.clone();
            let mut active = document_form.into_active_model();
            active.edited_number = Set(Some(released_number));
            active.edited_notes = Set(Some(reason.to_string()));
            active.update(&txn).await?;
        }

        activity::record(&txn, &edited_number, claims.user_id, "Rejected By Email").await?;
        txn.commit().await?;

        if let Err(e) = self
            .event_sender
            .send(Event::PaymentOrderRejected {
                payment_order_id: order.id,
                by_email: true,
            })
            .await
        {
            warn!(error = %e, order_id = order.id, "failed to send rejected event");
        }
        self.get(order.id).await
    }

    #[instrument(skip(self, reason))]
    pub async fn request_cancellation(
        &self,
        payment_order_id: i64,
        acting_user: i64,
        request_cancellation_to: i64,
        reason: &str,
    ) -> Result<PaymentOrderView, ServiceError> {
        let reason = validate_reason(reason)?;

        let txn = self.db.begin().await?;
        let (order, form_row) = load_order_with_form(&txn, payment_order_id, true).await?;

        let form_row = lifecycle::request_cancellation(
            &txn,
            form_row,
            acting_user,
            request_cancellation_to,
            reason,
        )
        .await?;
        activity::record(&txn, &form_row.number, acting_user, "Cancellation Requested").await?;
        txn.commit().await?;

        if let Err(e) = self
            .event_sender
            .send(Event::PaymentOrderCancellationRequested(order.id))
            .await
        {
            warn!(error = %e, order_id = order.id, "failed to send cancellation event");
        }
        self.notify_approver(&form_row, request_cancellation_to, order.id);

        self.get(payment_order_id).await
    }

    #[instrument(skip(self))]
    pub async fn approve_cancellation(
        &self,
        payment_order_id: i64,
        acting_user: i64,
    ) -> Result<PaymentOrderView, ServiceError> {
        let txn = self.db.begin().await?;
        let (order, form_row) = load_order_with_form(&txn, payment_order_id, true).await?;

        let form_row = lifecycle::approve_cancellation(&txn, form_row, acting_user).await?;
        // An approved cancellation releases balances exactly like a
        // rejection would.
        self.recompute_references(&txn, order.id).await?;
        activity::record(&txn, &form_row.number, acting_user, "Cancellation Approved").await?;
        txn.commit().await?;

        if let Err(e) = self
            .event_sender
            .send(Event::PaymentOrderCancellationApproved(order.id))
            .await
        {
            warn!(error = %e, order_id = order.id, "failed to send cancellation event");
        }
        self.get(payment_order_id).await
    }

    #[instrument(skip(self, reason))]
    pub async fn reject_cancellation(
        &self,
        payment_order_id: i64,
        acting_user: i64,
        reason: &str,
    ) -> Result<PaymentOrderView, ServiceError> {
        let reason = validate_reason(reason)?;

        let txn = self.db.begin().await?;
        let (order, form_row) = load_order_with_form(&txn, payment_order_id, true).await?;

        let form_row = lifecycle::reject_cancellation(&txn, form_row, acting_user, reason).await?;
        activity::record(&txn, &form_row.number, acting_user, "Cancellation Rejected").await?;
        txn.commit().await?;

        if let Err(e) = self
            .event_sender
            .send(Event::PaymentOrderCancellationRejected(order.id))
            .await
        {
            warn!(error = %e, order_id = order.id, "failed to send cancellation event");
        }
        self.get(payment_order_id).await
    }

    /// Order + form + lines, split into the four line collections.
    pub async fn get(&self, payment_order_id: i64) -> Result<PaymentOrderView, ServiceError> {
        let db = &*self.db;
        let (order, form_row) = load_order_with_form(db, payment_order_id, false).await?;

        let details = payment_order_detail::Entity::find()
            .filter(payment_order_detail::Column::PurchasePaymentOrderId.eq(order.id))
            .order_by_asc(payment_order_detail::Column::Id)
            .all(db)
            .await?;

        let mut view = PaymentOrderView {
            id: order.id,
            payment_type: order.payment_type,
            supplier_id: order.supplier_id,
            supplier_name: order.supplier_name,
            amount: order.amount,
            invoices: Vec::new(),
            down_payments: Vec::new(),
            returns: Vec::new(),
            others: Vec::new(),
            form: form_row,
        };
        for detail in details {
            match detail.referenceable_type.as_deref() {
                Some(form::FORMABLE_PURCHASE_INVOICE) => view.invoices.push(detail),
                Some(form::FORMABLE_PURCHASE_DOWN_PAYMENT) => view.down_payments.push(detail),
                Some(form::FORMABLE_PURCHASE_RETURN) => view.returns.push(detail),
                _ => view.others.push(detail),
            }
        }
        Ok(view)
    }

    /// Re-derive done/available state for every document the order settles.
    async fn recompute_references<C: ConnectionTrait>(
        &self,
        conn: &C,
        payment_order_id: i64,
    ) -> Result<Vec<Referenceable>, ServiceError> {
        let details = payment_order_detail::Entity::find()
            .filter(payment_order_detail::Column::PurchasePaymentOrderId.eq(payment_order_id))
            .all(conn)
            .await?;

        let mut documents = Vec::new();
        for detail in details.iter().filter(|d| d.is_reference()) {
            let kind = detail.referenceable_type.as_deref().unwrap_or_default();
            let id = detail.referenceable_id.unwrap_or_default();
            let document = Referenceable::load(conn, kind, id).await?.ok_or_else(|| {
                ServiceError::InternalError(format!("referenced {kind} {id} disappeared"))
            })?;
            availability::recompute_done(conn, &document).await?;
            documents.push(document);
        }
        Ok(documents)
    }

    async fn lock_references(
        &self,
        request: &CreatePaymentOrderRequest,
    ) -> Vec<OwnedMutexGuard<()>> {
        let mut keys: Vec<ReferenceKey> = request
            .invoices
            .iter()
            .map(|l| (form::FORMABLE_PURCHASE_INVOICE.to_string(), l.id))
            .chain(
                request
                    .down_payments
                    .iter()
                    .map(|l| (form::FORMABLE_PURCHASE_DOWN_PAYMENT.to_string(), l.id)),
            )
            .chain(
                request
                    .returns
                    .iter()
                    .map(|l| (form::FORMABLE_PURCHASE_RETURN.to_string(), l.id)),
            )
            .collect();
        // Sorted acquisition order prevents lock cycles between submissions.
        keys.sort();
        keys.dedup();

        let mut guards = Vec::with_capacity(keys.len());
        for key in keys {
            let lock = self
                .reference_locks
                .entry(key)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value()
                .clone();
            guards.push(lock.lock_owned().await);
        }
        guards
    }

    /// Post-commit, best-effort approval request. Token issuance or delivery
    /// failure is logged and never unwinds the committed transaction.
    fn notify_approver(&self, form_row: &form::Model, approver_id: i64, payment_order_id: i64) {
        let token = match self.tokens.issue(payment_order_id, approver_id) {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, payment_order_id, "failed to issue approval token");
                return;
            }
        };
        let dispatcher = self.dispatcher.clone();
        let form_row = form_row.clone();
        tokio::spawn(async move {
            if let Err(e) = dispatcher
                .send_approval_request(&form_row, approver_id, &token)
                .await
            {
                warn!(error = %e, number = %form_row.number, "approval request dispatch failed");
            }
        });
    }
}

/// Load the order and its form. With `for_update` the form row is read under
/// SELECT ... FOR UPDATE so concurrent transitions serialize on it instead of
/// both passing the same guard (backends without row locks ignore the
/// clause).
async fn load_order_with_form<C: ConnectionTrait>(
    conn: &C,
    payment_order_id: i64,
    for_update: bool,
) -> Result<(purchase_payment_order::Model, form::Model), ServiceError> {
    let order = purchase_payment_order::Entity::find_by_id(payment_order_id)
        .one(conn)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!(
                "purchase payment order with id {payment_order_id} not exist"
            ))
        })?;
    let mut form_query = form::Entity::find()
        .filter(form::Column::FormableType.eq(form::FORMABLE_PURCHASE_PAYMENT_ORDER))
        .filter(form::Column::FormableId.eq(order.id));
    if for_update {
        form_query = form_query.lock_exclusive();
    }
    let form_row = form_query
        .one(conn)
        .await?
        .ok_or_else(|| {
            ServiceError::InternalError(format!(
                "form missing for purchase payment order {payment_order_id}"
            ))
        })?;
    Ok((order, form_row))
}

fn ensure_subtotal(label: &str, expected: Decimal, received: Decimal) -> Result<(), ServiceError> {
    if expected != received {
        return Err(ServiceError::Conflict(format!(
            "incorect {label}, expected {expected} received {received}"
        )));
    }
    Ok(())
}

fn validate_line_amounts(request: &CreatePaymentOrderRequest) -> Result<(), ServiceError> {
    let collections: [(&str, &Vec<ReferenceLine>); 3] = [
        ("invoices", &request.invoices),
        ("downPayments", &request.down_payments),
        ("returns", &request.returns),
    ];
    for (field, lines) in collections {
        for (index, line) in lines.iter().enumerate() {
            if line.amount < Decimal::ONE {
                return Err(ServiceError::ValidationError(format!(
                    "\"{field}[{index}].amount\" must be greater than or equal to 1"
                )));
            }
        }
    }
    for (index, line) in request.others.iter().enumerate() {
        if line.amount < Decimal::ONE {
            return Err(ServiceError::ValidationError(format!(
                "\"others[{index}].amount\" must be greater than or equal to 1"
            )));
        }
    }
    Ok(())
}

fn normalize_notes(notes: Option<&str>) -> Result<Option<String>, ServiceError> {
    let Some(notes) = notes else {
        return Ok(None);
    };
    let trimmed = notes.trim();
    if trimmed.chars().count() > 255 {
        return Err(ServiceError::ValidationError(
            "\"notes\" length must be less than or equal to 255 characters long".into(),
        ));
    }
    Ok(Some(trimmed.to_string()))
}

fn validate_reason(reason: &str) -> Result<&str, ServiceError> {
    if reason.trim().is_empty() {
        return Err(ServiceError::ValidationError(
            "\"reason\" is not allowed to be empty".into(),
        ));
    }
    if reason.chars().count() > 255 {
        return Err(ServiceError::ValidationError(
            "\"reason\" length must be less than or equal to 255 characters long".into(),
        ));
    }
    Ok(reason)
}
