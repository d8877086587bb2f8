//! Form lifecycle state machine.
//!
//! States: pending approval -> approved | rejected; from approved, a
//! cancellation sub-flow: pending cancellation -> cancellation approved |
//! cancellation rejected. Guards operate on a form row loaded inside the
//! caller's transaction, so a transition can never be applied to state read
//! before the guard check.

use crate::entities::form;
use crate::errors::ServiceError;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, IntoActiveModel, Set};

/// A form may be approved or rejected exactly once.
pub fn ensure_pending_approval(form: &form::Model) -> Result<(), ServiceError> {
    match form.approval_status {
        form::APPROVAL_PENDING => Ok(()),
        form::APPROVAL_APPROVED => Err(ServiceError::Conflict("Form already approved".into())),
        _ => Err(ServiceError::Conflict("Form already rejected".into())),
    }
}

/// Only the user the approval was requested to may act on it.
pub fn ensure_selected_approver(form: &form::Model, acting_user: i64) -> Result<(), ServiceError> {
    if form.request_approval_to != acting_user {
        return Err(ServiceError::Forbidden(
            "Forbidden - You are not the selected approver".into(),
        ));
    }
    Ok(())
}

/// Token-authorized variant of the approver guard; the message names the
/// form because the caller arrives from an email link without context.
pub fn ensure_selected_approver_for_form(
    form: &form::Model,
    acting_user: i64,
) -> Result<(), ServiceError> {
    if form.request_approval_to != acting_user {
        return Err(ServiceError::Forbidden(format!(
            "Forbidden - You are not the selected approver for form {}",
            form.number
        )));
    }
    Ok(())
}

pub fn ensure_cancellation_pending(form: &form::Model) -> Result<(), ServiceError> {
    if form.cancellation_status != Some(form::CANCELLATION_PENDING) {
        return Err(ServiceError::Conflict(
            "form not requested to be delete".into(),
        ));
    }
    Ok(())
}

pub fn ensure_cancellation_approver(
    form: &form::Model,
    acting_user: i64,
) -> Result<(), ServiceError> {
    if form.request_cancellation_to != Some(acting_user) {
        return Err(ServiceError::Forbidden(
            "Forbidden - You are not the selected approver".into(),
        ));
    }
    Ok(())
}

pub async fn approve<C: ConnectionTrait>(
    conn: &C,
    form_row: form::Model,
    acting_user: i64,
) -> Result<form::Model, ServiceError> {
    ensure_pending_approval(&form_row)?;
    ensure_selected_approver(&form_row, acting_user)?;

    let mut active = form_row.into_active_model();
    active.approval_status = Set(form::APPROVAL_APPROVED);
    active.approval_by = Set(Some(acting_user));
    active.approval_at = Set(Some(Utc::now()));
    active.updated_by = Set(acting_user);
    Ok(active.update(conn).await?)
}

/// Rejection stamps shared by the in-app and token-authorized paths. Guards
/// are the caller's responsibility (the two paths differ only in the
/// forbidden message).
pub async fn apply_rejection<C: ConnectionTrait>(
    conn: &C,
    form_row: form::Model,
    acting_user: i64,
    reason: &str,
) -> Result<form::Model, ServiceError> {
    let mut active = form_row.into_active_model();
    active.approval_status = Set(form::APPROVAL_REJECTED);
    active.approval_by = Set(Some(acting_user));
    active.approval_at = Set(Some(Utc::now()));
    active.approval_reason = Set(Some(reason.to_string()));
    active.updated_by = Set(acting_user);
    Ok(active.update(conn).await?)
}

pub async fn reject<C: ConnectionTrait>(
    conn: &C,
    form_row: form::Model,
    acting_user: i64,
    reason: &str,
) -> Result<form::Model, ServiceError> {
    ensure_pending_approval(&form_row)?;
    ensure_selected_approver(&form_row, acting_user)?;
    apply_rejection(conn, form_row, acting_user, reason).await
}

/// Cancellation can only be requested on an approved form.
pub async fn request_cancellation<C: ConnectionTrait>(
    conn: &C,
    form_row: form::Model,
    acting_user: i64,
    request_cancellation_to: i64,
    reason: &str,
) -> Result<form::Model, ServiceError> {
    if form_row.approval_status != form::APPROVAL_APPROVED {
        return Err(ServiceError::Conflict(format!(
            "form {} is not approved",
            form_row.number
        )));
    }

    let mut active = form_row.into_active_model();
    active.cancellation_status = Set(Some(form::CANCELLATION_PENDING));
    active.request_cancellation_to = Set(Some(request_cancellation_to));
    active.request_cancellation_by = Set(Some(acting_user));
    active.request_cancellation_at = Set(Some(Utc::now()));
    active.request_cancellation_reason = Set(Some(reason.to_string()));
    active.updated_by = Set(acting_user);
    Ok(active.update(conn).await?)
}

pub async fn approve_cancellation<C: ConnectionTrait>(
    conn: &C,
    form_row: form::Model,
    acting_user: i64,
) -> Result<form::Model, ServiceError> {
    ensure_cancellation_pending(&form_row)?;
    ensure_cancellation_approver(&form_row, acting_user)?;

    let mut active = form_row.into_active_model();
    active.cancellation_status = Set(Some(form::CANCELLATION_APPROVED));
    active.cancellation_approval_by = Set(Some(acting_user));
    active.cancellation_approval_at = Set(Some(Utc::now()));
    active.updated_by = Set(acting_user);
    Ok(active.update(conn).await?)
}

/// Rejecting a cancellation leaves the form approved and balances untouched.
pub async fn reject_cancellation<C: ConnectionTrait>(
    conn: &C,
    form_row: form::Model,
    acting_user: i64,
    reason: &str,
) -> Result<form::Model, ServiceError> {
    ensure_cancellation_pending(&form_row)?;
    ensure_cancellation_approver(&form_row, acting_user)?;

    let mut active = form_row.into_active_model();
    active.cancellation_status = Set(Some(form::CANCELLATION_REJECTED));
    active.cancellation_approval_by = Set(Some(acting_user));
    active.cancellation_approval_at = Set(Some(Utc::now()));
    active.cancellation_approval_reason = Set(Some(reason.to_string()));
    active.updated_by = Set(acting_user);
    Ok(active.update(conn).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn pending_form() -> form::Model {
        form::Model {
            id: 1,
            branch_id: 1,
            formable_id: 10,
            formable_type: form::FORMABLE_PURCHASE_PAYMENT_ORDER.to_string(),
            number: "PP2212001".to_string(),
            edited_number: None,
            edited_notes: None,
            date: Utc::now(),
            notes: None,
            created_by: 1,
            updated_by: 1,
            done: false,
            increment_number: 1,
            increment_group: 202212,
            request_approval_to: 2,
            approval_by: None,
            approval_at: None,
            approval_reason: None,
            approval_status: form::APPROVAL_PENDING,
            request_cancellation_to: None,
            request_cancellation_by: None,
            request_cancellation_at: None,
            request_cancellation_reason: None,
            cancellation_approval_at: None,
            cancellation_approval_by: None,
            cancellation_approval_reason: None,
            cancellation_status: None,
        }
    }

    #[test]
    fn pending_guard_rejects_processed_forms() {
        let mut form_row = pending_form();
        assert!(ensure_pending_approval(&form_row).is_ok());

        form_row.approval_status = form::APPROVAL_APPROVED;
        let err = ensure_pending_approval(&form_row).unwrap_err();
        assert_eq!(err.to_string(), "Form already approved");

        form_row.approval_status = form::APPROVAL_REJECTED;
        let err = ensure_pending_approval(&form_row).unwrap_err();
        assert_eq!(err.to_string(), "Form already rejected");
    }

    #[test]
    fn approver_guard_names_the_form_in_token_flow() {
        let form_row = pending_form();
        assert!(ensure_selected_approver(&form_row, 2).is_ok());

        let err = ensure_selected_approver(&form_row, 3).unwrap_err();
        assert_eq!(err.to_string(), "Forbidden - You are not the selected approver");

        let err = ensure_selected_approver_for_form(&form_row, 3).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Forbidden - You are not the selected approver for form PP2212001"
        );
    }

    #[test]
    fn cancellation_guard_requires_a_pending_request() {
        let mut form_row = pending_form();
        let err = ensure_cancellation_pending(&form_row).unwrap_err();
        assert_eq!(err.to_string(), "form not requested to be delete");

        form_row.cancellation_status = Some(form::CANCELLATION_PENDING);
        form_row.request_cancellation_to = Some(2);
        assert!(ensure_cancellation_pending(&form_row).is_ok());
        assert!(ensure_cancellation_approver(&form_row, 2).is_ok());
        assert!(ensure_cancellation_approver(&form_row, 9).is_err());
    }
}
