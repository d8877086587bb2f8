//! Approval-request dispatch.
//!
//! The dispatcher runs strictly after commit and is best-effort: a delivery
//! failure is logged and never unwinds the transaction that triggered it.
//! The real transport (email) lives outside this crate; the default
//! implementation just logs.

use crate::entities::form;
use crate::errors::ServiceError;
use async_trait::async_trait;
use tracing::info;

#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Ask `approver_id` to act on the given form. `token` is the signed
    /// capability embedded in the message for the out-of-band flow.
    async fn send_approval_request(
        &self,
        form: &form::Model,
        approver_id: i64,
        token: &str,
    ) -> Result<(), ServiceError>;
}

pub struct LoggingDispatcher;

#[async_trait]
impl NotificationDispatcher for LoggingDispatcher {
    async fn send_approval_request(
        &self,
        form: &form::Model,
        approver_id: i64,
        token: &str,
    ) -> Result<(), ServiceError> {
        info!(
            number = %form.number,
            approver_id,
            token_len = token.len(),
            "approval request notification"
        );
        Ok(())
    }
}
