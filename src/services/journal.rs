//! Double-entry journal derivation and balance check.
//!
//! A payment order posts: debit accounts payable for the settled net
//! (invoices minus down payments minus returns), debit each "other" line on
//! a debit-polarity account, credit the cash/bank side for the grand total,
//! and credit each "other" line on a credit-polarity account. The order is
//! only allowed to exist when debits equal credits.

use crate::entities::{chart_of_account, setting_journal};
use crate::errors::ServiceError;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

pub const FEATURE_PURCHASE: &str = "purchase";
pub const ACCOUNT_PAYABLE: &str = "account payable";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalCheck {
    pub is_balance: bool,
    pub debit: Decimal,
    pub credit: Decimal,
}

/// A free-form "other" posting: the account decides the side, the amount is
/// always positive.
#[derive(Debug, Clone)]
pub struct OtherPosting {
    pub chart_of_account_id: i64,
    pub amount: Decimal,
}

/// The tenant must have mapped the feature to a ledger account; creating a
/// payment order without the accounts payable mapping is a hard failure.
pub async fn find_setting_journal<C: ConnectionTrait>(
    conn: &C,
    feature: &str,
    name: &str,
) -> Result<setting_journal::Model, ServiceError> {
    setting_journal::Entity::find()
        .filter(setting_journal::Column::Feature.eq(feature))
        .filter(setting_journal::Column::Name.eq(name))
        .one(conn)
        .await?
        .ok_or_else(|| {
            ServiceError::Conflict(format!("Journal {feature} account - {name} not found"))
        })
}

/// Derive the journal for the given totals and report whether it balances.
/// `is_balance == false` aborts order creation; it is never merely logged.
pub async fn check<C: ConnectionTrait>(
    conn: &C,
    amount: Decimal,
    invoice_total: Decimal,
    down_payment_total: Decimal,
    return_total: Decimal,
    others: &[OtherPosting],
) -> Result<JournalCheck, ServiceError> {
    find_setting_journal(conn, FEATURE_PURCHASE, ACCOUNT_PAYABLE).await?;

    let mut debit = invoice_total - down_payment_total - return_total;
    let mut credit = amount;

    for posting in others {
        let account = chart_of_account::Entity::find_by_id(posting.chart_of_account_id)
            .one(conn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "chart of account with id {} not exist",
                    posting.chart_of_account_id
                ))
            })?;
        if account.is_debit {
            debit += posting.amount;
        } else {
            credit += posting.amount;
        }
    }

    Ok(JournalCheck {
        is_balance: debit == credit,
        debit,
        credit,
    })
}
