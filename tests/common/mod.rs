#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use payables_api::config::AppConfig;
use payables_api::entities::{
    allocation, branch, branch_user, chart_of_account, form, purchase_down_payment,
    purchase_invoice, purchase_return, setting_journal, supplier, user, user_activity,
};
use payables_api::events::Event;
use payables_api::services::payment_orders::{
    CreatePaymentOrderRequest, OtherLine, ReferenceLine,
};
use payables_api::AppState;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, Set,
};
use tokio::sync::mpsc;

pub const SECRET: &str = "test_secret_key_for_testing_purposes_only_32chars";

/// Wired-up application state over in-memory sqlite, seeded with the
/// standing data every scenario needs: a maker with a default branch, an
/// approver, a supplier, ledger accounts with the purchase journal mapping,
/// and one approved invoice / down payment / return to settle against.
pub struct TestContext {
    pub state: AppState,
    pub events: mpsc::Receiver<Event>,
    pub maker: user::Model,
    pub approver: user::Model,
    pub branch: branch::Model,
    pub supplier: supplier::Model,
    pub allocation: allocation::Model,
    pub expense_account: chart_of_account::Model,
    pub income_account: chart_of_account::Model,
    pub invoice: purchase_invoice::Model,
    pub down_payment: purchase_down_payment::Model,
    pub purchase_return: purchase_return::Model,
}

impl TestContext {
    pub async fn setup() -> Self {
        // A single pooled connection keeps the in-memory database alive for
        // the whole test.
        let mut config = AppConfig::new(
            "sqlite::memory:".to_string(),
            SECRET.to_string(),
            3600,
            "test".to_string(),
        );
        config.auto_migrate = true;
        config.db_max_connections = 1;
        config.db_min_connections = 1;

        let (state, events) = AppState::initialize(config).await.expect("initialize state");
        let db = &*state.db;

        let maker = insert_user(db, "John Maker", "maker@example.com").await;
        let approver = insert_user(db, "Jane Approver", "approver@example.com").await;

        let branch_row = branch::ActiveModel {
            id: NotSet,
            name: Set("Head Office".to_string()),
        }
        .insert(db)
        .await
        .expect("insert branch");
        branch_user::ActiveModel {
            id: NotSet,
            user_id: Set(maker.id),
            branch_id: Set(branch_row.id),
            is_default: Set(true),
        }
        .insert(db)
        .await
        .expect("insert branch user");

        let supplier_row = supplier::ActiveModel {
            id: NotSet,
            name: Set("Supplier One".to_string()),
        }
        .insert(db)
        .await
        .expect("insert supplier");

        let allocation_row = allocation::ActiveModel {
            id: NotSet,
            branch_id: Set(branch_row.id),
            name: Set("General".to_string()),
        }
        .insert(db)
        .await
        .expect("insert allocation");

        let payable = insert_account(db, "account payable", false).await;
        let expense_account = insert_account(db, "other expense", true).await;
        let income_account = insert_account(db, "other income", false).await;
        setting_journal::ActiveModel {
            id: NotSet,
            feature: Set("purchase".to_string()),
            name: Set("account payable".to_string()),
            description: Set(Some("account payable".to_string())),
            chart_of_account_id: Set(payable.id),
        }
        .insert(db)
        .await
        .expect("insert setting journal");

        let invoice = purchase_invoice::ActiveModel {
            id: NotSet,
            supplier_id: Set(supplier_row.id),
            amount: Set(dec!(220000)),
            created_at: Set(Utc::now()),
        }
        .insert(db)
        .await
        .expect("insert invoice");
        insert_approved_form(
            db,
            form::FORMABLE_PURCHASE_INVOICE,
            invoice.id,
            "PI2211001",
            branch_row.id,
            maker.id,
            approver.id,
        )
        .await;

        let down_payment = purchase_down_payment::ActiveModel {
            id: NotSet,
            supplier_id: Set(supplier_row.id),
            amount: Set(dec!(30000)),
            created_at: Set(Utc::now()),
        }
        .insert(db)
        .await
        .expect("insert down payment");
        insert_approved_form(
            db,
            form::FORMABLE_PURCHASE_DOWN_PAYMENT,
            down_payment.id,
            "PDP2211001",
            branch_row.id,
            maker.id,
            approver.id,
        )
        .await;

        let purchase_return = purchase_return::ActiveModel {
            id: NotSet,
            supplier_id: Set(supplier_row.id),
            amount: Set(dec!(11000)),
            created_at: Set(Utc::now()),
        }
        .insert(db)
        .await
        .expect("insert return");
        insert_approved_form(
            db,
            form::FORMABLE_PURCHASE_RETURN,
            purchase_return.id,
            "PR2211001",
            branch_row.id,
            maker.id,
            approver.id,
        )
        .await;

        Self {
            state,
            events,
            maker,
            approver,
            branch: branch_row,
            supplier: supplier_row,
            allocation: allocation_row,
            expense_account,
            income_account,
            invoice,
            down_payment,
            purchase_return,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.state.db
    }

    /// Maker input settling part of each seeded document: invoice 100000,
    /// down payment 20000, return 10000, other expense 5000, other income
    /// 10000, grand total 65000, dated 2022-12-03.
    pub fn base_request(&self) -> CreatePaymentOrderRequest {
        CreatePaymentOrderRequest {
            payment_type: "cash".to_string(),
            supplier_id: self.supplier.id,
            date: Utc.with_ymd_and_hms(2022, 12, 3, 0, 0, 0).unwrap(),
            request_approval_to: self.approver.id,
            invoices: vec![ReferenceLine {
                id: self.invoice.id,
                amount: dec!(100000),
            }],
            down_payments: vec![ReferenceLine {
                id: self.down_payment.id,
                amount: dec!(20000),
            }],
            returns: vec![ReferenceLine {
                id: self.purchase_return.id,
                amount: dec!(10000),
            }],
            others: vec![
                OtherLine {
                    coa_id: self.expense_account.id,
                    allocation_id: self.allocation.id,
                    amount: dec!(5000),
                    notes: Some("bank charge".to_string()),
                },
                OtherLine {
                    coa_id: self.income_account.id,
                    allocation_id: self.allocation.id,
                    amount: dec!(10000),
                    notes: None,
                },
            ],
            total_invoice_amount: dec!(100000),
            total_down_payment_amount: dec!(20000),
            total_return_amount: dec!(10000),
            total_other_amount: dec!(-5000),
            total_amount: dec!(65000),
            notes: Some("example form note".to_string()),
        }
    }

    /// Maker input settling all three seeded documents in full: 220000 minus
    /// 30000 minus 11000 minus 5000 net other, grand total 174000.
    pub fn full_settlement_request(&self) -> CreatePaymentOrderRequest {
        let mut request = self.base_request();
        request.invoices[0].amount = dec!(220000);
        request.down_payments[0].amount = dec!(30000);
        request.returns[0].amount = dec!(11000);
        request.total_invoice_amount = dec!(220000);
        request.total_down_payment_amount = dec!(30000);
        request.total_return_amount = dec!(11000);
        request.total_amount = dec!(174000);
        request
    }

    /// Insert an extra approved invoice with its own form, for scenarios
    /// that need a dedicated balance.
    pub async fn insert_extra_invoice(&self, number: &str, amount: Decimal) -> purchase_invoice::Model {
        let invoice = purchase_invoice::ActiveModel {
            id: NotSet,
            supplier_id: Set(self.supplier.id),
            amount: Set(amount),
            created_at: Set(Utc::now()),
        }
        .insert(self.db())
        .await
        .expect("insert invoice");
        insert_approved_form(
            self.db(),
            form::FORMABLE_PURCHASE_INVOICE,
            invoice.id,
            number,
            self.branch.id,
            self.maker.id,
            self.approver.id,
        )
        .await;
        invoice
    }
}

pub async fn insert_user(db: &DatabaseConnection, name: &str, email: &str) -> user::Model {
    user::ActiveModel {
        id: NotSet,
        name: Set(name.to_string()),
        email: Set(email.to_string()),
    }
    .insert(db)
    .await
    .expect("insert user")
}

pub async fn insert_account(db: &DatabaseConnection, name: &str, is_debit: bool) -> chart_of_account::Model {
    chart_of_account::ActiveModel {
        id: NotSet,
        name: Set(name.to_string()),
        is_debit: Set(is_debit),
    }
    .insert(db)
    .await
    .expect("insert account")
}

async fn insert_approved_form(
    db: &DatabaseConnection,
    formable_type: &str,
    formable_id: i64,
    number: &str,
    branch_id: i64,
    maker_id: i64,
    approver_id: i64,
) -> form::Model {
    form::ActiveModel {
        id: NotSet,
        branch_id: Set(branch_id),
        formable_id: Set(formable_id),
        formable_type: Set(formable_type.to_string()),
        number: Set(number.to_string()),
        edited_number: Set(None),
        edited_notes: Set(None),
        date: Set(Utc::now()),
        notes: Set(None),
        created_by: Set(maker_id),
        updated_by: Set(maker_id),
        done: Set(false),
        increment_number: Set(1),
        increment_group: Set(202211),
        request_approval_to: Set(approver_id),
        approval_by: Set(Some(approver_id)),
        approval_at: Set(Some(Utc::now())),
        approval_reason: Set(None),
        approval_status: Set(form::APPROVAL_APPROVED),
        request_cancellation_to: Set(None),
        request_cancellation_by: Set(None),
        request_cancellation_at: Set(None),
        request_cancellation_reason: Set(None),
        cancellation_approval_at: Set(None),
        cancellation_approval_by: Set(None),
        cancellation_approval_reason: Set(None),
        cancellation_status: Set(None),
    }
    .insert(db)
    .await
    .expect("insert form")
}

/// The form envelope owned by a document.
pub async fn form_of(db: &DatabaseConnection, formable_type: &str, formable_id: i64) -> form::Model {
    form::Entity::find()
        .filter(form::Column::FormableType.eq(formable_type))
        .filter(form::Column::FormableId.eq(formable_id))
        .one(db)
        .await
        .expect("query form")
        .expect("form exists")
}

/// Whether an activity with the given description was recorded under the
/// given form number.
pub async fn has_activity(db: &DatabaseConnection, number: &str, activity: &str) -> bool {
    user_activity::Entity::find()
        .filter(user_activity::Column::Number.eq(number))
        .filter(user_activity::Column::Activity.eq(activity))
        .one(db)
        .await
        .expect("query activity")
        .is_some()
}
