pub mod allocation;
pub mod branch;
pub mod branch_user;
pub mod chart_of_account;
pub mod form;
pub mod form_sequence;
pub mod payment_order_detail;
pub mod purchase_down_payment;
pub mod purchase_invoice;
pub mod purchase_payment_order;
pub mod purchase_return;
pub mod setting_journal;
pub mod supplier;
pub mod user;
pub mod user_activity;
