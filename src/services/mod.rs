pub mod activity;
pub mod availability;
pub mod journal;
pub mod lifecycle;
pub mod notifications;
pub mod numbering;
pub mod payment_orders;
