//! Purchasing payment order core.
//!
//! A payment order settles approved purchase documents (invoices, down
//! payments, returns) for a supplier. This crate owns the aggregate: input
//! validation and totals reconciliation, available-balance accounting on the
//! referenced documents, form numbering, the approval/cancellation state
//! machine, the double-entry journal gate, and the activity trail. A thin
//! HTTP layer is expected to sit on top; `ServiceError` already maps to
//! response statuses for it.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod logging;
pub mod services;

use crate::auth::ApprovalTokenService;
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::notifications::{LoggingDispatcher, NotificationDispatcher};
use crate::services::payment_orders::PaymentOrderService;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Wired-up application state: one shared pool, one event channel, the
/// payment order service on top.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: Arc<AppConfig>,
    pub event_sender: Arc<EventSender>,
    pub payment_orders: PaymentOrderService,
}

impl AppState {
    /// Connect to the database and assemble the services. Returns the state
    /// together with the event channel's receiving end; the caller decides
    /// where to drain it (usually `events::process_events`).
    pub async fn initialize(config: AppConfig) -> Result<(Self, mpsc::Receiver<Event>), ServiceError> {
        Self::initialize_with_dispatcher(config, Arc::new(LoggingDispatcher)).await
    }

    pub async fn initialize_with_dispatcher(
        config: AppConfig,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Result<(Self, mpsc::Receiver<Event>), ServiceError> {
        let db = Arc::new(db::connect(&config).await?);
        let (tx, rx) = mpsc::channel(1024);
        let event_sender = Arc::new(EventSender::new(tx));

        let tokens = ApprovalTokenService::new(&config.jwt_secret, config.token_expiry_secs);
        let payment_orders = PaymentOrderService::new(
            db.clone(),
            event_sender.clone(),
            tokens,
            dispatcher,
            config.payment_order_prefix.clone(),
        );

        let state = Self {
            db,
            config: Arc::new(config),
            event_sender,
            payment_orders,
        };
        Ok((state, rx))
    }
}
