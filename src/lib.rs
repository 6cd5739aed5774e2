//! Logistics tracking library
//!
//! Shipment lifecycle with audited status tracking, per-warehouse inventory,
//! the directory of customers, warehouses, routes, drivers and vehicles, and
//! user accounts, all persisted through sea-orm.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod commands;
pub mod common;
pub mod config;
pub mod db;
pub mod errors;
pub mod events;
pub mod models;
pub mod queries;
pub mod seed;
pub mod services;

use crate::{
    config::AppConfig,
    db::DbPool,
    events::EventSender,
    services::{DirectoryService, InventoryService, ShipmentService, UserService},
};
use std::sync::Arc;

/// Services wired to one pool and one event channel
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: AppConfig,
    pub event_sender: Arc<EventSender>,
    pub shipments: ShipmentService,
    pub inventory: InventoryService,
    pub directory: DirectoryService,
    pub users: UserService,
}

impl AppState {
    pub fn new(db: Arc<DbPool>, config: AppConfig, event_sender: Arc<EventSender>) -> Self {
        let retry = config.retry_config();
        Self {
            shipments: ShipmentService::new(db.clone(), event_sender.clone())
                .with_retry_config(retry.clone()),
            inventory: InventoryService::new(db.clone(), event_sender.clone())
                .with_retry_config(retry),
            directory: DirectoryService::new(db.clone()),
            users: UserService::new(db.clone(), event_sender.clone()),
            db,
            config,
            event_sender,
        }
    }
}

pub mod prelude {
    pub use crate::commands::Command;
    pub use crate::common::*;
    pub use crate::db::{DbPool, RetryConfig};
    pub use crate::errors::*;
    pub use crate::events::{Event, EventSender};
    pub use crate::models::{ShipmentStatus, UserRole};
    pub use crate::queries::status_history::{StatusEvent, StatusHistory};
    pub use crate::services::*;
    pub use crate::AppState;
}
