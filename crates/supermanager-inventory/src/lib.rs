//! SuperManager Inventory - Catalogs, locations, devices and notifications
//!
//! This crate provides:
//! - Request payloads and response representations for every inventory resource
//! - CRUD services with the core-record guard, filters and ordering
//! - The cached settings singletons

pub mod model;
pub mod service;

pub use model::*;
pub use service::settings::SettingsService;
