//! SuperManager Persistence - Database entities and query helpers
//!
//! This crate provides:
//! - SeaORM entity definitions for every inventory table
//! - Limit/offset paging and ordering types
//! - Declarative query-parameter filtering

pub mod entity;
pub mod model;
pub mod query;

// Re-export sea-orm for convenience
pub use sea_orm;

// Re-export entity prelude
pub use entity::prelude::*;
pub use entity::{Audited, Titled};

// Re-export model types
pub use model::{OrderingTerm, Page, PageRequest, parse_ordering};
pub use query::{FilterField, FilterKind};
