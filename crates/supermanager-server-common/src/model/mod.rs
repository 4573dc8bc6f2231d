//! Data models module
//!
//! Shared configuration, state and response types used by the server crate.

pub mod app_state;
pub mod config;
pub mod constants;
pub mod response;

// Re-export commonly used types at the module level
pub use app_state::AppState;
pub use config::{Cli, Command, Configuration};
pub use constants::*;
pub use response::{Detail, Paginated};
