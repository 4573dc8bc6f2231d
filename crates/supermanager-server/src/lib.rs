// SuperManager server library: HTTP handlers, middleware and startup
// Shared state, configuration and the auth guard live in supermanager-server-common

pub mod api; // API handlers
pub mod command; // CLI subcommands
pub mod middleware; // HTTP middleware
pub mod startup; // Application startup utilities

pub use supermanager_server_common::{AppError, AppState, Configuration, Secured, SecuredBuilder};

pub use supermanager_server_common::secured;
