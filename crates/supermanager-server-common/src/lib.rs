// Shared server infrastructure for SuperManager
//
// Provides:
// - AppState (central application state)
// - Configuration (CLI args, config file and environment loading)
// - Response types (Detail, Paginated)
// - Error types (AppError, SuperManagerError re-exports)
// - Secured / secured! macro (auth guard)

pub mod error; // Error handling and types
pub mod model; // Data models and types
pub mod secured; // Security context and secured! macro

// Re-export model types for convenience
pub use model::{AppState, Configuration, Detail, Paginated};

// Re-export security types
pub use secured::{AccessLevel, Secured, SecuredBuilder};

pub use error::AppError;
