//! SuperManager Common - Shared types and utilities
//!
//! This crate provides the foundational types used across all SuperManager components:
//! - Error types and error codes
//! - Field-level validation helpers
//! - Common constants

pub mod error;
pub mod validation;

// Re-exports for convenience
pub use error::{ErrorCode, FieldErrors, NON_FIELD_ERRORS, SuperManagerError};

/// Status assigned to every newly created record
pub const DEFAULT_STATUS: i32 = 1;

/// Deployment environments in which debugging aids (such as echoing reset links) are allowed
pub const DEVELOPMENT_ENVIRONMENTS: &[&str] = &["development", "testing"];

pub fn is_development_environment(environment: &str) -> bool {
    DEVELOPMENT_ENVIRONMENTS
        .iter()
        .any(|e| e.eq_ignore_ascii_case(environment.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_development_environment() {
        assert!(is_development_environment("development"));
        assert!(is_development_environment("Testing"));
        assert!(!is_development_environment("production"));
        assert!(!is_development_environment(""));
    }
}
