//! SuperManager Auth - Accounts and authentication
//!
//! This crate provides:
//! - JWT access/refresh token handling
//! - User and profile services
//! - Register, login and password flows
//! - Password reset tokens and SMTP mail

pub mod model;
pub mod service;

// Re-export commonly used types
pub use model::*;
