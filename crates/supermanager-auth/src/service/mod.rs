//! Authentication service implementations

pub mod auth;
pub mod jwt;
pub mod mail;
pub mod password_reset;
pub mod profile;
pub mod user;
