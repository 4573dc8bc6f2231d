//! Error types and error codes for SuperManager
//!
//! This module defines:
//! - `SuperManagerError`: Application-specific error enum
//! - `FieldErrors`: Per-field validation messages rendered as `{"field": ["msg"]}`
//! - `ErrorCode`: Machine-readable codes paired with default messages

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Key used for errors that do not belong to a single field
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Application-specific error types
#[derive(thiserror::Error, Debug)]
pub enum SuperManagerError {
    #[error("{0}")]
    IllegalArgument(String),

    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Only superadmins can edit core {0}.")]
    CoreRecordProtected(String),

    #[error("Authentication credentials were not provided.")]
    NotAuthenticated,

    #[error("{0}")]
    AuthenticationFailed(String),

    #[error("{0}")]
    TokenNotValid(String),

    #[error("You do not have permission to perform this action.")]
    PermissionDenied,

    #[error("Not found.")]
    NotFound,

    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("mail error: {0}")]
    MailError(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl SuperManagerError {
    /// Shortcut for a validation error carrying a single field message
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        SuperManagerError::Validation(FieldErrors::single(field, message))
    }

    pub fn error_code(&self) -> ErrorCode<'static> {
        match self {
            SuperManagerError::IllegalArgument(_) | SuperManagerError::Validation(_) => INVALID,
            SuperManagerError::CoreRecordProtected(_) => CORE_RECORD_PROTECTED,
            SuperManagerError::NotAuthenticated => NOT_AUTHENTICATED,
            SuperManagerError::AuthenticationFailed(_) => AUTHENTICATION_FAILED,
            SuperManagerError::TokenNotValid(_) => TOKEN_NOT_VALID,
            SuperManagerError::PermissionDenied => PERMISSION_DENIED,
            SuperManagerError::NotFound => NOT_FOUND,
            SuperManagerError::DatabaseError(_) => DATA_ACCESS_ERROR,
            SuperManagerError::MailError(_) | SuperManagerError::InternalError(_) => SERVER_ERROR,
        }
    }
}

impl From<FieldErrors> for SuperManagerError {
    fn from(value: FieldErrors) -> Self {
        SuperManagerError::Validation(value)
    }
}

/// Validation messages keyed by field name
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(())` when no message was collected, otherwise a validation error
    pub fn into_result(self) -> Result<(), SuperManagerError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(SuperManagerError::Validation(self))
        }
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let parts = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
            .collect::<Vec<String>>();

        write!(f, "{}", parts.join("; "))
    }
}

impl From<&validator::ValidationErrors> for FieldErrors {
    fn from(value: &validator::ValidationErrors) -> Self {
        let mut errors = FieldErrors::new();

        for (field, field_errors) in value.field_errors() {
            for error in field_errors {
                errors.add(field.as_ref(), crate::validation::describe(error));
            }
        }

        errors
    }
}

/// Error code structure for API responses
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ErrorCode<'a> {
    pub code: &'a str,
    pub message: &'a str,
}

pub const INVALID: ErrorCode<'static> = ErrorCode {
    code: "invalid",
    message: "Invalid input.",
};

pub const CORE_RECORD_PROTECTED: ErrorCode<'static> = ErrorCode {
    code: "core_record_protected",
    message: "Only superadmins can edit core records.",
};

pub const NOT_AUTHENTICATED: ErrorCode<'static> = ErrorCode {
    code: "not_authenticated",
    message: "Authentication credentials were not provided.",
};

pub const AUTHENTICATION_FAILED: ErrorCode<'static> = ErrorCode {
    code: "authentication_failed",
    message: "Incorrect authentication credentials.",
};

pub const TOKEN_NOT_VALID: ErrorCode<'static> = ErrorCode {
    code: "token_not_valid",
    message: "Token is invalid.",
};

pub const PERMISSION_DENIED: ErrorCode<'static> = ErrorCode {
    code: "permission_denied",
    message: "You do not have permission to perform this action.",
};

pub const NOT_FOUND: ErrorCode<'static> = ErrorCode {
    code: "not_found",
    message: "Not found.",
};

pub const DATA_ACCESS_ERROR: ErrorCode<'static> = ErrorCode {
    code: "data_access_error",
    message: "A server error occurred.",
};

pub const SERVER_ERROR: ErrorCode<'static> = ErrorCode {
    code: "error",
    message: "A server error occurred.",
};

pub const PARSE_ERROR: ErrorCode<'static> = ErrorCode {
    code: "parse_error",
    message: "Malformed request.",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SuperManagerError::CoreRecordProtected("device types".to_string());
        assert_eq!(
            format!("{}", err),
            "Only superadmins can edit core device types."
        );

        let err = SuperManagerError::NotFound;
        assert_eq!(format!("{}", err), "Not found.");

        let err = SuperManagerError::DatabaseError("query failed".to_string());
        assert_eq!(format!("{}", err), "database error: query failed");
    }

    #[test]
    fn test_field_errors_collect() {
        let mut errors = FieldErrors::new();
        assert!(errors.is_empty());

        errors.add("title", "This field is required.");
        errors.add("title", "second");
        errors.add("code_name", "too long");

        assert!(errors.contains("title"));
        assert_eq!(errors.get("title").map(|m| m.len()), Some(2));
        assert!(errors.clone().into_result().is_err());

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["code_name"][0], "too long");
    }

    #[test]
    fn test_field_errors_merge() {
        let mut a = FieldErrors::single("username", "taken");
        a.merge(FieldErrors::single("username", "short"));
        a.merge(FieldErrors::single("email", "bad"));

        assert_eq!(a.get("username").map(|m| m.len()), Some(2));
        assert!(a.contains("email"));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(SuperManagerError::NotFound.error_code().code, "not_found");
        assert_eq!(
            SuperManagerError::TokenNotValid("expired".to_string())
                .error_code()
                .code,
            "token_not_valid"
        );
        assert_eq!(
            SuperManagerError::field("title", "x").error_code().code,
            "invalid"
        );
    }
}
