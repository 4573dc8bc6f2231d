//! Input validation helpers shared by the request payloads

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer};
use validator::ValidationError;

use crate::error::FieldErrors;

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";
pub const INVALID_EMAIL: &str = "Enter a valid email address.";

/// Maximum length of `title` on every catalog table
pub const TITLE_MAX_LENGTH: usize = 200;
pub const CODE_NAME_MAX_LENGTH: usize = 50;
pub const TEXT_FIELD_MAX_LENGTH: usize = 200;
pub const ZIP_CODE_MAX_LENGTH: usize = 12;
pub const VERSION_MAX_LENGTH: usize = 100;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("Invalid regex pattern")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// `validator` custom check used by `#[validate(custom(function = ...))]`
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(ValidationError::new("email").with_message(INVALID_EMAIL.into()))
    }
}

pub fn max_length_message(max: usize) -> String {
    format!("Ensure this field has no more than {} characters.", max)
}

pub fn min_length_message(min: usize) -> String {
    format!("Ensure this field has at least {} characters.", min)
}

/// Human readable text for a `validator` error
pub fn describe(error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }

    let param = |name: &str| {
        error
            .params
            .get(name)
            .and_then(|v| v.as_u64())
            .map(|v| v as usize)
    };

    match error.code.as_ref() {
        "length" => match (param("min"), param("max")) {
            (Some(min), Some(max)) => {
                format!("Ensure this field has between {} and {} characters.", min, max)
            }
            (Some(min), None) => min_length_message(min),
            (None, Some(max)) => max_length_message(max),
            (None, None) => "Invalid length.".to_string(),
        },
        "email" => INVALID_EMAIL.to_string(),
        "required" => REQUIRED.to_string(),
        code => code.to_string(),
    }
}

/// Checks a required string: present, not blank, and within `max` characters
pub fn check_required(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
    max: usize,
) {
    match value {
        None => errors.add(field, REQUIRED),
        Some(v) if v.trim().is_empty() => errors.add(field, BLANK),
        Some(v) => check_max_length(errors, field, Some(v), max),
    }
}

pub fn check_max_length(errors: &mut FieldErrors, field: &str, value: Option<&str>, max: usize) {
    if let Some(v) = value
        && v.chars().count() > max
    {
        errors.add(field, max_length_message(max));
    }
}

pub fn check_length_range(
    errors: &mut FieldErrors,
    field: &str,
    value: &str,
    min: usize,
    max: usize,
) {
    let len = value.chars().count();
    if len < min {
        errors.add(field, min_length_message(min));
    } else if len > max {
        errors.add(field, max_length_message(max));
    }
}

/// Distinguishes an explicit `null` from an absent key.
///
/// Use with `#[serde(default, deserialize_with = "deserialize_some")]` on an
/// `Option<Option<T>>` field: absent is `None`, `null` is `Some(None)`.
pub fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("admin@example.com"));
        assert!(is_valid_email("first.last+tag@sub.example.org"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_check_required() {
        let mut errors = FieldErrors::new();
        check_required(&mut errors, "title", None, 10);
        check_required(&mut errors, "code_name", Some("   "), 10);
        check_required(&mut errors, "description", Some("much too long"), 5);
        check_required(&mut errors, "ok", Some("fine"), 5);

        assert_eq!(errors.get("title"), Some(&[REQUIRED.to_string()][..]));
        assert_eq!(errors.get("code_name"), Some(&[BLANK.to_string()][..]));
        assert!(errors.contains("description"));
        assert!(!errors.contains("ok"));
    }

    #[test]
    fn test_check_length_range() {
        let mut errors = FieldErrors::new();
        check_length_range(&mut errors, "username", "abc", 5, 20);
        check_length_range(&mut errors, "password", "abcdefgh", 8, 128);
        assert!(errors.contains("username"));
        assert!(!errors.contains("password"));
    }

    #[test]
    fn test_describe_length() {
        let mut error = ValidationError::new("length");
        error.add_param("min".into(), &5u64);
        error.add_param("max".into(), &20u64);
        assert_eq!(
            describe(&error),
            "Ensure this field has between 5 and 20 characters."
        );
    }

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "deserialize_some")]
        description: Option<Option<String>>,
    }

    #[test]
    fn test_deserialize_some() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.description, None);

        let null: Patch = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(null.description, Some(None));

        let set: Patch = serde_json::from_str(r#"{"description": "x"}"#).unwrap();
        assert_eq!(set.description, Some(Some("x".to_string())));
    }

    proptest::proptest! {
        #[test]
        fn prop_max_length_is_char_based(s in "\\PC{0,40}") {
            let mut errors = FieldErrors::new();
            check_max_length(&mut errors, "f", Some(&s), 20);
            proptest::prop_assert_eq!(errors.contains("f"), s.chars().count() > 20);
        }
    }
}
