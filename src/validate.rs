//! Field validation.
//!
//! Rules run in a fixed priority order and the first failure wins:
//!
//! | # | Rule | Applies when | Message |
//! |---|------|--------------|---------|
//! | 1 | required | field is required | "This field is required" |
//! | 2 | email / tel / url | value non-empty | type-specific |
//! | 3 | minlength | value non-empty | "Must be at least N characters" |
//! | 4 | maxlength | value non-empty | "Must be no more than N characters" |
//! | 5 | pattern | value non-empty | custom message or "Invalid format" |
//!
//! The value is trimmed before any rule sees it. Validation never errors:
//! every input is either valid or invalid.

use crate::field::{FieldKind, FieldRules};
use regex::Regex;
use std::sync::LazyLock;

pub const REQUIRED_MESSAGE: &str = "This field is required";
pub const EMAIL_MESSAGE: &str = "Please enter a valid email address";
pub const PHONE_MESSAGE: &str = "Please enter a valid phone number";
pub const URL_MESSAGE: &str = "Please enter a valid URL";
pub const PATTERN_MESSAGE: &str = "Invalid format";

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

// Lenient: "----------" passes.
static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9\s\-()+.]{10,}$").expect("phone regex"));

/// Outcome of validating one value. Computed fresh on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    /// Empty when `valid`.
    pub message: String,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            message: String::new(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
        }
    }
}

/// Validate a raw field value against its rules.
pub fn validate_value(rules: &FieldRules, raw: &str) -> ValidationResult {
    let value = raw.trim();

    if value.is_empty() {
        return if rules.required {
            ValidationResult::fail(REQUIRED_MESSAGE)
        } else {
            ValidationResult::ok()
        };
    }

    let type_failure = match rules.kind {
        FieldKind::Email if !is_valid_email(value) => Some(EMAIL_MESSAGE),
        FieldKind::Tel if !is_valid_phone(value) => Some(PHONE_MESSAGE),
        FieldKind::Url if !is_valid_url(value) => Some(URL_MESSAGE),
        _ => None,
    };
    if let Some(message) = type_failure {
        return ValidationResult::fail(message);
    }

    let length = value.chars().count();
    if let Some(min) = rules.min_length.filter(|&min| length < min) {
        return ValidationResult::fail(format!("Must be at least {min} characters"));
    }
    if let Some(max) = rules.max_length.filter(|&max| length > max) {
        return ValidationResult::fail(format!("Must be no more than {max} characters"));
    }

    if let Some(pattern) = rules.pattern.as_ref().filter(|p| !p.is_match(value)) {
        return ValidationResult::fail(pattern.message().unwrap_or(PATTERN_MESSAGE));
    }

    ValidationResult::ok()
}

/// One `@`, at least one `.` after it, no whitespace.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

/// At least ten characters, all digits, whitespace, `-`, `(`, `)`, `+` or `.`.
pub fn is_valid_phone(value: &str) -> bool {
    PHONE.is_match(value)
}

/// Any absolute URL the WHATWG parser accepts.
pub fn is_valid_url(value: &str) -> bool {
    url::Url::parse(value).is_ok()
}
