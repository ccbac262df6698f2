//! Shared test utilities for the brochure-ui test suite.
//!
//! Provides a representative contact form and small lookup helpers so
//! module tests read as scenarios instead of setup.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let mut form = filled_contact_form();
//! form.input("email", "not-an-email");
//! form.validate();
//! assert_eq!(field_error(&form, "email"), Some(EMAIL_MESSAGE));
//! ```

use crate::field::{FieldKind, FieldRules};
use crate::form::{FieldState, FormState};

// =========================================================================
// Fixtures
// =========================================================================

pub const CONTACT_ACTION: &str = "https://forms.example.com/f/contact";

pub fn required_rules(kind: FieldKind) -> FieldRules {
    FieldRules {
        required: true,
        ..FieldRules::new(kind)
    }
}

/// Contact form with empty values: name (required), email (required),
/// phone (optional), message (required, min 10 chars).
pub fn contact_form() -> FormState {
    let mut form = FormState::new("contact", CONTACT_ACTION)
        .with_submit_label("Send Message")
        .with_field(FieldState::new("name", required_rules(FieldKind::Text)))
        .with_field(FieldState::new("email", required_rules(FieldKind::Email)))
        .with_field(FieldState::new("phone", FieldRules::new(FieldKind::Tel)))
        .with_field(FieldState::new(
            "message",
            FieldRules {
                min_length: Some(10),
                ..required_rules(FieldKind::Textarea)
            },
        ));
    form.ajax = true;
    form
}

/// [`contact_form`] with every field holding a valid value.
pub fn filled_contact_form() -> FormState {
    let mut form = contact_form();
    fill_contact_form(&mut form);
    form
}

/// Type valid values into every contact form field.
pub fn fill_contact_form(form: &mut FormState) {
    form.input("name", "Ada");
    form.input("email", "ada@example.org");
    form.input("phone", "+1 555 123 4567");
    form.input("message", "Please add me to the reading list.");
}

// =========================================================================
// Lookups: panic with a clear message on miss
// =========================================================================

/// Current error message of a field. Panics if the field does not exist.
pub fn field_error<'a>(form: &'a FormState, name: &str) -> Option<&'a str> {
    form.field(name)
        .unwrap_or_else(|| {
            let names: Vec<&str> = form.fields().iter().map(|f| f.name.as_str()).collect();
            panic!("field '{name}' not found. Available: {names:?}")
        })
        .error
        .as_deref()
}
