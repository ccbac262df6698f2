//! Typed field rules.
//!
//! Every constraint the page templates express as input attributes
//! (`required`, `type`, `minlength`, `maxlength`, `pattern`,
//! `data-pattern-message`) becomes a field of [`FieldRules`], built once when
//! the form is registered. Construction is the only place that can fail: a
//! malformed length or regular expression is rejected here, so validating a
//! value later is infallible.
//!
//! ```text
//! FieldSpec (config.toml) ─┐
//!                          ├─→ FieldRules ─→ validate::validate_value
//! attribute map (markup) ──┘
//! ```

use crate::config::FieldSpec;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FieldError {
    #[error("field '{name}': invalid pattern: {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },
    #[error("field '{name}': {attribute} must be a non-negative integer, got '{value}'")]
    InvalidLength {
        name: String,
        attribute: &'static str,
        value: String,
    },
    #[error("field '{name}': minlength {min} exceeds maxlength {max}")]
    LengthRange { name: String, min: usize, max: usize },
}

/// Declared input type. Only `email`, `tel` and `url` carry a type rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Email,
    Tel,
    Url,
    Textarea,
    Select,
    #[default]
    #[serde(other)]
    Text,
}

impl FieldKind {
    /// Parse an HTML `type` attribute. Unrecognised types behave as text.
    pub fn from_attribute(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "email" => Self::Email,
            "tel" => Self::Tel,
            "url" => Self::Url,
            "textarea" => Self::Textarea,
            "select" => Self::Select,
            _ => Self::Text,
        }
    }

    /// The `type` attribute value rendered on an `<input>`.
    pub fn input_type(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Tel => "tel",
            Self::Url => "url",
            Self::Text | Self::Textarea | Self::Select => "text",
        }
    }
}

/// A compiled `pattern` constraint with its optional custom message.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
    message: Option<String>,
}

impl Pattern {
    /// Compile `source` so that it must match the whole value.
    pub fn new(source: &str, message: Option<String>) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{source})$"))?;
        Ok(Self {
            source: source.to_string(),
            regex,
            message,
        })
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }

    /// The pattern as written, without the anchoring.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// Constraints for one field, in the order the validator applies them.
#[derive(Debug, Clone, Default)]
pub struct FieldRules {
    pub kind: FieldKind,
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Pattern>,
}

impl FieldRules {
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Build rules from a configured field.
    pub fn from_spec(spec: &FieldSpec) -> Result<Self, FieldError> {
        let pattern = spec
            .pattern
            .as_deref()
            .map(|source| {
                Pattern::new(source, spec.pattern_message.clone()).map_err(|source| {
                    FieldError::InvalidPattern {
                        name: spec.name.clone(),
                        source,
                    }
                })
            })
            .transpose()?;

        let rules = Self {
            kind: spec.kind,
            required: spec.required,
            min_length: spec.minlength,
            max_length: spec.maxlength,
            pattern,
        };
        rules.check_range(&spec.name)?;
        Ok(rules)
    }

    /// Build rules from raw markup attributes.
    ///
    /// `required` is a boolean attribute: its presence is enough, whatever
    /// the value. An empty `pattern` or `data-pattern-message` is ignored.
    pub fn from_attributes(
        name: &str,
        attributes: &BTreeMap<String, String>,
    ) -> Result<Self, FieldError> {
        let kind = attributes
            .get("type")
            .map(|t| FieldKind::from_attribute(t))
            .unwrap_or_default();
        let message = attributes
            .get("data-pattern-message")
            .filter(|m| !m.is_empty())
            .cloned();
        let pattern = attributes
            .get("pattern")
            .filter(|p| !p.is_empty())
            .map(|source| {
                Pattern::new(source, message).map_err(|source| FieldError::InvalidPattern {
                    name: name.to_string(),
                    source,
                })
            })
            .transpose()?;

        let rules = Self {
            kind,
            required: attributes.contains_key("required"),
            min_length: parse_length(name, "minlength", attributes)?,
            max_length: parse_length(name, "maxlength", attributes)?,
            pattern,
        };
        rules.check_range(name)?;
        Ok(rules)
    }

    fn check_range(&self, name: &str) -> Result<(), FieldError> {
        match (self.min_length, self.max_length) {
            (Some(min), Some(max)) if min > max => Err(FieldError::LengthRange {
                name: name.to_string(),
                min,
                max,
            }),
            _ => Ok(()),
        }
    }
}

fn parse_length(
    name: &str,
    attribute: &'static str,
    attributes: &BTreeMap<String, String>,
) -> Result<Option<usize>, FieldError> {
    let Some(raw) = attributes.get(attribute) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<usize>()
        .map(Some)
        .map_err(|_| FieldError::InvalidLength {
            name: name.to_string(),
            attribute,
            value: raw.clone(),
        })
}
