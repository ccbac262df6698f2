//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml` files. Stock
//! defaults are overridden by the user's `config.toml` in the site root.
//! Forms are declared here instead of being discovered from markup, so every
//! field constraint is typed and checked once, at load time.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [messages]
//! success = "Thank you! Your message has been sent successfully."
//! failure = "Oops! Something went wrong. Please try again later."
//! sending = "Sending..."       # Submit button label while in flight
//!
//! [submission]
//! success_dismiss_ms = 5000    # Success banner lifetime
//! timeout_secs = 30            # HTTP request timeout
//!
//! [counter]
//! duration_ms = 2000           # Stat counter animation length
//! steps = 60                   # Frames per animation
//!
//! [[forms]]
//! id = "contact"
//! action = "https://formspree.io/f/xyzabc"
//! validate = true              # Validate on blur and submit
//! ajax = true                  # Submit in the background
//! submit_label = "Send Message"
//!
//! [[forms.fields]]
//! name = "email"
//! type = "email"               # text | email | tel | url | textarea | select
//! required = true
//! minlength = 5
//! maxlength = 120
//! pattern = "[a-z@.]+"
//! pattern_message = "Lowercase only"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::field::{FieldError, FieldKind, FieldRules};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Invalid field in form '{form}': {source}")]
    Field {
        form: String,
        #[source]
        source: FieldError,
    },
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// User-facing texts for submission feedback.
    pub messages: MessagesConfig,
    /// Network and banner timing.
    pub submission: SubmissionConfig,
    /// Stat counter animation timing.
    pub counter: CounterConfig,
    /// Forms on the site, in page order.
    pub forms: Vec<FormSpec>,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges and that every
    /// form compiles to typed field rules.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.counter.steps == 0 {
            return Err(ConfigError::Validation(
                "counter.steps must be non-zero".into(),
            ));
        }
        if self.counter.duration_ms == 0 {
            return Err(ConfigError::Validation(
                "counter.duration_ms must be non-zero".into(),
            ));
        }
        if self.submission.success_dismiss_ms == 0 {
            return Err(ConfigError::Validation(
                "submission.success_dismiss_ms must be non-zero".into(),
            ));
        }

        let mut form_ids = HashSet::new();
        for form in &self.forms {
            if !form_ids.insert(form.id.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate form id '{}'",
                    form.id
                )));
            }
            form.validate()?;
        }
        Ok(())
    }
}

/// Texts shown by the submission flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MessagesConfig {
    /// Acknowledgement in the success banner.
    pub success: String,
    /// Generic text in the error banner, whatever the cause.
    pub failure: String,
    /// Submit button label while a submission is in flight.
    pub sending: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            success: "Thank you! Your message has been sent successfully.".to_string(),
            failure: "Oops! Something went wrong. Please try again later.".to_string(),
            sending: "Sending...".to_string(),
        }
    }
}

/// Network and banner timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SubmissionConfig {
    /// Milliseconds before a success banner removes itself.
    pub success_dismiss_ms: u64,
    /// Request timeout for the form backend, in seconds.
    pub timeout_secs: u64,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            success_dismiss_ms: 5000,
            timeout_secs: 30,
        }
    }
}

/// Stat counter animation timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CounterConfig {
    /// Total animation length in milliseconds.
    pub duration_ms: u64,
    /// Number of frames; each frame advances by `target / steps`.
    pub steps: u32,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            duration_ms: 2000,
            steps: 60,
        }
    }
}

/// A form declared on the site.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormSpec {
    /// Unique id, used to look the form up on a [`Page`](crate::form::Page).
    pub id: String,
    /// Submission target. Must be an absolute URL for `ajax` forms.
    #[serde(default)]
    pub action: String,
    /// Validate fields on blur and on submit.
    #[serde(default = "default_true")]
    pub validate: bool,
    /// Submit in the background instead of navigating.
    #[serde(default)]
    pub ajax: bool,
    /// Label of the submit button when idle.
    #[serde(default = "default_submit_label")]
    pub submit_label: String,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

fn default_true() -> bool {
    true
}

fn default_submit_label() -> String {
    "Send Message".to_string()
}

impl FormSpec {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.ajax && url::Url::parse(&self.action).is_err() {
            return Err(ConfigError::Validation(format!(
                "form '{}' submits in the background but action '{}' is not an absolute URL",
                self.id, self.action
            )));
        }

        let mut names = HashSet::new();
        for field in &self.fields {
            if !names.insert(field.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate field '{}' in form '{}'",
                    field.name, self.id
                )));
            }
            FieldRules::from_spec(field).map_err(|source| ConfigError::Field {
                form: self.id.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

/// A form field, mirroring the HTML input attributes it stands for.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    pub name: String,
    /// Visible label. Falls back to the name when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minlength: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxlength: Option<usize>,
    /// Regular expression the whole trimmed value must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Message shown when `pattern` does not match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_message: Option<String>,
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely, so a
///   `[[forms]]` array in the overlay replaces the whole form list.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
///
/// Merging happens on raw TOML rather than on deserialized structs so an
/// overlay only has to name the keys it changes, at any depth: `[messages]`
/// with just `failure` keeps the other two texts. `#[serde(default)]` alone
/// would reset them to stock. The base need not be the stock defaults; a
/// resolved config serialized back with `toml::Value::try_from` works as a
/// base for a further layer, such as a per-deployment override.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
pub fn stock_config_toml() -> &'static str {
    r##"# Brochure UI Configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Submission feedback texts
# ---------------------------------------------------------------------------
[messages]
# Shown in the success banner after the backend accepts a submission.
success = "Thank you! Your message has been sent successfully."

# Shown in the error banner for any backend or network failure.
failure = "Oops! Something went wrong. Please try again later."

# Submit button label while a submission is in flight.
sending = "Sending..."

# ---------------------------------------------------------------------------
# Background submission
# ---------------------------------------------------------------------------
[submission]
# Milliseconds before the success banner removes itself.
# Error banners stay until the next submission.
success_dismiss_ms = 5000

# Request timeout for the form backend, in seconds.
timeout_secs = 30

# ---------------------------------------------------------------------------
# Stat counters
# ---------------------------------------------------------------------------
[counter]
# Total animation length in milliseconds.
duration_ms = 2000

# Number of frames per animation.
steps = 60

# ---------------------------------------------------------------------------
# Forms
# ---------------------------------------------------------------------------
# Declare one [[forms]] table per form, each with [[forms.fields]] entries.
#
# [[forms]]
# id = "contact"
# action = "https://formspree.io/f/your-form-id"
# validate = true
# ajax = true
# submit_label = "Send Message"
#
# [[forms.fields]]
# name = "email"
# label = "Email"
# type = "email"            # text | email | tel | url | textarea | select
# required = true
# minlength = 5
# maxlength = 120
# pattern = "[^@]+@example\\.org"
# pattern_message = "Use your example.org address"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CONTACT_FORM: &str = r#"
[[forms]]
id = "contact"
action = "https://formspree.io/f/abc"
ajax = true

[[forms.fields]]
name = "name"
required = true

[[forms.fields]]
name = "email"
type = "email"
required = true
"#;

    #[test]
    fn default_config_has_messages() {
        let config = SiteConfig::default();
        assert_eq!(
            config.messages.success,
            "Thank you! Your message has been sent successfully."
        );
        assert_eq!(
            config.messages.failure,
            "Oops! Something went wrong. Please try again later."
        );
        assert_eq!(config.messages.sending, "Sending...");
    }

    #[test]
    fn default_config_has_timings() {
        let config = SiteConfig::default();
        assert_eq!(config.submission.success_dismiss_ms, 5000);
        assert_eq!(config.submission.timeout_secs, 30);
        assert_eq!(config.counter.duration_ms, 2000);
        assert_eq!(config.counter.steps, 60);
        assert!(config.forms.is_empty());
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[messages]
sending = "Please wait..."
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.messages.sending, "Please wait...");
        // Default values preserved
        assert_eq!(config.messages.failure, MessagesConfig::default().failure);
        assert_eq!(config.submission.success_dismiss_ms, 5000);
    }

    #[test]
    fn parse_forms() {
        let config: SiteConfig = toml::from_str(CONTACT_FORM).unwrap();
        assert_eq!(config.forms.len(), 1);
        let form = &config.forms[0];
        assert_eq!(form.id, "contact");
        assert!(form.ajax);
        assert!(form.validate, "validate defaults to true");
        assert_eq!(form.submit_label, "Send Message");
        assert_eq!(form.fields[1].kind, FieldKind::Email);
        assert_eq!(form.fields[0].kind, FieldKind::Text);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unknown_field_type_is_text() {
        let toml = r#"
[[forms]]
id = "signup"

[[forms.fields]]
name = "age"
type = "number"
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.forms[0].fields[0].kind, FieldKind::Text);
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.counter.steps, 60);
        assert!(config.forms.is_empty());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), CONTACT_FORM).unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.forms[0].action, "https://formspree.io/f/abc");
        assert_eq!(config.messages.sending, "Sending...");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "this is not valid toml [[[").unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_rejects_bad_pattern() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[[forms]]
id = "contact"

[[forms.fields]]
name = "code"
pattern = "[a-z"
"#,
        )
        .unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Field { ref form, .. }) if form == "contact"));
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_table_merge() {
        let base = stock_defaults_value();
        let overlay: toml::Value = toml::from_str(
            r#"
[submission]
timeout_secs = 5
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let submission = merged.get("submission").unwrap();
        assert_eq!(submission.get("timeout_secs").unwrap().as_integer(), Some(5));
        // dismiss delay preserved from base
        assert_eq!(
            submission.get("success_dismiss_ms").unwrap().as_integer(),
            Some(5000)
        );
    }

    #[test]
    fn merge_toml_arrays_replace() {
        let base: toml::Value = toml::from_str(CONTACT_FORM).unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[[forms]]
id = "newsletter"
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let forms = merged.get("forms").unwrap().as_array().unwrap();
        assert_eq!(forms.len(), 1);
        assert_eq!(forms[0].get("id").unwrap().as_str(), Some("newsletter"));
    }

    #[test]
    fn resolved_config_takes_a_second_layer() {
        let site = resolve_config(
            stock_defaults_value(),
            Some(toml::from_str(CONTACT_FORM).unwrap()),
        )
        .unwrap();
        let deployment: toml::Value = toml::from_str(
            r#"
[messages]
failure = "Please call us instead."
"#,
        )
        .unwrap();

        let layered =
            resolve_config(toml::Value::try_from(&site).unwrap(), Some(deployment)).unwrap();

        assert_eq!(layered.messages.failure, "Please call us instead.");
        assert_eq!(layered.messages.success, site.messages.success);
        assert_eq!(layered.forms.len(), 1);
        assert_eq!(layered.forms[0].id, "contact");
        assert_eq!(layered.forms[0].fields.len(), site.forms[0].fields.len());
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let toml_str = r#"
[submission]
timeout = 5
"#;
        let result: Result<SiteConfig, _> = toml::from_str(toml_str);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_field_attribute_rejected() {
        let toml_str = r#"
[[forms]]
id = "contact"

[[forms.fields]]
name = "email"
min_length = 3
"#;
        let result: Result<SiteConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_zero_steps() {
        let mut config = SiteConfig::default();
        config.counter.steps = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("counter.steps"));
    }

    #[test]
    fn validate_zero_counter_duration() {
        let mut config = SiteConfig::default();
        config.counter.duration_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("counter.duration_ms"));
    }

    #[test]
    fn validate_zero_dismiss_delay() {
        let mut config = SiteConfig::default();
        config.submission.success_dismiss_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_duplicate_form_ids() {
        let mut config: SiteConfig = toml::from_str(CONTACT_FORM).unwrap();
        config.forms.push(config.forms[0].clone());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate form id"));
    }

    #[test]
    fn validate_duplicate_field_names() {
        let mut config: SiteConfig = toml::from_str(CONTACT_FORM).unwrap();
        let dup = config.forms[0].fields[0].clone();
        config.forms[0].fields.push(dup);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate field 'name'"));
    }

    #[test]
    fn validate_ajax_form_needs_absolute_action() {
        let mut config: SiteConfig = toml::from_str(CONTACT_FORM).unwrap();
        config.forms[0].action = "/contact".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        // Native forms may post to a relative path
        config.forms[0].ajax = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_min_above_max() {
        let mut config: SiteConfig = toml::from_str(CONTACT_FORM).unwrap();
        config.forms[0].fields[0].minlength = Some(10);
        config.forms[0].fields[0].maxlength = Some(5);
        assert!(matches!(config.validate(), Err(ConfigError::Field { .. })));
    }

    #[test]
    fn resolve_config_rejects_invalid_values() {
        let base = stock_defaults_value();
        let overlay: toml::Value = toml::from_str(
            r#"
[counter]
steps = 0
"#,
        )
        .unwrap();
        let result = resolve_config(base, Some(overlay));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config.messages.success, MessagesConfig::default().success);
        assert_eq!(config.submission.success_dismiss_ms, 5000);
        assert_eq!(config.counter.steps, 60);
        assert!(config.forms.is_empty());
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        assert!(content.contains("[messages]"));
        assert!(content.contains("[submission]"));
        assert!(content.contains("[counter]"));
        assert!(content.contains("[[forms]]"));
        assert!(content.contains("[[forms.fields]]"));
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value();
        assert!(val.get("messages").is_some());
        assert!(val.get("submission").is_some());
        assert!(val.get("counter").is_some());
    }
}
