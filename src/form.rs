//! Per-form state.
//!
//! A [`FormState`] is the single source of truth for one form: field values,
//! their error indicators, the submit control, and the current banner. The
//! HTML produced by [`render`](crate::render) is a pure projection of it, so
//! everything here can be exercised without a browser.
//!
//! ## Submit control
//!
//! ```text
//!          begin_submit (all fields valid)
//!   Idle ───────────────────────────────────→ Submitting
//!    ↑                                            │
//!    └──────── finish_submit (success or failure) ┘
//! ```
//!
//! `Submitting` can only be entered through [`FormState::begin_submit`], which
//! hands out the [`SubmitTicket`] that [`FormState::finish_submit`] consumes.
//! Finishing, or [`FormState::abort_submit`] when the request is abandoned,
//! restores the control, so no path leaves it disabled.

use crate::banner::{Banner, BannerId, BannerKind};
use crate::config::{ConfigError, FieldSpec, FormSpec, MessagesConfig, SiteConfig};
use crate::field::{FieldError, FieldKind, FieldRules};
use crate::validate::{ValidationResult, validate_value};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// One field and its live indicator state.
#[derive(Debug, Clone)]
pub struct FieldState {
    pub name: String,
    pub label: String,
    pub rules: FieldRules,
    pub value: String,
    /// Message of the most recent failed validation; `None` when the field
    /// shows no error.
    pub error: Option<String>,
}

impl FieldState {
    pub fn new(name: impl Into<String>, rules: FieldRules) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            rules,
            value: String::new(),
            error: None,
        }
    }

    pub fn from_spec(spec: &FieldSpec) -> Result<Self, FieldError> {
        let mut field = Self::new(spec.name.clone(), FieldRules::from_spec(spec)?);
        if let Some(label) = &spec.label {
            field.label = label.clone();
        }
        Ok(field)
    }

    /// Validate the current value and sync the indicator with the result.
    pub fn validate(&mut self) -> ValidationResult {
        let result = validate_value(&self.rules, &self.value);
        self.error = (!result.valid).then(|| result.message.clone());
        result
    }

    /// Replace the value. Typing clears a visible error; it never raises one.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        if self.error.is_some() {
            self.clear_error();
        }
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn is_invalid(&self) -> bool {
        self.error.is_some()
    }

    /// Id of the error text element, referenced by `aria-describedby`.
    pub fn error_id(&self) -> String {
        format!("error-{}", self.name)
    }

    /// Select boxes are annotated but never receive focus on a blocked submit.
    pub fn focusable(&self) -> bool {
        self.rules.kind != FieldKind::Select
    }
}

/// The form's submit button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitControl {
    pub label: String,
    pub disabled: bool,
    pub loading: bool,
}

impl SubmitControl {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            disabled: false,
            loading: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Idle,
    Submitting { original_label: String },
}

/// How a background submission ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Success,
    NetworkFailure,
}

/// Proof that a form entered `Submitting`, carrying the data to send.
#[derive(Debug)]
pub struct SubmitTicket {
    pub action: String,
    pub fields: Vec<(String, String)>,
}

#[derive(Debug)]
pub enum BeginSubmit {
    /// Validation failed; `focus` names the first focusable invalid field.
    Blocked { focus: Option<String> },
    /// A submission for this form is already running.
    InFlight,
    Ready(SubmitTicket),
}

/// Decision for a form that submits natively (no background request).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeSubmit {
    Allow,
    Block { focus: Option<String> },
}

#[derive(Debug, Clone)]
pub struct FormState {
    pub id: String,
    pub action: String,
    /// Fields are checked on blur and before a native submit.
    pub validate: bool,
    /// Submits in the background through the orchestrator.
    pub ajax: bool,
    fields: Vec<FieldState>,
    submit: SubmitControl,
    submission: Submission,
    banner: Option<Banner>,
    next_banner: u64,
}

impl FormState {
    pub fn new(id: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            action: action.into(),
            validate: true,
            ajax: false,
            fields: Vec::new(),
            submit: SubmitControl::new("Submit"),
            submission: Submission::Idle,
            banner: None,
            next_banner: 0,
        }
    }

    pub fn from_spec(spec: &FormSpec) -> Result<Self, FieldError> {
        let mut form = Self::new(spec.id.clone(), spec.action.clone())
            .with_submit_label(spec.submit_label.clone());
        form.validate = spec.validate;
        form.ajax = spec.ajax;
        for field in &spec.fields {
            form.fields.push(FieldState::from_spec(field)?);
        }
        Ok(form)
    }

    pub fn with_field(mut self, field: FieldState) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_submit_label(mut self, label: impl Into<String>) -> Self {
        self.submit = SubmitControl::new(label);
        self
    }

    pub fn fields(&self) -> &[FieldState] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldState> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut FieldState> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    pub fn submit_control(&self) -> &SubmitControl {
        &self.submit
    }

    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.submission, Submission::Submitting { .. })
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    // =========================================================================
    // Field events
    // =========================================================================

    /// Validate one field by name. `None` if the form has no such field.
    pub fn validate_field(&mut self, name: &str) -> Option<ValidationResult> {
        self.field_mut(name).map(FieldState::validate)
    }

    /// Blur event: validates the field when the form opted into validation.
    pub fn blur(&mut self, name: &str) -> Option<ValidationResult> {
        if !self.validate {
            return None;
        }
        self.validate_field(name)
    }

    /// Input event. Returns `false` if the form has no such field.
    pub fn input(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.field_mut(name) {
            Some(field) => {
                field.set_value(value);
                true
            }
            None => false,
        }
    }

    /// Validate every field, annotating each one. Returns `true` iff all pass.
    pub fn validate(&mut self) -> bool {
        // No short-circuit: every field must be annotated.
        self.fields
            .iter_mut()
            .map(FieldState::validate)
            .fold(true, |all, result| all & result.valid)
    }

    /// First invalid field that can take focus, in document order.
    pub fn first_invalid(&self) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.is_invalid() && f.focusable())
            .map(|f| f.name.as_str())
    }

    /// Clear every value, as after a successful submission.
    pub fn reset(&mut self) {
        for field in &mut self.fields {
            field.value.clear();
            field.clear_error();
        }
    }

    /// Name/value pairs in document order.
    pub fn payload(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .map(|f| (f.name.clone(), f.value.clone()))
            .collect()
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Submit handler for forms without background submission.
    pub fn native_submit(&mut self) -> NativeSubmit {
        if !self.validate || self.validate() {
            return NativeSubmit::Allow;
        }
        let focus = self.first_invalid().map(str::to_string);
        debug!(form = %self.id, ?focus, "native submit blocked");
        NativeSubmit::Block { focus }
    }

    /// Validate and, if everything passes, enter `Submitting`.
    pub fn begin_submit(&mut self, sending_label: &str) -> BeginSubmit {
        if self.is_submitting() {
            return BeginSubmit::InFlight;
        }
        if !self.validate() {
            return BeginSubmit::Blocked {
                focus: self.first_invalid().map(str::to_string),
            };
        }

        let original_label = std::mem::replace(&mut self.submit.label, sending_label.to_string());
        self.submit.disabled = true;
        self.submit.loading = true;
        self.submission = Submission::Submitting { original_label };
        debug!(form = %self.id, "submitting");

        BeginSubmit::Ready(SubmitTicket {
            action: self.action.clone(),
            fields: self.payload(),
        })
    }

    /// Apply the outcome of a submission and return the banner it produced.
    ///
    /// The submit control is restored whatever the outcome.
    pub fn finish_submit(
        &mut self,
        _ticket: SubmitTicket,
        outcome: SubmissionOutcome,
        messages: &MessagesConfig,
    ) -> Banner {
        let banner = match outcome {
            SubmissionOutcome::Success => {
                let banner = self.show_banner(BannerKind::Success, &messages.success);
                self.reset();
                banner
            }
            SubmissionOutcome::NetworkFailure => {
                self.show_banner(BannerKind::Error, &messages.failure)
            }
        };

        self.restore_control();
        debug!(form = %self.id, ?outcome, "submission finished");

        banner
    }

    /// Leave `Submitting` without an outcome, as when the request is
    /// abandoned. Values and banner are untouched. Returns `false` if no
    /// submission was running.
    pub fn abort_submit(&mut self) -> bool {
        if !self.is_submitting() {
            return false;
        }
        self.restore_control();
        debug!(form = %self.id, "submission aborted");
        true
    }

    fn restore_control(&mut self) {
        if let Submission::Submitting { original_label } =
            std::mem::replace(&mut self.submission, Submission::Idle)
        {
            self.submit.label = original_label;
        }
        self.submit.disabled = false;
        self.submit.loading = false;
    }

    // =========================================================================
    // Banners
    // =========================================================================

    /// Show a banner, replacing any banner already on the form.
    pub fn show_banner(&mut self, kind: BannerKind, message: &str) -> Banner {
        self.next_banner += 1;
        let banner = Banner {
            id: BannerId(self.next_banner),
            kind,
            message: message.to_string(),
        };
        self.banner = Some(banner.clone());
        banner
    }

    /// Remove the banner if `id` is still the one shown. Returns whether
    /// anything was removed.
    pub fn dismiss_banner(&mut self, id: BannerId) -> bool {
        if self.banner.as_ref().is_some_and(|b| b.id == id) {
            self.banner = None;
            true
        } else {
            false
        }
    }
}

/// Shared handle to a form, so timers can reach it after the event that
/// scheduled them has returned.
#[derive(Debug, Clone)]
pub struct FormHandle {
    inner: Arc<Mutex<FormState>>,
}

impl FormHandle {
    pub fn new(form: FormState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(form)),
        }
    }

    /// Run `f` with exclusive access to the form. Never hold this across
    /// an `.await`.
    pub fn with<R>(&self, f: impl FnOnce(&mut FormState) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> FormState {
        self.with(|form| form.clone())
    }
}

/// All forms on a page, registered once from the site config.
#[derive(Debug, Default, Clone)]
pub struct Page {
    forms: Vec<FormHandle>,
    ids: Vec<String>,
}

impl Page {
    pub fn from_config(config: &SiteConfig) -> Result<Self, ConfigError> {
        let mut page = Self::default();
        for spec in &config.forms {
            let form = FormState::from_spec(spec).map_err(|source| ConfigError::Field {
                form: spec.id.clone(),
                source,
            })?;
            page.register(form);
        }
        Ok(page)
    }

    pub fn register(&mut self, form: FormState) -> FormHandle {
        let handle = FormHandle::new(form);
        self.ids.push(handle.with(|f| f.id.clone()));
        self.forms.push(handle.clone());
        handle
    }

    pub fn form(&self, id: &str) -> Option<&FormHandle> {
        self.ids
            .iter()
            .position(|candidate| candidate == id)
            .map(|idx| &self.forms[idx])
    }

    pub fn forms(&self) -> &[FormHandle] {
        &self.forms
    }
}
