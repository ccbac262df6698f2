//! HTML projection of form state.
//!
//! Everything a page shows about a form is derived here from a
//! [`FormState`]; nothing is read back from the markup. Rendering the same
//! state twice yields the same HTML, so an error indicator can never be
//! duplicated or left behind.
//!
//! ## Output
//!
//! ```html
//! <form id="contact" action="…" method="post" novalidate data-validate data-ajax>
//!   <div class="form-error-message" role="alert">…icon…<span>Oops! …</span></div>
//!   <div class="form-group error">
//!     <label for="email">Email</label>
//!     <input type="email" id="email" name="email" value="nope" required
//!            aria-invalid="true" aria-describedby="error-email">
//!     <span class="form-error" id="error-email" role="alert">Please enter a valid email address</span>
//!   </div>
//!   <button class="btn" type="submit">Send Message</button>
//! </form>
//! ```
//!
//! Uses [maud](https://maud.lambda.xyz/); all interpolation is auto-escaped.

use crate::banner::{Banner, BannerKind};
use crate::field::{FieldKind, Pattern};
use crate::form::{FieldState, FormState, SubmitControl};
use maud::{Markup, html};

/// Render a whole form, banner first.
pub fn render_form(form: &FormState) -> Markup {
    html! {
        form id=(form.id) action=(form.action) method="post" novalidate
            data-validate[form.validate] data-ajax[form.ajax] {
            @if let Some(banner) = form.banner() {
                (render_banner(banner))
            }
            @for field in form.fields() {
                (render_field(field))
            }
            (render_submit(form.submit_control()))
        }
    }
}

/// Render one field inside its `.form-group`.
pub fn render_field(field: &FieldState) -> Markup {
    let rules = &field.rules;
    let invalid = field.is_invalid();
    let aria_invalid = invalid.then_some("true");
    let described_by = invalid.then(|| field.error_id());
    let pattern = rules.pattern.as_ref().map(Pattern::source);
    let pattern_message = rules.pattern.as_ref().and_then(Pattern::message);

    html! {
        div.form-group.error[invalid] {
            label for=(field.name) { (field.label) }
            @match rules.kind {
                FieldKind::Textarea => {
                    textarea id=(field.name) name=(field.name) required[rules.required]
                        minlength=[rules.min_length] maxlength=[rules.max_length]
                        aria-invalid=[aria_invalid] aria-describedby=[described_by.as_deref()] {
                        (field.value)
                    }
                }
                FieldKind::Select => {
                    select id=(field.name) name=(field.name) required[rules.required]
                        aria-invalid=[aria_invalid] aria-describedby=[described_by.as_deref()] {
                        option value="" { "Select…" }
                        @if !field.value.is_empty() {
                            option value=(field.value) selected { (field.value) }
                        }
                    }
                }
                _ => {
                    input type=(rules.kind.input_type()) id=(field.name) name=(field.name)
                        value=(field.value) required[rules.required]
                        minlength=[rules.min_length] maxlength=[rules.max_length]
                        pattern=[pattern] data-pattern-message=[pattern_message]
                        aria-invalid=[aria_invalid] aria-describedby=[described_by.as_deref()];
                }
            }
            @if let Some(message) = &field.error {
                span.form-error id=(field.error_id()) role="alert" { (message) }
            }
        }
    }
}

/// Render the submit button in its current state.
pub fn render_submit(control: &SubmitControl) -> Markup {
    html! {
        button.btn.loading[control.loading] type="submit" disabled[control.disabled] {
            (control.label)
        }
    }
}

/// Render a success or error banner with its icon.
pub fn render_banner(banner: &Banner) -> Markup {
    html! {
        div class=(banner.kind.css_class()) role="alert" data-banner=(banner.id.0) {
            svg width="24" height="24" viewBox="0 0 24 24" fill="none"
                stroke="currentColor" stroke-width="2" {
                @match banner.kind {
                    BannerKind::Success => {
                        polyline points="20 6 9 17 4 12" {}
                    }
                    BannerKind::Error => {
                        circle cx="12" cy="12" r="10" {}
                        line x1="15" y1="9" x2="9" y2="15" {}
                        line x1="9" y1="9" x2="15" y2="15" {}
                    }
                }
            }
            span { (banner.message) }
        }
    }
}
