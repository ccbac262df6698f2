//! # Brochure UI
//!
//! Client-side behaviour for a brochure website: contact-form validation,
//! background form submission with success and error banners, animated
//! statistics counters, and active navigation links.
//!
//! # Architecture: State In, Markup Out
//!
//! Every form on a page has an explicit [`form::FormState`]. Events mutate
//! that state; the page is redrawn from it:
//!
//! ```text
//! 1. Event     blur / input / submit  →  FormState   (validate, mark errors)
//! 2. Submit    FormState → Transport  →  FormState   (loading, banner)
//! 3. Render    FormState              →  HTML        (pure projection with Maud)
//! ```
//!
//! Because the markup is never consulted, an error message cannot be shown
//! twice, a fixed field cannot keep a stale `aria-invalid`, and the submit
//! button's label is restored from state rather than scraped from the DOM.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `config.toml` loading, stock defaults, merging, validation |
//! | [`field`] | Per-field rules: kind, required, lengths, compiled pattern |
//! | [`validate`] | Pure value checks and their user-facing messages |
//! | [`form`] | Field and form state, the submission state machine, the page registry |
//! | [`banner`] | Success and error banners, auto-dismiss policy |
//! | [`submit`] | `Transport` seam, multipart HTTP transport, the submit orchestrator |
//! | [`render`] | HTML for forms, fields, buttons and banners |
//! | [`counter`] | Count-up animation for statistics |
//! | [`nav`] | Which nav link is active for a path |
//! | [`telemetry`] | `tracing` subscriber setup |
//!
//! # Design Decisions
//!
//! ## One Submission At A Time
//!
//! [`form::FormState::begin_submit`] hands out a [`form::SubmitTicket`] and
//! flips the form to `Submitting`; a second submit while one is in flight is
//! refused. The ticket is consumed by `finish_submit`, so the loading state
//! is always cleared exactly once, on success or failure. If the caller
//! drops the submission mid-request, a guard restores the control instead.
//!
//! ## Stale Timers Are Harmless
//!
//! A success banner dismisses itself after a delay. Banner ids only grow, and
//! dismissal names the banner it was scheduled for, so a timer that fires
//! after a newer banner appeared does nothing.
//!
//! ## Swappable Transport
//!
//! The orchestrator talks to a `dyn` [`submit::Transport`]. Production uses
//! [`submit::HttpTransport`] (reqwest, multipart body, `Accept:
//! application/json`); tests script responses without a network.

pub mod banner;
pub mod config;
pub mod counter;
pub mod field;
pub mod form;
pub mod nav;
pub mod render;
pub mod submit;
pub mod telemetry;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_helpers;
