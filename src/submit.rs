//! Background form submission.
//!
//! The [`Orchestrator`] drives one submission end to end:
//!
//! 1. validate every field; stop if any fails (no request, control untouched)
//! 2. enter `Submitting`: disable the button, flag it loading, show "Sending..."
//! 3. `POST` the fields as `multipart/form-data` with `Accept: application/json`
//! 4. 2xx → success banner, fields cleared, banner removed after a delay
//! 5. anything else, including transport errors → error banner, fields kept
//! 6. always: restore the button
//!
//! The network is behind the [`Transport`] trait. [`HttpTransport`] is the
//! production implementation; tests script responses without a server.
//!
//! The form lock is never held across the request, so other forms on the
//! page, and unrelated fields of this one, stay usable while it is in flight.

use crate::banner::{Banner, BannerId};
use crate::config::{MessagesConfig, SiteConfig, SubmissionConfig};
use crate::form::{BeginSubmit, FormHandle, FormState, NativeSubmit, SubmissionOutcome};
use async_trait::async_trait;
use reqwest::{Client, header, multipart};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid action URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Status and body of a backend response. The body is only kept for
/// non-2xx responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends form data to a backend.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `fields` to `action`.
    async fn post(
        &self,
        action: &str,
        fields: &[(String, String)],
    ) -> Result<TransportResponse, TransportError>;
}

/// `reqwest`-backed transport posting `multipart/form-data`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    pub fn from_config(config: &SubmissionConfig) -> Result<Self, TransportError> {
        Self::new(Duration::from_secs(config.timeout_secs))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(
        &self,
        action: &str,
        fields: &[(String, String)],
    ) -> Result<TransportResponse, TransportError> {
        let url = url::Url::parse(action).map_err(|source| TransportError::InvalidUrl {
            url: action.to_string(),
            source,
        })?;
        let form = fields
            .iter()
            .fold(multipart::Form::new(), |form, (name, value)| {
                form.text(name.clone(), value.clone())
            });

        let response = self
            .client
            .post(url)
            .header(header::ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        // The status alone decides the outcome; a failure body is only read
        // for diagnostics, and an unreadable one counts as empty.
        let body = if status.is_success() {
            Vec::new()
        } else {
            response
                .bytes()
                .await
                .map(|bytes| bytes.to_vec())
                .unwrap_or_default()
        };
        Ok(TransportResponse {
            status: status.as_u16(),
            body,
        })
    }
}

/// Error body returned by hosted form backends, e.g.
/// `{"errors":[{"field":"email","message":"should be an email"}]}`.
#[derive(Debug, Deserialize)]
struct BackendReply {
    #[serde(default)]
    errors: Vec<BackendErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct BackendErrorEntry {
    message: String,
}

/// Backend-provided failure reasons, joined, if the body carries any.
/// Only used for diagnostics; users always see the generic message.
fn backend_reason(body: &[u8]) -> Option<String> {
    let reply: BackendReply = serde_json::from_slice(body).ok()?;
    let reasons: Vec<String> = reply.errors.into_iter().map(|e| e.message).collect();
    (!reasons.is_empty()).then(|| reasons.join("; "))
}

/// Result of a background submit.
///
/// `Sent` and `Failed` carry the banner that was inserted; the caller scrolls
/// it into view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed. `focus` is the field to move focus to.
    Blocked { focus: Option<String> },
    /// The form already has a submission running; nothing was done.
    InFlight,
    Sent(Banner),
    Failed(Banner),
}

/// What a submit event turned into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitDecision {
    /// Form without background submission: let the browser submit, or not.
    Native(NativeSubmit),
    Background(SubmitOutcome),
}

pub struct Orchestrator {
    transport: Arc<dyn Transport>,
    messages: MessagesConfig,
    success_dismiss: Duration,
}

impl Orchestrator {
    pub fn new(transport: Arc<dyn Transport>, config: &SiteConfig) -> Self {
        Self {
            transport,
            messages: config.messages.clone(),
            success_dismiss: Duration::from_millis(config.submission.success_dismiss_ms),
        }
    }

    /// Orchestrator posting over HTTP with the configured timeout.
    pub fn from_config(config: &SiteConfig) -> Result<Self, TransportError> {
        let transport = HttpTransport::from_config(&config.submission)?;
        Ok(Self::new(Arc::new(transport), config))
    }

    /// Route a submit event by the form's opt-in flags.
    pub async fn handle_submit(&self, form: &FormHandle) -> SubmitDecision {
        if form.with(|f| f.ajax) {
            SubmitDecision::Background(self.submit(form).await)
        } else {
            SubmitDecision::Native(form.with(|f| f.native_submit()))
        }
    }

    /// Validate and submit a form in the background.
    pub async fn submit(&self, form: &FormHandle) -> SubmitOutcome {
        let (form_id, begin) =
            form.with(|f| (f.id.clone(), f.begin_submit(&self.messages.sending)));

        let ticket = match begin {
            BeginSubmit::Ready(ticket) => ticket,
            BeginSubmit::Blocked { focus } => {
                warn!(form = %form_id, ?focus, "submission blocked by validation");
                return SubmitOutcome::Blocked { focus };
            }
            BeginSubmit::InFlight => {
                debug!(form = %form_id, "submission already in flight");
                return SubmitOutcome::InFlight;
            }
        };

        let guard = SubmitGuard::new(form, &form_id);
        let outcome = match self.transport.post(&ticket.action, &ticket.fields).await {
            Ok(response) if response.is_success() => SubmissionOutcome::Success,
            Ok(response) => {
                let reason = backend_reason(&response.body);
                error!(
                    form = %form_id,
                    status = response.status,
                    reason = reason.as_deref().unwrap_or("none given"),
                    "form submission rejected"
                );
                SubmissionOutcome::NetworkFailure
            }
            Err(err) => {
                error!(form = %form_id, error = %err, "form submission error");
                SubmissionOutcome::NetworkFailure
            }
        };

        guard.disarm();
        let banner = form.with(|f| f.finish_submit(ticket, outcome, &self.messages));
        if let Some(delay) = banner.kind.auto_dismiss(self.success_dismiss) {
            schedule_dismiss(form.clone(), banner.id, delay);
        }

        match outcome {
            SubmissionOutcome::Success => {
                info!(form = %form_id, "form submitted");
                SubmitOutcome::Sent(banner)
            }
            SubmissionOutcome::NetworkFailure => SubmitOutcome::Failed(banner),
        }
    }
}

/// Restores the submit control if a submission future is dropped while its
/// request is in flight (timeout, `select!`, task abort).
struct SubmitGuard<'a> {
    form: &'a FormHandle,
    form_id: &'a str,
    armed: bool,
}

impl<'a> SubmitGuard<'a> {
    fn new(form: &'a FormHandle, form_id: &'a str) -> Self {
        Self {
            form,
            form_id,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        if self.armed && self.form.with(FormState::abort_submit) {
            warn!(form = %self.form_id, "submission dropped before completion");
        }
    }
}

/// Remove the banner after `delay`. Fire-and-forget: if the banner has been
/// replaced or removed by then, this does nothing.
fn schedule_dismiss(form: FormHandle, id: BannerId, delay: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if form.with(|f| f.dismiss_banner(id)) {
            debug!(?id, "banner dismissed");
        }
    });
}
