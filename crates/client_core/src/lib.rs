use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use reqwest::Client;
use serde_json::Value;
use shared::protocol::{first_truthy_text, is_truthy, CertidaoEnvelope, CERTIDAO_ROUTE};
use tracing::{debug, info, warn};

pub mod draft;
pub mod email;
pub mod error;
mod form;
pub mod status;

pub use draft::{Draft, FormField, UnknownField};
pub use email::{EmailList, MAX_EMAILS};
pub use error::{EmailError, SubmitError};
pub use form::FormState;
pub use status::{SubmitStatus, SUCCESS_BANNER_TTL, UNKNOWN_FAILURE_MESSAGE};

#[derive(Debug)]
pub enum SubmitOutcome {
    /// Another submission from this controller is still outstanding; nothing was sent.
    AlreadySubmitting,
    Saved,
    Failed(SubmitError),
}

/// Drives one certidão form: field edits, the email list, and submission through the relay.
///
/// Clones share the same form state and in-flight guard.
#[derive(Clone)]
pub struct FormController {
    http: Client,
    relay_url: String,
    state: Arc<Mutex<FormState>>,
    success_ttl: Duration,
}

impl FormController {
    pub fn new(server_url: impl AsRef<str>) -> Self {
        Self::with_client(Client::new(), server_url)
    }

    pub fn with_client(http: Client, server_url: impl AsRef<str>) -> Self {
        Self {
            http,
            relay_url: format!(
                "{}{CERTIDAO_ROUTE}",
                server_url.as_ref().trim_end_matches('/')
            ),
            state: Arc::new(Mutex::new(FormState::new())),
            success_ttl: SUCCESS_BANNER_TTL,
        }
    }

    pub fn with_success_ttl(mut self, ttl: Duration) -> Self {
        self.success_ttl = ttl;
        self
    }

    pub fn relay_url(&self) -> &str {
        &self.relay_url
    }

    pub fn snapshot(&self) -> FormState {
        self.lock().clone()
    }

    pub fn draft(&self) -> Draft {
        self.lock().draft().clone()
    }

    pub fn status(&self) -> SubmitStatus {
        self.lock().status().clone()
    }

    pub fn email_error(&self) -> Option<EmailError> {
        self.lock().email_error()
    }

    pub fn is_submitting(&self) -> bool {
        self.lock().is_submitting()
    }

    pub fn set_field(&self, field: FormField, value: &str) {
        self.lock().set_field(field, value);
    }

    pub fn set_field_by_name(&self, name: &str, value: &str) -> Result<(), UnknownField> {
        let field = name.parse::<FormField>()?;
        self.set_field(field, value);
        Ok(())
    }

    pub fn add_email(&self, candidate: &str) -> Result<(), EmailError> {
        self.lock().add_email(candidate)
    }

    pub fn add_pending_email(&self) -> Result<(), EmailError> {
        self.lock().add_pending_email()
    }

    pub fn remove_email(&self, target: &str) -> bool {
        self.lock().remove_email(target)
    }

    pub fn can_add_email(&self) -> bool {
        self.lock().can_add_email()
    }

    pub fn dismiss_status(&self) {
        self.lock().dismiss_status();
    }

    /// Posts the current draft to the relay. The draft is cleared only when the relay reports `ok`.
    pub async fn submit(&self) -> SubmitOutcome {
        let envelope = self.lock().begin_submission();
        let Some((generation, envelope)) = envelope else {
            debug!("certidao submission already in flight");
            return SubmitOutcome::AlreadySubmitting;
        };
        let _in_flight = InFlight {
            state: &self.state,
            generation,
        };

        let result = self.post_envelope(&envelope).await;
        let expiring = self.lock().finish_submission(&result);
        if let Some(generation) = expiring {
            self.schedule_success_expiry(generation);
        }

        match result {
            Ok(()) => {
                info!(empresa = %envelope.certidao.company, "certidao saved");
                SubmitOutcome::Saved
            }
            Err(err) => {
                warn!(%err, "certidao submission failed");
                SubmitOutcome::Failed(err)
            }
        }
    }

    async fn post_envelope(&self, envelope: &CertidaoEnvelope) -> Result<(), SubmitError> {
        let response = self
            .http
            .post(&self.relay_url)
            .json(envelope)
            .send()
            .await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        debug!(status, body = %text, "relay response");
        interpret_reply(status, &text)
    }

    fn schedule_success_expiry(&self, generation: u64) {
        let state = Arc::downgrade(&self.state);
        let ttl = self.success_ttl;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if let Some(state) = state.upgrade() {
                lock_state(&state).expire_success(generation);
            }
        });
    }

    fn lock(&self) -> MutexGuard<'_, FormState> {
        lock_state(&self.state)
    }
}

/// Classifies a relay reply body. Only a JSON body with a truthy `ok` counts as saved.
pub fn interpret_reply(status: u16, text: &str) -> Result<(), SubmitError> {
    let reply: Value =
        serde_json::from_str(text).map_err(|_| SubmitError::InvalidResponse {
            status,
            raw: text.to_string(),
        })?;

    if reply.get("ok").is_some_and(is_truthy) {
        return Ok(());
    }

    Err(SubmitError::Rejected {
        status,
        message: first_truthy_text(&reply, &["message", "error"])
            .unwrap_or_else(|| UNKNOWN_FAILURE_MESSAGE.to_string()),
        raw: rejection_detail(&reply),
    })
}

// The relay wraps non-JSON downstream text as `raw` and echoes refused payloads as `body`.
fn rejection_detail(reply: &Value) -> Option<String> {
    match reply.get("raw") {
        Some(Value::String(raw)) => Some(raw.clone()),
        _ => reply
            .get("body")
            .filter(|body| !body.is_null())
            .map(Value::to_string),
    }
}

// Clears the in-flight flag even if the submit future is dropped mid-request.
struct InFlight<'a> {
    state: &'a Mutex<FormState>,
    generation: u64,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        lock_state(self.state).release(self.generation);
    }
}

fn lock_state(state: &Mutex<FormState>) -> MutexGuard<'_, FormState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
