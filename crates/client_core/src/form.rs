use shared::protocol::CertidaoEnvelope;
use tracing::debug;

use crate::{
    draft::{Draft, FormField},
    error::{EmailError, SubmitError},
    status::SubmitStatus,
};

/// Everything one editing session holds: the draft, the pending email input and the banner.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    draft: Draft,
    email_input: String,
    email_error: Option<EmailError>,
    status: SubmitStatus,
    submitting: bool,
    // Bumped per submission so a stale success timer cannot clear a newer banner.
    generation: u64,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn email_input(&self) -> &str {
        &self.email_input
    }

    pub fn email_error(&self) -> Option<EmailError> {
        self.email_error
    }

    pub fn status(&self) -> &SubmitStatus {
        &self.status
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn set_field(&mut self, field: FormField, value: &str) {
        match field {
            FormField::Company => self.draft.select_company(value),
            FormField::TaxId => self.draft.tax_id = value.to_string(),
            FormField::EmailInput => {
                self.email_input = value.to_string();
                self.email_error = None;
            }
            FormField::DocumentTypeSelection => self.draft.select_document_type(value),
            FormField::DocumentTypeText => {
                if !self.draft.set_custom_document_type(value) {
                    debug!("custom document type ignored; \"Outro\" is not selected");
                }
            }
            FormField::IssuingBody => self.draft.issuing_body = value.to_string(),
            FormField::IssuedOn => self.draft.issued_on = value.to_string(),
            FormField::ValidUntil => self.draft.valid_until = value.to_string(),
            FormField::StatusNote => self.draft.status_note = value.to_string(),
        }
    }

    /// Validates and appends `candidate`. A rejection is also kept as the field error.
    pub fn add_email(&mut self, candidate: &str) -> Result<(), EmailError> {
        if candidate.is_empty() {
            return Ok(());
        }
        if let Err(err) = self.draft.emails.push(candidate) {
            self.email_error = Some(err);
            return Err(err);
        }
        self.email_input.clear();
        self.email_error = None;
        Ok(())
    }

    pub fn add_pending_email(&mut self) -> Result<(), EmailError> {
        let candidate = self.email_input.clone();
        self.add_email(&candidate)
    }

    pub fn remove_email(&mut self, target: &str) -> bool {
        self.draft.emails.remove(target)
    }

    pub fn can_add_email(&self) -> bool {
        !self.email_input.is_empty() && !self.draft.emails.is_full()
    }

    pub fn dismiss_status(&mut self) {
        if !self.submitting {
            self.status = SubmitStatus::Idle;
        }
    }

    /// Marks a submission in flight and snapshots the draft, or returns `None` if one already is.
    pub(crate) fn begin_submission(&mut self) -> Option<(u64, CertidaoEnvelope)> {
        if self.submitting {
            return None;
        }
        self.submitting = true;
        self.generation += 1;
        self.status = SubmitStatus::Submitting;
        Some((self.generation, self.draft.to_envelope()))
    }

    /// Applies the relay outcome. Returns the generation to expire when the banner is a success.
    pub(crate) fn finish_submission(&mut self, result: &Result<(), SubmitError>) -> Option<u64> {
        self.submitting = false;
        match result {
            Ok(()) => {
                self.status = SubmitStatus::success();
                self.reset_draft();
                Some(self.generation)
            }
            Err(err) => {
                self.status = SubmitStatus::Error {
                    message: err.banner_message(),
                    detail: err.detail(),
                };
                None
            }
        }
    }

    pub(crate) fn release(&mut self, generation: u64) {
        if self.generation != generation {
            return;
        }
        self.submitting = false;
        if self.status == SubmitStatus::Submitting {
            self.status = SubmitStatus::Idle;
        }
    }

    pub(crate) fn expire_success(&mut self, generation: u64) {
        if self.generation == generation && matches!(self.status, SubmitStatus::Success { .. }) {
            self.status = SubmitStatus::Idle;
        }
    }

    fn reset_draft(&mut self) {
        self.draft = Draft::default();
        self.email_input.clear();
        self.email_error = None;
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
