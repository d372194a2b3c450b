//! Lead submission workflow with strongly-typed steps

use super::outcome::*;
use super::traits::{CrmApi, SpamVerifier};
use crate::clients::{RealNexClient, RecaptchaClient};
use crate::config::{Credentials, FieldConfig, LeadFormConfig, DEFAULT_RECAPTCHA_VERIFY_URL};
use crate::error::{LeadFormError, Result};
use crate::services::sanitizer::validate_lead;
use crate::types::{Company, Contact, HistoryNote, LeadInput};
use chrono::Utc;

/// What a submission has achieved so far, reported on failure
struct Progress {
    stage: SubmissionStage,
    contact_key: Option<String>,
    company_key: Option<String>,
}

impl Progress {
    fn new() -> Self {
        Self {
            stage: SubmissionStage::Received,
            contact_key: None,
            company_key: None,
        }
    }
}

/// Runs one lead through validation, spam check, contact/company resolution
/// and note creation. Every step is attempted exactly once.
pub struct LeadWorkflow<C: CrmApi, S: SpamVerifier> {
    credentials: Credentials,
    fields: FieldConfig,
    crm: C,
    spam: S,
}

impl LeadWorkflow<RealNexClient, RecaptchaClient> {
    /// Build the workflow with the real HTTP clients
    pub fn from_config(config: &LeadFormConfig) -> Result<Self> {
        let crm = RealNexClient::new(&config.realnex, &config.http)?;
        let spam = match &config.recaptcha {
            Some(recaptcha) => RecaptchaClient::from_config(recaptcha, &config.http)?,
            // Never called without a secret
            None => RecaptchaClient::new(DEFAULT_RECAPTCHA_VERIFY_URL, &config.http)?,
        };

        Self::new(config.credentials(), config.fields.clone(), crm, spam)
    }
}

impl<C: CrmApi, S: SpamVerifier> LeadWorkflow<C, S> {
    pub fn new(credentials: Credentials, fields: FieldConfig, crm: C, spam: S) -> Result<Self> {
        if credentials.api_token.trim().is_empty() {
            return Err(LeadFormError::Config(MISSING_TOKEN_MESSAGE.to_string()));
        }

        Ok(Self { credentials, fields, crm, spam })
    }

    pub fn fields(&self) -> &FieldConfig {
        &self.fields
    }

    pub fn spam_check_enabled(&self) -> bool {
        self.credentials.spam_secret_key.is_some()
    }

    /// Submit one lead. Failures are logged and returned as an outcome, never as an error.
    pub async fn submit(&self, lead: &LeadInput, spam_response: Option<&str>) -> SubmissionOutcome {
        let submission_id = SubmissionId::new();
        let mut progress = Progress::new();

        log::info!("Submission {}: received lead", submission_id);

        match self.run(&submission_id, lead, spam_response, &mut progress).await {
            Ok(receipt) => {
                log::info!(
                    "Submission {}: succeeded (contact {}, company {})",
                    submission_id,
                    receipt.contact_key,
                    receipt.company_key.as_deref().unwrap_or("none")
                );
                SubmissionOutcome::Succeeded(receipt)
            }
            Err(e) => {
                log::error!(
                    "Submission {}: failed after stage {}: {}",
                    submission_id, progress.stage, e
                );
                SubmissionOutcome::Failed(SubmissionFailure {
                    submission_id,
                    kind: e.kind(),
                    reason: e.reason().to_string(),
                    stage: progress.stage,
                    contact_key: progress.contact_key,
                    company_key: progress.company_key,
                })
            }
        }
    }

    async fn run(
        &self,
        submission_id: &SubmissionId,
        lead: &LeadInput,
        spam_response: Option<&str>,
        progress: &mut Progress,
    ) -> std::result::Result<SubmissionReceipt, SubmissionError> {
        // Step 1: Validate and sanitize - nothing leaves the process before this passes
        let lead = validate_lead(lead, &self.fields).map_err(|e| match e {
            LeadFormError::Validation(reason) => SubmissionError::Validation(reason),
            other => SubmissionError::Validation(other.to_string()),
        })?;
        progress.stage = SubmissionStage::Validated;

        // Step 2: Spam check, skipped when no secret is configured
        self.check_spam(submission_id, spam_response).await?;
        progress.stage = SubmissionStage::SpamChecked;

        // Step 3: Find or create the contact
        let (contact, contact_created) = self.resolve_contact(submission_id, &lead).await?;
        progress.contact_key = Some(contact.key.clone());
        progress.stage = SubmissionStage::ContactResolved;

        // Step 4: Company is optional and best-effort
        let company = if lead.has_company() {
            self.resolve_company(submission_id, &lead).await
        } else {
            None
        };
        if let Some(ref company) = company {
            progress.company_key = Some(company.key.clone());
            progress.stage = SubmissionStage::CompanyResolved;
        }

        // Step 5: History note; without it the lead is untraceable
        let note = HistoryNote::for_lead(&lead, &contact.key, company.as_ref().map(|c| c.key.as_str()));
        self.attach_note(submission_id, &note).await?;
        progress.stage = SubmissionStage::NoteAttached;

        Ok(SubmissionReceipt {
            submission_id: submission_id.clone(),
            contact_key: contact.key,
            contact_created,
            company_key: company.map(|c| c.key),
            completed_at: Utc::now(),
        })
    }

    async fn check_spam(
        &self,
        submission_id: &SubmissionId,
        spam_response: Option<&str>,
    ) -> std::result::Result<(), SubmissionError> {
        let Some(secret) = self.credentials.spam_secret_key.as_deref() else {
            log::debug!("Submission {}: no spam secret configured, skipping verification", submission_id);
            return Ok(());
        };

        let response_token = spam_response.map(str::trim).unwrap_or("");
        if response_token.is_empty() {
            log::warn!("Submission {}: spam check response token missing", submission_id);
            return Err(SubmissionError::SpamCheck(SPAM_CHECK_FAILED_MESSAGE.to_string()));
        }

        if !self.spam.verify(secret, response_token).await {
            log::warn!("Submission {}: spam verification rejected", submission_id);
            return Err(SubmissionError::SpamCheck(SPAM_CHECK_FAILED_MESSAGE.to_string()));
        }

        Ok(())
    }

    /// Lookup errors count as "not found"; only a failed creation is fatal
    async fn resolve_contact(
        &self,
        submission_id: &SubmissionId,
        lead: &LeadInput,
    ) -> std::result::Result<(Contact, bool), SubmissionError> {
        let token = &self.credentials.api_token;

        let existing = match self.crm
            .find_contact_by_email(token, &lead.email, &lead.first_name, &lead.last_name)
            .await
        {
            Ok(found) => found,
            Err(e) => {
                log::warn!("Submission {}: contact lookup failed, creating instead: {}", submission_id, e);
                None
            }
        };

        if let Some(contact) = existing {
            log::info!("Submission {}: matched existing contact {}", submission_id, contact.key);
            return Ok((contact, false));
        }

        match self.crm.create_contact(token, lead).await {
            Ok(contact) => {
                log::info!("Submission {}: created contact {}", submission_id, contact.key);
                Ok((contact, true))
            }
            Err(e) => {
                log::error!("Submission {}: contact creation failed: {}", submission_id, e);
                Err(SubmissionError::ContactResolution(CONTACT_FAILED_MESSAGE.to_string()))
            }
        }
    }

    async fn resolve_company(&self, submission_id: &SubmissionId, lead: &LeadInput) -> Option<Company> {
        match self.crm
            .create_company(&self.credentials.api_token, &lead.company, &lead.address)
            .await
        {
            Ok(company) => {
                log::info!("Submission {}: created company {}", submission_id, company.key);
                Some(company)
            }
            Err(e) => {
                log::warn!("Submission {}: company creation failed, continuing without company: {}", submission_id, e);
                None
            }
        }
    }

    async fn attach_note(
        &self,
        submission_id: &SubmissionId,
        note: &HistoryNote,
    ) -> std::result::Result<(), SubmissionError> {
        self.crm
            .create_history_note(&self.credentials.api_token, note)
            .await
            .map_err(|e| {
                log::error!("Submission {}: history note failed: {}", submission_id, e);
                SubmissionError::NoteAttachment(NOTE_FAILED_MESSAGE.to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::config::FieldSetting;
    use std::sync::Mutex;

    struct MockCrm {
        existing_contacts: Vec<Contact>,
        should_fail_at_step: Option<&'static str>,
        calls: Mutex<Vec<String>>,
        notes: Mutex<Vec<HistoryNote>>,
    }

    impl MockCrm {
        fn new() -> Self {
            Self {
                existing_contacts: vec![],
                should_fail_at_step: None,
                calls: Mutex::new(vec![]),
                notes: Mutex::new(vec![]),
            }
        }

        fn with_contact(mut self, key: &str, first: &str, last: &str) -> Self {
            self.existing_contacts.push(Contact {
                key: key.to_string(),
                first_name: first.to_string(),
                last_name: last.to_string(),
                email: "jane@example.com".to_string(),
                phones: vec![],
            });
            self
        }

        fn with_failure_at(mut self, step: &'static str) -> Self {
            self.should_fail_at_step = Some(step);
            self
        }

        fn record(&self, step: &str) -> Result<()> {
            self.calls.lock().unwrap().push(step.to_string());
            if self.should_fail_at_step == Some(step) {
                return Err(LeadFormError::ServiceUnavailable(format!("{} failed", step)));
            }
            Ok(())
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CrmApi for MockCrm {
        async fn find_contact_by_email(
            &self,
            _token: &str,
            _email: &str,
            first_name: &str,
            last_name: &str,
        ) -> Result<Option<Contact>> {
            self.record("find_contact")?;
            Ok(self.existing_contacts
                .iter()
                .find(|c| c.matches_name(first_name, last_name))
                .cloned())
        }

        async fn create_contact(&self, _token: &str, lead: &LeadInput) -> Result<Contact> {
            self.record("create_contact")?;
            Ok(Contact {
                key: "new-contact".to_string(),
                first_name: lead.first_name.clone(),
                last_name: lead.last_name.clone(),
                email: lead.email.clone(),
                phones: vec![],
            })
        }

        async fn create_company(&self, _token: &str, name: &str, address: &str) -> Result<Company> {
            self.record("create_company")?;
            Ok(Company {
                key: "new-company".to_string(),
                name: name.to_string(),
                address: address.to_string(),
            })
        }

        async fn create_history_note(&self, _token: &str, note: &HistoryNote) -> Result<()> {
            self.record("create_history_note")?;
            self.notes.lock().unwrap().push(note.clone());
            Ok(())
        }
    }

    struct MockSpam {
        accept: bool,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl MockSpam {
        fn accepting(accept: bool) -> Self {
            Self { accept, calls: Mutex::new(vec![]) }
        }
    }

    #[async_trait]
    impl SpamVerifier for MockSpam {
        async fn verify(&self, secret: &str, response_token: &str) -> bool {
            self.calls.lock().unwrap().push((secret.to_string(), response_token.to_string()));
            self.accept
        }
    }

    fn jane() -> LeadInput {
        LeadInput {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: "jane@example.com".to_string(),
            ..Default::default()
        }
    }

    fn workflow(crm: MockCrm, spam: MockSpam, secret: Option<&str>) -> LeadWorkflow<MockCrm, MockSpam> {
        let mut credentials = Credentials::new("test-token");
        if let Some(secret) = secret {
            credentials = credentials.with_spam_secret(secret);
        }
        LeadWorkflow::new(credentials, FieldConfig::default(), crm, spam).unwrap()
    }

    fn failure(outcome: SubmissionOutcome) -> SubmissionFailure {
        match outcome {
            SubmissionOutcome::Failed(f) => f,
            SubmissionOutcome::Succeeded(r) => panic!("expected failure, got {:?}", r),
        }
    }

    fn receipt(outcome: SubmissionOutcome) -> SubmissionReceipt {
        match outcome {
            SubmissionOutcome::Succeeded(r) => r,
            SubmissionOutcome::Failed(f) => panic!("expected success, got {:?}", f),
        }
    }

    #[test]
    fn test_workflow_requires_api_token() {
        let result = LeadWorkflow::new(
            Credentials::new("  "),
            FieldConfig::default(),
            MockCrm::new(),
            MockSpam::accepting(true),
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_new_contact_scenario() {
        let wf = workflow(MockCrm::new(), MockSpam::accepting(true), None);

        let r = receipt(wf.submit(&jane(), None).await);

        assert_eq!(r.contact_key, "new-contact");
        assert!(r.contact_created);
        assert_eq!(r.company_key, None);
        assert_eq!(wf.crm.calls(), vec!["find_contact", "create_contact", "create_history_note"]);

        let notes = wf.crm.notes.lock().unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].linked_contact_keys, vec!["new-contact".to_string()]);
        assert!(notes[0].linked_company_keys.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_email_makes_no_calls() {
        let wf = workflow(MockCrm::new(), MockSpam::accepting(true), Some("secret"));
        let mut lead = jane();
        lead.email = "not-an-email".to_string();

        let f = failure(wf.submit(&lead, Some("token")).await);

        assert_eq!(f.kind, FailureKind::Validation);
        assert_eq!(f.reason, "Please provide a valid email address.");
        assert_eq!(f.stage, SubmissionStage::Received);
        assert!(wf.crm.calls().is_empty());
        assert!(wf.spam.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_required_field_missing_makes_no_calls() {
        let fields = FieldConfig {
            phone: FieldSetting { show: true, required: true },
            ..FieldConfig::default()
        };
        let wf = LeadWorkflow::new(Credentials::new("t"), fields, MockCrm::new(), MockSpam::accepting(true)).unwrap();

        let f = failure(wf.submit(&jane(), None).await);

        assert_eq!(f.kind, FailureKind::Validation);
        assert_eq!(f.reason, "Phone is required.");
        assert!(wf.crm.calls().is_empty());
    }

    #[tokio::test]
    async fn test_spam_check_skipped_without_secret() {
        let wf = workflow(MockCrm::new(), MockSpam::accepting(false), None);

        let outcome = wf.submit(&jane(), None).await;

        assert!(outcome.is_success());
        assert!(wf.spam.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_spam_check_skipped_without_secret_even_with_response_token() {
        let wf = workflow(MockCrm::new(), MockSpam::accepting(false), None);

        let outcome = wf.submit(&jane(), Some("tok")).await;

        assert!(outcome.is_success());
        assert!(wf.spam.calls.lock().unwrap().is_empty());
        assert_eq!(wf.crm.calls().last().map(String::as_str), Some("create_history_note"));
    }

    #[tokio::test]
    async fn test_spam_rejection_stops_before_crm() {
        let wf = workflow(MockCrm::new(), MockSpam::accepting(false), Some("secret"));

        let f = failure(wf.submit(&jane(), Some("captcha-token")).await);

        assert_eq!(f.kind, FailureKind::SpamCheck);
        assert_eq!(f.reason, "reCAPTCHA verification failed.");
        assert_eq!(f.stage, SubmissionStage::Validated);
        assert!(wf.crm.calls().is_empty());
        assert_eq!(
            *wf.spam.calls.lock().unwrap(),
            vec![("secret".to_string(), "captcha-token".to_string())]
        );
    }

    #[tokio::test]
    async fn test_missing_spam_token_fails_without_remote_call() {
        let wf = workflow(MockCrm::new(), MockSpam::accepting(true), Some("secret"));

        let f = failure(wf.submit(&jane(), Some("   ")).await);

        assert_eq!(f.kind, FailureKind::SpamCheck);
        assert!(wf.spam.calls.lock().unwrap().is_empty());
        assert!(wf.crm.calls().is_empty());
    }

    #[tokio::test]
    async fn test_existing_contact_is_reused() {
        let crm = MockCrm::new().with_contact("existing-1", "JANE", "doe");
        let wf = workflow(crm, MockSpam::accepting(true), Some("secret"));

        let r = receipt(wf.submit(&jane(), Some("ok")).await);

        assert_eq!(r.contact_key, "existing-1");
        assert!(!r.contact_created);
        assert!(!wf.crm.calls().contains(&"create_contact".to_string()));
        assert_eq!(wf.crm.notes.lock().unwrap()[0].linked_contact_keys, vec!["existing-1".to_string()]);
    }

    #[tokio::test]
    async fn test_lookup_failure_falls_back_to_creation() {
        let crm = MockCrm::new().with_failure_at("find_contact");
        let wf = workflow(crm, MockSpam::accepting(true), None);

        let r = receipt(wf.submit(&jane(), None).await);

        assert_eq!(r.contact_key, "new-contact");
        assert!(r.contact_created);
    }

    #[tokio::test]
    async fn test_contact_creation_failure_is_fatal() {
        let crm = MockCrm::new().with_failure_at("create_contact");
        let wf = workflow(crm, MockSpam::accepting(true), None);

        let f = failure(wf.submit(&jane(), None).await);

        assert_eq!(f.kind, FailureKind::ContactResolution);
        assert_eq!(f.reason, "Failed to create or find contact.");
        assert_eq!(f.stage, SubmissionStage::SpamChecked);
        assert_eq!(f.contact_key, None);
        assert!(!wf.crm.calls().contains(&"create_history_note".to_string()));
    }

    #[tokio::test]
    async fn test_company_failure_degrades_to_no_company() {
        let crm = MockCrm::new().with_failure_at("create_company");
        let wf = workflow(crm, MockSpam::accepting(true), None);
        let mut lead = jane();
        lead.company = "Acme Realty".to_string();

        let r = receipt(wf.submit(&lead, None).await);

        assert_eq!(r.company_key, None);
        let notes = wf.crm.notes.lock().unwrap();
        assert!(notes[0].linked_company_keys.is_empty());
    }

    #[tokio::test]
    async fn test_company_linked_to_note() {
        let wf = workflow(MockCrm::new(), MockSpam::accepting(true), None);
        let mut lead = jane();
        lead.company = "Acme Realty".to_string();
        lead.address = "1 Main St".to_string();
        lead.comments = "Call me".to_string();

        let r = receipt(wf.submit(&lead, None).await);

        assert_eq!(r.company_key.as_deref(), Some("new-company"));
        let notes = wf.crm.notes.lock().unwrap();
        assert_eq!(notes[0].linked_company_keys, vec!["new-company".to_string()]);
        assert_eq!(notes[0].notes, "Call me");
    }

    #[tokio::test]
    async fn test_note_failure_reports_partial_progress() {
        let crm = MockCrm::new().with_failure_at("create_history_note");
        let wf = workflow(crm, MockSpam::accepting(true), None);
        let mut lead = jane();
        lead.company = "Acme Realty".to_string();

        let f = failure(wf.submit(&lead, None).await);

        assert_eq!(f.kind, FailureKind::NoteAttachment);
        assert_eq!(f.reason, "Error creating history note.");
        assert_eq!(f.stage, SubmissionStage::CompanyResolved);
        assert_eq!(f.contact_key.as_deref(), Some("new-contact"));
        assert_eq!(f.company_key.as_deref(), Some("new-company"));
    }
}
