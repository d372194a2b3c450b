//! Strongly typed submission results
//! The workflow never returns an error past its boundary; it returns one of these.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const MISSING_TOKEN_MESSAGE: &str = "API Token is required.";
pub const SPAM_CHECK_FAILED_MESSAGE: &str = "reCAPTCHA verification failed.";
pub const CONTACT_FAILED_MESSAGE: &str = "Failed to create or find contact.";
pub const NOTE_FAILED_MESSAGE: &str = "Error creating history note.";

/// Strongly typed SubmissionId, used to correlate log lines of one submission
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(String);

impl SubmissionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stages a submission passes through, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStage {
    Received,
    Validated,
    SpamChecked,
    ContactResolved,
    CompanyResolved,
    NoteAttached,
    Succeeded,
}

impl fmt::Display for SubmissionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubmissionStage::Received => "received",
            SubmissionStage::Validated => "validated",
            SubmissionStage::SpamChecked => "spam_checked",
            SubmissionStage::ContactResolved => "contact_resolved",
            SubmissionStage::CompanyResolved => "company_resolved",
            SubmissionStage::NoteAttached => "note_attached",
            SubmissionStage::Succeeded => "succeeded",
        };
        write!(f, "{}", name)
    }
}

/// Failure categories a submission can end in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Configuration,
    Validation,
    SpamCheck,
    ContactResolution,
    NoteAttachment,
}

/// Fatal submission errors. Company creation failures never reach here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("{0}")]
    Configuration(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    SpamCheck(String),

    #[error("{0}")]
    ContactResolution(String),

    #[error("{0}")]
    NoteAttachment(String),
}

impl SubmissionError {
    pub fn kind(&self) -> FailureKind {
        match self {
            SubmissionError::Configuration(_) => FailureKind::Configuration,
            SubmissionError::Validation(_) => FailureKind::Validation,
            SubmissionError::SpamCheck(_) => FailureKind::SpamCheck,
            SubmissionError::ContactResolution(_) => FailureKind::ContactResolution,
            SubmissionError::NoteAttachment(_) => FailureKind::NoteAttachment,
        }
    }

    /// User-facing reason
    pub fn reason(&self) -> &str {
        match self {
            SubmissionError::Configuration(r)
            | SubmissionError::Validation(r)
            | SubmissionError::SpamCheck(r)
            | SubmissionError::ContactResolution(r)
            | SubmissionError::NoteAttachment(r) => r,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub submission_id: SubmissionId,
    pub contact_key: String,
    /// `false` when an existing contact matched
    pub contact_created: bool,
    pub company_key: Option<String>,
    pub completed_at: DateTime<Utc>,
}

/// A failed submission, including whatever was already written to the CRM
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionFailure {
    pub submission_id: SubmissionId,
    pub kind: FailureKind,
    pub reason: String,
    /// Last stage completed before the failure
    pub stage: SubmissionStage,
    pub contact_key: Option<String>,
    pub company_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    Succeeded(SubmissionReceipt),
    Failed(SubmissionFailure),
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Succeeded(_))
    }

    pub fn submission_id(&self) -> &SubmissionId {
        match self {
            SubmissionOutcome::Succeeded(r) => &r.submission_id,
            SubmissionOutcome::Failed(f) => &f.submission_id,
        }
    }

    /// Failure reason, if the submission failed
    pub fn reason(&self) -> Option<&str> {
        match self {
            SubmissionOutcome::Succeeded(_) => None,
            SubmissionOutcome::Failed(f) => Some(&f.reason),
        }
    }
}
