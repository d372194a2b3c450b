//! RealNex Lead Form Core Library
//!
//! Lead capture business logic: configuration, the RealNex CRM and reCAPTCHA
//! clients, form sanitization, snippet embedding, and the submission workflow.

pub mod config;
pub mod clients;
pub mod services;
pub mod workflow;
pub mod types;
pub mod error;

// Re-export main types for easy access
pub use config::{LeadFormConfig, Credentials, FieldConfig, FieldSetting};
pub use error::{LeadFormError, Result};

// Re-export all client types
pub use clients::{
    RealNexClient,
    RecaptchaClient,
};

// Re-export service types
pub use services::{
    SnippetBuilder,
    SnippetRequest,
    SnippetType,
};

pub use types::{LeadField, LeadInput, Contact, Company, HistoryNote, Phone};

// Re-export workflow types
pub use workflow::{
    LeadWorkflow,
    CrmApi,
    SpamVerifier,
    SubmissionId,
    SubmissionStage,
    SubmissionOutcome,
    SubmissionReceipt,
    SubmissionFailure,
    SubmissionError,
    FailureKind,
};
