//! Capabilities the submission workflow depends on
//!
//! The workflow only talks to the outside world through these traits, so the
//! HTTP clients can be swapped for fakes in tests.

use async_trait::async_trait;
use crate::clients::{RealNexClient, RecaptchaClient};
use crate::error::Result;
use crate::types::{Company, Contact, HistoryNote, LeadInput};

/// CRM operations needed to record a lead
#[async_trait]
pub trait CrmApi: Send + Sync {
    /// Look up a contact by email; the first case-insensitive first+last name match wins
    async fn find_contact_by_email(
        &self,
        token: &str,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<Option<Contact>>;

    async fn create_contact(&self, token: &str, lead: &LeadInput) -> Result<Contact>;

    async fn create_company(&self, token: &str, name: &str, address: &str) -> Result<Company>;

    async fn create_history_note(&self, token: &str, note: &HistoryNote) -> Result<()>;
}

/// Challenge-response check gating submissions
#[async_trait]
pub trait SpamVerifier: Send + Sync {
    /// `false` for an empty token, a failed call, or anything but an affirmative answer
    async fn verify(&self, secret: &str, response_token: &str) -> bool;
}

#[async_trait]
impl CrmApi for RealNexClient {
    async fn find_contact_by_email(
        &self,
        token: &str,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<Option<Contact>> {
        RealNexClient::find_contact_by_email(self, token, email, first_name, last_name).await
    }

    async fn create_contact(&self, token: &str, lead: &LeadInput) -> Result<Contact> {
        RealNexClient::create_contact(self, token, lead).await
    }

    async fn create_company(&self, token: &str, name: &str, address: &str) -> Result<Company> {
        RealNexClient::create_company(self, token, name, address).await
    }

    async fn create_history_note(&self, token: &str, note: &HistoryNote) -> Result<()> {
        RealNexClient::create_history_note(self, token, note).await
    }
}

#[async_trait]
impl SpamVerifier for RecaptchaClient {
    async fn verify(&self, secret: &str, response_token: &str) -> bool {
        RecaptchaClient::verify(self, secret, response_token).await
    }
}
