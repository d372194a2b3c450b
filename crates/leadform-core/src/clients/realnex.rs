//! RealNex CRM client
//!
//! Wraps the four CRM calls a lead submission needs. Every call is a single
//! request authorized with the account's bearer token; nothing is retried.

use crate::config::{HttpConfig, RealNexConfig};
use crate::error::{LeadFormError, Result};
use crate::types::{Company, Contact, HistoryNote, LeadInput, Phone};
use reqwest::{Client as HttpClient, Response};
use serde::Deserialize;
use serde_json::json;

/// Contact search result page
#[derive(Debug, Deserialize)]
struct ContactSearchResponse {
    #[serde(default)]
    items: Vec<ContactRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContactRecord {
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phones: Option<Vec<PhoneRecord>>,
}

#[derive(Debug, Deserialize)]
struct PhoneRecord {
    #[serde(default)]
    number: Option<String>,
}

#[derive(Debug, Deserialize)]
struct KeyRecord {
    #[serde(default)]
    key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContactEnvelope {
    #[serde(default)]
    contact: Option<KeyRecord>,
}

#[derive(Debug, Deserialize)]
struct CompanyEnvelope {
    #[serde(default)]
    company: Option<KeyRecord>,
}

impl ContactRecord {
    fn into_contact(self) -> Option<Contact> {
        let key = self.key.filter(|k| !k.is_empty())?;
        Some(Contact {
            key,
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            phones: self.phones
                .unwrap_or_default()
                .into_iter()
                .filter_map(|p| p.number)
                .map(|number| Phone { number })
                .collect(),
        })
    }
}

pub struct RealNexClient {
    http_client: HttpClient,
    base_url: String,
}

impl RealNexClient {
    pub fn new(config: &RealNexConfig, http: &HttpConfig) -> Result<Self> {
        let http_client = HttpClient::builder()
            .timeout(http.timeout())
            .build()
            .map_err(|e| LeadFormError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Turn a non-2xx response into an API error carrying the body text
    async fn ensure_success(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
        Err(LeadFormError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Search contacts by email and pick the first whose name matches.
    ///
    /// The CRM filters by email; the name comparison is case-insensitive and
    /// the first match wins.
    pub async fn find_contact_by_email(
        &self,
        token: &str,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<Option<Contact>> {
        let response = self.http_client
            .get(self.endpoint("contacts"))
            .bearer_auth(token)
            .query(&[("email", email)])
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let page: ContactSearchResponse = response.json().await?;

        log::debug!("Contact search for {} returned {} candidates", email, page.items.len());

        Ok(page.items
            .into_iter()
            .filter_map(ContactRecord::into_contact)
            .find(|c| c.matches_name(first_name, last_name)))
    }

    /// Create a contact from the submitted lead
    pub async fn create_contact(&self, token: &str, lead: &LeadInput) -> Result<Contact> {
        let phones: Vec<Phone> = if lead.phone.is_empty() {
            Vec::new()
        } else {
            vec![Phone { number: lead.phone.clone() }]
        };

        let payload = json!({
            "firstName": lead.first_name,
            "lastName": lead.last_name,
            "email": lead.email,
            "doNotEmail": false,
            "phones": phones,
        });

        let response = self.http_client
            .post(self.endpoint("contact"))
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let envelope: ContactEnvelope = response.json().await?;

        let key = envelope.contact
            .and_then(|c| c.key)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| LeadFormError::UnexpectedResponse("contact key missing from response".to_string()))?;

        log::info!("Created RealNex contact {}", key);

        Ok(Contact {
            key,
            first_name: lead.first_name.clone(),
            last_name: lead.last_name.clone(),
            email: lead.email.clone(),
            phones,
        })
    }

    /// Create a company with a single address line
    pub async fn create_company(&self, token: &str, name: &str, address: &str) -> Result<Company> {
        let payload = json!({
            "name": name,
            "address_info": {
                "company": name,
                "address_1": address,
            }
        });

        let response = self.http_client
            .post(self.endpoint("company"))
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let envelope: CompanyEnvelope = response.json().await?;

        let key = envelope.company
            .and_then(|c| c.key)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| LeadFormError::UnexpectedResponse("company key missing from response".to_string()))?;

        log::info!("Created RealNex company {}", key);

        Ok(Company {
            key,
            name: name.to_string(),
            address: address.to_string(),
        })
    }

    /// Attach a history note; any status below 400 counts as success
    pub async fn create_history_note(&self, token: &str, note: &HistoryNote) -> Result<()> {
        let payload = json!({
            "subject": note.subject,
            "notes": note.notes,
            "linkedContactKeys": note.linked_contact_keys,
            "linkedCompanyKeys": note.linked_company_keys,
            "history_info": {
                "subject": note.subject,
                "event_type_key": note.event_type,
            }
        });

        let response = self.http_client
            .post(self.endpoint("history"))
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() >= 400 {
            let message = response.text().await.unwrap_or_default();
            log::error!("History note rejected with {}: {}", status, message);
            return Err(LeadFormError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}
