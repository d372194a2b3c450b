//! Common types used throughout the lead form system

use serde::{Deserialize, Serialize};
use std::fmt;

/// The fields a visitor can fill in on the lead form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadField {
    FirstName,
    LastName,
    Email,
    Phone,
    Company,
    Address,
    Comments,
}

impl LeadField {
    /// All fields in form order
    pub const ALL: [LeadField; 7] = [
        LeadField::FirstName,
        LeadField::LastName,
        LeadField::Email,
        LeadField::Phone,
        LeadField::Company,
        LeadField::Address,
        LeadField::Comments,
    ];

    /// Form parameter name, as posted by the rendered form
    pub fn key(&self) -> &'static str {
        match self {
            LeadField::FirstName => "first_name",
            LeadField::LastName => "last_name",
            LeadField::Email => "email",
            LeadField::Phone => "phone",
            LeadField::Company => "company",
            LeadField::Address => "address",
            LeadField::Comments => "comments",
        }
    }

    /// Human readable label used in user-facing messages
    pub fn label(&self) -> &'static str {
        match self {
            LeadField::FirstName => "First Name",
            LeadField::LastName => "Last Name",
            LeadField::Email => "Email",
            LeadField::Phone => "Phone",
            LeadField::Company => "Company",
            LeadField::Address => "Address",
            LeadField::Comments => "Comments",
        }
    }
}

impl fmt::Display for LeadField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// A lead as submitted through the form.
///
/// Empty strings mean "not supplied", which is how the form posts blank inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub address: String,
    pub comments: String,
}

impl LeadInput {
    /// Value of a single field
    pub fn value(&self, field: LeadField) -> &str {
        match field {
            LeadField::FirstName => &self.first_name,
            LeadField::LastName => &self.last_name,
            LeadField::Email => &self.email,
            LeadField::Phone => &self.phone,
            LeadField::Company => &self.company,
            LeadField::Address => &self.address,
            LeadField::Comments => &self.comments,
        }
    }

    pub fn has_company(&self) -> bool {
        !self.company.is_empty()
    }
}

/// Phone number entry on a CRM contact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phone {
    pub number: String,
}

/// Contact record in RealNex CRM
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub key: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phones: Vec<Phone>,
}

impl Contact {
    /// Case-insensitive first and last name comparison
    pub fn matches_name(&self, first_name: &str, last_name: &str) -> bool {
        self.first_name.to_lowercase() == first_name.to_lowercase()
            && self.last_name.to_lowercase() == last_name.to_lowercase()
    }
}

/// Company record in RealNex CRM
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub key: String,
    pub name: String,
    pub address: String,
}

/// History record attached to a contact (and optionally a company)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryNote {
    pub subject: String,
    pub notes: String,
    pub linked_contact_keys: Vec<String>,
    pub linked_company_keys: Vec<String>,
    pub event_type: String,
}

impl HistoryNote {
    pub const SUBJECT: &'static str = "Weblead";
    pub const EVENT_TYPE: &'static str = "Note";
    pub const DEFAULT_NOTES: &'static str = "Submitted via web form.";

    /// Build the web lead note for a contact, linking the company when there is one
    pub fn for_lead(lead: &LeadInput, contact_key: &str, company_key: Option<&str>) -> Self {
        let notes = if lead.comments.is_empty() {
            Self::DEFAULT_NOTES.to_string()
        } else {
            lead.comments.clone()
        };

        Self {
            subject: Self::SUBJECT.to_string(),
            notes,
            linked_contact_keys: vec![contact_key.to_string()],
            linked_company_keys: company_key.map(|k| vec![k.to_string()]).unwrap_or_default(),
            event_type: Self::EVENT_TYPE.to_string(),
        }
    }
}
