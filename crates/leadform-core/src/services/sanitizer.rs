//! Form input sanitization and validation

use crate::config::FieldConfig;
use crate::error::{LeadFormError, Result};
use crate::types::{LeadField, LeadInput};
use once_cell::sync::Lazy;
use regex::Regex;

static UNSAFE_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[<>"'&;()]"#).expect("Invalid unsafe character pattern")
});

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\w.-]+@[\w.-]+\.\w+$").expect("Invalid email pattern")
});

pub const INVALID_EMAIL_MESSAGE: &str = "Please provide a valid email address.";

/// Strip markup/quote characters and surrounding whitespace
pub fn sanitize_input(value: &str) -> String {
    UNSAFE_CHARS.replace_all(value, "").trim().to_string()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Sanitizes every field of a lead
pub fn sanitize_lead(lead: &LeadInput) -> LeadInput {
    LeadInput {
        first_name: sanitize_input(&lead.first_name),
        last_name: sanitize_input(&lead.last_name),
        email: sanitize_input(&lead.email),
        phone: sanitize_input(&lead.phone),
        company: sanitize_input(&lead.company),
        address: sanitize_input(&lead.address),
        comments: sanitize_input(&lead.comments),
    }
}

/// Sanitize then validate a lead against the field configuration.
///
/// Email is checked first, then the remaining enforced fields in form order.
pub fn validate_lead(lead: &LeadInput, fields: &FieldConfig) -> Result<LeadInput> {
    let lead = sanitize_lead(lead);

    if !is_valid_email(&lead.email) {
        return Err(LeadFormError::Validation(INVALID_EMAIL_MESSAGE.to_string()));
    }

    if let Some(missing) = fields
        .enforced_fields()
        .find(|field| lead.value(*field).is_empty())
    {
        return Err(LeadFormError::Validation(missing_field_message(missing)));
    }

    Ok(lead)
}

fn missing_field_message(field: LeadField) -> String {
    format!("{} is required.", field.label())
}
