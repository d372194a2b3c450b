//! Embeddable iframe snippet for the hosted lead form

use crate::config::LeadFormConfig;
use crate::error::{LeadFormError, Result};
use reqwest::Url;
use std::fmt;
use std::str::FromStr;

/// Which hosted form to embed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnippetType {
    #[default]
    ContactUs,
    ListingsContactUs,
}

impl SnippetType {
    /// Value of the hosted API's `snippet_type` parameter
    pub fn api_value(&self) -> &'static str {
        match self {
            SnippetType::ContactUs => "contact",
            SnippetType::ListingsContactUs => "listing",
        }
    }

    pub fn requires_company_id(&self) -> bool {
        matches!(self, SnippetType::ListingsContactUs)
    }
}

impl FromStr for SnippetType {
    type Err = LeadFormError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "contact_us" => Ok(SnippetType::ContactUs),
            "listings_contact_us" => Ok(SnippetType::ListingsContactUs),
            other => Err(LeadFormError::Validation(format!("Unknown snippet type: {}", other))),
        }
    }
}

impl fmt::Display for SnippetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnippetType::ContactUs => write!(f, "contact_us"),
            SnippetType::ListingsContactUs => write!(f, "listings_contact_us"),
        }
    }
}

/// Per-embed values; blanks fall back to the configured defaults
#[derive(Debug, Clone, Default)]
pub struct SnippetRequest {
    pub token: Option<String>,
    pub company_id: Option<String>,
    pub snippet_type: SnippetType,
}

pub struct SnippetBuilder {
    base_url: String,
    default_token: String,
    default_company_id: String,
}

impl SnippetBuilder {
    pub fn new(
        base_url: impl Into<String>,
        default_token: impl Into<String>,
        default_company_id: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            default_token: default_token.into(),
            default_company_id: default_company_id.into(),
        }
    }

    pub fn from_config(config: &LeadFormConfig) -> Self {
        Self::new(
            config.snippet.base_url.clone(),
            config.realnex.api_token.clone(),
            config.snippet.default_company_id.clone(),
        )
    }

    fn pick<'a>(requested: &'a Option<String>, fallback: &'a str) -> &'a str {
        requested
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(fallback)
    }

    /// Hosted form URL for a request
    pub fn url(&self, request: &SnippetRequest) -> Result<Url> {
        let token = Self::pick(&request.token, &self.default_token);
        let company_id = Self::pick(&request.company_id, &self.default_company_id);

        if token.is_empty() {
            return Err(LeadFormError::Validation("RealNex token is required.".to_string()));
        }
        if request.snippet_type.requires_company_id() && company_id.is_empty() {
            return Err(LeadFormError::Validation(
                "Company ID is required for Listings + Contact Us.".to_string()
            ));
        }

        let mut url = Url::parse(&self.base_url)
            .map_err(|e| LeadFormError::Config(format!("Invalid snippet base URL: {}", e)))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("snippet_type", request.snippet_type.api_value());
            query.append_pair("token", token);
            if request.snippet_type.requires_company_id() {
                query.append_pair("company_id", company_id);
            }
        }
        Ok(url)
    }

    /// iframe markup embedding the hosted form
    pub fn render_iframe(&self, request: &SnippetRequest) -> Result<String> {
        let url = self.url(request)?;
        Ok(format!(
            r#"<iframe src="{}" width="100%" height="600" frameborder="0" style="border:0;"></iframe>"#,
            escape_attr(url.as_str())
        ))
    }
}

fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
