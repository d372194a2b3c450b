//! Configuration management for the lead form system

use serde::{Deserialize, Serialize};
use crate::error::{LeadFormError, Result};
use crate::types::LeadField;
use std::path::Path;
use std::time::Duration;

/// Raw configuration structure matching the settings file exactly
#[derive(Debug, Deserialize)]
struct RawConfig {
    pub realnex: RealNexConfig,

    // Blank secrets are how an unconfigured spam check is stored
    #[serde(default)]
    pub recaptcha: Option<RawRecaptchaConfig>,

    #[serde(default)]
    pub fields: FieldConfig,

    #[serde(default = "default_success_message")]
    pub success_message: String,

    #[serde(default)]
    pub snippet: SnippetConfig,

    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
struct RawRecaptchaConfig {
    #[serde(default)]
    pub site_key: String,
    #[serde(default)]
    pub secret_key: String,
    #[serde(default = "default_recaptcha_verify_url")]
    pub verify_url: String,
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadFormConfig {
    pub realnex: RealNexConfig,
    pub recaptcha: Option<RecaptchaConfig>,
    pub fields: FieldConfig,
    pub success_message: String,
    pub snippet: SnippetConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealNexConfig {
    #[serde(alias = "token")]  // Accept both 'api_token' and 'token'
    pub api_token: String,

    #[serde(alias = "url", default = "default_realnex_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecaptchaConfig {
    pub site_key: String,
    pub secret_key: String,
    pub verify_url: String,
}

/// Show/required flags for a single form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSetting {
    pub show: bool,
    pub required: bool,
}

impl Default for FieldSetting {
    fn default() -> Self {
        Self { show: true, required: false }
    }
}

impl FieldSetting {
    fn required() -> Self {
        Self { show: true, required: true }
    }
}

/// Per-field form configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub first_name: FieldSetting,
    pub last_name: FieldSetting,
    pub email: FieldSetting,
    pub phone: FieldSetting,
    pub company: FieldSetting,
    pub address: FieldSetting,
    pub comments: FieldSetting,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            first_name: FieldSetting::required(),
            last_name: FieldSetting::required(),
            email: FieldSetting::required(),
            phone: FieldSetting::default(),
            company: FieldSetting::default(),
            address: FieldSetting::default(),
            comments: FieldSetting::default(),
        }
    }
}

impl FieldConfig {
    pub fn setting(&self, field: LeadField) -> FieldSetting {
        match field {
            LeadField::FirstName => self.first_name,
            LeadField::LastName => self.last_name,
            LeadField::Email => self.email,
            LeadField::Phone => self.phone,
            LeadField::Company => self.company,
            LeadField::Address => self.address,
            LeadField::Comments => self.comments,
        }
    }

    /// Whether a submission must carry a value for this field.
    /// Email is always enforced; hidden fields never are.
    pub fn is_enforced(&self, field: LeadField) -> bool {
        if field == LeadField::Email {
            return true;
        }
        let setting = self.setting(field);
        setting.show && setting.required
    }

    /// Fields that must be non-empty, in form order
    pub fn enforced_fields(&self) -> impl Iterator<Item = LeadField> + '_ {
        LeadField::ALL.into_iter().filter(move |f| self.is_enforced(*f))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnippetConfig {
    pub base_url: String,
    pub default_company_id: String,
}

impl Default for SnippetConfig {
    fn default() -> Self {
        Self {
            base_url: default_snippet_base_url(),
            default_company_id: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 10 }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Secrets the submission workflow runs with
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_token: String,
    pub spam_secret_key: Option<String>,
}

impl Credentials {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            spam_secret_key: None,
        }
    }

    pub fn with_spam_secret(mut self, secret: impl Into<String>) -> Self {
        let secret = secret.into();
        self.spam_secret_key = if secret.trim().is_empty() { None } else { Some(secret) };
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_token.trim().is_empty() {
            return Err(LeadFormError::Config("RealNex API token is required".to_string()));
        }
        Ok(())
    }
}

// Secrets stay out of logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_token", &"<redacted>")
            .field("spam_secret_key", &self.spam_secret_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

// Default functions
fn default_success_message() -> String {
    "Thank you! Your information has been submitted.".to_string()
}

fn default_realnex_base_url() -> String {
    "https://sync.realnex.com/api/v1/Crm".to_string()
}

/// Google's siteverify endpoint
pub const DEFAULT_RECAPTCHA_VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

fn default_recaptcha_verify_url() -> String {
    DEFAULT_RECAPTCHA_VERIFY_URL.to_string()
}

fn default_snippet_base_url() -> String {
    "https://realnex-lead-form-api.onrender.com/snippet".to_string()
}

impl LeadFormConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_file_with_token(path, None)
    }

    /// Load configuration from a JSON file, letting a non-blank token replace the configured one
    ///
    /// The override is applied before validation, so a file without a token is
    /// accepted when the caller supplies one.
    pub fn from_file_with_token<P: AsRef<Path>>(path: P, token: Option<&str>) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| LeadFormError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_json_str_with_token(&content, token)
    }

    /// Load configuration from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_json_str_with_token(json, None)
    }

    /// Load configuration from a JSON string with an optional token override
    pub fn from_json_str_with_token(json: &str, token: Option<&str>) -> Result<Self> {
        let raw_config: RawConfig = serde_json::from_str(json)
            .map_err(|e| LeadFormError::Config(format!("Failed to parse config: {}", e)))?;

        let mut config = Self::from_raw_config(raw_config);
        if let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) {
            config.realnex.api_token = token.to_string();
        }
        config.validate()?;
        Ok(config)
    }

    /// Convert raw config to structured config, dropping a spam check without a secret
    fn from_raw_config(raw: RawConfig) -> Self {
        let recaptcha = raw.recaptcha
            .filter(|r| !r.secret_key.trim().is_empty())
            .map(|r| RecaptchaConfig {
                site_key: r.site_key,
                secret_key: r.secret_key,
                verify_url: r.verify_url,
            });

        Self {
            realnex: raw.realnex,
            recaptcha,
            fields: raw.fields,
            success_message: raw.success_message,
            snippet: raw.snippet,
            http: raw.http,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.realnex.api_token.trim().is_empty() {
            return Err(LeadFormError::Config("RealNex API token is required".to_string()));
        }

        if self.realnex.base_url.trim().is_empty() {
            return Err(LeadFormError::Config("RealNex base URL is required".to_string()));
        }

        if self.http.timeout_secs == 0 {
            return Err(LeadFormError::Config("HTTP timeout must be greater than zero".to_string()));
        }

        Ok(())
    }

    /// Credentials for the submission workflow
    pub fn credentials(&self) -> Credentials {
        let credentials = Credentials::new(self.realnex.api_token.clone());
        match &self.recaptcha {
            Some(recaptcha) => credentials.with_spam_secret(recaptcha.secret_key.clone()),
            None => credentials,
        }
    }

    pub fn spam_check_enabled(&self) -> bool {
        self.recaptcha.is_some()
    }
}
