//! reCAPTCHA verification client

use crate::config::{HttpConfig, RecaptchaConfig};
use crate::error::{LeadFormError, Result};
use reqwest::Client as HttpClient;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    #[serde(default)]
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

pub struct RecaptchaClient {
    http_client: HttpClient,
    verify_url: String,
}

impl RecaptchaClient {
    pub fn new(verify_url: impl Into<String>, http: &HttpConfig) -> Result<Self> {
        let http_client = HttpClient::builder()
            .timeout(http.timeout())
            .build()
            .map_err(|e| LeadFormError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            verify_url: verify_url.into(),
        })
    }

    pub fn from_config(config: &RecaptchaConfig, http: &HttpConfig) -> Result<Self> {
        Self::new(config.verify_url.clone(), http)
    }

    /// Verify a challenge response. Anything short of an explicit
    /// `success: true` from the remote service is a rejection.
    pub async fn verify(&self, secret: &str, response_token: &str) -> bool {
        if response_token.trim().is_empty() {
            log::warn!("reCAPTCHA response token missing");
            return false;
        }

        match self.request_verification(secret, response_token).await {
            Ok(true) => true,
            Ok(false) => false,
            Err(e) => {
                log::error!("reCAPTCHA verification request failed: {}", e);
                false
            }
        }
    }

    async fn request_verification(&self, secret: &str, response_token: &str) -> Result<bool> {
        let response = self.http_client
            .post(&self.verify_url)
            .form(&[("secret", secret), ("response", response_token)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LeadFormError::ServiceUnavailable(
                format!("reCAPTCHA verify endpoint returned {}", response.status())
            ));
        }

        let body: VerifyResponse = response.json().await?;
        if !body.success {
            log::warn!("reCAPTCHA rejected submission: {:?}", body.error_codes);
        }
        Ok(body.success)
    }
}
