use leadform_core::config::{LeadFormConfig, DEFAULT_RECAPTCHA_VERIFY_URL};
use leadform_core::types::LeadField;
use std::io::Write;

#[test]
fn test_parse_full_settings_json() {
    let json = r#"{
        "realnex": {
            "token": "test_token",
            "url": "https://sandbox.realnex.com/api/v1/Crm"
        },
        "recaptcha": {
            "site_key": "site",
            "secret_key": "secret"
        },
        "fields": {
            "phone": { "show": true, "required": true },
            "comments": { "show": false, "required": false }
        },
        "success_message": "Thanks!",
        "snippet": {
            "default_company_id": "42"
        },
        "http": {
            "timeout_secs": 5
        }
    }"#;

    let config = LeadFormConfig::from_json_str(json).expect("Failed to parse config");

    assert_eq!(config.realnex.api_token, "test_token", "token should map to api_token");
    assert_eq!(config.realnex.base_url, "https://sandbox.realnex.com/api/v1/Crm", "url should map to base_url");

    let recaptcha = config.recaptcha.as_ref().expect("reCAPTCHA should be configured");
    assert_eq!(recaptcha.site_key, "site");
    assert_eq!(recaptcha.verify_url, DEFAULT_RECAPTCHA_VERIFY_URL);

    assert!(config.fields.is_enforced(LeadField::Phone));
    assert!(!config.fields.setting(LeadField::Comments).show);
    // Unlisted fields keep their defaults
    assert!(config.fields.is_enforced(LeadField::FirstName));

    assert_eq!(config.success_message, "Thanks!");
    assert_eq!(config.snippet.default_company_id, "42");
    assert_eq!(config.snippet.base_url, "https://realnex-lead-form-api.onrender.com/snippet");
    assert_eq!(config.http.timeout_secs, 5);

    let credentials = config.credentials();
    assert_eq!(credentials.api_token, "test_token");
    assert_eq!(credentials.spam_secret_key.as_deref(), Some("secret"));
}

#[test]
fn test_parse_minimal_config() {
    let json = r#"{ "realnex": { "api_token": "key" } }"#;

    let config = LeadFormConfig::from_json_str(json).expect("Failed to parse minimal config");

    assert_eq!(config.realnex.base_url, "https://sync.realnex.com/api/v1/Crm", "Default RealNex base URL");
    assert!(config.recaptcha.is_none());
    assert!(!config.spam_check_enabled());
    assert_eq!(config.http.timeout_secs, 10);
    assert_eq!(config.success_message, "Thank you! Your information has been submitted.");

    let enforced: Vec<LeadField> = config.fields.enforced_fields().collect();
    assert_eq!(enforced, vec![LeadField::FirstName, LeadField::LastName, LeadField::Email]);
}

#[test]
fn test_blank_recaptcha_secret_disables_spam_check() {
    let json = r#"{
        "realnex": { "api_token": "key" },
        "recaptcha": { "site_key": "site", "secret_key": "  " }
    }"#;

    let config = LeadFormConfig::from_json_str(json).unwrap();

    assert!(config.recaptcha.is_none());
    assert_eq!(config.credentials().spam_secret_key, None);
}

#[test]
fn test_validate_config() {
    let json = r#"{ "realnex": { "api_token": "" } }"#;

    let result = LeadFormConfig::from_json_str(json);
    assert!(result.is_err(), "Parsing should fail with an empty API token");
    assert!(result.unwrap_err().to_string().contains("required"), "Error should mention required fields");

    let json = r#"{ "realnex": { "api_token": "key" }, "http": { "timeout_secs": 0 } }"#;
    assert!(LeadFormConfig::from_json_str(json).is_err(), "Zero timeout should be rejected");
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{ "realnex": {{ "api_token": "from-file" }} }}"#).unwrap();

    let config = LeadFormConfig::from_file(file.path()).unwrap();
    assert_eq!(config.realnex.api_token, "from-file");

    let missing = LeadFormConfig::from_file("/nonexistent/leadform.json");
    assert!(missing.unwrap_err().to_string().contains("Failed to read config file"));
}

#[test]
fn test_token_override_fills_blank_config_token() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{ "realnex": {{ "api_token": "" }} }}"#).unwrap();

    let config = LeadFormConfig::from_file_with_token(file.path(), Some("per-embed")).unwrap();
    assert_eq!(config.realnex.api_token, "per-embed");

    // A blank override falls back to the configured token, which is also blank
    let result = LeadFormConfig::from_file_with_token(file.path(), Some("  "));
    assert!(result.unwrap_err().to_string().contains("required"));

    let config = LeadFormConfig::from_json_str_with_token(r#"{ "realnex": { "api_token": "default" } }"#, Some("override"))
        .unwrap();
    assert_eq!(config.realnex.api_token, "override");
}

#[test]
fn test_credentials_debug_redacts_secrets() {
    let json = r#"{
        "realnex": { "api_token": "super-secret-token" },
        "recaptcha": { "secret_key": "captcha-secret" }
    }"#;
    let config = LeadFormConfig::from_json_str(json).unwrap();

    let debug = format!("{:?}", config.credentials());
    assert!(!debug.contains("super-secret-token"));
    assert!(!debug.contains("captcha-secret"));
}
