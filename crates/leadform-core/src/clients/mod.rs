//! Client modules for external services

pub mod realnex;
pub mod recaptcha;

// Re-export all client types
pub use realnex::RealNexClient;
pub use recaptcha::RecaptchaClient;
