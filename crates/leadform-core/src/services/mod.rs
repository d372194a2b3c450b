//! Service modules for form handling

pub mod sanitizer;
pub mod snippet;

// Re-export service types
pub use sanitizer::{sanitize_input, sanitize_lead, validate_lead, is_valid_email};
pub use snippet::{SnippetBuilder, SnippetRequest, SnippetType};
