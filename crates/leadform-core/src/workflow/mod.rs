//! Lead submission workflow

pub mod outcome;
pub mod traits;
pub mod orchestrator;

pub use outcome::*;
pub use traits::{CrmApi, SpamVerifier};
pub use orchestrator::LeadWorkflow;
