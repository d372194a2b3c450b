//! Rendering submission outcomes for the page that posted the form

use anyhow::{Context, Result};
use leadform_core::SubmissionOutcome;
use reqwest::Url;

const STATUS_PARAM: &str = "status";
const MESSAGE_PARAM: &str = "message";

/// Query parameters describing an outcome: `status=success` or `status=error&message=...`
fn outcome_params(outcome: &SubmissionOutcome) -> Vec<(&'static str, String)> {
    match outcome {
        SubmissionOutcome::Succeeded(_) => vec![(STATUS_PARAM, "success".to_string())],
        SubmissionOutcome::Failed(failure) => vec![
            (STATUS_PARAM, "error".to_string()),
            (MESSAGE_PARAM, failure.reason.clone()),
        ],
    }
}

/// Redirect target for the form page, replacing any earlier status/message
pub fn redirect_location(base: &str, outcome: &SubmissionOutcome) -> Result<String> {
    let mut url = Url::parse(base).with_context(|| format!("Invalid redirect URL: {}", base))?;

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != STATUS_PARAM && k != MESSAGE_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    url.set_query(None);
    {
        let mut query = url.query_pairs_mut();
        for (k, v) in &kept {
            query.append_pair(k, v);
        }
        for (k, v) in outcome_params(outcome) {
            query.append_pair(k, &v);
        }
    }

    Ok(url.to_string())
}

/// Bare query string, for callers that build their own redirect
pub fn status_query(outcome: &SubmissionOutcome) -> String {
    let mut url = Url::parse("http://localhost/").expect("static URL is valid");
    url.query_pairs_mut().extend_pairs(outcome_params(outcome));
    url.query().unwrap_or_default().to_string()
}

/// Message shown inline to the visitor
pub fn user_message<'a>(outcome: &'a SubmissionOutcome, success_message: &'a str) -> &'a str {
    outcome.reason().unwrap_or(success_message)
}
