//! Schema-constrained profile extraction.
//!
//! Flow: build prompt → model call (retried per `RetryPolicy`) → strip fences →
//! parse JSON → fill sentinels → reverse-chronological ordering.
//!
//! Only the model call is retried. A reply that does not parse fails at once.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::llm_client::retry::{retry_with_backoff, RetryError, RetryPolicy, Sleeper};
use crate::llm_client::{strip_json_fences, GenerativeModel, LlmError};
use crate::profile::models::CandidateProfile;
use crate::profile::ordering::order_profile;
use crate::profile::prompts::build_extraction_prompt;
use crate::profile::schema::wb_cv_schema;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Failed to communicate with AI service after {attempts} retries. Last error: {last}")]
    Unavailable { attempts: u32, last: LlmError },

    #[error("AI service rejected the request: {0}")]
    Rejected(LlmError),

    #[error("AI response is not a valid profile: {0}")]
    ResponseParse(#[from] serde_json::Error),

    #[error("AI response contained no text")]
    EmptyResponse,
}

#[derive(Clone)]
pub struct ProfileExtractor {
    model: Arc<dyn GenerativeModel>,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl ProfileExtractor {
    pub fn new(
        model: Arc<dyn GenerativeModel>,
        policy: RetryPolicy,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            model,
            policy,
            sleeper,
        }
    }

    pub async fn extract_profile(&self, cv_text: &str) -> Result<CandidateProfile, ProfileError> {
        let prompt = build_extraction_prompt(cv_text);
        let schema = wb_cv_schema();

        let reply = retry_with_backoff(
            &self.policy,
            self.sleeper.as_ref(),
            LlmError::is_retryable,
            |_| self.model.generate(&prompt, schema),
        )
        .await
        .map_err(|e| match e {
            RetryError::Exhausted { attempts, last } => ProfileError::Unavailable { attempts, last },
            RetryError::Fatal(LlmError::Envelope(e)) => ProfileError::ResponseParse(e),
            RetryError::Fatal(LlmError::EmptyContent) => ProfileError::EmptyResponse,
            RetryError::Fatal(e) => ProfileError::Rejected(e),
        })?;

        let value: serde_json::Value = serde_json::from_str(strip_json_fences(&reply))?;
        let mut profile = CandidateProfile::from_json_lenient(value)?;
        order_profile(&mut profile);

        info!(
            "Extracted CV profile: {} education, {} languages, {} employment, {} projects",
            profile.education.len(),
            profile.languages.len(),
            profile.employment_record.len(),
            profile.work_undertaken.len()
        );

        Ok(profile)
    }
}
