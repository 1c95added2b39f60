use crate::config::Config;
use crate::extraction::TextExtractor;
use crate::profile::extractor::ProfileExtractor;

/// Shared application state injected into all route handlers via Axum extractors.
/// Immutable after startup; requests share nothing else.
#[derive(Clone)]
pub struct AppState {
    pub text_extractor: TextExtractor,
    pub profile_extractor: ProfileExtractor,
    pub config: Config,
}

#[cfg(test)]
impl AppState {
    /// State wired to a scripted model and a sleeper that never waits.
    pub fn for_tests(model: std::sync::Arc<crate::llm_client::testing::ScriptedModel>) -> Self {
        use std::sync::Arc;

        use crate::llm_client::retry::{testing::RecordingSleeper, RetryPolicy};

        let config = Config::for_tests();
        AppState {
            text_extractor: TextExtractor::new(config.doc_converter.clone()),
            profile_extractor: ProfileExtractor::new(
                model,
                RetryPolicy::default(),
                Arc::new(RecordingSleeper::default()),
            ),
            config,
        }
    }
}
