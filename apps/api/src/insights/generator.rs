//! Insight Generator: prompt → LLM (with backoff) → decode → payload, or fallback.
//!
//! `generate` never fails. Whatever goes wrong (overload that outlasts the retries,
//! a permanent API error, unparseable or schema-violating text) is logged and the
//! static fallback payload is returned instead, so the user-facing request succeeds.

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};

use crate::insights::decoder::{decode_insight, DecodeError};
use crate::insights::fallback::fallback_payload;
use crate::insights::prompts::{build_insight_prompt, MarketProfile};
use crate::insights::retry::{retry_with_backoff, RetryPolicy};
use crate::llm_client::{LlmError, TextGenerator};
use crate::models::insight::InsightPayload;

/// Where a generated payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightSource {
    Model,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct GeneratedInsight {
    pub payload: InsightPayload,
    pub source: InsightSource,
}

#[derive(Debug, Error)]
enum GenerationError {
    #[error("generation call failed: {0}")]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

pub struct InsightGenerator {
    client: Arc<dyn TextGenerator>,
    policy: RetryPolicy,
    market: MarketProfile,
}

impl InsightGenerator {
    pub fn new(client: Arc<dyn TextGenerator>, policy: RetryPolicy, market: MarketProfile) -> Self {
        Self {
            client,
            policy,
            market,
        }
    }

    /// Produces an unpersisted insight payload for `industry`. Infallible.
    pub async fn generate(&self, industry: &str) -> GeneratedInsight {
        match self.try_generate(industry).await {
            Ok(payload) => {
                info!(
                    "Generated insight for industry '{}' ({} salary ranges)",
                    industry,
                    payload.salary_ranges.len()
                );
                GeneratedInsight {
                    payload,
                    source: InsightSource::Model,
                }
            }
            Err(e) => {
                error!("Failed to generate insight for industry '{industry}', using fallback data: {e}");
                GeneratedInsight {
                    payload: fallback_payload(),
                    source: InsightSource::Fallback,
                }
            }
        }
    }

    async fn try_generate(&self, industry: &str) -> Result<InsightPayload, GenerationError> {
        let prompt = build_insight_prompt(industry, &self.market);
        let text = retry_with_backoff(&self.policy, || self.client.generate_text(&prompt)).await?;
        Ok(decode_insight(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::Instant;

    use super::*;
    use crate::insights::decoder::validate_payload;
    use crate::testing::{model_response, overloaded, FakeTextGenerator};

    fn generator(fake: Arc<FakeTextGenerator>) -> InsightGenerator {
        InsightGenerator::new(fake, RetryPolicy::default(), MarketProfile::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_model_response_is_used_when_valid() {
        let fake = Arc::new(FakeTextGenerator::new(vec![Ok(model_response())]));
        let generated = generator(fake.clone()).generate("healthcare").await;

        assert_eq!(generated.source, InsightSource::Model);
        assert_eq!(generated.payload.top_skills[0], "Clinical Research");
        assert_eq!(fake.calls(), 1);
        assert!(fake.prompts()[0].contains("healthcare industry in India"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fenced_model_response_is_used() {
        let fenced = format!("```json\n{}\n```", model_response());
        let fake = Arc::new(FakeTextGenerator::new(vec![Ok(fenced)]));
        let generated = generator(fake).generate("healthcare").await;

        assert_eq!(generated.source, InsightSource::Model);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overload_twice_then_success_backs_off_and_uses_model() {
        let fake = Arc::new(FakeTextGenerator::new(vec![
            Err(overloaded()),
            Err(overloaded()),
            Ok(model_response()),
        ]));
        let start = Instant::now();
        let generated = generator(fake.clone()).generate("healthcare").await;

        assert_eq!(generated.source, InsightSource::Model);
        assert_eq!(fake.calls(), 3);
        assert_eq!(start.elapsed(), Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_error_falls_back_immediately() {
        let fake = Arc::new(FakeTextGenerator::new(vec![Err(LlmError::Api {
            status: 403,
            message: "API key not valid".to_string(),
        })]));
        let start = Instant::now();
        let generated = generator(fake.clone()).generate("healthcare").await;

        assert_eq!(generated.source, InsightSource::Fallback);
        assert_eq!(generated.payload, fallback_payload());
        assert_eq!(fake.calls(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_overloads_fall_back() {
        let fake = Arc::new(FakeTextGenerator::new(vec![
            Err(overloaded()),
            Err(overloaded()),
            Err(overloaded()),
        ]));
        let generated = generator(fake.clone()).generate("healthcare").await;

        assert_eq!(generated.source, InsightSource::Fallback);
        assert_eq!(fake.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_json_falls_back_without_retry() {
        let fake = Arc::new(FakeTextGenerator::new(vec![Ok(
            "{\"salaryRanges\": [".to_string()
        )]));
        let generated = generator(fake.clone()).generate("healthcare").await;

        assert_eq!(generated.source, InsightSource::Fallback);
        assert_eq!(fake.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_schema_violation_falls_back() {
        let mut value: serde_json::Value = serde_json::from_str(&model_response()).unwrap();
        value["salaryRanges"].as_array_mut().unwrap().truncate(2);
        let fake = Arc::new(FakeTextGenerator::new(vec![Ok(value.to_string())]));
        let generated = generator(fake).generate("healthcare").await;

        assert_eq!(generated.source, InsightSource::Fallback);
    }

    #[tokio::test(start_paused = true)]
    async fn test_output_is_always_schema_valid() {
        let scripts = vec![
            vec![Ok(model_response())],
            vec![Ok("not json".to_string())],
            vec![Err(LlmError::EmptyContent)],
            vec![Err(overloaded()), Ok(model_response())],
        ];
        for script in scripts {
            let fake = Arc::new(FakeTextGenerator::new(script));
            let generated = generator(fake).generate("retail").await;
            validate_payload(&generated.payload).unwrap();
        }
    }
}
