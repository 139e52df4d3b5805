//! Default `ResumeGenerator`: a single completion request through `LlmClient`.

use std::time::Instant;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::generation::prompts::{build_resume_prompt, RESUME_SYSTEM};
use crate::generation::{
    GenerationError, GenerationOutcome, GenerationStats, ResumeGenerator,
};
use crate::llm_client::LlmClient;

pub struct LlmResumeGenerator {
    llm: LlmClient,
}

impl LlmResumeGenerator {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ResumeGenerator for LlmResumeGenerator {
    async fn generate(&self, about_me: &str) -> Result<GenerationOutcome, GenerationError> {
        let started = Instant::now();
        let completion = self
            .llm
            .complete(RESUME_SYSTEM, &build_resume_prompt(about_me))
            .await?;

        let stats = GenerationStats {
            input_tokens: completion.usage.input_tokens,
            output_tokens: completion.usage.output_tokens,
            duration_ms: started.elapsed().as_millis() as u64,
        };

        let markdown = completion.text.trim();
        if markdown.is_empty() {
            warn!(stop_reason = ?completion.stop_reason, "generator produced no resume");
            return Ok(GenerationOutcome::blocked(stats));
        }

        info!(
            output_tokens = stats.output_tokens,
            duration_ms = stats.duration_ms,
            "resume generated"
        );
        Ok(GenerationOutcome::finished(markdown.to_string(), stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::generation::GenerationStatus;

    async fn generator_with_reply(server: &MockServer, text: &str) -> LlmResumeGenerator {
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"type": "text", "text": text}],
                "usage": {"input_tokens": 11, "output_tokens": 22}
            })))
            .mount(server)
            .await;
        LlmResumeGenerator::new(LlmClient::with_endpoint("key".into(), server.uri()).unwrap())
    }

    #[tokio::test]
    async fn test_finished_outcome_carries_markdown_and_usage() {
        let server = MockServer::start().await;
        let generator = generator_with_reply(&server, "\n# Alex Navarro\n").await;

        let outcome = generator.generate("Go developer for 6 years").await.unwrap();
        assert_eq!(outcome.status, GenerationStatus::Finished);
        assert_eq!(outcome.result.as_deref(), Some("# Alex Navarro"));
        assert_eq!(outcome.stats.input_tokens, 11);
        assert_eq!(outcome.stats.output_tokens, 22);
    }

    #[tokio::test]
    async fn test_empty_reply_is_blocked() {
        let server = MockServer::start().await;
        let generator = generator_with_reply(&server, "   ").await;

        let outcome = generator.generate("asdf").await.unwrap();
        assert_eq!(outcome.status, GenerationStatus::Blocked);
        assert!(outcome.result.is_none());
    }
}
