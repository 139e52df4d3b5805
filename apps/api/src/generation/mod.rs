//! Resume generation: turns free-text "about me" input into a markdown resume.
//!
//! Handlers depend only on the `ResumeGenerator` trait. `AppState` holds an
//! `Arc<dyn ResumeGenerator>`, so the LLM-backed default can be swapped
//! without touching the HTTP layer.

pub mod generator;
pub mod prompts;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm_client::LlmError;

pub use generator::LlmResumeGenerator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GenerationStatus {
    Finished,
    /// The generator ran but could not produce a resume from the input.
    Blocked,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub status: GenerationStatus,
    /// Markdown resume; present only when `status` is `Finished`.
    pub result: Option<String>,
    pub stats: GenerationStats,
}

impl GenerationOutcome {
    pub fn finished(result: String, stats: GenerationStats) -> Self {
        Self {
            status: GenerationStatus::Finished,
            result: Some(result),
            stats,
        }
    }

    pub fn blocked(stats: GenerationStats) -> Self {
        Self {
            status: GenerationStatus::Blocked,
            result: None,
            stats,
        }
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
}

#[async_trait]
pub trait ResumeGenerator: Send + Sync {
    async fn generate(&self, about_me: &str) -> Result<GenerationOutcome, GenerationError>;
}
