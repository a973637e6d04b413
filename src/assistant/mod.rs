//! Medical answer generator
//!
//! Glue between the UI and the model: validates the question, fills the
//! prompt template, runs one generation and cleans the result into bullet
//! sentences.

pub mod postprocess;
pub mod prompt;

use crate::inference::{EngineError, GenerationParams, ModelLoader};
use crate::types::request::AnswerRequest;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Returned without touching the model when the question is blank
pub const EMPTY_QUESTION_MESSAGE: &str = "Please enter a medical question.";
/// Returned when nothing survives post-processing
pub const NO_ANSWER_MESSAGE: &str =
    "Unable to generate a response. Please try rephrasing your question.";

#[derive(Debug, Error)]
pub enum AnswerError {
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Anything that can complete a prompt into new text
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Return only the newly generated text, without the prompt.
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, EngineError>;
}

#[async_trait]
impl TextGenerator for ModelLoader {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, EngineError> {
        let engine = self.engine().await?;
        let prompt = prompt.to_string();
        let params = params.clone();
        tokio::task::spawn_blocking(move || engine.generate(&prompt, &params))
            .await
            .map_err(|e| EngineError::Task(e.to_string()))?
    }
}

/// The answer pipeline over a text generator
pub struct Assistant {
    generator: Arc<dyn TextGenerator>,
    seed: Option<u32>,
}

impl Assistant {
    pub fn new(generator: Arc<dyn TextGenerator>, seed: Option<u32>) -> Self {
        Self { generator, seed }
    }

    /// Answer one question as a bulleted block of at most
    /// `request.sentence_count` sentences.
    ///
    /// Generation errors are returned as-is; there is no retry.
    pub async fn answer(&self, request: &AnswerRequest) -> Result<String, AnswerError> {
        if request.is_blank() {
            return Ok(EMPTY_QUESTION_MESSAGE.to_string());
        }

        let prompt = prompt::build_prompt(&request.question, request.sentence_count);
        let params = GenerationParams::with_budget(request.max_tokens, self.seed);

        tracing::info!(
            sentences = request.sentence_count,
            max_tokens = request.max_tokens,
            "Generating answer"
        );
        let raw = self.generator.generate(&prompt, &params).await?;
        tracing::debug!("Raw model output: {:?}", raw);

        match postprocess::postprocess(&raw, request.sentence_count as usize) {
            Some(answer) => Ok(answer),
            None => {
                tracing::warn!("No usable sentences in model output");
                Ok(NO_ANSWER_MESSAGE.to_string())
            }
        }
    }
}
