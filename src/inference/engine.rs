//! llama.cpp engine
//!
//! Owns the backend and the loaded model (which carries its own tokenizer)
//! and runs one blocking completion per call.

use crate::inference::model::ModelError;
use crate::storage::StorageError;
use crate::system::gpu::ComputePlacement;
use llama_cpp_2::context::params::LlamaContextParams;
use llama_cpp_2::llama_backend::LlamaBackend;
use llama_cpp_2::llama_batch::LlamaBatch;
use llama_cpp_2::model::params::LlamaModelParams;
use llama_cpp_2::model::{AddBos, LlamaModel};
use llama_cpp_2::sampling::LlamaSampler;
use llama_cpp_2::token::LlamaToken;
use llama_cpp_2::TokenToStringError;
use std::num::NonZeroU32;
use std::path::Path;
use std::time::Instant;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Failed to initialize llama backend: {0}")]
    Backend(String),
    #[error("Failed to fetch model: {0}")]
    Fetch(#[from] StorageError),
    #[error("Invalid model file: {0}")]
    InvalidModel(#[from] ModelError),
    #[error("Failed to load model: {0}")]
    Load(String),
    #[error("Failed to create context: {0}")]
    Context(String),
    #[error("Tokenization failed: {0}")]
    Tokenize(String),
    #[error("Prompt of {prompt} tokens plus {budget} new tokens exceeds context of {context}")]
    ContextOverflow {
        prompt: usize,
        budget: usize,
        context: usize,
    },
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Generation task failed: {0}")]
    Task(String),
}

/// Sampling configuration for one completion
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_p: f32,
    pub repeat_penalty: f32,
    pub max_tokens: u32,
    pub seed: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.4,
            top_p: 0.8,
            repeat_penalty: 1.1,
            max_tokens: 256,
            seed: fresh_seed(),
        }
    }
}

impl GenerationParams {
    /// Fixed sampling settings with a caller-supplied token budget.
    pub fn with_budget(max_tokens: u32, seed: Option<u32>) -> Self {
        Self {
            max_tokens,
            seed: seed.unwrap_or_else(fresh_seed),
            ..Self::default()
        }
    }
}

fn fresh_seed() -> u32 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
        .unwrap_or(0)
}

/// Information about a loaded model
#[derive(Debug, Clone)]
pub struct LoadedModelInfo {
    pub name: String,
    pub placement: ComputePlacement,
    pub context_size: u32,
}

pub struct LlamaEngine {
    // Field order matters: the model must drop before the backend.
    model: LlamaModel,
    backend: LlamaBackend,
    info: LoadedModelInfo,
}

impl LlamaEngine {
    /// Initialize llama.cpp and load the GGUF file at `path`.
    ///
    /// Blocking; call from `spawn_blocking`.
    pub fn load(
        path: &Path,
        placement: ComputePlacement,
        context_size: u32,
    ) -> Result<Self, EngineError> {
        let backend = LlamaBackend::init().map_err(|e| EngineError::Backend(e.to_string()))?;

        tracing::info!("Loading model from {:?} on {}", path, placement);
        let started = Instant::now();
        let model_params = LlamaModelParams::default().with_n_gpu_layers(placement.gpu_layers());
        let model = LlamaModel::load_from_file(&backend, path, &model_params)
            .map_err(|e| EngineError::Load(e.to_string()))?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "model".to_string());
        tracing::info!(
            "Model {} loaded on: {} in {:.1}s",
            name,
            placement,
            started.elapsed().as_secs_f32()
        );

        Ok(Self {
            model,
            backend,
            info: LoadedModelInfo {
                name,
                placement,
                context_size,
            },
        })
    }

    pub fn info(&self) -> &LoadedModelInfo {
        &self.info
    }

    /// Complete `prompt` and return only the newly generated text.
    ///
    /// Stops at an end-of-generation token or after `params.max_tokens`
    /// tokens. Special tokens are not rendered. Blocking.
    pub fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, EngineError> {
        let context_size = self.info.context_size;
        let ctx_params = LlamaContextParams::default()
            .with_n_ctx(NonZeroU32::new(context_size))
            .with_n_batch(context_size);
        let mut ctx = self
            .model
            .new_context(&self.backend, ctx_params)
            .map_err(|e| EngineError::Context(e.to_string()))?;

        let tokens = self
            .model
            .str_to_token(prompt, AddBos::Always)
            .map_err(|e| EngineError::Tokenize(e.to_string()))?;
        if tokens.is_empty() {
            return Err(EngineError::Tokenize("prompt produced no tokens".to_string()));
        }

        let budget = params.max_tokens as usize;
        if tokens.len() + budget > context_size as usize {
            return Err(EngineError::ContextOverflow {
                prompt: tokens.len(),
                budget,
                context: context_size as usize,
            });
        }

        let mut batch = LlamaBatch::new(tokens.len(), 1);
        let last_index = tokens.len() as i32 - 1;
        for (i, token) in (0_i32..).zip(tokens.iter()) {
            // Logits are only needed for the last prompt token
            batch
                .add(*token, i, &[0], i == last_index)
                .map_err(|e| EngineError::Decode(e.to_string()))?;
        }
        ctx.decode(&mut batch)
            .map_err(|e| EngineError::Decode(e.to_string()))?;

        let mut sampler = build_sampler(params, penalty_window(tokens.len(), params.max_tokens));
        // The repetition penalty sees the prompt as well as the answer
        sampler.accept_many(&tokens);

        let started = Instant::now();
        let mut decoder = encoding_rs::UTF_8.new_decoder();
        let mut output = String::new();
        let mut n_cur = batch.n_tokens();
        let mut n_generated = 0u32;

        while n_generated < params.max_tokens {
            let token = sampler.sample(&ctx, batch.n_tokens() - 1);
            if self.model.is_eog_token(token) {
                break;
            }

            let bytes = self.piece_bytes(token)?;
            decode_into(&mut decoder, &bytes, &mut output, false);

            batch.clear();
            batch
                .add(token, n_cur, &[0], true)
                .map_err(|e| EngineError::Decode(e.to_string()))?;
            n_cur += 1;
            n_generated += 1;

            ctx.decode(&mut batch)
                .map_err(|e| EngineError::Decode(e.to_string()))?;
        }
        decode_into(&mut decoder, &[], &mut output, true);

        tracing::debug!(
            "Generated {} tokens in {:.2}s",
            n_generated,
            started.elapsed().as_secs_f32()
        );

        Ok(output.trim().to_string())
    }

    fn piece_bytes(&self, token: LlamaToken) -> Result<Vec<u8>, EngineError> {
        match self.model.token_to_piece_bytes(token, PIECE_BUFFER_SIZE, false, None) {
            // llama.cpp reports the required size as a negative count
            Err(TokenToStringError::InsufficientBufferSpace(needed)) => self
                .model
                .token_to_piece_bytes(token, needed.unsigned_abs() as usize, false, None)
                .map_err(|e| EngineError::Decode(e.to_string())),
            other => other.map_err(|e| EngineError::Decode(e.to_string())),
        }
    }
}

const PIECE_BUFFER_SIZE: usize = 64;

/// Append the UTF-8 text for `bytes` to `output`.
///
/// Bytes of a character split across tokens stay buffered in `decoder`
/// until the rest arrives; `last` flushes them as U+FFFD.
fn decode_into(decoder: &mut encoding_rs::Decoder, bytes: &[u8], output: &mut String, last: bool) {
    let needed = decoder
        .max_utf8_buffer_length(bytes.len())
        .unwrap_or(bytes.len() + 4);
    output.reserve(needed);
    let (_, read, _) = decoder.decode_to_string(bytes, output, last);
    debug_assert_eq!(read, bytes.len());
}

/// Repetition penalty window covering the prompt and every new token.
///
/// llama.cpp treats a window of zero or less as "no penalty".
fn penalty_window(prompt_tokens: usize, max_tokens: u32) -> i32 {
    let window = prompt_tokens.saturating_add(max_tokens as usize);
    i32::try_from(window).unwrap_or(i32::MAX).max(1)
}

fn build_sampler(params: &GenerationParams, penalty_last_n: i32) -> LlamaSampler {
    LlamaSampler::chain_simple([
        LlamaSampler::penalties(penalty_last_n, params.repeat_penalty, 0.0, 0.0),
        LlamaSampler::temp(params.temperature),
        LlamaSampler::top_p(params.top_p, 1),
        LlamaSampler::dist(params.seed),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sampling() {
        let params = GenerationParams::default();
        assert_eq!(params.temperature, 0.4);
        assert_eq!(params.top_p, 0.8);
        assert_eq!(params.repeat_penalty, 1.1);
    }

    #[test]
    fn test_penalty_window_covers_whole_sequence() {
        assert_eq!(penalty_window(250, 256), 506);
        assert!(penalty_window(0, 0) > 0);
        assert_eq!(penalty_window(usize::MAX, 512), i32::MAX);
    }

    #[test]
    fn test_decode_keeps_long_pieces() {
        let piece = "\u{4e2d}".repeat(16);
        assert_eq!(piece.len(), 48);

        let mut decoder = encoding_rs::UTF_8.new_decoder();
        let mut output = String::new();
        decode_into(&mut decoder, piece.as_bytes(), &mut output, false);
        assert_eq!(output, piece);
    }

    #[test]
    fn test_decode_joins_split_characters() {
        let bytes = "\u{00e9}t\u{00e9}".as_bytes();
        let mut decoder = encoding_rs::UTF_8.new_decoder();
        let mut output = String::new();
        decode_into(&mut decoder, &bytes[..1], &mut output, false);
        assert_eq!(output, "");
        decode_into(&mut decoder, &bytes[1..], &mut output, false);
        decode_into(&mut decoder, &[], &mut output, true);
        assert_eq!(output, "\u{00e9}t\u{00e9}");
    }

    #[test]
    fn test_decode_flush_keeps_trailing_replacement() {
        let mut decoder = encoding_rs::UTF_8.new_decoder();
        let mut output = String::from("ok");
        output.shrink_to_fit();
        decode_into(&mut decoder, &[0xe4, 0xb8], &mut output, false);
        decode_into(&mut decoder, &[], &mut output, true);
        assert_eq!(output, "ok\u{fffd}");
    }

    #[test]
    fn test_budget_and_seed() {
        let params = GenerationParams::with_budget(128, Some(7));
        assert_eq!(params.max_tokens, 128);
        assert_eq!(params.seed, 7);
        assert_eq!(params.temperature, 0.4);
    }

    #[test]
    fn test_overflow_message() {
        let err = EngineError::ContextOverflow {
            prompt: 300,
            budget: 512,
            context: 512,
        };
        assert_eq!(
            err.to_string(),
            "Prompt of 300 tokens plus 512 new tokens exceeds context of 512"
        );
    }
}
