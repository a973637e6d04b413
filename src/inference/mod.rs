//! LLM inference engine
//!
//! This module handles all interaction with llama-cpp for model loading and inference.

pub mod engine;
pub mod loader;
pub mod model;

// Re-export main types for convenience
pub use engine::{EngineError, GenerationParams, LlamaEngine, LoadedModelInfo};
pub use loader::ModelLoader;
pub use model::{validate_gguf, ModelError, GGUF_MAGIC};
