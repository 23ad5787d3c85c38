//! # Single-Document Field Extraction
//!
//! This crate loads one document, embeds its leading text into a fixed
//! instruction prompt, and asks a completion backend (the hosted Gemini API or
//! a local Ollama server) to emit a single structured line.
//!
//! The document format lives behind the [`DocumentLoader`] trait; the PDF
//! implementation is provided by the `docextract-pdf` crate.

pub mod constants;
pub mod errors;
pub mod loader;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod providers;
pub mod types;

pub use errors::ExtractError;
pub use loader::DocumentLoader;
pub use pipeline::{ExtractionPipeline, ExtractionPipelineBuilder};
pub use providers::ai::CompletionBackend;
pub use types::{
    CompletionResult, Document, ExtractionOptions, GenerationOptions, ProviderConfig,
};
