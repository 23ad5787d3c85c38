//! # Extraction Pipeline
//!
//! Loads one document, renders it into a prompt, and sends the prompt to a
//! completion backend. Each stage runs once and a failure at any stage ends
//! the run with that stage's error.

use crate::{
    errors::ExtractError,
    loader::DocumentLoader,
    prompts::core::render_prompt,
    providers::ai::CompletionBackend,
    types::{CompletionResult, Document, ExtractionOptions},
};
use std::fmt;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Orchestrates a `DocumentLoader` and a `CompletionBackend`.
pub struct ExtractionPipeline {
    pub(crate) loader: Box<dyn DocumentLoader>,
    pub(crate) backend: Box<dyn CompletionBackend>,
}

impl fmt::Debug for ExtractionPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionPipeline")
            .field("loader", &self.loader)
            .field("backend", &self.backend.name())
            .finish()
    }
}

impl ExtractionPipeline {
    pub fn builder() -> ExtractionPipelineBuilder {
        ExtractionPipelineBuilder::new()
    }

    /// Runs the full pipeline for the document at `path`.
    ///
    /// Performs exactly one document load and one backend call. The
    /// completion text is returned as the backend produced it; it is not
    /// checked against the template's output format.
    #[instrument(skip(self, options), fields(backend = %self.backend.name()))]
    pub async fn run(&self, path: &Path, options: &ExtractionOptions) -> CompletionResult {
        let document = self.load(path)?;
        self.complete_document(&document, options).await
    }

    /// Loads and extracts the document text.
    pub fn load(&self, path: &Path) -> Result<Document, ExtractError> {
        info!("Loading document '{}'", path.display());
        let document = self.loader.load(path)?;
        info!(
            pages = document.page_count,
            chars = document.char_count(),
            "Document text extraction complete"
        );
        if document.text.is_empty() {
            warn!(
                "Document '{}' produced no extractable text; continuing with an empty body.",
                path.display()
            );
        }
        Ok(document)
    }

    /// Renders the prompt for an already loaded document without calling the backend.
    pub fn render(&self, document: &Document, options: &ExtractionOptions) -> String {
        render_prompt(&options.template, &document.text, options.max_chars)
    }

    /// Sends an already loaded document to the backend.
    pub async fn complete_document(
        &self,
        document: &Document,
        options: &ExtractionOptions,
    ) -> CompletionResult {
        if !options.generation.is_deterministic() {
            warn!(
                temperature = options.generation.temperature,
                top_p = options.generation.top_p,
                "Generation options are not deterministic; extracted fields may vary between runs"
            );
        }

        let prompt = self.render(document, options);
        if document.char_count() > options.max_chars {
            info!(
                "Document truncated to the first {} of {} characters",
                options.max_chars,
                document.char_count()
            );
        }

        debug!(prompt = %prompt, "--> Sending prompt to completion backend");

        let result = self.backend.complete(&prompt, &options.generation).await?;

        debug!("<-- Completion: {}", &result);
        Ok(result)
    }
}

/// A builder for creating `ExtractionPipeline` instances.
#[derive(Default)]
pub struct ExtractionPipelineBuilder {
    loader: Option<Box<dyn DocumentLoader>>,
    backend: Option<Box<dyn CompletionBackend>>,
}

impl ExtractionPipelineBuilder {
    /// Creates a new `ExtractionPipelineBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the document loader.
    pub fn loader(mut self, loader: Box<dyn DocumentLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Sets the completion backend.
    pub fn backend(mut self, backend: Box<dyn CompletionBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Builds the `ExtractionPipeline`.
    ///
    /// Returns `ExtractError::MissingComponent` if either part was not set.
    pub fn build(self) -> Result<ExtractionPipeline, ExtractError> {
        let loader = self
            .loader
            .ok_or(ExtractError::MissingComponent("document loader"))?;
        let backend = self
            .backend
            .ok_or(ExtractError::MissingComponent("completion backend"))?;
        Ok(ExtractionPipeline { loader, backend })
    }
}
