use docextract::{
    loader::DocumentLoader, CompletionBackend, CompletionResult, Document, ExtractError,
    GenerationOptions,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

// --- Mock Completion Backend ---

/// A scripted response for [`MockBackend`].
#[derive(Clone, Debug)]
enum Scripted {
    Text(String),
    Failure(fn() -> ExtractError),
}

/// A completion backend that returns canned responses and records every call.
#[derive(Clone, Debug)]
pub struct MockBackend {
    response: Arc<Mutex<Scripted>>,
    calls: Arc<Mutex<Vec<(String, GenerationOptions)>>>,
}

impl MockBackend {
    /// A backend that always answers with `response`.
    pub fn with_response(response: &str) -> Self {
        Self {
            response: Arc::new(Mutex::new(Scripted::Text(response.to_string()))),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A backend that always fails with the error built by `make_error`.
    pub fn failing(make_error: fn() -> ExtractError) -> Self {
        Self {
            response: Arc::new(Mutex::new(Scripted::Failure(make_error))),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Retrieves the recorded calls (prompt, options) for assertion.
    pub fn get_calls(&self) -> Vec<(String, GenerationOptions)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionBackend for MockBackend {
    async fn complete(&self, prompt: &str, options: &GenerationOptions) -> CompletionResult {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), *options));

        match &*self.response.lock().unwrap() {
            Scripted::Text(text) => Ok(text.clone()),
            Scripted::Failure(make_error) => Err(make_error()),
        }
    }

    fn name(&self) -> String {
        "mock".to_string()
    }
}

// --- Mock Document Loader ---

/// A loader serving in-memory pages keyed by path.
///
/// Unknown paths behave like missing files. Pages are concatenated in order,
/// the same way a real loader joins page text.
#[derive(Clone, Debug, Default)]
pub struct MockLoader {
    documents: Arc<Mutex<HashMap<PathBuf, Vec<String>>>>,
    loads: Arc<Mutex<usize>>,
}

impl MockLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a document made of the given page texts.
    pub fn add_document(&self, path: impl AsRef<Path>, pages: &[&str]) {
        self.documents.lock().unwrap().insert(
            path.as_ref().to_path_buf(),
            pages.iter().map(|p| p.to_string()).collect(),
        );
    }

    /// Number of times `load` has been called.
    pub fn load_count(&self) -> usize {
        *self.loads.lock().unwrap()
    }
}

impl DocumentLoader for MockLoader {
    fn load(&self, path: &Path) -> Result<Document, ExtractError> {
        *self.loads.lock().unwrap() += 1;
        let documents = self.documents.lock().unwrap();
        let pages = documents
            .get(path)
            .ok_or_else(|| ExtractError::FileNotFound(path.to_path_buf()))?;
        Ok(Document::new(path, pages.concat(), pages.len()))
    }
}

// --- Test-Specific Helpers ---
#[cfg(feature = "pdf")]
pub mod helpers {
    use anyhow::Result;
    use printpdf::{
        BuiltinFont, Layer, Mm, Op, ParsedFont, PdfDocument, PdfPage, PdfSaveOptions, Pt, TextItem,
        TextMatrix, TextRenderingMode,
    };

    /// Generates a simple, single-page PDF with the given text content, compatible with printpdf v0.8.2.
    pub fn generate_test_pdf(text: &str) -> Result<Vec<u8>> {
        generate_multi_page_pdf(&[text])
    }

    /// Generates a PDF with one page per entry of `pages`, each showing its text
    /// in an embedded (Type0) font.
    pub fn generate_multi_page_pdf(pages: &[&str]) -> Result<Vec<u8>> {
        let mut doc = PdfDocument::new("Test PDF");
        let layer_def = Layer::new("Layer 1");
        let layer_id = doc.add_layer(&layer_def);

        let font_bytes = BuiltinFont::Helvetica.get_subset_font().bytes;
        let font = ParsedFont::from_bytes(&font_bytes, 0, &mut Vec::new())
            .ok_or_else(|| anyhow::anyhow!("Failed to parse built-in font"))?;
        let font_id = doc.add_font(&font);

        for text in pages {
            let mut page = PdfPage::new(Mm(210.0), Mm(297.0), vec![]);
            page.ops = vec![
                Op::BeginLayer {
                    layer_id: layer_id.clone(),
                },
                Op::SetFontSize {
                    size: Pt(12.0),
                    font: font_id.clone(),
                },
                Op::StartTextSection,
                Op::SetTextMatrix {
                    matrix: TextMatrix::Translate(Mm(10.0).into(), Mm(280.0).into()),
                },
                Op::SetTextRenderingMode {
                    mode: TextRenderingMode::Fill,
                },
                Op::WriteText {
                    items: vec![TextItem::Text(text.to_string())],
                    font: font_id.clone(),
                },
                Op::EndTextSection,
                Op::EndLayer {
                    layer_id: layer_id.clone(),
                },
            ];
            doc.pages.push(page);
        }

        Ok(save(&doc))
    }

    /// Generates a PDF of `pages` pages that contain no text at all.
    pub fn generate_blank_pdf(pages: usize) -> Vec<u8> {
        let mut doc = PdfDocument::new("Blank PDF");
        for _ in 0..pages {
            doc.pages.push(PdfPage::new(Mm(210.0), Mm(297.0), vec![]));
        }
        save(&doc)
    }

    fn save(doc: &PdfDocument) -> Vec<u8> {
        let mut warnings = Vec::new();
        let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            // In a test context, it's fine to just print warnings.
            eprintln!("PDF generation warnings: {warnings:?}");
        }
        bytes
    }
}
