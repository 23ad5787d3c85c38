//! # docextract-pdf: PDF Document Loader
//!
//! This crate provides the PDF implementation of the `DocumentLoader` trait
//! from `docextract`, built on `lopdf`.

use docextract::{loader::DocumentLoader, Document, ExtractError};
use lopdf::content::{Content, Operation};
use lopdf::{Encoding, Object, ObjectId};
use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, instrument};

// --- Error Definitions ---

#[derive(Error, Debug)]
enum PdfLoadError {
    #[error("failed to read file: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse PDF content: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("PDF is encrypted and cannot be processed")]
    Encrypted,
}

impl PdfLoadError {
    fn into_extract_error(self, path: &Path) -> ExtractError {
        match self {
            PdfLoadError::Io(e) if e.kind() == io::ErrorKind::NotFound => {
                ExtractError::FileNotFound(path.to_path_buf())
            }
            other => ExtractError::ParseFailure {
                path: path.to_path_buf(),
                message: root_cause(&other),
            },
        }
    }
}

/// The innermost error's message, on one line.
fn root_cause(err: &(dyn std::error::Error + 'static)) -> String {
    let mut current = err;
    while let Some(source) = current.source() {
        current = source;
    }
    let message = current.to_string();
    message.lines().next().unwrap_or_default().trim().to_string()
}

// --- Core Extraction Logic ---

/// Extracts the text of every page, in page order.
///
/// Returns the concatenated text and the page count.
fn extract_text_from_pdf(pdf_data: &[u8]) -> Result<(String, usize), PdfLoadError> {
    let doc = lopdf::Document::load_mem(pdf_data)?;
    if doc.is_encrypted() {
        return Err(PdfLoadError::Encrypted);
    }

    let pages = doc.get_pages();
    let mut full_text = String::new();
    for (page_num, page_id) in &pages {
        let page_text = extract_page_text(&doc, *page_id)?;
        debug!(
            page = page_num,
            chars = page_text.chars().count(),
            "extracted page text"
        );
        full_text.push_str(&page_text);
    }

    Ok((full_text, pages.len()))
}

/// Walks one page's content stream, decoding shown strings through the
/// encoding (or `ToUnicode` map) of the font selected by the last `Tf`.
///
/// Ends of text objects and vertical moves become line breaks. Pages
/// without text-showing operators yield an empty string.
fn extract_page_text(doc: &lopdf::Document, page_id: ObjectId) -> Result<String, PdfLoadError> {
    let encodings: BTreeMap<Vec<u8>, Encoding> = doc
        .get_page_fonts(page_id)?
        .into_iter()
        .filter_map(|(name, font)| match font.get_font_encoding(doc) {
            Ok(encoding) => Some((name, encoding)),
            Err(e) => {
                debug!(font = %String::from_utf8_lossy(&name), "unsupported font encoding: {e}");
                None
            }
        })
        .collect();

    let content = Content::decode(&doc.get_page_content(page_id)?)?;
    let mut text = String::new();
    let mut encoding: Option<&Encoding> = None;

    for op in &content.operations {
        match op.operator.as_str() {
            "Tf" => {
                encoding = op
                    .operands
                    .first()
                    .and_then(|name| name.as_name().ok())
                    .and_then(|name| encodings.get(name));
            }
            "Tj" | "TJ" => show_text(&mut text, encoding, &op.operands)?,
            "'" => {
                break_line(&mut text);
                show_text(&mut text, encoding, &op.operands)?;
            }
            "\"" => {
                break_line(&mut text);
                show_text(&mut text, encoding, op.operands.get(2..).unwrap_or_default())?;
            }
            "Td" | "TD" if moves_vertically(op) => break_line(&mut text),
            "T*" | "ET" => break_line(&mut text),
            _ => {}
        }
    }

    Ok(text)
}

fn show_text(
    text: &mut String,
    encoding: Option<&Encoding>,
    operands: &[Object],
) -> Result<(), PdfLoadError> {
    let Some(encoding) = encoding else {
        debug!("text shown without a decodable font; skipped");
        return Ok(());
    };
    for operand in operands {
        match operand {
            Object::String(bytes, _) => {
                text.push_str(&lopdf::Document::decode_text(encoding, bytes)?);
            }
            Object::Array(items) => show_text(text, Some(encoding), items)?,
            // A large negative adjustment inside a TJ array is a word gap.
            Object::Integer(_) | Object::Real(_) => {
                if operand.as_float().is_ok_and(|gap| gap < -100.0) && !text.ends_with(' ') {
                    text.push(' ');
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn moves_vertically(op: &Operation) -> bool {
    op.operands
        .get(1)
        .and_then(|ty| ty.as_float().ok())
        .is_some_and(|ty| ty != 0.0)
}

fn break_line(text: &mut String) {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
}

// --- Loader Implementation ---

/// The `DocumentLoader` implementation for PDF files.
///
/// The whole file is read into memory in a single call, so no file handle is
/// held once `load` returns, whether extraction succeeded or not.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfLoader;

impl PdfLoader {
    pub fn new() -> Self {
        Self
    }

    /// Extracts text from PDF bytes that are already in memory.
    pub fn load_bytes(&self, path: &Path, pdf_data: &[u8]) -> Result<Document, ExtractError> {
        let (text, page_count) =
            extract_text_from_pdf(pdf_data).map_err(|e| e.into_extract_error(path))?;
        Ok(Document::new(path, text, page_count))
    }
}

impl DocumentLoader for PdfLoader {
    #[instrument(skip(self))]
    fn load(&self, path: &Path) -> Result<Document, ExtractError> {
        let pdf_data = std::fs::read(path)
            .map_err(|e| PdfLoadError::from(e).into_extract_error(path))?;
        let document = self.load_bytes(path, &pdf_data)?;
        info!(
            "Successfully extracted PDF text from '{}' ({} pages)",
            path.display(),
            document.page_count
        );
        Ok(document)
    }
}
