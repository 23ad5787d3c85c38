//! # Document Loading
//!
//! Defines the seam between the pipeline and a document-format plugin such as
//! `docextract-pdf`.

use crate::{errors::ExtractError, types::Document};
use std::fmt::Debug;
use std::path::Path;

/// A trait for turning a file on disk into plain text.
///
/// Implementations must report a missing path as [`ExtractError::FileNotFound`]
/// and every other read or decode problem as [`ExtractError::ParseFailure`].
/// Pages without extractable text contribute an empty string.
pub trait DocumentLoader: Send + Sync + Debug {
    fn load(&self, path: &Path) -> Result<Document, ExtractError>;
}
