//! # Shared Constants
//!
//! This module provides a centralized location for the names of the built-in
//! tasks and providers, which are shared between the library defaults and the
//! `docextract` binary's configuration layer.

/// The task replacing the offering-memorandum scripts (return, minimum, hold period).
pub const FUND_TERMS_TASK: &str = "fund_terms";

/// The task replacing the brochure timeline script.
pub const TIMELINE_TASK: &str = "timeline";

/// The provider entry for a local Ollama server.
pub const LOCAL_DEFAULT_PROVIDER: &str = "local_default";

/// The provider entry for the hosted Gemini API.
pub const GEMINI_DEFAULT_PROVIDER: &str = "gemini_default";
