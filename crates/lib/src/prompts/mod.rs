//! # Prompt Template Modules
//!
//! This module organizes the prompt rendering logic and the built-in
//! extraction templates.

pub mod core;
pub mod extraction;
