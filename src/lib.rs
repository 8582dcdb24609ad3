//! Batch PDF labeling using local and hosted LLMs.
//!
//! Scans a directory of PDF documents, extracts a text excerpt from each,
//! asks a language-model backend for a handful of descriptive labels, and
//! writes the filename-to-labels mapping as a two-column CSV table.

pub mod cli;
pub mod config;
pub mod export;
pub mod extract;
pub mod llm;
pub mod services;
