//! Text extraction from PDF documents.
//!
//! Extraction failures are recovered locally: a document that cannot be
//! read yields an empty string so the surrounding batch keeps going.

use std::path::Path;

use lopdf::Document;
use tracing::{debug, warn};

/// Extract text from the leading pages of a PDF.
///
/// Reads at most `page_limit` pages from the front of the document
/// (`0` means all pages) and joins page texts with newlines. Returns the
/// trimmed result; an empty string is a valid "no usable text" outcome and
/// is also what any load or parse failure degrades to.
pub fn extract_text(path: &Path, page_limit: usize) -> String {
    let doc = match Document::load(path) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("Could not extract text from {}: {}", path.display(), e);
            return String::new();
        }
    };

    if doc.is_encrypted() {
        warn!("Could not extract text from {}: PDF is encrypted", path.display());
        return String::new();
    }

    let mut pages: Vec<u32> = doc.get_pages().keys().copied().collect();
    if page_limit > 0 && pages.len() > page_limit {
        pages.truncate(page_limit);
    }

    let mut segments = Vec::with_capacity(pages.len());
    for page in pages {
        match doc.extract_text(&[page]) {
            Ok(text) => segments.push(text),
            Err(e) => {
                // A page without a usable text layer contributes an empty segment
                debug!("No text on page {} of {}: {}", page, path.display(), e);
                segments.push(String::new());
            }
        }
    }

    segments.join("\n").trim().to_string()
}
