
use tracing::debug;

use crate::{PdfChatError, Result};

/// Text extracted from a single page of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub page_number: u32,
    pub text: String,
}

/// Extract text from PDF bytes, page by page.
///
/// Fails with [`PdfChatError::Extraction`] when the bytes are not a
/// parseable PDF or when the document contains no extractable text.
#[inline]
pub fn extract_pdf_text(bytes: &[u8]) -> Result<Vec<PageText>> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| PdfChatError::Extraction(format!("Failed to extract PDF text: {e}")))?;

    let pages = paginate(&text);

    if pages.is_empty() {
        return Err(PdfChatError::Extraction(
            "Document contains no extractable text".to_string(),
        ));
    }

    debug!("Extracted {} page(s) of text", pages.len());
    Ok(pages)
}

/// Split extracted text into pages on the form-feed character that
/// `pdf-extract` emits at page breaks. Text without page breaks becomes a
/// single page. Blank pages are dropped.
fn paginate(text: &str) -> Vec<PageText> {
    text.split('\u{000C}')
        .map(str::trim)
        .filter(|page| !page.is_empty())
        .enumerate()
        .map(|(idx, page)| PageText {
            page_number: idx as u32 + 1,
            text: page.to_string(),
        })
        .collect()
}

/// Join pages into the document's full text, page breaks becoming
/// paragraph breaks.
#[inline]
pub fn full_text(pages: &[PageText]) -> String {
    pages
        .iter()
        .map(|page| page.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
