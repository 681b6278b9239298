
use tracing::debug;

use crate::extract::{PageText, full_text};

/// Chunk size in characters.
pub const CHUNK_SIZE: usize = 1000;

/// Overlap between adjacent chunks, in characters.
pub const CHUNK_OVERLAP: usize = 200;

/// A chunk of document text ready for embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// The chunk's text content.
    pub content: String,
    /// The index of this chunk within the document.
    pub chunk_index: usize,
}

/// Configuration for text chunking.
///
/// Invariant: `overlap` < `chunk_size`.
#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Overlap carried over from the previous chunk, in characters.
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
            overlap: CHUNK_OVERLAP,
        }
    }
}

/// Split text into overlapping fixed-size chunks.
///
/// Each chunk holds at most `chunk_size` characters. When a chunk would be
/// cut mid-content, the split point backs up to the nearest natural
/// boundary inside the window, trying paragraph, then sentence, then word
/// boundaries before falling back to a hard character cut. Adjacent
/// chunks overlap by roughly `overlap` characters.
#[inline]
pub fn chunk_text(text: &str, config: &ChunkingConfig) -> Vec<TextChunk> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = trimmed.chars().collect();
    let mut chunks = Vec::new();
    let mut start = 0;

    loop {
        let end = if chars.len() - start <= config.chunk_size {
            chars.len()
        } else {
            find_split_point(&chars, start, start + config.chunk_size)
        };

        let content = chars
            .get(start..end)
            .map(|span| span.iter().collect::<String>())
            .unwrap_or_default();
        let content = content.trim();
        if !content.is_empty() {
            chunks.push(TextChunk {
                content: content.to_string(),
                chunk_index: chunks.len(),
            });
        }

        if end >= chars.len() {
            break;
        }

        // Step back by the overlap, but always make forward progress.
        let proposed = end.saturating_sub(config.overlap);
        start = align_to_word_start(&chars, proposed, end).max(start + 1);
    }

    debug!("Split {} characters into {} chunks", chars.len(), chunks.len());
    chunks
}

/// Chunk a document's pages as one continuous text.
#[inline]
pub fn chunk_document(pages: &[PageText], config: &ChunkingConfig) -> Vec<TextChunk> {
    chunk_text(&full_text(pages), config)
}

/// Find where to split the window `[start, limit)`.
///
/// Boundary candidates are tried in order: the last paragraph break, the
/// last sentence end, the last whitespace. A candidate in the first half
/// of the window is rejected so chunks cannot degenerate; when no
/// candidate qualifies the window is cut at `limit`.
fn find_split_point(chars: &[char], start: usize, limit: usize) -> usize {
    let min_split = start + (limit - start) / 2;

    last_paragraph_break(chars, start, limit)
        .filter(|&split| split > min_split)
        .or_else(|| last_sentence_end(chars, start, limit).filter(|&split| split > min_split))
        .or_else(|| last_whitespace(chars, start, limit).filter(|&split| split > min_split))
        .unwrap_or(limit)
}

/// Position of the last blank-line paragraph break within the window.
fn last_paragraph_break(chars: &[char], start: usize, limit: usize) -> Option<usize> {
    (start..limit.saturating_sub(1))
        .rev()
        .find(|&i| chars[i] == '\n' && chars[i + 1] == '\n')
}

/// Position just past the last sentence-ending punctuation in the window.
fn last_sentence_end(chars: &[char], start: usize, limit: usize) -> Option<usize> {
    (start..limit)
        .rev()
        .find(|&i| {
            matches!(chars[i], '.' | '!' | '?')
                && chars.get(i + 1).is_none_or(|next| next.is_whitespace())
        })
        .map(|i| i + 1)
}

/// Position of the last whitespace character in the window.
fn last_whitespace(chars: &[char], start: usize, limit: usize) -> Option<usize> {
    (start..limit).rev().find(|&i| chars[i].is_whitespace())
}

/// Nudge an overlap start forward so it does not land mid-word.
///
/// Text with no word boundary before `end` keeps the proposed position,
/// preserving the exact configured overlap for unbreakable runs.
fn align_to_word_start(chars: &[char], proposed: usize, end: usize) -> usize {
    let starts_on_boundary = proposed == 0
        || chars
            .get(proposed - 1)
            .is_some_and(|prev| prev.is_whitespace());
    if starts_on_boundary {
        return proposed;
    }

    (proposed..end)
        .find(|&i| chars[i].is_whitespace())
        .map(|i| i + 1)
        .filter(|&i| i < end)
        .unwrap_or(proposed)
}
