//! Text chunking with configurable size and overlap.
//!
//! Splitting is delegated to `text-splitter`, which prefers paragraph,
//! sentence and word boundaries before cutting mid-word. Trimming is
//! disabled so every chunk is an exact slice of the input and the original
//! text can be rebuilt from the chunks.
//!
//! The splitter treats overlap as a ceiling. Each chunk's start is then
//! pulled back so it shares at least `chunk_overlap` characters with its
//! predecessor, and its end is cut to keep it within `chunk_size`.

use docqa_core::config::ChunkingSettings;
use docqa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use text_splitter::{ChunkConfig, TextSplitter};

/// A slice of the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Ordinal position in the chunk sequence
    pub position: usize,

    /// Byte offset of the chunk in the source text
    pub offset: usize,

    pub text: String,
}

impl Chunk {
    /// Byte offset one past the end of the chunk.
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }
}

/// Split `text` into chunks of at most `chunk_size` characters, consecutive
/// chunks overlapping by at least `chunk_overlap` characters.
///
/// Empty input produces no chunks.
pub fn chunk_text(text: &str, settings: &ChunkingSettings) -> AppResult<Vec<Chunk>> {
    if text.is_empty() {
        return Ok(Vec::new());
    }

    if settings.chunk_size == 0 {
        return Err(AppError::Config("chunkSize must be greater than 0".to_string()));
    }

    let config = ChunkConfig::new(settings.chunk_size)
        .with_overlap(settings.chunk_overlap)
        .map_err(|e| AppError::Config(format!("Invalid chunking settings: {}", e)))?
        .with_trim(false);
    let splitter = TextSplitter::new(config);

    let size = settings.chunk_size;
    let overlap = settings.chunk_overlap;
    let mut chunks: Vec<Chunk> = Vec::new();

    for (offset, slice) in splitter.chunk_indices(text) {
        let mut start = offset;
        let mut end = offset + slice.len();

        if let Some(prev) = chunks.last() {
            if end <= prev.end() {
                continue;
            }
            start = start.min(retreat(text, prev.end(), overlap));
            end = end.min(advance(text, start, size));
        }

        chunks.push(Chunk {
            position: chunks.len(),
            offset: start,
            text: text[start..end].to_string(),
        });
    }

    // Cutting ends can leave the tail uncovered.
    while let Some(last) = chunks.last() {
        if last.end() >= text.len() {
            break;
        }
        let start = retreat(text, last.end(), overlap);
        let end = advance(text, start, size);
        chunks.push(Chunk {
            position: chunks.len(),
            offset: start,
            text: text[start..end].to_string(),
        });
    }

    tracing::debug!(
        "Split {} bytes into {} chunks (size {}, overlap {})",
        text.len(),
        chunks.len(),
        settings.chunk_size,
        settings.chunk_overlap
    );

    Ok(chunks)
}

/// Byte offset `n` characters after `from`, capped at the end of `text`.
fn advance(text: &str, from: usize, n: usize) -> usize {
    text[from..]
        .char_indices()
        .nth(n)
        .map(|(i, _)| from + i)
        .unwrap_or(text.len())
}

/// Byte offset `n` characters before `from`, floored at 0.
fn retreat(text: &str, from: usize, n: usize) -> usize {
    if n == 0 {
        return from;
    }
    text[..from]
        .char_indices()
        .rev()
        .nth(n - 1)
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Rebuild the source text by dropping the part of each chunk already
/// covered by its predecessors.
pub fn reconstruct(chunks: &[Chunk]) -> String {
    let mut text = String::new();
    let mut covered = 0usize;

    for chunk in chunks {
        if chunk.end() <= covered {
            continue;
        }
        let skip = covered.saturating_sub(chunk.offset);
        text.push_str(&chunk.text[skip..]);
        covered = chunk.end();
    }

    text
}
