use crate::error::{Error, Result};
use crate::types::DocumentChunk;

/// Sliding-window parameters, both measured in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { chunk_size: 1200, overlap: 200 }
    }
}

impl ChunkingConfig {
    /// The window must strictly advance on every step.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk_size must be greater than zero".to_string()));
        }
        if self.overlap >= self.chunk_size {
            return Err(Error::InvalidConfig(format!(
                "chunk overlap ({}) must be smaller than chunk_size ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }

    fn step(&self) -> usize { self.chunk_size - self.overlap }
}

/// Split `text` into overlapping windows of at most `chunk_size` characters.
///
/// Windows whose content is blank are skipped without consuming a
/// `chunk_id`, so ids stay dense. Scanning stops once a window reaches the end
/// of the text.
pub fn chunk(text: &str, doc_id: &str, source_path: &str, config: &ChunkingConfig) -> Result<Vec<DocumentChunk>> {
    config.validate()?;
    Ok(windows(text, config)
        .map(|(start, end)| &text[start..end])
        .filter(|window| !window.trim().is_empty())
        .enumerate()
        .map(|(chunk_id, window)| DocumentChunk {
            doc_id: doc_id.to_string(),
            chunk_id,
            text: window.to_string(),
            source_path: source_path.to_string(),
        })
        .collect())
}

/// Byte ranges of each window, aligned to char boundaries. Assumes a validated config.
fn windows(text: &str, config: &ChunkingConfig) -> impl Iterator<Item = (usize, usize)> {
    // Byte offset of every char plus the end of the text.
    let mut offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    let char_len = offsets.len();
    offsets.push(text.len());

    let size = config.chunk_size;
    let step = config.step();
    let mut start = 0usize;
    let mut done = char_len == 0;
    std::iter::from_fn(move || {
        if done {
            return None;
        }
        let end = (start + size).min(char_len);
        let range = (offsets[start], offsets[end]);
        if end >= char_len {
            done = true;
        } else {
            start += step;
        }
        Some(range)
    })
}
