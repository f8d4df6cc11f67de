//! soat-knowledge
//!
//! Ingests a directory of source documents, chunks them, fits one TF-IDF
//! index over every chunk and answers ranked retrieval queries.
//!
//! [`KnowledgeBase::index_documents`] returns an owned [`KnowledgeIndex`];
//! retrieval lives on that value, so there is no way to query documents that
//! were never indexed. An index built from zero chunks still exists but
//! answers every query with [`Error::NotIndexed`].
use std::path::Path;

use soat_core::chunker::{chunk, ChunkingConfig};
use soat_core::error::{Error, Result};
use soat_core::types::{DocumentChunk, RetrievalResult};
use soat_text::{TfIdfIndex, Tokenizer};

pub mod loader;

use loader::{list_documents, read_document};

#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    chunking: ChunkingConfig,
    stop_words: bool,
}

impl KnowledgeBase {
    pub fn new(chunking: ChunkingConfig) -> Result<Self> {
        chunking.validate()?;
        Ok(Self { chunking, stop_words: false })
    }

    /// Filter Spanish stop words out of both chunks and queries.
    pub fn with_stop_words(mut self, enabled: bool) -> Self {
        self.stop_words = enabled;
        self
    }

    /// Full rebuild from every recognized document directly under `dir`.
    /// Unreadable documents are skipped and recorded as warnings.
    pub fn index_documents(&self, dir: &Path) -> Result<KnowledgeIndex> {
        let (files, mut warnings) = list_documents(dir);
        if files.is_empty() {
            warnings.push(format!("No documents found under {}", dir.display()));
        }

        let mut chunks: Vec<DocumentChunk> = Vec::new();
        let mut documents = 0usize;
        for (path, kind) in &files {
            let doc_id = path.file_name().map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().to_string());
            let text = match read_document(path, *kind) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(doc = %doc_id, error = %format!("{e:#}"), "skipping unreadable document");
                    warnings.push(format!("Could not read {doc_id}: {e:#}"));
                    continue;
                }
            };
            let doc_chunks = chunk(&text, &doc_id, &path.to_string_lossy(), &self.chunking)?;
            tracing::debug!(doc = %doc_id, chunks = doc_chunks.len(), "chunked document");
            if !doc_chunks.is_empty() {
                documents += 1;
            }
            chunks.extend(doc_chunks);
        }

        for w in &warnings {
            tracing::warn!("{w}");
        }
        if chunks.is_empty() {
            tracing::warn!(dir = %dir.display(), "no chunks to index");
        } else {
            tracing::info!(chunks = chunks.len(), documents, "indexed knowledge base");
        }

        let tokenizer = if self.stop_words { Tokenizer::spanish() } else { Tokenizer::new() };
        let index = TfIdfIndex::fit(tokenizer, chunks.iter().map(|c| c.text.as_str()));
        Ok(KnowledgeIndex { chunks, index, documents, warnings })
    }
}

/// Chunks and the similarity index fitted over exactly those chunks.
#[derive(Debug, Clone)]
pub struct KnowledgeIndex {
    chunks: Vec<DocumentChunk>,
    index: TfIdfIndex,
    documents: usize,
    warnings: Vec<String>,
}

impl KnowledgeIndex {
    /// Up to `top_k` chunks ranked by similarity to `query`, best first.
    pub fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<RetrievalResult>> {
        if self.chunks.is_empty() {
            return Err(Error::NotIndexed);
        }
        let hits = self.index.query(query, top_k)?;
        Ok(hits
            .into_iter()
            .filter_map(|hit| {
                let c = self.chunks.get(hit.index)?;
                Some(RetrievalResult {
                    doc_id: c.doc_id.clone(),
                    chunk_id: c.chunk_id,
                    score: hit.score,
                    text: c.text.clone(),
                    source_path: c.source_path.clone(),
                })
            })
            .collect())
    }

    pub fn chunks(&self) -> &[DocumentChunk] { &self.chunks }

    pub fn len(&self) -> usize { self.chunks.len() }

    pub fn is_empty(&self) -> bool { self.chunks.is_empty() }

    /// Documents that contributed at least one chunk.
    pub fn documents(&self) -> usize { self.documents }

    pub fn warnings(&self) -> &[String] { &self.warnings }
}
