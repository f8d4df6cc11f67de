use anyhow::{Context, Result};
use std::any::Any;
use std::fs;
use std::panic;
use std::path::{Path, PathBuf};

/// Source formats the knowledge base knows how to turn into plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Text,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" | "md" => Some(Self::Text),
            _ => None,
        }
    }
}

/// Recognized documents directly under `dir`, sorted by file name.
/// Entries that cannot be listed are returned as warnings instead.
pub fn list_documents(dir: &Path) -> (Vec<(PathBuf, DocumentKind)>, Vec<String>) {
    let mut docs = Vec::new();
    let mut warnings = Vec::new();
    for entry in walkdir::WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        match entry {
            // `Path::is_file` follows symlinks; the walker's file type does not.
            Ok(e) if e.path().is_file() => {
                if let Some(kind) = DocumentKind::from_path(e.path()) {
                    docs.push((e.path().to_path_buf(), kind));
                }
            }
            Ok(_) => {}
            Err(e) => warnings.push(format!("Could not list {}: {}", dir.display(), e)),
        }
    }
    (docs, warnings)
}

pub fn read_document(path: &Path, kind: DocumentKind) -> Result<String> {
    match kind {
        DocumentKind::Pdf => extract_pdf(path),
        DocumentKind::Text => match fs::read_to_string(path) {
            Ok(content) => Ok(content),
            Err(_) => {
                let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
                Ok(String::from_utf8_lossy(&bytes).to_string())
            }
        },
    }
}

/// pdf-extract panics on some structurally valid but incomplete PDFs (e.g. a
/// page without `/MediaBox`); those are reported as ordinary read failures.
fn extract_pdf(path: &Path) -> Result<String> {
    match panic::catch_unwind(|| pdf_extract::extract_text(path)) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(anyhow::anyhow!("Failed to extract text from {}: {}", path.display(), e)),
        Err(payload) => Err(anyhow::anyhow!(
            "PDF parser panicked on {}: {}",
            path.display(),
            panic_message(payload.as_ref())
        )),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
