use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::report::{SECTION_CALCULATION, SECTION_EVIDENCE, SECTION_EXPLANATION, SECTION_STATS, SECTION_TRACE};

const MIN_REPORT_CHARS: usize = 800;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// Number of expected sections present, out of [`Evaluation::MAX_SCORE`].
    pub score: usize,
    pub feedback: Vec<String>,
}

impl Evaluation {
    pub const MAX_SCORE: usize = 5;
}

pub fn evaluate_text(text: &str) -> Evaluation {
    let score = [SECTION_EXPLANATION, SECTION_EVIDENCE, SECTION_CALCULATION, SECTION_STATS, SECTION_TRACE]
        .iter()
        .filter(|s| text.contains(*s))
        .count();
    let feedback = if text.chars().count() < MIN_REPORT_CHARS {
        "El reporte es relativamente corto; podrías ampliar la explicación o el análisis."
    } else {
        "La longitud del reporte es adecuada para la sustentación."
    };
    Evaluation { score, feedback: vec![feedback.to_string()] }
}

pub fn evaluate_report(path: &Path) -> Result<Evaluation> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read report {}", path.display()))?;
    Ok(evaluate_text(&text))
}
