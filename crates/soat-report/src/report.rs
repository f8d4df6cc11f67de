//! Markdown report of one agent run.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};

use soat_core::types::RetrievalResult;
use soat_exec::{ExecutionReport, PlateOutcome};

use crate::reasoner::stats_block;

pub const SECTION_INSTRUCTION: &str = "## 1. Instrucción del usuario";
pub const SECTION_EXPLANATION: &str = "## 2. Explicación del agente";
pub const SECTION_EVIDENCE: &str = "## 3. Evidencia documental (RAG)";
pub const SECTION_CALCULATION: &str = "## 4. Resultado de cálculo individual";
pub const SECTION_STATS: &str = "## 5. Estadísticas generales";
pub const SECTION_TRACE: &str = "## 6. Trazabilidad del agente";

pub struct ReportInput<'a> {
    pub instruction: &'a str,
    pub explanation: &'a str,
    pub evidence: &'a [RetrievalResult],
    pub execution: &'a ExecutionReport,
}

pub fn render_markdown(input: &ReportInput<'_>, generated_at: DateTime<Local>) -> String {
    let refs = if input.evidence.is_empty() {
        "_No se encontró evidencia documental relevante._".to_string()
    } else {
        let mut out = String::new();
        for (i, ev) in input.evidence.iter().enumerate() {
            let _ = writeln!(out, "- [Fuente {}] {} (chunk {}, score {:.3}) - {}", i + 1, ev.doc_id, ev.chunk_id, ev.score, ev.source_path);
        }
        out.trim_end().to_string()
    };

    let calc = match &input.execution.calc {
        Some(PlateOutcome::Found(quote)) => serde_json::to_string_pretty(quote).unwrap_or_else(|e| format!("<no serializable: {e}>")),
        Some(PlateOutcome::NotFound { placa }) => format!("No se encontró la placa {placa}."),
        None => "No se realizó un cálculo individual de póliza.".to_string(),
    };

    let stats = match input.execution.stats.as_ref() {
        Some(s) => stats_block(Some(s)),
        None => "No se calcularon estadísticas globales.".to_string(),
    };

    let trace = if input.execution.logs.is_empty() {
        "_Sin trazabilidad registrada._".to_string()
    } else {
        input.execution.logs.iter().map(|l| format!("- {l}")).collect::<Vec<_>>().join("\n")
    };

    format!(
        "# Reporte del Agente SOAT\n\n\
         **Fecha:** {date}\n\n---\n\n\
         {SECTION_INSTRUCTION}\n\n> {instruction}\n\n---\n\n\
         {SECTION_EXPLANATION} (razón + evidencia)\n\n{explanation}\n\n---\n\n\
         {SECTION_EVIDENCE}\n\n{refs}\n\n---\n\n\
         {SECTION_CALCULATION}\n\n```text\n{calc}\n```\n\n---\n\n\
         {SECTION_STATS}\n\n```text\n{stats}\n```\n\n---\n\n\
         {SECTION_TRACE}\n\n```text\n{trace}\n```\n\n---\n\n\
         _Reporte generado automáticamente por el Agente Cognitivo SOAT_\n",
        date = generated_at.format("%Y-%m-%d %H:%M:%S"),
        instruction = input.instruction,
        explanation = input.explanation,
    )
}

/// Write `reporte_soat_<timestamp>.md` under `dir`, creating it if needed.
pub fn write_report(dir: &Path, input: &ReportInput<'_>) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create reports dir {}", dir.display()))?;
    let now = Local::now();
    let path = dir.join(format!("reporte_soat_{}.md", now.format("%Y%m%d_%H%M%S_%3f")));
    fs::write(&path, render_markdown(input, now)).with_context(|| format!("Failed to write report {}", path.display()))?;
    tracing::info!(path = %path.display(), "report written");
    Ok(path)
}
