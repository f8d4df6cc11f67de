//! Natural-language explanation of an execution, delegated to the language model.

use anyhow::{Context, Result};
use std::fmt::Write;

use soat_core::traits::{ChatRequest, LanguageModel};
use soat_core::types::RetrievalResult;
use soat_exec::{ExecutionReport, PlateOutcome, PortfolioStats};

pub const REASONER_SYSTEM_PROMPT: &str =
    "Eres un analista de seguros que explica cálculos de SOAT basados en reglas documentadas.";

const SNIPPET_CHARS: usize = 500;

/// `[Fuente i - doc]: snippet...` lines, one per retrieved chunk.
pub fn evidence_block(evidence: &[RetrievalResult]) -> String {
    let mut out = String::new();
    for (i, ev) in evidence.iter().enumerate() {
        let snippet: String = ev.text.replace('\n', " ").chars().take(SNIPPET_CHARS).collect();
        let _ = writeln!(out, "[Fuente {} - {}]: {}...\n", i + 1, ev.doc_id, snippet);
    }
    out
}

pub fn calculation_block(calc: Option<&PlateOutcome>) -> String {
    let Some(PlateOutcome::Found(q)) = calc else {
        return "No se realizó un cálculo específico por placa.".to_string();
    };
    let (r, b) = (&q.record, &q.breakdown);
    format!(
        "Placa: {}\nTipo de vehículo: {}\nCilindraje: {}\nEdad conductor: {}\nSiniestros 12m: {}\nZona de riesgo: {}\n\n\
         Tarifa base: {} COP\nFactor edad: {}\nFactor siniestros: {}\nFactor zona: {}\nFactor historial: {}\n\n\
         Valor estimado del SOAT: {} COP\nValor actual en dataset: {} COP",
        r.placa,
        r.tipo_vehiculo,
        r.cilindraje,
        r.edad_conductor,
        r.numero_siniestros_12m,
        r.zona_riesgo,
        b.base,
        b.age_factor,
        b.claims_factor,
        b.zone_factor,
        b.history_factor,
        b.estimate,
        r.valor_soat_actual,
    )
}

pub fn stats_block(stats: Option<&PortfolioStats>) -> String {
    let Some(stats) = stats else { return String::new() };
    let mut out = String::from("Resumen portafolio (por tipo de vehículo):\n");
    for t in &stats.by_type {
        let _ = writeln!(out, "- {}: n={} promedio={:.0} min={} max={}", t.vehicle_type, t.count, t.mean, t.min, t.max);
    }
    let _ = write!(
        out,
        "\nPorcentaje de vehículos con al menos un siniestro en 12 meses: {:.2}%",
        stats.pct_with_claims
    );
    out
}

pub fn build_prompt(instruction: &str, report: &ExecutionReport, evidence: &[RetrievalResult]) -> String {
    format!(
        "Instrucción original del usuario:\n{instruction}\n\n\
         Evidencia del manual de tarifas SOAT:\n{evidence}\n\
         Resultados del cálculo individual (si aplica):\n{calc}\n\n\
         Estadísticas generales (si se solicitaron):\n{stats}\n\n\
         Redacta un informe en español, claro y técnico, explicando:\n\
         - Cómo se calculó el valor del SOAT para la placa (si aplica),\n\
         - Qué factores de riesgo influyeron (edad, siniestros, zona, historial),\n\
         - Cómo se relaciona el cálculo con las reglas del manual,\n\
         - Un breve análisis del portafolio si hay estadísticas generales.\n\n\
         Usa referencias del tipo [Fuente i - nombre_doc] cuando te apoyes en el manual.\n\
         No inventes cifras adicionales que no estén en los datos.",
        evidence = evidence_block(evidence),
        calc = calculation_block(report.calc.as_ref()),
        stats = stats_block(report.stats.as_ref()),
    )
}

/// One request to the model; its answer is returned unchanged.
pub fn explain<M: LanguageModel + ?Sized>(
    model: &M,
    instruction: &str,
    report: &ExecutionReport,
    evidence: &[RetrievalResult],
) -> Result<String> {
    let prompt = build_prompt(instruction, report, evidence);
    let request = ChatRequest { system_prompt: REASONER_SYSTEM_PROMPT, user_message: &prompt };
    model.chat(&request).context("explanation request failed")
}
