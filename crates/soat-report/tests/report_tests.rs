use std::fs;
use std::sync::Mutex;
use tempfile::TempDir;

use soat_core::traits::{ChatRequest, LanguageModel};
use soat_core::types::RetrievalResult;
use soat_exec::dataset::VehicleRecord;
use soat_exec::executor::{portfolio_stats, PremiumQuote};
use soat_exec::tariff::estimate_premium;
use soat_exec::{ExecutionReport, PlateOutcome};
use soat_report::evaluate::evaluate_text;
use soat_report::reasoner::{evidence_block, REASONER_SYSTEM_PROMPT};
use soat_report::{evaluate_report, explain, write_report, Evaluation, ReportInput};

/// Records the last prompt and answers with a fixed text.
struct EchoModel {
    seen: Mutex<Option<String>>,
}

impl LanguageModel for EchoModel {
    fn chat(&self, request: &ChatRequest<'_>) -> anyhow::Result<String> {
        assert_eq!(request.system_prompt, REASONER_SYSTEM_PROMPT);
        *self.seen.lock().unwrap() = Some(request.user_message.to_string());
        Ok("El valor sube por la edad del conductor [Fuente 1 - manual.txt].".to_string())
    }
}

fn record() -> VehicleRecord {
    VehicleRecord {
        placa: "DJK890".to_string(),
        tipo_vehiculo: "auto_particular".to_string(),
        cilindraje: 1400,
        edad_conductor: 22,
        numero_siniestros_12m: 1,
        zona_riesgo: "media".to_string(),
        anios_sin_siniestros: 0,
        valor_soat_actual: 650_000,
    }
}

fn execution() -> ExecutionReport {
    let r = record();
    let breakdown = estimate_premium(&r).unwrap();
    ExecutionReport {
        calc: Some(PlateOutcome::Found(PremiumQuote { record: r.clone(), breakdown })),
        stats: Some(portfolio_stats(&[r])),
        logs: vec!["Dataset loaded".to_string(), "[WARN] Unsupported action a9: 'x'".to_string()],
    }
}

fn evidence() -> Vec<RetrievalResult> {
    vec![RetrievalResult {
        doc_id: "manual.txt".to_string(),
        chunk_id: 0,
        score: 0.81,
        text: "Conductores menores de 25 anos\ntienen recargo del 20%".to_string(),
        source_path: "data/docs/manual.txt".to_string(),
    }]
}

#[test]
fn evidence_snippets_are_flattened_and_capped() {
    let mut ev = evidence();
    ev[0].text = "x\n".repeat(400);
    let block = evidence_block(&ev);
    assert!(block.starts_with("[Fuente 1 - manual.txt]: "));
    let snippet = block.trim_end().trim_start_matches("[Fuente 1 - manual.txt]: ").trim_end_matches("...");
    assert_eq!(snippet.chars().count(), 500);
    assert!(!snippet.contains('\n'));
}

#[test]
fn explain_sends_evidence_and_figures_to_the_model() {
    let model = EchoModel { seen: Mutex::new(None) };
    let text = explain(&model, "Calcula el SOAT para DJK890", &execution(), &evidence()).expect("explain");
    assert!(text.contains("[Fuente 1 - manual.txt]"));

    let prompt = model.seen.lock().unwrap().clone().expect("prompt sent");
    assert!(prompt.contains("Calcula el SOAT para DJK890"));
    assert!(prompt.contains("[Fuente 1 - manual.txt]: Conductores menores de 25 anos tienen recargo"));
    assert!(prompt.contains("Valor estimado del SOAT: 792000 COP"));
    assert!(prompt.contains("auto_particular: n=1"));
}

#[test]
fn written_report_has_every_section_and_scores_full_marks() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("outputs").join("reports");
    let explanation = "Explicación detallada. ".repeat(40);
    let exec = execution();
    let ev = evidence();
    let input = ReportInput { instruction: "Calcula el SOAT para DJK890", explanation: &explanation, evidence: &ev, execution: &exec };

    let path = write_report(&dir, &input).expect("report written");
    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("reporte_soat_") && name.ends_with(".md"), "name={name}");

    let body = fs::read_to_string(&path).unwrap();
    assert!(body.contains("> Calcula el SOAT para DJK890"));
    assert!(body.contains("[Fuente 1] manual.txt (chunk 0, score 0.810)"));
    assert!(body.contains("\"estimate\": 792000"));
    assert!(body.contains("- [WARN] Unsupported action a9: 'x'"));

    let eval = evaluate_report(&path).expect("evaluate");
    assert_eq!(eval.score, Evaluation::MAX_SCORE);
    assert!(eval.feedback[0].contains("adecuada"));
}

#[test]
fn report_without_results_says_so() {
    let tmp = TempDir::new().unwrap();
    let exec = ExecutionReport {
        calc: Some(PlateOutcome::NotFound { placa: "ZZZ999".to_string() }),
        stats: None,
        logs: Vec::new(),
    };
    let input = ReportInput { instruction: "placa ZZZ999", explanation: "n/a", evidence: &[], execution: &exec };
    let body = fs::read_to_string(write_report(tmp.path(), &input).unwrap()).unwrap();
    assert!(body.contains("No se encontró la placa ZZZ999."));
    assert!(body.contains("No se calcularon estadísticas globales."));
    assert!(body.contains("_No se encontró evidencia documental relevante._"));
}

#[test]
fn evaluation_counts_sections_and_flags_short_reports() {
    let eval = evaluate_text("## 2. Explicación del agente\nok\n## 5. Estadísticas generales\n");
    assert_eq!(eval.score, 2);
    assert!(eval.feedback[0].contains("corto"));
    assert_eq!(evaluate_text("").score, 0);
}

#[test]
fn evaluating_a_missing_report_is_an_error() {
    let tmp = TempDir::new().unwrap();
    assert!(evaluate_report(&tmp.path().join("nope.md")).is_err());
}
