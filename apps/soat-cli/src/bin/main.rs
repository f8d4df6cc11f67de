use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use soat_core::config::{AgentSettings, Config};
use soat_exec::Executor;
use soat_knowledge::{KnowledgeBase, KnowledgeIndex};
use soat_planner::{FallbackPlanner, OllamaClient, PlanSource, Planner};
use soat_report::{evaluate_report, explain, write_report, Evaluation, ReportInput};

const GREETINGS: &[&str] = &["hola", "buenas", "buenos dias", "buenos días", "buenas tardes", "buenas noches", "hi", "hello"];

const GREETING_REPLY: &str = "¡Hola! Soy el agente cognitivo SOAT. Puedo calcular la nueva póliza de una placa \
(por ejemplo: \"Calcula el SOAT para la placa DJK890\") o analizar el portafolio completo \
(\"Analiza el portafolio y dame el promedio por tipo de vehículo\").";

fn is_greeting(instruction: &str) -> bool {
    let normalized = instruction.trim().trim_matches(|c: char| c.is_ascii_punctuation() || c == '¡' || c == '¿').to_lowercase();
    GREETINGS.contains(&normalized.as_str())
}

struct Agent {
    index: KnowledgeIndex,
    planner: Planner<OllamaClient>,
    executor: Executor,
    reports_dir: PathBuf,
    top_k: usize,
}

struct RunSummary {
    report_path: PathBuf,
    explanation: String,
    evaluation: Evaluation,
}

impl Agent {
    fn from_config(config: &Config, settings: &AgentSettings) -> Result<Self> {
        let docs_dir = config.resolve(&settings.paths.docs_dir);
        let kb = KnowledgeBase::new(settings.rag.chunking())?.with_stop_words(settings.rag.stop_words);
        let index = kb.index_documents(&docs_dir)?;
        for w in index.warnings() {
            eprintln!("⚠️  {w}");
        }
        println!("📚 Indexed {} chunks from {} documents in {}", index.len(), index.documents(), docs_dir.display());

        let client = OllamaClient::from_config(&settings.llm)?;
        let planner = Planner::new(client, FallbackPlanner::new(settings.planner.stats_keywords.iter().cloned()));

        let dataset = config.resolve(&settings.paths.datasets_dir).join(&settings.paths.dataset_file);
        Ok(Self {
            index,
            planner,
            executor: Executor::new(dataset),
            reports_dir: config.resolve(&settings.paths.reports_dir),
            top_k: settings.rag.top_k,
        })
    }

    fn run(&self, instruction: &str) -> Result<RunSummary> {
        let outcome = self.planner.plan_with_source(instruction);
        if let PlanSource::Fallback(cause) = &outcome.source {
            println!("ℹ️  Using rule-based plan ({cause})");
        }
        let evidence = self.index.retrieve(instruction, self.top_k).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "retrieval failed; continuing without evidence");
            Vec::new()
        });
        let execution = self.executor.run(&outcome.plan)?;
        let explanation = explain(self.planner.model(), instruction, &execution, &evidence)?;
        let input = ReportInput { instruction, explanation: &explanation, evidence: &evidence, execution: &execution };
        let report_path = write_report(&self.reports_dir, &input)?;
        let evaluation = evaluate_report(&report_path)?;
        Ok(RunSummary { report_path, explanation, evaluation })
    }

    fn handle(&self, instruction: &str) {
        if is_greeting(instruction) {
            println!("{GREETING_REPLY}");
            return;
        }
        match self.run(instruction) {
            Ok(summary) => {
                println!("\n{}\n", summary.explanation);
                println!("📝 Report: {}", summary.report_path.display());
                println!("✅ Score: {}/{}", summary.evaluation.score, Evaluation::MAX_SCORE);
                for f in &summary.evaluation.feedback {
                    println!("   - {f}");
                }
            }
            Err(e) => eprintln!("❌ Error: {e:#}"),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let settings = config.settings()?;
    let agent = Agent::from_config(&config, &settings)?;

    let args: Vec<String> = env::args().skip(1).collect();
    if !args.is_empty() {
        agent.handle(&args.join(" "));
        return Ok(());
    }

    println!("🚗 Agente SOAT listo. Escribe una instrucción (o 'salir' para terminar).");
    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let instruction = line.trim();
        if instruction.is_empty() {
            continue;
        }
        if instruction.eq_ignore_ascii_case("salir") {
            break;
        }
        agent.handle(instruction);
    }
    Ok(())
}
