use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use soat_core::types::{ActionKind, Plan};

use crate::dataset::{VehicleDataset, VehicleRecord};
use crate::tariff::{estimate_premium, PremiumBreakdown};

/// Mutable state threaded through one plan execution, plus a readable trace.
#[derive(Debug, Default)]
pub struct ExecutionContext {
    dataset: Option<VehicleDataset>,
    logs: Vec<String>,
}

impl ExecutionContext {
    pub fn log(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        tracing::info!("{msg}");
        self.logs.push(msg);
    }

    pub fn warn(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        tracing::warn!("{msg}");
        self.logs.push(format!("[WARN] {msg}"));
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PremiumQuote {
    pub record: VehicleRecord,
    pub breakdown: PremiumBreakdown,
}

/// A plate missing from the dataset is an ordinary outcome, not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlateOutcome {
    Found(PremiumQuote),
    NotFound { placa: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeStats {
    pub vehicle_type: String,
    pub count: usize,
    pub mean: f64,
    pub min: u64,
    pub max: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioStats {
    pub total: usize,
    /// Ordered by vehicle type.
    pub by_type: Vec<TypeStats>,
    pub pct_with_claims: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecutionReport {
    pub calc: Option<PlateOutcome>,
    pub stats: Option<PortfolioStats>,
    pub logs: Vec<String>,
}

pub struct Executor {
    dataset_path: PathBuf,
}

impl Executor {
    pub fn new(dataset_path: impl Into<PathBuf>) -> Self {
        Self { dataset_path: dataset_path.into() }
    }

    /// Run every action in order. Unknown actions, actions missing their
    /// parameters and actions that need a dataset before one was loaded are
    /// logged and skipped. Failing to read the dataset or pricing a record of
    /// an unknown vehicle type is an error.
    pub fn run(&self, plan: &Plan) -> Result<ExecutionReport> {
        let mut ctx = ExecutionContext::default();
        let mut report = ExecutionReport::default();

        for action in plan {
            match &action.kind {
                ActionKind::LoadDataset => {
                    let dataset = VehicleDataset::load(&self.dataset_path)?;
                    ctx.log(format!("Dataset loaded from {} ({} rows)", dataset.path().display(), dataset.len()));
                    ctx.dataset = Some(dataset);
                }
                ActionKind::CalcForPlate { placa: Some(placa) } => {
                    let Some(dataset) = ctx.dataset.as_ref() else {
                        ctx.warn(format!("Action {} ({}) skipped: dataset not loaded", action.id, action.kind.as_str()));
                        continue;
                    };
                    let outcome = quote_plate(dataset, placa)?;
                    match &outcome {
                        PlateOutcome::Found(q) => ctx.log(format!(
                            "New premium for {}: base={}, estimate={}",
                            q.record.placa, q.breakdown.base, q.breakdown.estimate
                        )),
                        PlateOutcome::NotFound { placa } => ctx.log(format!("Plate {placa} not found in dataset")),
                    }
                    report.calc = Some(outcome);
                }
                ActionKind::CalcForPlate { placa: None } => {
                    ctx.warn(format!("Action {} (calc_for_plate) has no 'placa' in params", action.id));
                }
                ActionKind::GlobalStats => {
                    let Some(dataset) = ctx.dataset.as_ref() else {
                        ctx.warn(format!("Action {} ({}) skipped: dataset not loaded", action.id, action.kind.as_str()));
                        continue;
                    };
                    let stats = portfolio_stats(dataset.records());
                    ctx.log(format!("Portfolio statistics computed over {} vehicles", stats.total));
                    report.stats = Some(stats);
                }
                ActionKind::Unknown(kind) => {
                    ctx.warn(format!("Unsupported action {}: '{}'", action.id, kind));
                }
            }
        }

        report.logs = ctx.logs;
        Ok(report)
    }
}

pub fn quote_plate(dataset: &VehicleDataset, placa: &str) -> Result<PlateOutcome> {
    let Some(record) = dataset.find(placa) else {
        return Ok(PlateOutcome::NotFound { placa: placa.trim().to_uppercase() });
    };
    let breakdown = estimate_premium(record)?;
    Ok(PlateOutcome::Found(PremiumQuote { record: record.clone(), breakdown }))
}

pub fn portfolio_stats(records: &[VehicleRecord]) -> PortfolioStats {
    let mut groups: BTreeMap<&str, Vec<u64>> = BTreeMap::new();
    for r in records {
        groups.entry(r.tipo_vehiculo.as_str()).or_default().push(r.valor_soat_actual);
    }
    let by_type = groups
        .into_iter()
        .map(|(vehicle_type, values)| TypeStats {
            vehicle_type: vehicle_type.to_string(),
            count: values.len(),
            mean: values.iter().sum::<u64>() as f64 / values.len() as f64,
            min: values.iter().copied().min().unwrap_or_default(),
            max: values.iter().copied().max().unwrap_or_default(),
        })
        .collect();
    let with_claims = records.iter().filter(|r| r.numero_siniestros_12m > 0).count();
    let pct_with_claims = if records.is_empty() { 0.0 } else { with_claims as f64 / records.len() as f64 * 100.0 };
    PortfolioStats { total: records.len(), by_type, pct_with_claims }
}
