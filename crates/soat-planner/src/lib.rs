//! soat-planner
//!
//! Two-tier planning: ask the language model for a JSON plan, and if the call
//! fails or the answer does not validate, hand the instruction to the
//! rule-based [`FallbackPlanner`] instead. The model is asked once per
//! instruction; there are no retries.
use thiserror::Error;

use soat_core::traits::{ChatRequest, LanguageModel};
use soat_core::types::Plan;

pub mod fallback;
pub mod llm;
pub mod validator;

pub use fallback::{extract_plate, FallbackPlanner};
pub use llm::OllamaClient;
pub use validator::PlanFormatError;

pub const PLANNER_SYSTEM_PROMPT: &str = r#"Eres el módulo de planificación de un agente que analiza pólizas SOAT en Colombia.

Lee la instrucción del usuario y responde SOLO con un objeto JSON válido, sin texto adicional, con esta forma:

{
  "actions": [
    {"id": "a1", "type": "load_dataset", "params": {}},
    {"id": "a2", "type": "calc_for_plate", "params": {"placa": "ABC123"}},
    {"id": "a3", "type": "global_stats", "params": {}}
  ]
}

Tipos de acción disponibles:
- "load_dataset": carga el dataset de vehículos. Va primero siempre que se trabaje con datos. Sin parámetros.
- "calc_for_plate": estima la nueva póliza de una placa concreta. Parámetro obligatorio "placa" (tres letras y tres números, p. ej. ABC123).
- "global_stats": estadísticas generales del portafolio (promedios por tipo de vehículo, porcentaje con siniestros). Sin parámetros.

Reglas:
- Si la instrucción menciona una placa, incluye "calc_for_plate" con esa placa.
- Si pide análisis, estadísticas, promedios o porcentajes, incluye "global_stats".
- Si no estás seguro, devuelve al menos la acción "load_dataset".
- La clave raíz siempre es "actions" y su valor es una lista."#;

/// Why the model-backed attempt did not produce a plan.
#[derive(Debug, Error)]
pub enum PlanFailure {
    #[error("language model call failed: {0}")]
    Model(String),

    #[error("invalid plan: {0}")]
    Format(#[from] PlanFormatError),
}

/// Which tier produced a plan.
#[derive(Debug)]
pub enum PlanSource {
    Model,
    Fallback(PlanFailure),
}

#[derive(Debug)]
pub struct PlanOutcome {
    pub plan: Plan,
    pub source: PlanSource,
}

pub struct Planner<M> {
    model: M,
    fallback: FallbackPlanner,
}

impl<M: LanguageModel> Planner<M> {
    pub fn new(model: M, fallback: FallbackPlanner) -> Self {
        Self { model, fallback }
    }

    pub fn model(&self) -> &M { &self.model }

    pub fn plan_from_instruction(&self, instruction: &str) -> Plan {
        self.plan_with_source(instruction).plan
    }

    pub fn plan_with_source(&self, instruction: &str) -> PlanOutcome {
        match self.request_plan(instruction) {
            Ok(plan) => {
                tracing::info!(actions = plan.len(), "plan produced by language model");
                PlanOutcome { plan, source: PlanSource::Model }
            }
            Err(failure) => {
                tracing::warn!(cause = %failure, "planner falling back to rule-based plan");
                let plan = self.fallback.plan(instruction);
                tracing::info!(actions = plan.len(), "plan produced by fallback rules");
                PlanOutcome { plan, source: PlanSource::Fallback(failure) }
            }
        }
    }

    /// The model-backed tier on its own: one request, then validation.
    pub fn request_plan(&self, instruction: &str) -> Result<Plan, PlanFailure> {
        let request = ChatRequest { system_prompt: PLANNER_SYSTEM_PROMPT, user_message: instruction };
        let raw = self.model.chat(&request).map_err(|e| PlanFailure::Model(format!("{e:#}")))?;
        tracing::debug!(response = %raw, "raw planner response");
        Ok(validator::parse(&raw)?)
    }
}
