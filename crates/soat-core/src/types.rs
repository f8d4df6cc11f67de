//! Domain types shared by the retrieval, planning and execution crates.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type Params = Map<String, Value>;

/// A bounded slice of a source document that is independently indexed.
///
/// - `doc_id`: file name of the source document
/// - `chunk_id`: 0-based, dense per document
/// - `text`: the window contents (never blank)
/// - `source_path`: original path to the source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub doc_id: String,
    pub chunk_id: usize,
    pub text: String,
    pub source_path: String,
}

/// One ranked chunk returned from the knowledge base. Higher `score` is better
/// and it is always finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub doc_id: String,
    pub chunk_id: usize,
    pub score: f64,
    pub text: String,
    pub source_path: String,
}

/// The closed set of steps the executor understands, plus a catch-all
/// carrying whatever `type` string the model produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    LoadDataset,
    CalcForPlate { placa: Option<String> },
    GlobalStats,
    Unknown(String),
}

impl ActionKind {
    pub const LOAD_DATASET: &'static str = "load_dataset";
    pub const CALC_FOR_PLATE: &'static str = "calc_for_plate";
    pub const GLOBAL_STATS: &'static str = "global_stats";

    /// Classify a raw `type` string; `placa` is read from `params` for plate actions.
    pub fn from_parts(kind: &str, params: &Params) -> Self {
        match kind {
            Self::LOAD_DATASET => Self::LoadDataset,
            Self::CALC_FOR_PLATE => Self::CalcForPlate {
                placa: params
                    .get("placa")
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string),
            },
            Self::GLOBAL_STATS => Self::GlobalStats,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::LoadDataset => Self::LOAD_DATASET,
            Self::CalcForPlate { .. } => Self::CALC_FOR_PLATE,
            Self::GlobalStats => Self::GLOBAL_STATS,
            Self::Unknown(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub id: String,
    pub kind: ActionKind,
    pub params: Params,
}

impl Action {
    pub fn new(id: impl Into<String>, kind: &str, params: Params) -> Self {
        let kind = ActionKind::from_parts(kind, &params);
        Self { id: id.into(), kind, params }
    }

    pub fn load_dataset(id: impl Into<String>) -> Self {
        Self::new(id, ActionKind::LOAD_DATASET, Params::new())
    }

    pub fn calc_for_plate(id: impl Into<String>, placa: &str) -> Self {
        let mut params = Params::new();
        params.insert("placa".to_string(), Value::String(placa.to_string()));
        Self::new(id, ActionKind::CALC_FOR_PLATE, params)
    }

    pub fn global_stats(id: impl Into<String>) -> Self {
        Self::new(id, ActionKind::GLOBAL_STATS, Params::new())
    }

    /// Build an action from one loosely-shaped element of a model's `actions`
    /// array. Missing fields degrade to defaults; nothing is rejected here.
    pub fn from_value(value: &Value, position: usize) -> Self {
        let id = value
            .get("id")
            .and_then(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .unwrap_or_else(|| format!("a{}", position + 1));
        let kind = value.get("type").and_then(Value::as_str).unwrap_or_default();
        let params = value.get("params").and_then(Value::as_object).cloned().unwrap_or_default();
        Self::new(id, kind, params)
    }
}

/// An ordered sequence of actions produced for one instruction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    actions: Vec<Action>,
}

impl Plan {
    pub fn new(actions: Vec<Action>) -> Self { Self { actions } }

    pub fn actions(&self) -> &[Action] { &self.actions }

    pub fn len(&self) -> usize { self.actions.len() }

    pub fn is_empty(&self) -> bool { self.actions.is_empty() }

    pub fn iter(&self) -> std::slice::Iter<'_, Action> { self.actions.iter() }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a Action;
    type IntoIter = std::slice::Iter<'a, Action>;

    fn into_iter(self) -> Self::IntoIter { self.actions.iter() }
}
