//! Deterministic instruction → plan mapping used whenever the model cannot
//! produce a usable plan.

use std::sync::OnceLock;

use regex::Regex;

use soat_core::config::DEFAULT_STATS_KEYWORDS;
use soat_core::types::{Action, Plan};

fn plate_pattern() -> &'static Regex {
    static PLATE: OnceLock<Regex> = OnceLock::new();
    PLATE.get_or_init(|| Regex::new(r"\b([A-Z]{3}[0-9]{3})\b").expect("plate pattern is valid"))
}

/// First plate-like token (three letters + three digits), upper-cased.
pub fn extract_plate(text: &str) -> Option<String> {
    let upper = text.to_uppercase();
    plate_pattern().captures(&upper).map(|c| c[1].to_string())
}

#[derive(Debug, Clone)]
pub struct FallbackPlanner {
    stats_keywords: Vec<String>,
}

impl Default for FallbackPlanner {
    fn default() -> Self {
        Self::new(DEFAULT_STATS_KEYWORDS.iter().copied())
    }
}

impl FallbackPlanner {
    pub fn new<I, S>(stats_keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self { stats_keywords: stats_keywords.into_iter().map(|k| k.as_ref().to_lowercase()).collect() }
    }

    /// Always starts with `load_dataset`; never fails and never returns an empty plan.
    pub fn plan(&self, instruction: &str) -> Plan {
        let mut actions = vec![Action::load_dataset("a1")];
        if let Some(placa) = extract_plate(instruction) {
            actions.push(Action::calc_for_plate("a2", &placa));
        }
        let lower = instruction.to_lowercase();
        if self.stats_keywords.iter().any(|k| lower.contains(k.as_str())) {
            actions.push(Action::global_stats("a3"));
        }
        Plan::new(actions)
    }
}
