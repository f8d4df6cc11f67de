//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge built-in defaults + `config.toml` + `config.<env>.toml`
//! + `APP_*` env vars (nested keys separated by `__`, e.g. `APP_RAG__TOP_K`).
//! Provides helpers to expand `~` and `${VAR}` and to resolve relative paths
//! against a known base directory.
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::chunker::ChunkingConfig;

pub struct Config {
    figment: Figment,
    base_dir: PathBuf,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_in(Path::new("."))
    }

    /// Same as [`Config::load`] but reads the TOML files from `base_dir`, which
    /// is also the directory relative paths are resolved against.
    pub fn load_in(base_dir: &Path) -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(AgentSettings::default()))
            .merge(Toml::file(base_dir.join("config.toml")));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file(base_dir.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(base_dir.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(base_dir.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment, base_dir: base_dir.to_path_buf() };
        config.validate()?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Extract the full typed settings tree.
    pub fn settings(&self) -> anyhow::Result<AgentSettings> {
        self.figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to extract settings: {}", e))
    }

    /// Resolve a configured path (already expanded) against the config base dir.
    pub fn resolve(&self, p: &str) -> PathBuf {
        resolve_with_base(&self.base_dir, p)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let settings = self.settings()?;
        settings.rag.chunking().validate()?;
        anyhow::ensure!(settings.rag.top_k > 0, "rag.top_k must be at least 1");
        anyhow::ensure!(!settings.llm.model.trim().is_empty(), "llm.model must not be empty");
        Ok(())
    }
}

/// Typed view over every key the agent reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentSettings {
    pub paths: PathsConfig,
    pub llm: LlmConfig,
    pub rag: RagConfig,
    pub planner: PlannerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    pub docs_dir: String,
    pub datasets_dir: String,
    pub dataset_file: String,
    pub reports_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            docs_dir: "data/docs".to_string(),
            datasets_dir: "data/datasets".to_string(),
            dataset_file: "vehiculos_soat.csv".to_string(),
            reports_dir: "outputs/reports".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    /// No client-side timeout when unset.
    pub timeout_secs: Option<u64>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.1:8b".to_string(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub stop_words: bool,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self { chunk_size: 1200, chunk_overlap: 200, top_k: 5, stop_words: false }
    }
}

impl RagConfig {
    pub fn chunking(&self) -> ChunkingConfig {
        ChunkingConfig { chunk_size: self.chunk_size, overlap: self.chunk_overlap }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    pub stats_keywords: Vec<String>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self { stats_keywords: DEFAULT_STATS_KEYWORDS.iter().map(|s| (*s).to_string()).collect() }
    }
}

/// Aggregate-analysis keywords matched against the lower-cased instruction.
pub const DEFAULT_STATS_KEYWORDS: &[&str] = &[
    "analiza", "analizar", "estadística", "estadisticas", "promedio", "porcentaje",
    "analyze", "statistics", "average", "percentage",
];

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
