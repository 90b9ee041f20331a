//! Configuration loading for labwarden.
//! Reads labwarden.toml from the current directory or the path in the
//! LABWARDEN_CONFIG env var. Every field has a default, so running without
//! a config file gives an in-memory store talking to api.openai.com.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use labwarden_db::{MemoryStore, PgStore, RecordStore};
use labwarden_llm::backend::{OllamaBackend, OpenAiCompatibleBackend, OLLAMA_BASE_URL, OPENAI_BASE_URL};
use labwarden_llm::{HazardAssessor, LlmBackend};

pub const CONFIG_PATH_ENV: &str = "LABWARDEN_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "labwarden.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

// ── Server ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Directory served for paths no API route matches.
    pub static_dir: Option<PathBuf>,
}

fn default_bind_addr() -> String { "127.0.0.1:5000".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_addr: default_bind_addr(), static_dir: None }
    }
}

// ── Storage ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

fn default_max_connections() -> usize { 10 }

impl Default for StorageConfig {
    fn default() -> Self {
        Self { backend: StorageBackend::Memory, url: None, max_connections: default_max_connections() }
    }
}

impl StorageConfig {
    /// Construct the configured store. PostgreSQL tables are created if missing.
    pub async fn open(&self) -> anyhow::Result<Arc<dyn RecordStore>> {
        match self.backend {
            StorageBackend::Memory => {
                tracing::warn!("using in-memory store; records are lost on exit");
                Ok(Arc::new(MemoryStore::new()))
            }
            StorageBackend::Postgres => {
                let url = self
                    .url
                    .as_deref()
                    .context("storage.url is required for the postgres backend")?;
                let store = PgStore::connect(url, self.max_connections)?;
                store.initialize().await.context("failed to initialize database schema")?;
                tracing::info!(max_connections = self.max_connections, "connected to PostgreSQL");
                Ok(Arc::new(store))
            }
        }
    }
}

// ── LLM ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Any OpenAI-style `/chat/completions` endpoint.
    #[default]
    Openai,
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: LlmProvider,
    /// Defaults per provider when unset.
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_llm_temperature")]
    pub temperature: f32,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_llm_model()       -> String { "gpt-4o".to_string() }
fn default_llm_temperature() -> f32    { 0.7 }
fn default_llm_timeout()     -> u64    { 60 }

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Openai,
            base_url: None,
            api_key: None,
            model: default_llm_model(),
            temperature: default_llm_temperature(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

impl LlmConfig {
    pub fn effective_base_url(&self) -> &str {
        match (&self.base_url, self.provider) {
            (Some(url), _) => url,
            (None, LlmProvider::Openai) => OPENAI_BASE_URL,
            (None, LlmProvider::Ollama) => OLLAMA_BASE_URL,
        }
    }

    pub fn build_backend(&self) -> anyhow::Result<Arc<dyn LlmBackend>> {
        let timeout = Duration::from_secs(self.timeout_secs);
        let base_url = self.effective_base_url();
        let backend: Arc<dyn LlmBackend> = match self.provider {
            LlmProvider::Openai => {
                if self.api_key.is_none() {
                    tracing::warn!(base_url, "no LLM API key configured; requests are sent unauthenticated");
                }
                Arc::new(
                    OpenAiCompatibleBackend::new(base_url, &self.model, self.api_key.clone())
                        .with_timeout(timeout)?,
                )
            }
            LlmProvider::Ollama => Arc::new(OllamaBackend::new(base_url, &self.model).with_timeout(timeout)?),
        };
        tracing::info!(base_url, model = %self.model, timeout_secs = self.timeout_secs, "LLM backend ready");
        Ok(backend)
    }

    pub fn build_assessor(&self) -> anyhow::Result<HazardAssessor> {
        Ok(HazardAssessor::new(self.build_backend()?)
            .with_model(self.model.clone())
            .with_temperature(self.temperature))
    }
}

// ── Loading ──────────────────────────────────────────────────────────────────

impl Config {
    /// Load configuration from labwarden.toml.
    /// Checks LABWARDEN_CONFIG env var first, then current directory.
    pub fn load() -> anyhow::Result<Self> {
        let explicit = std::env::var(CONFIG_PATH_ENV).ok();
        let path = explicit.clone().unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

        let mut config = if Path::new(&path).exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {path}"))?;
            Self::from_toml(&content).with_context(|| format!("invalid config file {path}"))?
        } else if explicit.is_some() {
            anyhow::bail!("Config file not found: {path}");
        } else {
            tracing::info!("{DEFAULT_CONFIG_PATH} not found; using defaults");
            Config::default()
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Overlay environment variables. `lookup` is `std::env::var` outside tests.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("LABWARDEN_LLM_API_KEY").or_else(|| non_empty("AI_INTEGRATIONS_OPENAI_API_KEY")) {
            self.llm.api_key = Some(key);
        }
        if let Some(url) = non_empty("AI_INTEGRATIONS_OPENAI_BASE_URL") {
            self.llm.base_url = Some(url);
        }
        if let Some(url) = non_empty("DATABASE_URL") {
            self.storage.url = Some(url);
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.llm.temperature > 0.0 && self.llm.temperature <= 2.0) {
            anyhow::bail!("llm.temperature must be in (0, 2], got {}", self.llm.temperature);
        }
        if self.llm.model.trim().is_empty() {
            anyhow::bail!("llm.model must not be empty");
        }
        if self.storage.backend == StorageBackend::Postgres && self.storage.url.is_none() {
            anyhow::bail!("storage.url (or DATABASE_URL) is required when storage.backend = \"postgres\"");
        }
        Ok(())
    }
}
