use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::oracle::CompletionParams;

/// Whole-pipeline configuration, read from an optional TOML file with env
/// fallback for the oracle credential. Every field has a default, so running
/// with no config file at all is valid (and selects degraded oracle mode).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub oracle: OracleConfig,
    pub feed: FeedConfig,
    pub storage: StorageConfig,
}

impl PipelineConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) => {
                let raw = std::fs::read_to_string(p)
                    .with_context(|| format!("reading config file {}", p.display()))?;
                toml::from_str(&raw)
                    .with_context(|| format!("parsing config file {}", p.display()))?
            }
            None => PipelineConfig::default(),
        };
        cfg.apply_env();
        Ok(cfg)
    }

    fn apply_env(&mut self) {
        if self.oracle.api_key.is_none() {
            if let Ok(key) = std::env::var("OPENAI_API_KEY") {
                if !key.trim().is_empty() {
                    self.oracle.api_key = Some(key);
                }
            }
        }
        if self.oracle.api_base.is_none() {
            if let Ok(base) = std::env::var("OPENAI_API_BASE") {
                if !base.trim().is_empty() {
                    self.oracle.api_base = Some(base);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub api_key: Option<String>,
    pub api_base: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
    pub classify_max_tokens: u32,
    pub classify_temperature: f32,
    pub explain_max_tokens: u32,
    pub explain_temperature: f32,
}

impl Default for OracleConfig {
    fn default() -> Self {
        OracleConfig {
            api_key: None,
            api_base: None,
            model: "gpt-4o".to_string(),
            timeout_secs: 10,
            classify_max_tokens: 10,
            classify_temperature: 0.1,
            explain_max_tokens: 200,
            explain_temperature: 0.5,
        }
    }
}

impl OracleConfig {
    /// Detectable up front so the run selects the no-oracle code path once,
    /// instead of failing on every call.
    pub fn is_configured(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }

    pub fn classify_params(&self) -> CompletionParams {
        CompletionParams {
            max_tokens: self.classify_max_tokens,
            temperature: self.classify_temperature,
        }
    }

    pub fn explain_params(&self) -> CompletionParams {
        CompletionParams {
            max_tokens: self.explain_max_tokens,
            temperature: self.explain_temperature,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub max_topics_per_source: usize,
    pub request_timeout_secs: u64,
    pub bilibili_limit: u32,
    pub user_agent: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        FeedConfig {
            max_topics_per_source: 30,
            request_timeout_secs: 10,
            bilibili_limit: 10,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Where the history table and per-day CSV snapshots live.
    pub data_dir: String,
    /// Where the display-ready JSON projections land.
    pub display_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            data_dir: "collector_output/data".to_string(),
            display_dir: "data".to_string(),
        }
    }
}
