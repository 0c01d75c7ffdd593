// src/config/pipeline.rs
//! Run configuration.
//!
//! Resolution order:
//! 1) $PIPELINE_CONFIG_PATH (must exist)
//! 2) config/pipeline.toml
//! 3) config/pipeline.json
//! 4) built-in defaults
//!
//! Env overrides are applied last: KEYWORDS_PATH, INPUT_PATH, OUTPUT_PATH,
//! ON_DATA_ERROR (skip|abort), METRICS_PATH.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::pipeline::DataErrorPolicy;

pub const ENV_PIPELINE_CONFIG_PATH: &str = "PIPELINE_CONFIG_PATH";

fn default_output_path() -> PathBuf {
    PathBuf::from("results.json")
}
fn default_rss_platform() -> String {
    "news".to_string()
}
fn default_rss_language() -> String {
    "TR".to_string()
}

/// Optional RSS headline feed read from disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RssFeedCfg {
    pub path: PathBuf,
    #[serde(default = "default_rss_platform")]
    pub platform: String,
    #[serde(default = "default_rss_language")]
    pub language: String,
    #[serde(default)]
    pub region: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// `None` → dictionary default lookup ($KEYWORDS_PATH, config/keywords.{json,toml}).
    #[serde(default)]
    pub keywords_path: Option<PathBuf>,
    /// JSON array or JSON Lines file of raw items.
    #[serde(default)]
    pub input_path: Option<PathBuf>,
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
    #[serde(default)]
    pub on_data_error: DataErrorPolicy,
    /// Platform allowlist; empty admits every platform.
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub rss: Option<RssFeedCfg>,
    /// When set, a Prometheus textfile is written here after the run.
    #[serde(default)]
    pub metrics_path: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            keywords_path: None,
            input_path: Some(PathBuf::from("data/items.json")),
            output_path: default_output_path(),
            on_data_error: DataErrorPolicy::default(),
            platforms: Vec::new(),
            rss: None,
            metrics_path: None,
        }
    }
}

impl PipelineConfig {
    /// Load from an explicit path. Supports TOML or JSON.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading pipeline config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        parse_config(&content, ext.as_str())
            .with_context(|| format!("parsing pipeline config {}", path.display()))
    }

    /// File lookup (see module docs) followed by process env overrides.
    pub fn load_default() -> Result<Self> {
        let mut cfg = Self::load_file_default()?;
        cfg.apply_overrides(|k| std::env::var(k).ok())?;
        Ok(cfg)
    }

    fn load_file_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_PIPELINE_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            } else {
                return Err(anyhow!("PIPELINE_CONFIG_PATH points to non-existent path"));
            }
        }
        let toml_p = PathBuf::from("config/pipeline.toml");
        if toml_p.exists() {
            return Self::load_from(&toml_p);
        }
        let json_p = PathBuf::from("config/pipeline.json");
        if json_p.exists() {
            return Self::load_from(&json_p);
        }
        Ok(Self::default())
    }

    /// Apply overrides from a key lookup (the process env in production).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| lookup(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get("KEYWORDS_PATH") {
            self.keywords_path = Some(PathBuf::from(v));
        }
        if let Some(v) = get("INPUT_PATH") {
            self.input_path = Some(PathBuf::from(v));
        }
        if let Some(v) = get("OUTPUT_PATH") {
            self.output_path = PathBuf::from(v);
        }
        if let Some(v) = get("ON_DATA_ERROR") {
            self.on_data_error = v.parse()?;
        }
        if let Some(v) = get("METRICS_PATH") {
            self.metrics_path = Some(PathBuf::from(v));
        }
        Ok(())
    }
}

fn parse_config(s: &str, hint_ext: &str) -> Result<PipelineConfig> {
    let parsed = match hint_ext {
        "json" => serde_json::from_str::<PipelineConfig>(s).map_err(anyhow::Error::from),
        "toml" => toml::from_str::<PipelineConfig>(s).map_err(anyhow::Error::from),
        // Unknown extension: TOML first, then JSON.
        _ => toml::from_str::<PipelineConfig>(s)
            .map_err(anyhow::Error::from)
            .or_else(|_| serde_json::from_str::<PipelineConfig>(s).map_err(anyhow::Error::from)),
    };
    let mut cfg = parsed.context("unsupported pipeline config format")?;
    cfg.platforms = clean_list(std::mem::take(&mut cfg.platforms));
    Ok(cfg)
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    use std::collections::BTreeSet;
    let mut set = BTreeSet::new();
    for it in items {
        let t = it.trim();
        if !t.is_empty() {
            set.insert(t.to_string());
        }
    }
    set.into_iter().collect()
}
