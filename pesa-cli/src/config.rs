use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use pesa_enrich::{EnricherConfig, RetryPolicy};

use crate::state::ensure_pesa_home;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub llm: LlmSection,
    pub enrich: EnrichSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSection {
    pub model: String,
    pub base_url: String,
    /// Environment variable holding the API key; keys never live in the file
    pub api_key_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichSection {
    pub attempts: u32,
    pub initial_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmSection {
                model: "gpt-4o-mini".to_string(),
                base_url: "https://api.openai.com".to_string(),
                api_key_env: "OPENAI_API_KEY".to_string(),
            },
            enrich: EnrichSection {
                attempts: 3,
                initial_delay_ms: 500,
            },
        }
    }
}

impl Config {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.enrich.attempts,
            initial_delay: Duration::from_millis(self.enrich.initial_delay_ms),
        }
    }

    pub fn enricher_config(&self) -> Result<EnricherConfig> {
        let api_key = match std::env::var(&self.llm.api_key_env) {
            Ok(k) if !k.is_empty() => k,
            _ => bail!(
                "{} is not set; export it or point llm.api_key_env elsewhere in config.toml",
                self.llm.api_key_env
            ),
        };
        Ok(EnricherConfig {
            base_url: self.llm.base_url.clone(),
            model: self.llm.model.clone(),
            api_key,
        })
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_pesa_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(toml::from_str(&s).context("parse config.toml")?)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let cfg = Config::default();
    save_config(&cfg)?;
    println!("Wrote {}", p.display());
    Ok(())
}
