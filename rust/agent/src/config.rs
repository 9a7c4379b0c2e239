//! Layered agent configuration: defaults, then a toml file named by
//! `ARENA_CONFIG`, then `ARENA_*` environment variables.

use arena_engine::parser::ParserConfig;
use arena_engine::registry::ToolRunner;
use arena_engine::tools::{DEFAULT_SAMPLES, MAX_SAMPLES, MIN_SAMPLES};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

pub const CONFIG_PATH_VAR: &str = "ARENA_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentConfig {
    /// Sampling temperature passed to the model provider
    pub temperature: f64,
    /// Per-call timeout in seconds
    pub timeout_secs: u64,
    /// Extra attempts after a transient responder error
    pub retries: u32,
    /// Send one clarification follow-up when a reply does not parse
    pub clarify: bool,
    /// Bytes after a bet/raise verb searched for its amount
    pub parser_lookahead: usize,
    /// Rounds of tool calls allowed before the model must answer; 0 disables tools
    pub tool_rounds: u32,
    /// Monte Carlo runouts per equity tool call
    pub equity_samples: u32,
    /// Seed for the equity simulation
    pub tool_seed: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            timeout_secs: 30,
            retries: 3,
            clarify: true,
            parser_lookahead: ParserConfig::default().lookahead,
            tool_rounds: 3,
            equity_samples: DEFAULT_SAMPLES,
            tool_seed: 0,
        }
    }
}

impl AgentConfig {
    pub fn parser_config(&self) -> ParserConfig {
        ParserConfig {
            lookahead: self.parser_lookahead,
            ..ParserConfig::default()
        }
    }

    pub fn tool_runner(&self) -> ToolRunner {
        ToolRunner::new(self.equity_samples, self.tool_seed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConfigSources {
    pub temperature: ValueSource,
    pub timeout_secs: ValueSource,
    pub retries: ValueSource,
    pub clarify: ValueSource,
    pub parser_lookahead: ValueSource,
    pub tool_rounds: ValueSource,
    pub equity_samples: ValueSource,
    pub tool_seed: ValueSource,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            temperature: ValueSource::Default,
            timeout_secs: ValueSource::Default,
            retries: ValueSource::Default,
            clarify: ValueSource::Default,
            parser_lookahead: ValueSource::Default,
            tool_rounds: ValueSource::Default,
            equity_samples: ValueSource::Default,
            tool_seed: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolved {
    pub config: AgentConfig,
    pub sources: ConfigSources,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("unknown agent kind: {0}")]
    UnknownAgent(String),
}

pub fn load() -> Result<AgentConfig, ConfigError> {
    load_with_sources().map(|resolved| resolved.config)
}

pub fn load_with_sources() -> Result<ConfigResolved, ConfigError> {
    let mut cfg = AgentConfig::default();
    let mut sources = ConfigSources::default();

    if let Ok(path) = std::env::var(CONFIG_PATH_VAR)
        && !path.is_empty()
    {
        let path = PathBuf::from(path);
        let s = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let f: FileConfig = toml::from_str(&s)?;
        apply_file(&mut cfg, &mut sources, f);
        tracing::debug!(path = %path.display(), "loaded agent config file");
    }

    if let Some(v) = env_value("ARENA_LLM_TEMPERATURE", |s| s.parse().ok())? {
        cfg.temperature = v;
        sources.temperature = ValueSource::Env;
    }
    if let Some(v) = env_value("ARENA_LLM_TIMEOUT", |s| s.parse().ok())? {
        cfg.timeout_secs = v;
        sources.timeout_secs = ValueSource::Env;
    }
    if let Some(v) = env_value("ARENA_LLM_RETRIES", |s| s.parse().ok())? {
        cfg.retries = v;
        sources.retries = ValueSource::Env;
    }
    if let Some(v) = env_value("ARENA_CLARIFY", parse_bool)? {
        cfg.clarify = v;
        sources.clarify = ValueSource::Env;
    }
    if let Some(v) = env_value("ARENA_PARSER_LOOKAHEAD", |s| s.parse().ok())? {
        cfg.parser_lookahead = v;
        sources.parser_lookahead = ValueSource::Env;
    }
    if let Some(v) = env_value("ARENA_TOOL_ROUNDS", |s| s.parse().ok())? {
        cfg.tool_rounds = v;
        sources.tool_rounds = ValueSource::Env;
    }
    if let Some(v) = env_value("ARENA_EQUITY_SAMPLES", |s| s.parse().ok())? {
        cfg.equity_samples = v;
        sources.equity_samples = ValueSource::Env;
    }
    if let Some(v) = env_value("ARENA_TOOL_SEED", |s| s.parse().ok())? {
        cfg.tool_seed = v;
        sources.tool_seed = ValueSource::Env;
    }

    validate(&cfg)?;
    Ok(ConfigResolved {
        config: cfg,
        sources,
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    temperature: Option<f64>,
    #[serde(default)]
    timeout_secs: Option<u64>,
    #[serde(default)]
    retries: Option<u32>,
    #[serde(default)]
    clarify: Option<bool>,
    #[serde(default)]
    parser_lookahead: Option<usize>,
    #[serde(default)]
    tool_rounds: Option<u32>,
    #[serde(default)]
    equity_samples: Option<u32>,
    #[serde(default)]
    tool_seed: Option<u64>,
}

fn apply_file(cfg: &mut AgentConfig, sources: &mut ConfigSources, f: FileConfig) {
    if let Some(v) = f.temperature {
        cfg.temperature = v;
        sources.temperature = ValueSource::File;
    }
    if let Some(v) = f.timeout_secs {
        cfg.timeout_secs = v;
        sources.timeout_secs = ValueSource::File;
    }
    if let Some(v) = f.retries {
        cfg.retries = v;
        sources.retries = ValueSource::File;
    }
    if let Some(v) = f.clarify {
        cfg.clarify = v;
        sources.clarify = ValueSource::File;
    }
    if let Some(v) = f.parser_lookahead {
        cfg.parser_lookahead = v;
        sources.parser_lookahead = ValueSource::File;
    }
    if let Some(v) = f.tool_rounds {
        cfg.tool_rounds = v;
        sources.tool_rounds = ValueSource::File;
    }
    if let Some(v) = f.equity_samples {
        cfg.equity_samples = v;
        sources.equity_samples = ValueSource::File;
    }
    if let Some(v) = f.tool_seed {
        cfg.tool_seed = v;
        sources.tool_seed = ValueSource::File;
    }
}

/// Reads a non-empty env var through `parse`; unset or empty means no override.
fn env_value<T>(
    var: &'static str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, ConfigError> {
    match std::env::var(var) {
        Ok(value) if !value.is_empty() => parse(value.trim())
            .map(Some)
            .ok_or(ConfigError::InvalidEnv { var, value }),
        _ => Ok(None),
    }
}

pub fn validate(cfg: &AgentConfig) -> Result<(), ConfigError> {
    if !(0.0..=2.0).contains(&cfg.temperature) {
        return Err(ConfigError::Invalid(format!(
            "temperature must be within [0, 2], got {}",
            cfg.temperature
        )));
    }
    if cfg.timeout_secs == 0 {
        return Err(ConfigError::Invalid("timeout_secs must be >0".into()));
    }
    if cfg.parser_lookahead == 0 {
        return Err(ConfigError::Invalid("parser_lookahead must be >0".into()));
    }
    if !(MIN_SAMPLES..=MAX_SAMPLES).contains(&cfg.equity_samples) {
        return Err(ConfigError::Invalid(format!(
            "equity_samples must be within [{MIN_SAMPLES}, {MAX_SAMPLES}], got {}",
            cfg.equity_samples
        )));
    }
    Ok(())
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
