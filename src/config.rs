//! Startup configuration: required environment, optional TOML profiles.
//!
//! Precedence is command line, then environment, then the selected profile.
//! The API key is only ever read from the environment.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::news::guardrail::DEFAULT_MAX_QUERY_CHARS;
use crate::news::render::OutputMode;
use crate::news::specialist::DEFAULT_MAX_TOOL_ROUNDS;
use crate::rchain::provider::AskOptions;

pub const BASE_URL_ENV: &str = "BASE_URL";
pub const API_KEY_ENV: &str = "API_KEY";
pub const MODEL_NAME_ENV: &str = "MODEL_NAME";

pub const DEFAULT_USER_ID: &str = "user456";
pub const DEFAULT_CATEGORIES: [&str; 2] = ["tech", "finance"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {}. Please set BASE_URL, API_KEY, and MODEL_NAME.", .missing.join(", "))]
    MissingRequired { missing: Vec<&'static str> },
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Config file '{}' does not contain a [profiles] section.", .path.display())]
    NoProfiles { path: PathBuf },
    #[error("Profile '{name}' not found in config file '{}'.", .path.display())]
    ProfileNotFound { name: String, path: PathBuf },
    #[error("Cannot resolve config path: set NS_CONFIG or HOME/XDG_CONFIG_HOME.")]
    NoConfigPath,
    #[error("Invalid {key} '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProfileConfig {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout: Option<u64>,
    pub turn_timeout: Option<u64>,
    pub retries: Option<u32>,
    pub retry_delay: Option<u64>,
    pub max_tool_rounds: Option<usize>,
    pub user_id: Option<String>,
    pub preferred_categories: Option<Vec<String>>,
    pub output: Option<String>,
    pub max_query_chars: Option<usize>,
    pub blocked_terms: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    profiles: Option<HashMap<String, ProfileConfig>>,
}

/// Values given on the command line; `None` defers to env and profile.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub profile: Option<String>,
    pub user_id: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout: Option<u64>,
    pub turn_timeout: Option<u64>,
    pub retries: Option<u32>,
    pub retry_delay: Option<u64>,
    pub output: Option<OutputMode>,
}

/// Everything the session needs, resolved once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub ask: AskOptions,
    pub turn_timeout: Option<Duration>,
    pub max_tool_rounds: usize,
    pub user_id: String,
    pub preferred_categories: Vec<String>,
    pub output: OutputMode,
    pub max_query_chars: usize,
    pub blocked_terms: Vec<String>,
}

impl Settings {
    /// Resolves settings from the process environment.
    pub fn from_env(overrides: &Overrides) -> Result<Self, ConfigError> {
        Self::resolve(overrides, |key| std::env::var(key).ok())
    }

    /// Resolves settings with an explicit environment lookup.
    pub fn resolve<F>(overrides: &Overrides, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| env(key).map(|value| value.trim().to_string()).filter(|v| !v.is_empty());

        let profile = match &overrides.profile {
            Some(name) => load_profile(name, config_path(&env)?)?,
            None => ProfileConfig::default(),
        };

        let base_url = env(BASE_URL_ENV).or(profile.base_url.clone());
        let api_key = env(API_KEY_ENV);
        let model = env(MODEL_NAME_ENV).or(profile.model.clone());

        let missing: Vec<&'static str> = [
            (BASE_URL_ENV, base_url.is_none()),
            (API_KEY_ENV, api_key.is_none()),
            (MODEL_NAME_ENV, model.is_none()),
        ]
        .into_iter()
        .filter_map(|(key, absent)| absent.then_some(key))
        .collect();
        let (Some(base_url), Some(api_key), Some(model)) = (base_url, api_key, model) else {
            return Err(ConfigError::MissingRequired { missing });
        };

        let output = match overrides.output {
            Some(mode) => mode,
            None => match env("NS_OUTPUT").or(profile.output.clone()) {
                Some(raw) => OutputMode::parse(&raw).ok_or_else(|| ConfigError::Invalid {
                    key: "NS_OUTPUT",
                    value: raw.clone(),
                    reason: "expected 'text' or 'json'".to_string(),
                })?,
                None => OutputMode::Text,
            },
        };

        let ask = AskOptions {
            temperature: pick(overrides.temperature, &env, "NS_TEMPERATURE", profile.temperature)?,
            max_tokens: pick(overrides.max_tokens, &env, "NS_MAX_TOKENS", profile.max_tokens)?,
            timeout_secs: pick(overrides.timeout, &env, "NS_TIMEOUT", profile.timeout)?
                .filter(|secs| *secs > 0),
            retries: pick(overrides.retries, &env, "NS_RETRIES", profile.retries)?.unwrap_or(0),
            retry_delay_ms: pick(overrides.retry_delay, &env, "NS_RETRY_DELAY", profile.retry_delay)?
                .unwrap_or(AskOptions::default().retry_delay_ms),
        };

        let turn_timeout =
            pick(overrides.turn_timeout, &env, "NS_TURN_TIMEOUT", profile.turn_timeout)?
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs);

        let max_tool_rounds = profile.max_tool_rounds.unwrap_or(DEFAULT_MAX_TOOL_ROUNDS);
        if max_tool_rounds < 1 {
            return Err(ConfigError::Invalid {
                key: "max_tool_rounds",
                value: max_tool_rounds.to_string(),
                reason: "at least one tool round is required".to_string(),
            });
        }

        let user_id = overrides
            .user_id
            .clone()
            .or_else(|| env("NS_USER_ID"))
            .or(profile.user_id)
            .unwrap_or_else(|| DEFAULT_USER_ID.to_string());

        Ok(Self {
            base_url,
            api_key,
            model,
            ask,
            turn_timeout,
            max_tool_rounds,
            user_id,
            preferred_categories: profile
                .preferred_categories
                .unwrap_or_else(|| DEFAULT_CATEGORIES.map(String::from).to_vec()),
            output,
            max_query_chars: profile.max_query_chars.unwrap_or(DEFAULT_MAX_QUERY_CHARS),
            blocked_terms: profile.blocked_terms.unwrap_or_default(),
        })
    }
}

fn pick<T, F>(cli: Option<T>, env: &F, key: &'static str, profile: Option<T>) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    if cli.is_some() {
        return Ok(cli);
    }
    match env(key) {
        Some(raw) => raw.parse().map(Some).map_err(|err: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: err.to_string(),
        }),
        None => Ok(profile),
    }
}

pub fn load_profile(name: &str, path: PathBuf) -> Result<ProfileConfig, ConfigError> {
    let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;

    let config: ConfigFile = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.clone(),
        source,
    })?;

    let mut profiles = config
        .profiles
        .ok_or_else(|| ConfigError::NoProfiles { path: path.clone() })?;

    profiles
        .remove(name)
        .ok_or_else(|| ConfigError::ProfileNotFound {
            name: name.to_string(),
            path,
        })
}

fn config_path<F>(env: &F) -> Result<PathBuf, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = env("NS_CONFIG") {
        return Ok(PathBuf::from(path));
    }
    if let Some(xdg) = env("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg).join("newssense").join("config.toml"));
    }
    let home = env("HOME").ok_or(ConfigError::NoConfigPath)?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("newssense")
        .join("config.toml"))
}
