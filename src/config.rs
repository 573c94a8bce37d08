use anyhow::{Context, Result, bail};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_GENERATION_HOST: &str = "http://localhost:11434";
pub const DEFAULT_GENERATION_MODEL: &str = "llama3.2:1b";
pub const DEFAULT_SEARCH_API_URL: &str = "https://api.stackexchange.com/2.3/search/advanced";
pub const DEFAULT_SEARCH_SITE: &str = "stackoverflow";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// Upper bound on `pagesize` accepted by the Stack Exchange API.
const MAX_SEARCH_PAGE_SIZE: usize = 100;

/// Process-wide settings. Built once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct Config {
    pub generation_host: String,
    pub generation_model: String,
    pub generation_timeout: Duration,
    pub search_enabled: bool,
    pub search_max_results: usize,
    pub search_timeout: Duration,
    pub search_api_url: String,
    pub search_site: String,
    pub bind_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            generation_host: DEFAULT_GENERATION_HOST.to_string(),
            generation_model: DEFAULT_GENERATION_MODEL.to_string(),
            generation_timeout: Duration::from_secs(60),
            search_enabled: false,
            search_max_results: 3,
            search_timeout: Duration::from_secs(10),
            search_api_url: DEFAULT_SEARCH_API_URL.to_string(),
            search_site: DEFAULT_SEARCH_SITE.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl Config {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> Result<Config> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Unset keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let generation_host = get("GENERATION_HOST")
            .or_else(|| get("OLLAMA_HOST"))
            .unwrap_or(defaults.generation_host);
        let generation_model = get("GENERATION_MODEL")
            .or_else(|| get("OLLAMA_MODEL"))
            .unwrap_or(defaults.generation_model);

        let generation_timeout = match get("GENERATION_TIMEOUT_SECS") {
            Some(v) => parse_secs("GENERATION_TIMEOUT_SECS", &v)?,
            None => defaults.generation_timeout,
        };
        let search_timeout = match get("SEARCH_TIMEOUT_SECS") {
            Some(v) => parse_secs("SEARCH_TIMEOUT_SECS", &v)?,
            None => defaults.search_timeout,
        };
        let search_enabled = match get("SEARCH_AUGMENTATION") {
            Some(v) => parse_bool("SEARCH_AUGMENTATION", &v)?,
            None => defaults.search_enabled,
        };
        let search_max_results = match get("SEARCH_MAX_RESULTS") {
            Some(v) => parse_num::<usize>("SEARCH_MAX_RESULTS", &v)?,
            None => defaults.search_max_results,
        };
        if search_max_results == 0 || search_max_results > MAX_SEARCH_PAGE_SIZE {
            bail!("SEARCH_MAX_RESULTS must be between 1 and {MAX_SEARCH_PAGE_SIZE}, got {search_max_results}");
        }

        Ok(Config {
            generation_host,
            generation_model,
            generation_timeout,
            search_enabled,
            search_max_results,
            search_timeout,
            search_api_url: get("SEARCH_API_URL").unwrap_or(defaults.search_api_url),
            search_site: get("SEARCH_SITE").unwrap_or(defaults.search_site),
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
        })
    }
}

fn parse_num<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse::<T>()
        .with_context(|| format!("Invalid value for {key}: {value:?}"))
}

fn parse_secs(key: &str, value: &str) -> Result<Duration> {
    let secs = parse_num::<u64>(key, value)?;
    if secs == 0 {
        bail!("{key} must be greater than zero");
    }
    Ok(Duration::from_secs(secs))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("Invalid value for {key}: {other:?} (expected true or false)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.generation_host, "http://localhost:11434");
        assert_eq!(config.generation_model, DEFAULT_GENERATION_MODEL);
        assert_eq!(config.generation_timeout, Duration::from_secs(60));
        assert!(!config.search_enabled);
        assert_eq!(config.search_max_results, 3);
        assert_eq!(config.bind_addr, "0.0.0.0:8000");
    }

    #[test]
    fn test_legacy_ollama_variables_are_honoured() {
        let config = config_from(&[
            ("OLLAMA_HOST", "http://gpu-box:11434"),
            ("OLLAMA_MODEL", "llama3"),
        ])
        .unwrap();
        assert_eq!(config.generation_host, "http://gpu-box:11434");
        assert_eq!(config.generation_model, "llama3");
    }

    #[test]
    fn test_generation_variables_win_over_legacy_ones() {
        let config = config_from(&[
            ("OLLAMA_HOST", "http://old:11434"),
            ("GENERATION_HOST", "http://new:11434"),
        ])
        .unwrap();
        assert_eq!(config.generation_host, "http://new:11434");
    }

    #[test]
    fn test_search_knobs() {
        let config = config_from(&[
            ("SEARCH_AUGMENTATION", "yes"),
            ("SEARCH_MAX_RESULTS", "5"),
            ("SEARCH_TIMEOUT_SECS", "2"),
        ])
        .unwrap();
        assert!(config.search_enabled);
        assert_eq!(config.search_max_results, 5);
        assert_eq!(config.search_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = config_from(&[("GENERATION_MODEL", "   ")]).unwrap();
        assert_eq!(config.generation_model, DEFAULT_GENERATION_MODEL);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(config_from(&[("GENERATION_TIMEOUT_SECS", "soon")]).is_err());
        assert!(config_from(&[("GENERATION_TIMEOUT_SECS", "0")]).is_err());
        assert!(config_from(&[("SEARCH_AUGMENTATION", "maybe")]).is_err());
        assert!(config_from(&[("SEARCH_MAX_RESULTS", "0")]).is_err());
        assert!(config_from(&[("SEARCH_MAX_RESULTS", "101")]).is_err());
    }
}
