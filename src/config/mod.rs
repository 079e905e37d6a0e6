mod api;
mod defaults;
mod display;
mod validation;

use crate::cli::Args;
use crate::error::{AdvisorError, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use api::ApiConfig;
pub use defaults::DEFAULT_API_BASE;
pub use display::DisplayConfig;
pub use validation::{expand_env_var_in_string, normalize_base_url, parse_flag};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub verbose: Option<bool>,
}

/// Shape of `.laptop-advisor.yaml` / `.json`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FileConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Everything the API client needs. Passed in at construction so tests can
/// point it at a fake endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiSettings {
    pub base_url: String,
    pub request_timeout: Duration,
    pub price_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            request_timeout: Duration::from_secs(defaults::default_request_timeout()),
            price_timeout: Duration::from_secs(defaults::default_price_timeout()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api: ApiSettings,
    pub verbose: bool,
    pub currency_symbol: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiSettings::default(),
            verbose: defaults::default_verbose(),
            currency_symbol: defaults::default_currency_symbol(),
        }
    }
}

impl Config {
    pub fn from_env_and_args(args: &Args) -> Result<Self> {
        let file_config = match &args.config {
            Some(path) => FileConfig::load_from(path)?,
            None => FileConfig::load()?,
        };
        Self::resolve(args, &file_config, |name| env::var(name).ok())
    }

    /// Layering: CLI args > env vars > config file > defaults.
    pub fn resolve<F>(args: &Args, file: &FileConfig, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_base = args
            .api_base
            .clone()
            .or_else(|| lookup("ADVISOR_API_BASE"))
            .or_else(|| file.api.base_url.clone())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let base_url = normalize_base_url(&expand_env_var_in_string(&raw_base, &lookup))
            .map_err(AdvisorError::ConfigError)?;

        let request_timeout = args
            .request_timeout
            .or_else(|| lookup("ADVISOR_REQUEST_TIMEOUT").and_then(|s| s.parse().ok()))
            .or(file.api.request_timeout)
            .unwrap_or_else(defaults::default_request_timeout);

        let price_timeout = args
            .price_timeout
            .or_else(|| lookup("ADVISOR_PRICE_TIMEOUT").and_then(|s| s.parse().ok()))
            .or(file.api.price_timeout)
            .unwrap_or_else(defaults::default_price_timeout);

        if request_timeout == 0 || price_timeout == 0 {
            return Err(AdvisorError::ConfigError(
                "timeouts must be at least one second".to_string(),
            ));
        }

        // --verbose can only switch logging on
        let verbose = args.verbose
            || lookup("ADVISOR_VERBOSE")
                .and_then(|v| parse_flag(&v))
                .or(file.session.verbose)
                .unwrap_or_else(defaults::default_verbose);

        let currency_symbol = lookup("ADVISOR_CURRENCY")
            .or_else(|| file.display.currency_symbol.clone())
            .unwrap_or_else(defaults::default_currency_symbol);

        Ok(Config {
            api: ApiSettings {
                base_url,
                request_timeout: Duration::from_secs(request_timeout),
                price_timeout: Duration::from_secs(price_timeout),
            },
            verbose,
            currency_symbol,
        })
    }
}

impl FileConfig {
    /// First existing file from `get_config_paths` wins; none found means defaults.
    pub fn load() -> Result<Self> {
        for path in Self::get_config_paths() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(FileConfig::default())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let is_yaml = matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yaml") | Some("yml")
        );

        let config = if is_yaml {
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config file: {}", path.display()))?
        } else {
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config file: {}", path.display()))?
        };

        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    pub fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".laptop-advisor.yaml"),
            PathBuf::from(".laptop-advisor.yml"),
            PathBuf::from(".laptop-advisor.json"),
        ];

        if let Some(config_dir) = dirs::home_dir().map(|home| home.join(".config").join("laptop-advisor")) {
            paths.push(config_dir.join("config.yaml"));
            paths.push(config_dir.join("config.yml"));
            paths.push(config_dir.join("config.json"));
        }

        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::collections::HashMap;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["advisor"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = Config::resolve(&args(&[]), &FileConfig::default(), env_of(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.api.price_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_cli_beats_env_beats_file() {
        let file = FileConfig {
            api: ApiConfig {
                base_url: Some("http://file:1/api".into()),
                request_timeout: Some(5),
                price_timeout: Some(90),
            },
            ..FileConfig::default()
        };
        let env = env_of(&[
            ("ADVISOR_API_BASE", "http://env:2/api/"),
            ("ADVISOR_REQUEST_TIMEOUT", "7"),
        ]);

        let config = Config::resolve(&args(&[]), &file, &env).unwrap();
        assert_eq!(config.api.base_url, "http://env:2/api");
        assert_eq!(config.api.request_timeout, Duration::from_secs(7));
        assert_eq!(config.api.price_timeout, Duration::from_secs(90));

        let config =
            Config::resolve(&args(&["--api-base", "http://cli:3/api"]), &file, &env).unwrap();
        assert_eq!(config.api.base_url, "http://cli:3/api");
    }

    #[test]
    fn test_base_url_env_expansion() {
        let env = env_of(&[("ADVISOR_API_BASE", "http://${BACKEND_HOST}/api"), ("BACKEND_HOST", "10.0.0.2:8000")]);
        let config = Config::resolve(&args(&[]), &FileConfig::default(), env).unwrap();
        assert_eq!(config.api.base_url, "http://10.0.0.2:8000/api");
    }

    #[test]
    fn test_invalid_base_url_is_config_error() {
        let result = Config::resolve(
            &args(&["--api-base", "localhost:8000"]),
            &FileConfig::default(),
            env_of(&[]),
        );
        assert!(matches!(result, Err(AdvisorError::ConfigError(_))));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = Config::resolve(
            &args(&["--price-timeout", "0"]),
            &FileConfig::default(),
            env_of(&[]),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_load_yaml_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("advisor.yaml");
        fs::write(
            &path,
            "api:\n  base_url: http://yaml-host:9000/api\n  price_timeout: 45\ndisplay:\n  currency_symbol: \"$\"\n",
        )
        .unwrap();

        let file = FileConfig::load_from(&path).unwrap();
        let config = Config::resolve(&args(&[]), &file, env_of(&[])).unwrap();
        assert_eq!(config.api.base_url, "http://yaml-host:9000/api");
        assert_eq!(config.api.price_timeout, Duration::from_secs(45));
        assert_eq!(config.currency_symbol, "$");
    }

    #[test]
    fn test_load_malformed_json_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("advisor.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            FileConfig::load_from(&path),
            Err(AdvisorError::ConfigError(_))
        ));
    }
}
