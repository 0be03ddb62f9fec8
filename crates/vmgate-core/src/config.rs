//! Environment Configuration Loader
//!
//! Loads `KEY=VALUE` files into the process environment and builds the
//! gateway configuration from it.
//!
//! ## Usage
//!
//! Call `load_environment()` early in main() before reading any config:
//!
//! ```rust
//! use vmgate_core::config::{load_environment, GatewayConfig};
//!
//! load_environment();
//! let config = GatewayConfig::from_env();
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Paths checked for an environment file (in order of priority)
pub const ENV_FILE_PATHS: &[&str] = &["/etc/vmgate/environment", ".env"];

pub const DEFAULT_PROXY_URL: &str = "http://codesandbox_proxy:3001";
pub const DEFAULT_LLM_URL: &str = "https://api.mistral.ai/v1";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Load environment variables from the first environment file found.
///
/// `$VMGATE_ENV_FILE` wins over the built-in paths. Variables that are
/// already set are never overridden.
///
/// Returns the path that was loaded, or None if no file was found.
pub fn load_environment() -> Option<String> {
    if let Ok(custom_path) = std::env::var("VMGATE_ENV_FILE") {
        if let Some(path) = try_load_env_file(&custom_path) {
            return Some(path);
        }
    }

    for path in ENV_FILE_PATHS {
        if let Some(loaded_path) = try_load_env_file(path) {
            return Some(loaded_path);
        }
    }

    debug!("No environment file found, using existing environment");
    None
}

fn try_load_env_file(path: &str) -> Option<String> {
    let content = match fs::read_to_string(Path::new(path)) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!("Failed to read environment file {}: {}", path, e);
            return None;
        }
    };

    let entries = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(parse_env_line);

    let mut applied = 0;
    for (key, value) in entries {
        if std::env::var_os(&key).is_some() {
            debug!("Keeping existing {}", key);
            continue;
        }
        debug!("Setting {}={}", key, redact(&key, &value));
        std::env::set_var(&key, &value);
        applied += 1;
    }

    info!("Applied {} variables from {}", applied, path);
    Some(path.to_string())
}

fn redact<'a>(key: &str, value: &'a str) -> &'a str {
    if key.contains("KEY") || key.contains("TOKEN") || key.contains("SECRET") {
        "***"
    } else {
        value
    }
}

/// Parse a single environment line into key-value pair.
fn parse_env_line(line: &str) -> Option<(String, String)> {
    // KEY=VALUE, KEY="VALUE", KEY='VALUE', optionally prefixed with `export `
    let line = line.strip_prefix("export ").unwrap_or(line);
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = value.trim();

    if key.is_empty() {
        return None;
    }

    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(value);

    Some((key.to_string(), value.to_string()))
}

/// Process-wide gateway configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Sandbox proxy base URL. `None` when explicitly configured empty.
    pub proxy_base_url: Option<String>,
    /// Default LLM credential used when a request carries none.
    pub default_api_key: Option<String>,
    pub llm_base_url: String,
    pub bind_addr: String,
    pub port: u16,
    pub sandbox_timeout: Duration,
    pub llm_timeout: Duration,
    /// Allowed CORS origins. `None` allows any origin.
    pub cors_origins: Option<Vec<String>>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            proxy_base_url: Some(DEFAULT_PROXY_URL.to_string()),
            default_api_key: None,
            llm_base_url: DEFAULT_LLM_URL.to_string(),
            bind_addr: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            sandbox_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            llm_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cors_origins: None,
        }
    }
}

impl GatewayConfig {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        // A proxy URL that is set but empty counts as missing.
        let proxy_base_url = match lookup("SANDBOX_PROXY_URL").or_else(|| lookup("MCP_SERVER_URL")) {
            Some(url) => {
                let url = url.trim().trim_end_matches('/').to_string();
                if url.is_empty() {
                    None
                } else {
                    Some(url)
                }
            }
            None => defaults.proxy_base_url,
        };

        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let secs = |key: &str, default: Duration| {
            non_empty(key)
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(default)
        };

        let cors_origins = non_empty("CORS_ORIGINS").and_then(|raw| {
            let origins: Vec<String> = raw
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
            if origins.is_empty() || origins.iter().any(|o| o == "*") {
                None
            } else {
                Some(origins)
            }
        });

        Self {
            proxy_base_url,
            default_api_key: non_empty("MISTRAL_API_KEY"),
            llm_base_url: non_empty("MISTRAL_API_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.llm_base_url),
            bind_addr: non_empty("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: non_empty("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            sandbox_timeout: secs("SANDBOX_TIMEOUT_SECS", defaults.sandbox_timeout),
            llm_timeout: secs("LLM_TIMEOUT_SECS", defaults.llm_timeout),
            cors_origins,
        }
    }

    /// The proxy base URL, or `ConfigurationMissing` when it is absent.
    pub fn require_proxy_url(&self) -> Result<&str> {
        self.proxy_base_url.as_deref().ok_or_else(|| {
            Error::configuration_missing(
                "SANDBOX_PROXY_URL environment variable is not set. Please configure it.",
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> GatewayConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        GatewayConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_env_file_never_overrides_existing_variables() {
        let path = std::env::temp_dir().join(format!("vmgate-env-{}", std::process::id()));
        fs::write(
            &path,
            "# comment\nVMGATE_TEST_FRESH=from-file\nexport VMGATE_TEST_KEPT=from-file\n",
        )
        .unwrap();
        std::env::set_var("VMGATE_TEST_KEPT", "from-env");

        let loaded = try_load_env_file(path.to_str().unwrap());
        fs::remove_file(&path).unwrap();

        assert!(loaded.is_some());
        assert_eq!(std::env::var("VMGATE_TEST_FRESH").unwrap(), "from-file");
        assert_eq!(std::env::var("VMGATE_TEST_KEPT").unwrap(), "from-env");
    }

    #[test]
    fn test_missing_env_file_is_skipped() {
        assert!(try_load_env_file("/nonexistent/vmgate/environment").is_none());
    }

    #[test]
    fn test_parse_env_line_simple() {
        let (k, v) = parse_env_line("FOO=bar").unwrap();
        assert_eq!(k, "FOO");
        assert_eq!(v, "bar");
    }

    #[test]
    fn test_parse_env_line_quoted() {
        let (k, v) = parse_env_line("FOO=\"bar baz\"").unwrap();
        assert_eq!(k, "FOO");
        assert_eq!(v, "bar baz");
    }

    #[test]
    fn test_parse_env_line_export_prefix() {
        let (k, v) = parse_env_line("export MISTRAL_API_KEY='abc=def'").unwrap();
        assert_eq!(k, "MISTRAL_API_KEY");
        assert_eq!(v, "abc=def");
    }

    #[test]
    fn test_parse_env_line_empty() {
        assert!(parse_env_line("").is_none());
        assert!(parse_env_line("=value").is_none());
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = config_from(&[]);
        assert_eq!(config.proxy_base_url.as_deref(), Some(DEFAULT_PROXY_URL));
        assert_eq!(config.llm_base_url, DEFAULT_LLM_URL);
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.default_api_key.is_none());
        assert!(config.cors_origins.is_none());
    }

    #[test]
    fn test_legacy_proxy_variable_and_trailing_slash() {
        let config = config_from(&[("MCP_SERVER_URL", "http://sandbox:3001/")]);
        assert_eq!(config.proxy_base_url.as_deref(), Some("http://sandbox:3001"));
    }

    #[test]
    fn test_empty_proxy_url_is_missing() {
        let config = config_from(&[("SANDBOX_PROXY_URL", "")]);
        assert!(config.proxy_base_url.is_none());
        assert!(matches!(
            config.require_proxy_url(),
            Err(Error::ConfigurationMissing(_))
        ));
    }

    #[test]
    fn test_blank_api_key_is_absent() {
        let config = config_from(&[("MISTRAL_API_KEY", "  ")]);
        assert!(config.default_api_key.is_none());
    }

    #[test]
    fn test_cors_wildcard_means_any() {
        let config = config_from(&[("CORS_ORIGINS", "http://localhost:3000, *")]);
        assert!(config.cors_origins.is_none());

        let config = config_from(&[("CORS_ORIGINS", "http://localhost:3000,https://app.example")]);
        assert_eq!(
            config.cors_origins,
            Some(vec![
                "http://localhost:3000".to_string(),
                "https://app.example".to_string()
            ])
        );
    }

    #[test]
    fn test_timeouts_parse_seconds() {
        let config = config_from(&[("SANDBOX_TIMEOUT_SECS", "5"), ("LLM_TIMEOUT_SECS", "junk")]);
        assert_eq!(config.sandbox_timeout, Duration::from_secs(5));
        assert_eq!(config.llm_timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }
}
