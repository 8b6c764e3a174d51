//! Configuration types for qmon.
//!
//! Configuration is layered: built-in defaults, then `/etc/qmon/config.toml`,
//! then the user config (respecting `XDG_CONFIG_HOME`), then environment
//! overrides, then CLI flags (applied in `main`). Invalid values are
//! corrected to defaults with a warning unless `QMON_STRICT_CONFIG` is set.

use serde::{Deserialize, Serialize};

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,

    pub refresh: RefreshConfig,

    pub display: DisplayConfig,

    pub behavior: BehaviorConfig,
}

/// Coordinator endpoint configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Coordinator base URL (the client appends /v1/query)
    pub url: String,

    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080".to_string(),
            request_timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Delay between poll completions in milliseconds
    pub poll_interval_ms: u64,

    /// How often the displayed list is fully re-sorted, in milliseconds.
    /// 0 disables periodic reordering.
    pub reorder_interval_ms: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1_000,
            reorder_interval_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Maximum number of queries shown. 0 means unbounded.
    pub max_queries: usize,

    /// Theme name: "dark" or "light"
    pub theme: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_queries: 100,
            theme: "dark".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Quiet period after the last search keystroke before the list is
    /// re-derived, in milliseconds
    pub search_debounce_ms: u64,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            search_debounce_ms: 200,
        }
    }
}

/// Minimum allowed poll interval in milliseconds (prevents tight polling loops)
const MIN_POLL_INTERVAL_MS: u64 = 100;

/// Minimum allowed request timeout in milliseconds
const MIN_REQUEST_TIMEOUT_MS: u64 = 100;

/// Validate that a value meets a minimum requirement.
/// In non-strict mode, corrects invalid values to the default and adds a warning.
/// In strict mode, returns an error for invalid values.
fn validate_min(
    value: &mut u64,
    field: &str,
    min: u64,
    default: u64,
    strict: bool,
    warnings: &mut Vec<String>,
) -> Result<(), String> {
    if *value < min {
        let msg = format!("{field} must be at least {min}, got {value}");
        if strict {
            return Err(msg);
        }
        warnings.push(format!("{msg} - using default ({default})"));
        *value = default;
    }
    Ok(())
}

impl Config {
    /// Get the user config file path, respecting XDG_CONFIG_HOME
    ///
    /// Resolution order:
    /// 1. $XDG_CONFIG_HOME/qmon/config.toml (if XDG_CONFIG_HOME is set)
    /// 2. $HOME/.config/qmon/config.toml (if HOME is set)
    /// 3. dirs::config_dir()/qmon/config.toml (fallback using dirs crate)
    /// 4. None if no config directory can be determined
    #[must_use]
    pub fn user_config_path() -> Option<std::path::PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
            && !xdg_config.is_empty()
        {
            return Some(std::path::PathBuf::from(xdg_config).join("qmon/config.toml"));
        }

        if let Some(home) = std::env::var_os("HOME") {
            return Some(std::path::PathBuf::from(home).join(".config/qmon/config.toml"));
        }

        dirs::config_dir().map(|dir| dir.join("qmon/config.toml"))
    }

    /// Load configuration from files and environment.
    /// Returns the config and any warnings encountered during loading.
    pub fn load() -> (Self, Vec<String>) {
        let mut config = Self::default();
        let mut warnings = Vec::new();
        let strict = Self::is_strict_mode();

        Self::load_config_file(&mut config, "/etc/qmon/config.toml", &mut warnings);

        if let Some(user_path) = Self::user_config_path() {
            Self::load_config_file(&mut config, &user_path.to_string_lossy(), &mut warnings);
        }

        config.apply_env_overrides(&mut warnings);

        match config.validate(strict) {
            Ok(validation_warnings) => warnings.extend(validation_warnings),
            Err(err) => {
                eprintln!("Error: {}", err);
                eprintln!("(QMON_STRICT_CONFIG is set - config errors are fatal)");
                std::process::exit(1);
            }
        }

        (config, warnings)
    }

    /// Check if strict config mode is enabled via QMON_STRICT_CONFIG
    fn is_strict_mode() -> bool {
        std::env::var("QMON_STRICT_CONFIG")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    /// Load a config file, collecting warnings on parse errors but not on missing files.
    fn load_config_file(config: &mut Self, path: &str, warnings: &mut Vec<String>) {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return, // missing file is fine
        };

        match toml::from_str::<Config>(&contents) {
            Ok(parsed) => *config = parsed,
            Err(e) => warnings.push(format!("Failed to parse {}: {}", path, e)),
        }
    }

    /// Apply QMON_* environment variable overrides
    fn apply_env_overrides(&mut self, warnings: &mut Vec<String>) {
        if let Ok(url) = std::env::var("QMON_SERVER")
            && !url.is_empty()
        {
            self.server.url = url;
        }

        if let Ok(theme) = std::env::var("QMON_THEME")
            && !theme.is_empty()
        {
            self.display.theme = theme;
        }

        if let Ok(interval) = std::env::var("QMON_POLL_INTERVAL_MS") {
            match interval.parse::<u64>() {
                Ok(ms) => self.refresh.poll_interval_ms = ms,
                Err(_) => warnings.push(format!(
                    "QMON_POLL_INTERVAL_MS is not a number: {:?}",
                    interval
                )),
            }
        }
    }

    /// Validate configuration values.
    /// Returns a list of warnings for invalid values that were corrected to defaults.
    /// If `strict` is true, returns Err instead of correcting values.
    pub fn validate(&mut self, strict: bool) -> Result<Vec<String>, String> {
        let mut warnings = Vec::new();
        let refresh_defaults = RefreshConfig::default();
        let server_defaults = ServerConfig::default();

        validate_min(
            &mut self.refresh.poll_interval_ms,
            "refresh.poll_interval_ms",
            MIN_POLL_INTERVAL_MS,
            refresh_defaults.poll_interval_ms,
            strict,
            &mut warnings,
        )?;

        validate_min(
            &mut self.server.request_timeout_ms,
            "server.request_timeout_ms",
            MIN_REQUEST_TIMEOUT_MS,
            server_defaults.request_timeout_ms,
            strict,
            &mut warnings,
        )?;

        if self.server.url.is_empty() {
            let msg = "server.url must not be empty".to_string();
            if strict {
                return Err(msg);
            }
            warnings.push(format!("{msg} - using default ({})", server_defaults.url));
            self.server.url = server_defaults.url;
        }

        Ok(warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.refresh.poll_interval_ms, 1_000);
        assert_eq!(config.refresh.reorder_interval_ms, 5_000);
        assert_eq!(config.display.max_queries, 100);
        assert_eq!(config.behavior.search_debounce_ms, 200);
        assert_eq!(config.server.url, "http://localhost:8080");
    }

    #[test]
    fn test_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [server]
            url = "http://coordinator:8080"

            [display]
            max_queries = 50
            "#,
        )
        .unwrap();

        assert_eq!(config.server.url, "http://coordinator:8080");
        assert_eq!(config.display.max_queries, 50);
        // Unspecified sections keep their defaults
        assert_eq!(config.refresh.poll_interval_ms, 1_000);
    }

    #[test]
    fn test_validate_corrects_with_warning() {
        let mut config = Config::default();
        config.refresh.poll_interval_ms = 10;

        let warnings = config.validate(false).unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(config.refresh.poll_interval_ms, 1_000);
    }

    #[test]
    fn test_validate_strict_rejects() {
        let mut config = Config::default();
        config.refresh.poll_interval_ms = 10;

        assert!(config.validate(true).is_err());
    }

    #[test]
    fn test_reorder_interval_zero_is_valid() {
        let mut config = Config::default();
        config.refresh.reorder_interval_ms = 0;

        let warnings = config.validate(false).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(config.refresh.reorder_interval_ms, 0);
    }
}
