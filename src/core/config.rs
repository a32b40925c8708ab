//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.tsi/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::{DEFAULT_BASE_URL, DEFAULT_ENDPOINT};
use crate::core::gate::DEFAULT_MAX_HEIGHT;
use crate::core::timer::DEFAULT_CADENCE;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TsiConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    pub base_url: Option<String>,
    pub endpoint: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UiConfig {
    pub tick_ms: Option<u64>,
    pub max_input_rows: Option<u16>,
    pub prompts: Option<Vec<String>>,
    pub transcript_path: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_TRANSCRIPT_FILE: &str = "tsi-transcript.html";

/// Shown on the intro panel until the first question.
pub const DEFAULT_PROMPTS: [&str; 3] = [
    "What is TSI?",
    "How do I get access to the shared drive?",
    "Where can I find the onboarding checklist?",
];

// Intro panel binds Alt+1..9
const MAX_PROMPTS: usize = 9;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub endpoint: String,
    pub tick: Duration,
    pub max_input_height: u16,
    pub prompts: Vec<String>,
    pub transcript_path: PathBuf,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.tsi/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".tsi").join("config.toml"))
}

/// Load config from `~/.tsi/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `TsiConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<TsiConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(TsiConfig::default());
        }
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<TsiConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(TsiConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: TsiConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

fn generate_default_config(path: &Path) {
    let default_content = r#"# TSI Assistant Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [server]
# base_url = "http://localhost:5000"   # Or set TSI_BASE_URL
# endpoint = "/api/ask"                # Or set TSI_ENDPOINT

# [ui]
# tick_ms = 100                        # Timer and animation cadence
# max_input_rows = 7                   # Input box height cap, borders included
# transcript_path = "tsi-transcript.html"
# prompts = [
#     "What is TSI?",
#     "How do I get access to the shared drive?",
# ]
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_url` is the `--url` flag (None = not specified).
pub fn resolve(config: &TsiConfig, cli_url: Option<&str>) -> ResolvedConfig {
    // Base URL: CLI → env → config → default
    let base_url = cli_url
        .map(|s| s.to_string())
        .or_else(|| std::env::var("TSI_BASE_URL").ok())
        .or_else(|| config.server.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    // Endpoint: env → config → default
    let endpoint = std::env::var("TSI_ENDPOINT")
        .ok()
        .or_else(|| config.server.endpoint.clone())
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

    let tick = config
        .ui
        .tick_ms
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_CADENCE);

    let max_input_height = config.ui.max_input_rows.unwrap_or(DEFAULT_MAX_HEIGHT);

    ResolvedConfig {
        base_url,
        endpoint,
        tick,
        max_input_height,
        prompts: resolve_prompts(config),
        transcript_path: config
            .ui
            .transcript_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TRANSCRIPT_FILE)),
    }
}

/// Blank prompts are dropped; anything past the ninth has no shortcut and is
/// cut with a warning. An explicit empty list hides the prompt section.
fn resolve_prompts(config: &TsiConfig) -> Vec<String> {
    let Some(prompts) = &config.ui.prompts else {
        return DEFAULT_PROMPTS.iter().map(|p| p.to_string()).collect();
    };
    let mut prompts: Vec<String> = prompts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();
    if prompts.len() > MAX_PROMPTS {
        warn!(
            "{} prompts configured, only the first {} are shown",
            prompts.len(),
            MAX_PROMPTS
        );
        prompts.truncate(MAX_PROMPTS);
    }
    prompts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_empty() {
        let config = TsiConfig::default();
        assert!(config.server.base_url.is_none());
        assert!(config.ui.prompts.is_none());
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved = resolve(&TsiConfig::default(), Some(DEFAULT_BASE_URL));
        assert_eq!(resolved.base_url, DEFAULT_BASE_URL);
        assert_eq!(resolved.tick, DEFAULT_CADENCE);
        assert_eq!(resolved.max_input_height, DEFAULT_MAX_HEIGHT);
        assert_eq!(resolved.prompts.len(), DEFAULT_PROMPTS.len());
        assert_eq!(resolved.transcript_path, PathBuf::from(DEFAULT_TRANSCRIPT_FILE));
    }

    #[test]
    fn test_resolve_cli_url_wins() {
        let config = TsiConfig {
            server: ServerConfig {
                base_url: Some("http://from-file:1".to_string()),
                endpoint: None,
            },
            ..Default::default()
        };
        let resolved = resolve(&config, Some("http://cli:2"));
        assert_eq!(resolved.base_url, "http://cli:2");
    }

    #[test]
    fn test_zero_tick_falls_back_to_default() {
        let config = TsiConfig {
            ui: UiConfig {
                tick_ms: Some(0),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(resolve(&config, None).tick, DEFAULT_CADENCE);
    }

    #[test]
    fn test_prompts_are_trimmed_and_capped() {
        let mut prompts: Vec<String> = (1..=12).map(|i| format!(" prompt {i} ")).collect();
        prompts.insert(0, "   ".to_string());
        let config = TsiConfig {
            ui: UiConfig {
                prompts: Some(prompts),
                ..Default::default()
            },
            ..Default::default()
        };
        let resolved = resolve(&config, None);
        assert_eq!(resolved.prompts.len(), 9);
        assert_eq!(resolved.prompts[0], "prompt 1");
    }

    #[test]
    fn test_explicit_empty_prompts_hide_section() {
        let config = TsiConfig {
            ui: UiConfig {
                prompts: Some(vec![]),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(resolve(&config, None).prompts.is_empty());
    }

    #[test]
    fn test_toml_parses_all_sections() {
        let toml_str = r#"
[server]
base_url = "http://10.0.0.5:5000"
endpoint = "/v2/ask"

[ui]
tick_ms = 50
max_input_rows = 10
prompts = ["One", "Two"]
transcript_path = "/tmp/out.html"
"#;
        let config: TsiConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.base_url.as_deref(), Some("http://10.0.0.5:5000"));
        assert_eq!(config.server.endpoint.as_deref(), Some("/v2/ask"));
        assert_eq!(config.ui.tick_ms, Some(50));
        assert_eq!(config.ui.max_input_rows, Some(10));
        assert_eq!(config.ui.prompts.as_ref().map(Vec::len), Some(2));

        let resolved = resolve(&config, Some("http://cli"));
        assert_eq!(resolved.tick, Duration::from_millis(50));
        assert_eq!(resolved.max_input_height, 10);
        assert_eq!(resolved.transcript_path, PathBuf::from("/tmp/out.html"));
    }

    #[test]
    fn test_sparse_toml_parses() {
        let config: TsiConfig = toml::from_str("[ui]\ntick_ms = 250\n").unwrap();
        assert_eq!(config.ui.tick_ms, Some(250));
        assert!(config.server.base_url.is_none());
        assert!(config.ui.prompts.is_none());
    }

    #[test]
    fn test_malformed_file_is_a_parse_error() {
        let dir = std::env::temp_dir().join(format!("tsi-config-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        fs::write(&path, "[server\nbase_url = 1").unwrap();
        assert!(matches!(load_config_from(&path), Err(ConfigError::Parse(_))));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file_generates_commented_default() {
        let dir = std::env::temp_dir().join(format!("tsi-config-gen-{}", std::process::id()));
        let path = dir.join("config.toml");
        let _ = fs::remove_dir_all(&dir);

        let config = load_config_from(&path).unwrap();
        assert!(config.server.base_url.is_none());
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# TSI Assistant Configuration"));
        // Generated file is all comments, so it parses to defaults
        assert!(load_config_from(&path).unwrap().ui.prompts.is_none());
        fs::remove_dir_all(&dir).unwrap();
    }
}
