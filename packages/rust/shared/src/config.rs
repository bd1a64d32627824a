//! Application configuration for MeetBrief.
//!
//! User config lives at `~/.meetbrief/meetbrief.toml`.
//! CLI flags override config file values, which override defaults.
//! API keys are never stored in the file — only the names of the
//! environment variables that hold them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MeetBriefError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "meetbrief.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".meetbrief";

// ---------------------------------------------------------------------------
// Config structs (matching meetbrief.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// OpenRouter (model provider) settings.
    #[serde(default)]
    pub openrouter: OpenRouterConfig,

    /// Serper (keyword search) settings.
    #[serde(default)]
    pub serper: SerperConfig,

    /// Exa (semantic search) settings.
    #[serde(default)]
    pub exa: ExaConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Maximum organic results taken per keyword search.
    #[serde(default = "default_result_cap")]
    pub result_cap: usize,

    /// Maximum snippets kept per person lookup.
    #[serde(default = "default_snippet_cap")]
    pub snippet_cap: usize,

    /// Maximum tool-call rounds per stage before the engine gives up.
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: u32,

    /// Professional-network domain fragment used to pick the profile URL.
    #[serde(default = "default_profile_domain")]
    pub profile_domain: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            result_cap: default_result_cap(),
            snippet_cap: default_snippet_cap(),
            max_tool_rounds: default_max_tool_rounds(),
            profile_domain: default_profile_domain(),
        }
    }
}

fn default_result_cap() -> usize {
    3
}
fn default_snippet_cap() -> usize {
    3
}
fn default_max_tool_rounds() -> u32 {
    5
}
fn default_profile_domain() -> String {
    "linkedin.com/in".into()
}

/// `[openrouter]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenRouterConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_openrouter_key_env")]
    pub api_key_env: String,

    /// Default model used for all stages.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// API base URL (override for tests/proxies).
    #[serde(default = "default_openrouter_base")]
    pub base_url: String,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_openrouter_key_env(),
            default_model: default_model(),
            base_url: default_openrouter_base(),
        }
    }
}

fn default_openrouter_key_env() -> String {
    "OPENROUTER_API_KEY".into()
}
fn default_model() -> String {
    "google/gemini-2.5-flash".into()
}
fn default_openrouter_base() -> String {
    "https://openrouter.ai/api/v1".into()
}

/// `[serper]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerperConfig {
    /// Name of the env var holding the API key.
    #[serde(default = "default_serper_key_env")]
    pub api_key_env: String,

    /// Search endpoint (override for tests).
    #[serde(default = "default_serper_endpoint")]
    pub endpoint: String,
}

impl Default for SerperConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_serper_key_env(),
            endpoint: default_serper_endpoint(),
        }
    }
}

fn default_serper_key_env() -> String {
    "SERPER_API_KEY".into()
}
fn default_serper_endpoint() -> String {
    "https://google.serper.dev/search".into()
}

/// `[exa]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExaConfig {
    /// Name of the env var holding the API key.
    #[serde(default = "default_exa_key_env")]
    pub api_key_env: String,

    /// API base URL (override for tests).
    #[serde(default = "default_exa_base")]
    pub base_url: String,
}

impl Default for ExaConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_exa_key_env(),
            base_url: default_exa_base(),
        }
    }
}

fn default_exa_key_env() -> String {
    "EXA_API_KEY".into()
}
fn default_exa_base() -> String {
    "https://api.exa.ai".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.meetbrief/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| MeetBriefError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.meetbrief/meetbrief.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| MeetBriefError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| MeetBriefError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| MeetBriefError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| MeetBriefError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| MeetBriefError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read an API key from the env var named in config; errors name the var.
pub fn read_api_key(var_name: &str, provider: &str) -> Result<String> {
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(MeetBriefError::config(format!(
            "{provider} API key not found. Set the {var_name} environment variable."
        ))),
    }
}

/// Check that all three provider API key env vars are set and non-empty.
pub fn validate_api_keys(config: &AppConfig) -> Result<()> {
    read_api_key(&config.openrouter.api_key_env, "OpenRouter")?;
    read_api_key(&config.serper.api_key_env, "Serper")?;
    read_api_key(&config.exa.api_key_env, "Exa")?;
    Ok(())
}
