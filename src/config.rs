use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{RoverError, RoverResult};

pub const DEFAULT_SERVICE_UUID: &str = "1ae49b08-b750-4ef7-afd8-5395763c0da6";
pub const DEFAULT_CHARACTERISTIC_UUID: &str = "19b10011-e8f2-537e-4f6c-d104768a1214";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub link: LinkConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub debug: DebugConfig,
}

/// Decision model endpoint. Speaks the Anthropic Messages API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_base: String,
    pub model: String,
    pub max_tokens: u32,
    pub anthropic_version: String,
    /// Optional API key stored in config.toml (overridden by env SEEROVER_API_KEY;
    /// ANTHROPIC_API_KEY is the last resort).
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.anthropic.com/v1/messages".into(),
            model: "claude-3-opus-20240229".into(),
            max_tokens: 1000,
            anthropic_version: "2023-06-01".into(),
            api_key: None,
        }
    }
}

impl LlmConfig {
    /// `SEEROVER_API_KEY` wins over `[llm].api_key`, which wins over
    /// `ANTHROPIC_API_KEY`. Empty values count as unset.
    pub fn resolve_api_key(&self) -> RoverResult<String> {
        pick_api_key(
            std::env::var("SEEROVER_API_KEY").ok(),
            self.api_key.clone(),
            std::env::var("ANTHROPIC_API_KEY").ok(),
        )
        .ok_or_else(|| {
            RoverError::Config(
                "no API key: set SEEROVER_API_KEY, [llm].api_key or ANTHROPIC_API_KEY".into(),
            )
        })
    }
}

fn pick_api_key(
    override_key: Option<String>,
    configured: Option<String>,
    fallback: Option<String>,
) -> Option<String> {
    [override_key, configured, fallback]
        .into_iter()
        .flatten()
        .find(|k| !k.trim().is_empty())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Advertised local name of the robot, matched exactly.
    pub device_name: String,
    pub service_uuid: String,
    pub characteristic_uuid: String,
    pub scan_window_secs: u64,
    /// Scan windows to try before giving up. `0` scans until the robot shows up.
    pub max_scan_attempts: u32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            device_name: "Arduino_Robotics".into(),
            service_uuid: DEFAULT_SERVICE_UUID.into(),
            characteristic_uuid: DEFAULT_CHARACTERISTIC_UUID.into(),
            scan_window_secs: 5,
            max_scan_attempts: 12,
        }
    }
}

impl LinkConfig {
    pub fn service(&self) -> RoverResult<Uuid> {
        parse_uuid("service_uuid", &self.service_uuid)
    }

    pub fn characteristic(&self) -> RoverResult<Uuid> {
        parse_uuid("characteristic_uuid", &self.characteristic_uuid)
    }

    pub fn scan_window(&self) -> Duration {
        Duration::from_secs(self.scan_window_secs)
    }

    /// `None` when scanning is unbounded.
    pub fn scan_attempts(&self) -> Option<u32> {
        (self.max_scan_attempts > 0).then_some(self.max_scan_attempts)
    }
}

fn parse_uuid(field: &str, raw: &str) -> RoverResult<Uuid> {
    Uuid::parse_str(raw).map_err(|e| RoverError::Config(format!("[link].{field} '{raw}': {e}")))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Seconds to wait after each iteration so the robot can finish moving.
    pub pace_secs: u64,
    /// Goal used when the operator enters nothing.
    pub default_goal: String,
    pub max_iterations: Option<u32>,
    pub max_duration_minutes: Option<u32>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            pace_secs: 10,
            default_goal: "go to the kitchen".into(),
            max_iterations: None,
            max_duration_minutes: None,
        }
    }
}

/// External still-capture program. It must write one encoded image to stdout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub command: String,
    pub args: Vec<String>,
    pub width: u32,
    pub height: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            command: "fswebcam".into(),
            args: ["--no-banner", "--png", "0", "-d", "/dev/video0", "-"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            width: 640,
            height: 480,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub enabled: bool,
    pub dir: PathBuf,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: PathBuf::from("debug"),
        }
    }
}

fn resolve_config_path() -> RoverResult<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            let candidate = parent.join("config.toml");
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "config found next to executable");
                return Ok(candidate);
            }
        }
    }

    let cwd = std::env::current_dir()?;
    let candidate = cwd.join("config.toml");
    if candidate.exists() {
        tracing::debug!(path = %candidate.display(), "config found in working directory");
        return Ok(candidate);
    }

    Err(RoverError::Config(
        "config.toml not found next to executable or in working directory".into(),
    ))
}

pub fn load_config() -> RoverResult<AppConfig> {
    let path = resolve_config_path()?;
    let content = std::fs::read_to_string(&path)?;
    let config = parse_config(&content)?;
    tracing::info!(
        path = %path.display(),
        model = %config.llm.model,
        device = %config.link.device_name,
        "config loaded"
    );
    Ok(config)
}

pub fn parse_config(content: &str) -> RoverResult<AppConfig> {
    let config: AppConfig = toml::from_str(content)?;
    config.link.service()?;
    config.link.characteristic()?;
    Ok(config)
}
