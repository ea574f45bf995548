pub mod agent_engine;
pub mod config;
pub mod errors;
pub mod executor;
pub mod llm;
pub mod perception;
pub mod transport;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use crate::agent_engine::decision::DecisionClient;
use crate::agent_engine::engine::{AgentEngine, RunSummary};
use crate::agent_engine::loop_control::LoopConfig;
use crate::agent_engine::recorder::DebugRecorder;
use crate::config::AppConfig;
use crate::errors::RoverResult;
use crate::llm::providers::anthropic::AnthropicProvider;
use crate::perception::capture::CommandFrameSource;
use crate::transport::ble::system_adapters;
use crate::transport::discovery::{discover, ScanPolicy, StdinAdapterSelector};
use crate::transport::link::ChannelAddress;

/// Installs the tracing subscriber. `RUST_LOG` wins; default is `info`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

/// Loads config.toml, falling back to defaults when it is missing or invalid.
pub fn load_config_or_default() -> AppConfig {
    match config::load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load config; using built-in defaults");
            AppConfig::default()
        }
    }
}

/// Connects to the robot, then drives it toward `goal` until the model
/// finishes (or a configured limit is reached).
pub async fn run(config: &AppConfig, goal: &str) -> RoverResult<RunSummary> {
    let provider = Arc::new(AnthropicProvider::from_config(&config.llm)?);
    let decider = DecisionClient::new(provider, &config.llm)?;

    let channel = ChannelAddress::from_config(&config.link)?;
    let adapters = system_adapters().await?;
    let link = discover(
        adapters,
        &StdinAdapterSelector,
        &config.link.device_name,
        &ScanPolicy::from(&config.link),
        channel,
    )
    .await?;

    let frames = CommandFrameSource::new(config.capture.clone());
    let mut engine = AgentEngine::new(
        Box::new(frames),
        decider,
        Box::new(link),
        LoopConfig::from(&config.agent),
    );
    if config.debug.enabled {
        match DebugRecorder::create(&config.debug.dir) {
            Ok(rec) => engine = engine.with_recorder(rec),
            Err(e) => tracing::warn!(error = %e, "debug recorder disabled"),
        }
    }

    engine.run(goal).await
}
