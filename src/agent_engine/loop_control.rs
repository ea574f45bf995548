use std::time::Duration;

use tokio::time::Instant;

use crate::config::AgentConfig;

/// Pacing and optional run limits. With no limits the loop only ends on
/// `finish_task`.
#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub pace: Duration,
    pub max_iterations: Option<u32>,
    pub max_duration_minutes: Option<u32>,
}

impl From<&AgentConfig> for LoopConfig {
    fn from(cfg: &AgentConfig) -> Self {
        Self {
            pace: Duration::from_secs(cfg.pace_secs),
            max_iterations: cfg.max_iterations,
            max_duration_minutes: cfg.max_duration_minutes,
        }
    }
}

pub struct LoopController {
    config: LoopConfig,
    start_time: Instant,
    iterations: u32,
}

impl LoopController {
    pub fn new(config: LoopConfig) -> Self {
        Self {
            config,
            start_time: Instant::now(),
            iterations: 0,
        }
    }

    pub fn pace(&self) -> Duration {
        self.config.pace
    }

    pub fn record_iteration(&mut self) {
        self.iterations += 1;
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn should_stop(&self) -> bool {
        if let Some(max) = self.config.max_iterations {
            if self.iterations >= max {
                return true;
            }
        }
        if let Some(max_min) = self.config.max_duration_minutes {
            if self.start_time.elapsed().as_secs() / 60 >= max_min as u64 {
                return true;
            }
        }
        false
    }
}
