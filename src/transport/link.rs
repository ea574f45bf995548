use async_trait::async_trait;
use uuid::Uuid;

use crate::config::LinkConfig;
use crate::errors::RoverResult;
use crate::executor::command::Command;

/// The robot's writable command channel.
#[async_trait]
pub trait CommandLink: Send + Sync {
    /// Confirmed write of the command's ASCII bytes. Fails with
    /// `LinkWriteFailed` when rejected or disconnected.
    async fn send(&self, command: &Command) -> RoverResult<()>;
}

/// Fixed GATT service/characteristic pair the robot listens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelAddress {
    pub service: Uuid,
    pub characteristic: Uuid,
}

impl ChannelAddress {
    pub fn from_config(cfg: &LinkConfig) -> RoverResult<Self> {
        Ok(Self {
            service: cfg.service()?,
            characteristic: cfg.characteristic()?,
        })
    }
}
