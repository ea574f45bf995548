use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoverError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No Bluetooth adapter available")]
    NoAdapterAvailable,

    #[error("Device '{name}' not found after {attempts} scan window(s)")]
    DeviceNotFound { name: String, attempts: u32 },

    #[error("Link write failed: {0}")]
    LinkWriteFailed(String),

    #[error("Frame capture failed: {0}")]
    CaptureFailed(String),

    #[error("Decision request failed: {0}")]
    DecisionRequestFailed(String),

    #[error("Bluetooth error: {0}")]
    Bluetooth(#[from] btleplug::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialize error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

pub type RoverResult<T> = Result<T, RoverError>;
