use std::io::{BufRead, Write};
use std::time::Duration;

use async_trait::async_trait;

use crate::config::LinkConfig;
use crate::errors::{RoverError, RoverResult};
use crate::transport::link::{ChannelAddress, CommandLink};

/// How long each scan window lasts and how many windows to try.
#[derive(Debug, Clone)]
pub struct ScanPolicy {
    pub window: Duration,
    /// `None` keeps scanning until the device shows up.
    pub max_attempts: Option<u32>,
}

impl From<&LinkConfig> for ScanPolicy {
    fn from(cfg: &LinkConfig) -> Self {
        Self {
            window: cfg.scan_window(),
            max_attempts: cfg.scan_attempts(),
        }
    }
}

#[async_trait]
pub trait ScanAdapter: Send + Sync {
    type Peripheral: ScannedPeripheral;

    /// Human-readable adapter name shown in the selection prompt.
    async fn identifier(&self) -> String;

    /// Scans for `window` and returns the peripherals seen during it.
    async fn scan(&self, window: Duration) -> RoverResult<Vec<Self::Peripheral>>;
}

#[async_trait]
pub trait ScannedPeripheral: Send + Sync {
    type Link: CommandLink;

    fn local_name(&self) -> Option<&str>;
    fn address(&self) -> String;
    async fn connect(&self, channel: ChannelAddress) -> RoverResult<Self::Link>;
}

/// Picks one adapter when several are present.
pub trait AdapterSelector: Send + Sync {
    fn select(&self, identifiers: &[String]) -> RoverResult<usize>;
}

/// Asks the operator on stdin, re-prompting until a listed index is entered.
pub struct StdinAdapterSelector;

impl AdapterSelector for StdinAdapterSelector {
    fn select(&self, identifiers: &[String]) -> RoverResult<usize> {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        println!("Please select an adapter:");
        for (i, id) in identifiers.iter().enumerate() {
            println!("{i}: {id}");
        }
        loop {
            print!("Enter choice: ");
            stdout.flush()?;
            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                return Err(RoverError::Config("no adapter selected (stdin closed)".into()));
            }
            match line.trim().parse::<usize>() {
                Ok(i) if i < identifiers.len() => return Ok(i),
                _ => println!("Invalid choice, enter a number between 0 and {}", identifiers.len() - 1),
            }
        }
    }
}

/// Chooses an adapter, scans for `device_name` and opens the single link.
pub async fn discover<A: ScanAdapter>(
    adapters: Vec<A>,
    selector: &dyn AdapterSelector,
    device_name: &str,
    policy: &ScanPolicy,
    channel: ChannelAddress,
) -> RoverResult<<A::Peripheral as ScannedPeripheral>::Link> {
    let adapter = select_adapter(adapters, selector).await?;
    let peripheral = find_peripheral(&adapter, device_name, policy).await?;

    tracing::info!(
        name = device_name,
        address = %peripheral.address(),
        "connecting to peripheral"
    );
    let link = peripheral.connect(channel).await?;
    tracing::info!(name = device_name, "connected to robot");
    Ok(link)
}

async fn select_adapter<A: ScanAdapter>(
    mut adapters: Vec<A>,
    selector: &dyn AdapterSelector,
) -> RoverResult<A> {
    match adapters.len() {
        0 => Err(RoverError::NoAdapterAvailable),
        1 => Ok(adapters.remove(0)),
        n => {
            let mut identifiers = Vec::with_capacity(n);
            for adapter in &adapters {
                identifiers.push(adapter.identifier().await);
            }
            let choice = selector.select(&identifiers)?;
            if choice >= n {
                return Err(RoverError::Config(format!("adapter choice {choice} out of range (0..{n})")));
            }
            tracing::info!(adapter = %identifiers[choice], "adapter selected");
            Ok(adapters.swap_remove(choice))
        }
    }
}

async fn find_peripheral<A: ScanAdapter>(
    adapter: &A,
    device_name: &str,
    policy: &ScanPolicy,
) -> RoverResult<A::Peripheral> {
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        tracing::info!(
            attempt,
            window_secs = policy.window.as_secs(),
            target = device_name,
            "scanning for bluetooth devices"
        );
        let found = adapter.scan(policy.window).await?;
        tracing::info!(attempt, count = found.len(), "scan window complete");

        if let Some(p) = found
            .into_iter()
            .find(|p| p.local_name() == Some(device_name))
        {
            return Ok(p);
        }

        if let Some(max) = policy.max_attempts {
            if attempt >= max {
                return Err(RoverError::DeviceNotFound {
                    name: device_name.to_string(),
                    attempts: attempt,
                });
            }
        }
    }
}
