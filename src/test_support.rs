//! Test-only fakes for the loop's collaborators.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::errors::{RoverError, RoverResult};
use crate::executor::command::Command;
use crate::llm::provider::LlmProvider;
use crate::llm::types::{ContentBlock, MessagesRequest, MessagesResponse, ToolUse};
use crate::perception::capture::{Frame, FrameSource};
use crate::transport::discovery::{AdapterSelector, ScanAdapter, ScannedPeripheral};
use crate::transport::link::{ChannelAddress, CommandLink};

// ── Content blocks ─────────────────────────────────────────────────────────

pub fn text(t: &str) -> ContentBlock {
    ContentBlock::Text { text: t.into() }
}

pub fn tool_use(name: &str, input: serde_json::Value) -> ContentBlock {
    ContentBlock::ToolUse(ToolUse {
        id: format!("toolu_{name}"),
        name: name.into(),
        input,
    })
}

pub fn move_robot(direction: &str, distance: &str) -> ContentBlock {
    tool_use(
        "move_robot",
        serde_json::json!({"direction": direction, "distance": distance}),
    )
}

pub fn turn_robot(degrees: serde_json::Value) -> ContentBlock {
    tool_use("turn_robot", serde_json::json!({ "degrees": degrees }))
}

pub fn finish_task() -> ContentBlock {
    tool_use("finish_task", serde_json::json!({}))
}

// ── Decision model ─────────────────────────────────────────────────────────

/// Replays canned responses in order; fails once the script runs out.
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<Vec<ContentBlock>>>,
    requests: Mutex<Vec<MessagesRequest>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<Vec<ContentBlock>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<MessagesRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn create_message(&self, request: &MessagesRequest) -> RoverResult<MessagesResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let content = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| RoverError::DecisionRequestFailed("script exhausted".into()))?;
        Ok(MessagesResponse {
            id: "msg_scripted".into(),
            content,
            stop_reason: Some("tool_use".into()),
        })
    }
}

// ── Frames ────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct StaticFrames;

#[async_trait]
impl FrameSource for StaticFrames {
    async fn capture(&self) -> RoverResult<Frame> {
        Ok(Frame::png(vec![0x89, b'P', b'N', b'G']))
    }
}

pub struct FailingFrames;

#[async_trait]
impl FrameSource for FailingFrames {
    async fn capture(&self) -> RoverResult<Frame> {
        Err(RoverError::CaptureFailed("camera unplugged".into()))
    }
}

// ── Link ───────────────────────────────────────────────────────────────────

/// Records every command; clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingLink {
    sent: Arc<Mutex<Vec<String>>>,
    calls: Arc<AtomicUsize>,
    fail: bool,
    peer: String,
    channel: Option<ChannelAddress>,
}

impl RecordingLink {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn send_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peer_name(&self) -> &str {
        &self.peer
    }

    pub fn channel(&self) -> ChannelAddress {
        self.channel.expect("link was not opened through discovery")
    }
}

#[async_trait]
impl CommandLink for RecordingLink {
    async fn send(&self, command: &Command) -> RoverResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RoverError::LinkWriteFailed("write rejected".into()));
        }
        self.sent.lock().unwrap().push(command.to_string());
        Ok(())
    }
}

// ── Discovery ──────────────────────────────────────────────────────────────

pub struct FixedSelector {
    choice: usize,
    offered: Mutex<Vec<String>>,
}

impl FixedSelector {
    pub fn new(choice: usize) -> Self {
        Self {
            choice,
            offered: Mutex::new(Vec::new()),
        }
    }

    pub fn offered(&self) -> Vec<String> {
        self.offered.lock().unwrap().clone()
    }
}

impl AdapterSelector for FixedSelector {
    fn select(&self, identifiers: &[String]) -> RoverResult<usize> {
        *self.offered.lock().unwrap() = identifiers.to_vec();
        Ok(self.choice)
    }
}

/// Each scan pops the next list of advertised names (`None` = unnamed).
pub struct ScriptedAdapter {
    id: String,
    scans: Mutex<VecDeque<Vec<Option<&'static str>>>>,
    scan_count: Arc<AtomicUsize>,
    connect_count: Arc<AtomicUsize>,
}

impl ScriptedAdapter {
    pub fn new(id: &str, scans: Vec<Vec<Option<&'static str>>>) -> Self {
        Self {
            id: id.into(),
            scans: Mutex::new(scans.into()),
            scan_count: Arc::new(AtomicUsize::new(0)),
            connect_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn scan_counter(&self) -> Arc<AtomicUsize> {
        self.scan_count.clone()
    }

    pub fn connect_counter(&self) -> Arc<AtomicUsize> {
        self.connect_count.clone()
    }
}

#[async_trait]
impl ScanAdapter for ScriptedAdapter {
    type Peripheral = ScriptedPeripheral;

    async fn identifier(&self) -> String {
        self.id.clone()
    }

    async fn scan(&self, _window: Duration) -> RoverResult<Vec<ScriptedPeripheral>> {
        self.scan_count.fetch_add(1, Ordering::SeqCst);
        let names = self.scans.lock().unwrap().pop_front().unwrap_or_default();
        Ok(names
            .into_iter()
            .enumerate()
            .map(|(i, name)| ScriptedPeripheral {
                name: name.map(str::to_string),
                address: format!("AA:BB:CC:DD:EE:{i:02X}"),
                connect_count: self.connect_count.clone(),
            })
            .collect())
    }
}

pub struct ScriptedPeripheral {
    name: Option<String>,
    address: String,
    connect_count: Arc<AtomicUsize>,
}

#[async_trait]
impl ScannedPeripheral for ScriptedPeripheral {
    type Link = RecordingLink;

    fn local_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn address(&self) -> String {
        self.address.clone()
    }

    async fn connect(&self, channel: ChannelAddress) -> RoverResult<RecordingLink> {
        self.connect_count.fetch_add(1, Ordering::SeqCst);
        Ok(RecordingLink {
            peer: self.name.clone().unwrap_or_default(),
            channel: Some(channel),
            ..RecordingLink::default()
        })
    }
}
