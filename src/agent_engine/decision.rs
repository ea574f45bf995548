use std::sync::Arc;

use crate::agent_engine::history::{HistoryEntry, Ledger};
use crate::config::LlmConfig;
use crate::errors::RoverResult;
use crate::llm::provider::LlmProvider;
use crate::llm::tools::load_robot_tools;
use crate::llm::types::{
    ContentBlock, ImageSource, MessageParam, MessagesRequest, RequestBlock, ToolDef, ToolUse,
};
use crate::perception::capture::Frame;

/// Result of one decision round-trip.
#[derive(Debug)]
pub struct Decision {
    /// The input ledger with this response appended.
    pub ledger: Ledger,
    pub text_blocks: Vec<String>,
    pub tool_blocks: Vec<ToolUse>,
}

/// Builds single-turn requests (history, frame, goal) and classifies the reply.
pub struct DecisionClient {
    provider: Arc<dyn LlmProvider>,
    model: String,
    max_tokens: u32,
    tools: Vec<ToolDef>,
}

impl DecisionClient {
    pub fn new(provider: Arc<dyn LlmProvider>, cfg: &LlmConfig) -> RoverResult<Self> {
        Ok(Self {
            provider,
            model: cfg.model.clone(),
            max_tokens: cfg.max_tokens,
            tools: load_robot_tools()?,
        })
    }

    pub async fn decide(&self, frame: &Frame, goal: &str, ledger: &Ledger) -> RoverResult<Decision> {
        let request = self.build_request(frame, goal, ledger);
        tracing::info!(
            provider = self.provider.name(),
            model = %self.model,
            history_entries = ledger.len(),
            image_bytes = frame.bytes.len(),
            "requesting decision"
        );

        let response = self.provider.create_message(&request).await?;
        let (text_blocks, tool_blocks) = partition_blocks(&response.content);
        let ledger = ledger.clone().append(HistoryEntry::new(response.content));

        Ok(Decision {
            ledger,
            text_blocks,
            tool_blocks,
        })
    }

    pub fn build_request(&self, frame: &Frame, goal: &str, ledger: &Ledger) -> MessagesRequest {
        MessagesRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            tools: self.tools.clone(),
            messages: vec![MessageParam {
                role: "user".into(),
                content: vec![
                    RequestBlock::Text {
                        text: format!(
                            "What you know about the robot's environment is {}",
                            ledger.render()
                        ),
                    },
                    RequestBlock::Image {
                        source: ImageSource::base64(frame.media_type, frame.to_base64()),
                    },
                    RequestBlock::Text {
                        text: goal_prompt(goal),
                    },
                ],
            }],
        }
    }
}

fn goal_prompt(goal: &str) -> String {
    format!(
        "Analyze this image and the history of the robot's actions, and decide which direction \
         the robot should move. Your goal is <GOAL>{goal}</GOAL>. Make executive decisions based \
         on the image and history. Use the tools at your disposal (move_robot, turn_robot, \
         finish_task) to make the best decision, without asking for more information: you will \
         need to gather it by moving the robot."
    )
}

/// Splits response content into text and tool blocks, keeping relative order.
pub fn partition_blocks(content: &[ContentBlock]) -> (Vec<String>, Vec<ToolUse>) {
    let mut texts = Vec::new();
    let mut tools = Vec::new();
    for block in content {
        match block {
            ContentBlock::Text { text } => texts.push(text.clone()),
            ContentBlock::ToolUse(tu) => tools.push(tu.clone()),
            ContentBlock::Other(_) => {}
        }
    }
    (texts, tools)
}
