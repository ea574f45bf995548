use crate::agent_engine::decision::DecisionClient;
use crate::agent_engine::history::Ledger;
use crate::agent_engine::loop_control::{LoopConfig, LoopController};
use crate::agent_engine::recorder::DebugRecorder;
use crate::agent_engine::state::{LoopState, RobotAction, RunOutcome};
use crate::errors::RoverResult;
use crate::executor::command::Command;
use crate::llm::types::ToolUse;
use crate::perception::capture::FrameSource;
use crate::transport::link::CommandLink;

/// What a finished run looked like.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub iterations: u32,
    pub commands_sent: Vec<Command>,
}

/// Capture → decide → act → pace, strictly one step at a time.
pub struct AgentEngine {
    state: LoopState,
    frames: Box<dyn FrameSource>,
    decider: DecisionClient,
    link: Box<dyn CommandLink>,
    loop_ctrl: LoopController,
    ledger: Ledger,
    recorder: Option<DebugRecorder>,
    commands_sent: Vec<Command>,
}

impl AgentEngine {
    pub fn new(
        frames: Box<dyn FrameSource>,
        decider: DecisionClient,
        link: Box<dyn CommandLink>,
        loop_config: LoopConfig,
    ) -> Self {
        Self {
            state: LoopState::Capturing,
            frames,
            decider,
            link,
            loop_ctrl: LoopController::new(loop_config),
            ledger: Ledger::new(),
            recorder: None,
            commands_sent: Vec::new(),
        }
    }

    pub fn with_recorder(mut self, recorder: DebugRecorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Drives the loop until `finish_task` (or a configured limit). Capture,
    /// decision and link failures end the run with that error.
    pub async fn run(&mut self, goal: &str) -> RoverResult<RunSummary> {
        tracing::info!(goal = %goal, "agent loop started");
        let outcome = loop {
            let state = std::mem::replace(&mut self.state, LoopState::Capturing);
            tracing::debug!(state = state.label(), iteration = self.loop_ctrl.iterations(), "state");

            self.state = match state {
                // ── Capturing: one fresh frame ────────────────────────────
                LoopState::Capturing => {
                    let frame = self.frames.capture().await?;
                    if let Some(rec) = &self.recorder {
                        match rec.save_frame(&frame) {
                            Ok(path) => tracing::info!(path = %path.display(), "debug image saved"),
                            Err(e) => tracing::warn!(error = %e, "debug image not saved"),
                        }
                    }
                    LoopState::Deciding { frame }
                }

                // ── Deciding: ask the model, grow the ledger ─────────────
                LoopState::Deciding { frame } => {
                    let decision = self.decider.decide(&frame, goal, &self.ledger).await?;
                    self.ledger = decision.ledger;
                    if let (Some(rec), Some(entry)) = (&self.recorder, self.ledger.last()) {
                        if let Err(e) = rec.record_entry(entry) {
                            tracing::warn!(error = %e, "ledger entry not recorded");
                        }
                    }

                    for text in &decision.text_blocks {
                        tracing::info!(text = %text, "model output");
                    }

                    // At most one instruction per iteration: later tool calls
                    // in the same response are dropped.
                    let mut tools = decision.tool_blocks.into_iter();
                    match tools.next() {
                        Some(tool) => {
                            let ignored = tools.count();
                            if ignored > 0 {
                                tracing::info!(ignored, "extra tool calls ignored");
                            }
                            LoopState::Acting { tool }
                        }
                        None => {
                            tracing::info!("no tool call → pacing");
                            LoopState::Pacing
                        }
                    }
                }

                // ── Acting: first tool call only ──────────────────────────
                LoopState::Acting { tool } => self.act(&tool).await?,

                // ── Pacing: let the robot finish moving ───────────────────
                LoopState::Pacing => {
                    self.loop_ctrl.record_iteration();
                    if self.loop_ctrl.should_stop() {
                        tracing::info!(iterations = self.loop_ctrl.iterations(), "loop limit reached");
                        LoopState::Done {
                            outcome: RunOutcome::LimitReached,
                        }
                    } else {
                        tokio::time::sleep(self.loop_ctrl.pace()).await;
                        LoopState::Capturing
                    }
                }

                LoopState::Done { outcome } => {
                    self.state = LoopState::Done { outcome };
                    break outcome;
                }
            };
        };

        let summary = RunSummary {
            outcome,
            iterations: self.loop_ctrl.iterations(),
            commands_sent: self.commands_sent.clone(),
        };
        tracing::info!(
            outcome = ?summary.outcome,
            iterations = summary.iterations,
            commands = summary.commands_sent.len(),
            history_entries = self.ledger.len(),
            "agent loop ended"
        );
        Ok(summary)
    }

    async fn act(&mut self, tool: &ToolUse) -> RoverResult<LoopState> {
        let action = RobotAction::from_tool_use(tool);
        tracing::info!(tool = %tool.name, args = %tool.input, ?action, "acting");

        match &action {
            RobotAction::FinishTask => {
                tracing::info!("task finished");
                // The loop counts the finishing iteration too.
                self.loop_ctrl.record_iteration();
                return Ok(LoopState::Done {
                    outcome: RunOutcome::Finished,
                });
            }
            RobotAction::Unrecognized { name } => {
                tracing::warn!(tool = %name, "unrecognized tool → no action this round");
            }
            RobotAction::Malformed { name, reason } => {
                tracing::warn!(tool = %name, reason = %reason, "malformed tool arguments → no action this round");
            }
            RobotAction::MoveRobot { .. } | RobotAction::TurnRobot { .. } => {}
        }

        if let Some(command) = Command::encode(&action) {
            tracing::info!(command = %command, "sending command");
            self.link.send(&command).await?;
            self.commands_sent.push(command);
        }
        Ok(LoopState::Pacing)
    }
}
