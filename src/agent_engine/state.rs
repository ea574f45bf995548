use serde::Deserialize;

use crate::llm::tools::{FINISH_TASK, MOVE_ROBOT, TURN_ROBOT};
use crate::llm::types::ToolUse;
use crate::perception::capture::Frame;

/// Lifecycle states of one control-loop run.
#[derive(Debug)]
pub enum LoopState {
    Capturing,
    Deciding { frame: Frame },
    Acting { tool: ToolUse },
    Pacing,
    Done { outcome: RunOutcome },
}

impl LoopState {
    pub fn label(&self) -> &'static str {
        match self {
            LoopState::Capturing => "capturing",
            LoopState::Deciding { .. } => "deciding",
            LoopState::Acting { .. } => "acting",
            LoopState::Pacing => "pacing",
            LoopState::Done { .. } => "done",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The model called `finish_task`.
    Finished,
    /// An operator-configured iteration or duration limit was hit.
    LimitReached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Backward => "backward",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Distance {
    Short,
    Medium,
    Long,
}

impl Distance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Distance::Short => "short",
            Distance::Medium => "medium",
            Distance::Long => "long",
        }
    }
}

/// A robot instruction derived from the model's first tool call.
///
/// `Unrecognized` and `Malformed` are deliberate no-ops: the loop logs them and
/// moves on to pacing without sending anything.
#[derive(Debug, Clone, PartialEq)]
pub enum RobotAction {
    MoveRobot { direction: Direction, distance: Distance },
    /// `degrees` keeps the model's number as sent so it renders back unchanged.
    TurnRobot { degrees: serde_json::Number },
    FinishTask,
    Unrecognized { name: String },
    Malformed { name: String, reason: String },
}

#[derive(Deserialize)]
struct MoveArgs {
    direction: Direction,
    distance: Distance,
}

#[derive(Deserialize)]
struct TurnArgs {
    degrees: serde_json::Number,
}

impl RobotAction {
    /// Validates a tool call against the declared tool schemas.
    pub fn from_tool_use(tool: &ToolUse) -> Self {
        match tool.name.as_str() {
            MOVE_ROBOT => match serde_json::from_value::<MoveArgs>(tool.input.clone()) {
                Ok(args) => RobotAction::MoveRobot {
                    direction: args.direction,
                    distance: args.distance,
                },
                Err(e) => RobotAction::Malformed {
                    name: tool.name.clone(),
                    reason: e.to_string(),
                },
            },
            TURN_ROBOT => match serde_json::from_value::<TurnArgs>(tool.input.clone()) {
                Ok(args) => RobotAction::TurnRobot {
                    degrees: args.degrees,
                },
                Err(e) => RobotAction::Malformed {
                    name: tool.name.clone(),
                    reason: e.to_string(),
                },
            },
            FINISH_TASK => RobotAction::FinishTask,
            other => RobotAction::Unrecognized { name: other.to_string() },
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, RobotAction::Unrecognized { .. } | RobotAction::Malformed { .. })
    }
}
