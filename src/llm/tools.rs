use crate::errors::{RoverError, RoverResult};
use crate::llm::types::ToolDef;

pub const MOVE_ROBOT: &str = "move_robot";
pub const TURN_ROBOT: &str = "turn_robot";
pub const FINISH_TASK: &str = "finish_task";

/// Loads the robot tool definitions from prompts/tools/robot.json.
/// The JSON is embedded at compile time via include_str!.
pub fn load_robot_tools() -> RoverResult<Vec<ToolDef>> {
    let json = include_str!("../../prompts/tools/robot.json");
    serde_json::from_str(json).map_err(|e| RoverError::Config(format!("Failed to parse robot tools: {e}")))
}
