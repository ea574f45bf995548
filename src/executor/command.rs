//! Wire grammar for robot commands: `instruction "-" value`.
//!
//! The firmware on the robot looks for `forward`, `backward`, `left` and
//! `right`; the value is a distance token or a raw degree count.

use std::fmt;

use crate::agent_engine::state::{Direction, RobotAction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Forward,
    Backward,
    Left,
    Right,
}

impl Instruction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Instruction::Forward => "forward",
            Instruction::Backward => "backward",
            Instruction::Left => "left",
            Instruction::Right => "right",
        }
    }

    fn parse(token: &str) -> Option<Self> {
        match token {
            "forward" => Some(Instruction::Forward),
            "backward" => Some(Instruction::Backward),
            "left" => Some(Instruction::Left),
            "right" => Some(Instruction::Right),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub instruction: Instruction,
    pub value: String,
}

impl Command {
    /// Maps an action to its wire command. `FinishTask` and the no-op
    /// variants have no command.
    pub fn encode(action: &RobotAction) -> Option<Command> {
        match action {
            RobotAction::MoveRobot { direction, distance } => Some(Command {
                instruction: match direction {
                    Direction::Forward => Instruction::Forward,
                    Direction::Backward => Instruction::Backward,
                },
                value: distance.as_str().to_string(),
            }),
            RobotAction::TurnRobot { degrees } => Some(Command {
                instruction: turn_instruction(degrees),
                value: degrees.to_string(),
            }),
            RobotAction::FinishTask
            | RobotAction::Unrecognized { .. }
            | RobotAction::Malformed { .. } => None,
        }
    }

    /// Splits on the first `-`, so negative degree values survive (`left--15`).
    pub fn parse(raw: &str) -> Option<Command> {
        let (instruction, value) = raw.split_once('-')?;
        if value.is_empty() {
            return None;
        }
        Some(Command {
            instruction: Instruction::parse(instruction)?,
            value: value.to_string(),
        })
    }

    /// ASCII payload for the link. Non-ASCII characters become `?`.
    pub fn to_wire_bytes(&self) -> Vec<u8> {
        self.to_string()
            .chars()
            .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
            .collect()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.instruction.as_str(), self.value)
    }
}

/// Any nonzero angle turns left and zero turns right, whatever the sign.
/// This is the behavior the robot has always been driven with; see DESIGN.md
/// before changing it.
fn turn_instruction(degrees: &serde_json::Number) -> Instruction {
    let nonzero = degrees.as_f64().map(|d| d != 0.0).unwrap_or(false);
    if nonzero {
        Instruction::Left
    } else {
        Instruction::Right
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent_engine::state::Distance;

    fn turn(degrees: serde_json::Value) -> RobotAction {
        let serde_json::Value::Number(n) = degrees else {
            panic!("not a number");
        };
        RobotAction::TurnRobot { degrees: n }
    }

    #[test]
    fn move_commands_parse_back_to_direction_and_distance() {
        for direction in [Direction::Forward, Direction::Backward] {
            for distance in [Distance::Short, Distance::Medium, Distance::Long] {
                let cmd = Command::encode(&RobotAction::MoveRobot { direction, distance }).unwrap();
                let parsed = Command::parse(&cmd.to_string()).unwrap();
                assert_eq!(parsed.instruction.as_str(), direction.as_str());
                assert_eq!(parsed.value, distance.as_str());
            }
        }
    }

    #[test]
    fn move_forward_short_renders() {
        let cmd = Command::encode(&RobotAction::MoveRobot {
            direction: Direction::Forward,
            distance: Distance::Short,
        })
        .unwrap();
        assert_eq!(cmd.to_string(), "forward-short");
    }

    #[test]
    fn zero_degree_turn_is_right() {
        assert_eq!(Command::encode(&turn(serde_json::json!(0))).unwrap().to_string(), "right-0");
        let cmd = Command::encode(&turn(serde_json::json!(0.0))).unwrap();
        assert_eq!(cmd.instruction, Instruction::Right);
    }

    #[test]
    fn nonzero_turn_is_left_regardless_of_sign() {
        assert_eq!(Command::encode(&turn(serde_json::json!(30))).unwrap().to_string(), "left-30");
        assert_eq!(Command::encode(&turn(serde_json::json!(-15))).unwrap().to_string(), "left--15");
        assert_eq!(Command::encode(&turn(serde_json::json!(12.5))).unwrap().to_string(), "left-12.5");
    }

    #[test]
    fn negative_turn_parses_back() {
        let parsed = Command::parse("left--15").unwrap();
        assert_eq!(parsed.instruction, Instruction::Left);
        assert_eq!(parsed.value, "-15");
    }

    #[test]
    fn finish_and_noops_have_no_command() {
        assert!(Command::encode(&RobotAction::FinishTask).is_none());
        assert!(Command::encode(&RobotAction::Unrecognized { name: "x".into() }).is_none());
        assert!(Command::encode(&RobotAction::Malformed {
            name: "move_robot".into(),
            reason: "missing field".into()
        })
        .is_none());
    }

    #[test]
    fn parse_rejects_unknown_instruction_and_missing_value() {
        assert!(Command::parse("up-short").is_none());
        assert!(Command::parse("forward").is_none());
        assert!(Command::parse("forward-").is_none());
    }

    #[test]
    fn wire_bytes_replace_non_ascii() {
        let cmd = Command {
            instruction: Instruction::Left,
            value: "30°".into(),
        };
        assert_eq!(cmd.to_wire_bytes(), b"left-30?".to_vec());
    }
}
