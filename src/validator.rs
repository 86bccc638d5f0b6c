/// Allow-list validation of programs before they reach the simulator
use crate::catalog::LevelDefinition;
use crate::program::{BlockCode, Instruction};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("program is empty")]
    EmptyProgram,
    #[error("instruction block '{code}' is not allowed in this level")]
    InvalidInstruction { code: BlockCode },
}

impl ValidationError {
    /// Stable machine-readable code for callers that forward the rejection
    pub fn code(&self) -> String {
        match self {
            ValidationError::EmptyProgram => "E_EMPTY_PROGRAM".to_string(),
            ValidationError::InvalidInstruction { code } => code.to_string(),
        }
    }
}

/// Check every instruction, nested ones included, against the level's allow-list.
///
/// An empty allow-list leaves the level unrestricted. The walk is depth-first,
/// left to right, and stops at the first disallowed block.
pub fn validate(level: &LevelDefinition, program: &[Instruction]) -> Result<(), ValidationError> {
    if program.is_empty() {
        return Err(ValidationError::EmptyProgram);
    }
    if level.allowed_blocks.is_empty() {
        return Ok(());
    }
    check_all(level, program)
}

fn check_all(level: &LevelDefinition, instructions: &[Instruction]) -> Result<(), ValidationError> {
    for instruction in instructions {
        let code = instruction.block_code();
        if !level.allowed_blocks.contains(code.as_str()) {
            return Err(ValidationError::InvalidInstruction { code });
        }
        match instruction {
            Instruction::Repeat { body, .. } => check_all(level, body)?,
            Instruction::Conditional { truthy, falsy, .. } => {
                check_all(level, truthy)?;
                check_all(level, falsy)?;
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Facing, LevelGoal, LevelRewards, Position};
    use crate::program::{Condition, TurnDirection};

    fn level_allowing(blocks: &[&str]) -> LevelDefinition {
        LevelDefinition {
            id: "test".to_string(),
            name: "Test".to_string(),
            width: 1,
            height: 1,
            tiles: vec![],
            start: Position::new(0, 0, Facing::North),
            goal: LevelGoal::default(),
            best_steps: 1,
            hints: vec![],
            allowed_blocks: blocks.iter().map(|b| b.to_string()).collect(),
            comic: String::new(),
            rewards: LevelRewards::default(),
        }
    }

    #[test]
    fn test_empty_program_rejected() {
        let level = level_allowing(&[]);
        assert_eq!(validate(&level, &[]), Err(ValidationError::EmptyProgram));
    }

    #[test]
    fn test_empty_allow_list_is_unrestricted() {
        let level = level_allowing(&[]);
        let program = vec![Instruction::Unsupported {
            kind: "teleport".to_string(),
        }];
        assert_eq!(validate(&level, &program), Ok(()));
    }

    #[test]
    fn test_turn_direction_maps_to_block() {
        let level = level_allowing(&["MOVE", "TURN_LEFT"]);
        let program = vec![
            Instruction::turn(TurnDirection::Left),
            Instruction::turn(TurnDirection::Right),
        ];
        assert_eq!(
            validate(&level, &program),
            Err(ValidationError::InvalidInstruction {
                code: BlockCode::TurnRight
            })
        );
    }

    #[test]
    fn test_nested_falsy_branch_checked() {
        let level = level_allowing(&["MOVE", "CONDITIONAL"]);
        let program = vec![Instruction::conditional(
            Condition::TileAheadWalkable,
            vec![Instruction::Move],
            vec![Instruction::Collect],
        )];
        assert_eq!(
            validate(&level, &program),
            Err(ValidationError::InvalidInstruction {
                code: BlockCode::Collect
            })
        );
    }

    #[test]
    fn test_first_violation_wins() {
        let level = level_allowing(&["MOVE"]);
        let program = vec![
            Instruction::Move,
            Instruction::repeat(2, vec![Instruction::Collect]),
            Instruction::Collect,
        ];
        let error = validate(&level, &program).unwrap_err();
        assert_eq!(error.code(), "REPEAT");
    }
}
