/// CodeAdventure engine - program simulator and level progression
///
/// Interprets student programs (trees of movement and control blocks) against
/// tile-grid levels, rates the outcome in stars, and tracks per-student progress,
/// unlocks, achievements and hints.
///
/// # Example
///
/// ```
/// use codeadventure_engine::{parse_program, Engine};
///
/// let engine = Engine::builtin();
/// let program = parse_program("repeat 6\n    move\n").unwrap();
/// let result = engine.run_program("ada", "level-2-1", &program).unwrap();
/// assert!(result.success);
/// assert_eq!(result.stars, 3);
/// ```
pub mod catalog;
pub mod config;
pub mod diagnostic;
pub mod engine;
pub mod goal;
pub mod hint;
pub mod parser;
pub mod persistence;
pub mod program;
pub mod progress;
pub mod simulator;
pub mod span;
pub mod trace;
pub mod validator;

/// Re-export main types for convenience
pub use catalog::{LevelCatalog, LevelDefinition};
pub use config::EngineConfig;
pub use engine::{Engine, EngineError};
pub use parser::ParseError;
pub use persistence::ProfileRepository;
pub use program::{Instruction, Program};
pub use progress::{CompleteRequest, ProgressStore, StudentProfile};
pub use simulator::{simulate, ErrorCode, SimulationOptions, Simulator};
pub use trace::SimulationResult;
pub use validator::{validate, ValidationError};

/// Error reading a program from its text or JSON form
#[derive(Debug, thiserror::Error)]
pub enum ProgramError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("invalid program JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse a program written in the text syntax
///
/// # Example
/// ```
/// use codeadventure_engine::{parse_program, Instruction};
///
/// let program = parse_program("move\ncollect\n").unwrap();
/// assert_eq!(program, vec![Instruction::Move, Instruction::Collect]);
/// ```
pub fn parse_program(input: &str) -> Result<Program, ParseError> {
    parser::parse(input)
}

/// Parse a program from its JSON wire form (an array of instruction objects)
pub fn parse_program_json(input: &str) -> Result<Program, serde_json::Error> {
    serde_json::from_str(input)
}

/// Print a program in the text syntax
pub fn format_program(program: &[Instruction]) -> String {
    parser::format_program(program)
}

/// Parse a program as JSON or text, depending on `json`
pub fn load_program(input: &str, json: bool) -> Result<Program, ProgramError> {
    if json {
        Ok(parse_program_json(input)?)
    } else {
        Ok(parse_program(input)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_program_both_forms() {
        let text = load_program("repeat 2\n  move\n", false).unwrap();
        let json = load_program(
            r#"[{"type": "repeat", "times": 2, "body": [{"type": "move"}]}]"#,
            true,
        )
        .unwrap();
        assert_eq!(text, json);
    }

    #[test]
    fn test_load_program_reports_json_errors() {
        let err = load_program("[{\"type\": ", true).unwrap_err();
        assert!(matches!(err, ProgramError::Json(_)));
    }

    #[test]
    fn test_format_program_output() {
        let program = vec![Instruction::repeat(2, vec![Instruction::Move])];
        assert_eq!(format_program(&program), "repeat 2\n    move\n");
    }
}
