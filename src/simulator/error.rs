use crate::program::kind_to_code;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Terminal outcome code of a failed run.
///
/// These are not Rust errors: a failed run still produces a full
/// [`SimulationResult`](crate::trace::SimulationResult) carrying one of these.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ErrorCode {
    Collide,
    StepLimit,
    LoopDepth,
    GoalNotMet,
    /// Upper-cased instruction kind, e.g. `TELEPORT`
    Unsupported(String),
}

impl ErrorCode {
    pub fn unsupported(kind: &str) -> Self {
        ErrorCode::Unsupported(kind_to_code(kind))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Collide => f.write_str("E_COLLIDE"),
            ErrorCode::StepLimit => f.write_str("E_STEP_LIMIT"),
            ErrorCode::LoopDepth => f.write_str("E_LOOP_DEPTH"),
            ErrorCode::GoalNotMet => f.write_str("E_GOAL_NOT_MET"),
            ErrorCode::Unsupported(kind) => write!(f, "E_UNSUPPORTED_{}", kind),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown error code '{0}'")]
pub struct UnknownErrorCode(pub String);

impl FromStr for ErrorCode {
    type Err = UnknownErrorCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "E_COLLIDE" => Ok(ErrorCode::Collide),
            "E_STEP_LIMIT" => Ok(ErrorCode::StepLimit),
            "E_LOOP_DEPTH" => Ok(ErrorCode::LoopDepth),
            "E_GOAL_NOT_MET" => Ok(ErrorCode::GoalNotMet),
            other => match other.strip_prefix("E_UNSUPPORTED_") {
                Some(kind) if !kind.is_empty() => Ok(ErrorCode::unsupported(kind)),
                _ => Err(UnknownErrorCode(other.to_string())),
            },
        }
    }
}

impl TryFrom<String> for ErrorCode {
    type Error = UnknownErrorCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ErrorCode> for String {
    fn from(code: ErrorCode) -> Self {
        code.to_string()
    }
}
