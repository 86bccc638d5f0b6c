/// Hint ladder: picks the next hint from attempt count and the last error
use crate::catalog::LevelDefinition;
use crate::simulator::ErrorCode;

pub const FIRST_TRY_HINT: &str = "Try running your program and watch what happens.";
pub const FALLBACK_HINT: &str = "Check the order of your blocks.";
pub const COLLIDE_HINT: &str = "Oops, something is in the way! Try adjusting your turns.";
pub const STEP_LIMIT_HINT: &str = "That's a lot of steps. Try using a repeat block!";
pub const GOAL_NOT_MET_HINT: &str = "You finished without meeting the goal. Check what the level asks for.";
pub const LOOP_DEPTH_HINT: &str = "Your blocks are nested too deeply. Try simplifying your loops.";

/// Remediation text for errors that have one
pub fn remediation(code: &ErrorCode) -> Option<&'static str> {
    match code {
        ErrorCode::Collide => Some(COLLIDE_HINT),
        ErrorCode::StepLimit => Some(STEP_LIMIT_HINT),
        ErrorCode::GoalNotMet => Some(GOAL_NOT_MET_HINT),
        ErrorCode::LoopDepth => Some(LOOP_DEPTH_HINT),
        ErrorCode::Unsupported(_) => None,
    }
}

/// Hint for a student who has made `attempts` runs, the last failing with `last_error`.
///
/// Before any attempt the first scripted hint is shown. After that a recognized
/// error takes priority; otherwise the ladder is indexed by attempts, clamped to
/// its last rung.
pub fn hint(level: &LevelDefinition, attempts: u32, last_error: Option<&ErrorCode>) -> String {
    if attempts == 0 {
        return level
            .hints
            .first()
            .map_or(FIRST_TRY_HINT, String::as_str)
            .to_string();
    }
    if let Some(text) = last_error.and_then(remediation) {
        return text.to_string();
    }
    let rung = (attempts as usize).min(level.hints.len().saturating_sub(1));
    level
        .hints
        .get(rung)
        .map_or(FALLBACK_HINT, String::as_str)
        .to_string()
}

/// Like [`hint`], taking the error as its wire code; unrecognized codes are ignored
pub fn hint_for_code(level: &LevelDefinition, attempts: u32, last_error: Option<&str>) -> String {
    let code = last_error.and_then(|code| code.parse::<ErrorCode>().ok());
    hint(level, attempts, code.as_ref())
}
