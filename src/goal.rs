/// Goal evaluation and star rating for finished runs
use crate::catalog::{LevelDefinition, Point};
use crate::simulator::ErrorCode;

/// How a run ended, as decided from its terminal state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub success: bool,
    pub stars: u8,
    pub error_code: Option<ErrorCode>,
}

/// Check every goal clause the level specifies against the final state
pub fn goals_met(level: &LevelDefinition, position: Point, remaining: u32, steps: u32) -> bool {
    let goal = &level.goal;
    if goal.collectibles_required.is_some() && remaining > 0 {
        return false;
    }
    if let Some(target) = goal.reach_target {
        if target != position {
            return false;
        }
    }
    if let Some(limit) = goal.step_limit {
        if steps > limit {
            return false;
        }
    }
    true
}

/// Stars for a successful run.
///
/// Leftover collectibles cap the rating at one star; otherwise par earns three
/// and up to two steps over par earns two.
pub fn star_rating(level: &LevelDefinition, steps: u32, remaining: u32) -> u8 {
    if remaining > 0 {
        return 1;
    }
    if steps <= level.best_steps {
        3
    } else if steps <= level.best_steps.saturating_add(2) {
        2
    } else {
        1
    }
}

/// Combine the execution outcome with the goal clauses.
///
/// A run that finished without an execution error but misses a goal reports
/// [`ErrorCode::GoalNotMet`]. Failures always earn zero stars.
pub fn evaluate(
    level: &LevelDefinition,
    execution: Result<(), ErrorCode>,
    position: Point,
    remaining: u32,
    steps: u32,
) -> Verdict {
    match execution {
        Err(code) => Verdict {
            success: false,
            stars: 0,
            error_code: Some(code),
        },
        Ok(()) if goals_met(level, position, remaining, steps) => Verdict {
            success: true,
            stars: star_rating(level, steps, remaining),
            error_code: None,
        },
        Ok(()) => Verdict {
            success: false,
            stars: 0,
            error_code: Some(ErrorCode::GoalNotMet),
        },
    }
}
