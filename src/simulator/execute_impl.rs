//! Recursive execution of the instruction tree.
//!
//! Depth counts structural nesting of `repeat`/`conditional` bodies, not iterations;
//! the step budget bounds the total amount of work.

use crate::program::{Condition, Instruction, TurnDirection};
use crate::trace::SimulationStep;

use super::world::WorldState;
use super::{ErrorCode, Simulator};

/// Mutable bookkeeping for one call to [`Simulator::run`]
pub(super) struct Run {
    pub world: WorldState,
    pub log: Vec<SimulationStep>,
    pub step_limit: u32,
}

impl<'a> Simulator<'a> {
    pub(super) fn execute(
        &self,
        run: &mut Run,
        instructions: &[Instruction],
        depth: usize,
    ) -> Result<(), ErrorCode> {
        if depth > self.options.max_depth {
            return Err(ErrorCode::LoopDepth);
        }

        for instruction in instructions {
            if run.world.steps_taken >= run.step_limit {
                return Err(ErrorCode::StepLimit);
            }
            run.world.steps_taken += 1;

            if self.options.capture_log {
                run.log.push(SimulationStep {
                    index: run.world.steps_taken,
                    instruction: instruction.clone(),
                    position: run.world.position,
                    collectibles: run.world.remaining_collectibles,
                });
            }

            match instruction {
                Instruction::Move => {
                    let next = run.world.position.ahead();
                    if !self.grid.is_walkable(next) {
                        return Err(ErrorCode::Collide);
                    }
                    run.world.position.x = next.x;
                    run.world.position.y = next.y;
                }
                Instruction::Turn { direction } => {
                    let facing = run.world.position.facing;
                    run.world.position.facing = match direction {
                        TurnDirection::Left => facing.turned_left(),
                        TurnDirection::Right => facing.turned_right(),
                    };
                }
                Instruction::Collect => {
                    let here = run.world.position.point();
                    if let Some(kind) = self.grid.collectible_at(here) {
                        run.world.collect(here, kind);
                    }
                }
                Instruction::Repeat { times, body } => {
                    // An empty body charges no steps, so iterating it would be unbounded work
                    if body.is_empty() {
                        continue;
                    }
                    for _ in 0..*times {
                        self.execute(run, body, depth + 1)?;
                    }
                }
                Instruction::Conditional {
                    condition,
                    truthy,
                    falsy,
                } => {
                    // A conditional without a condition runs neither branch
                    if let Some(condition) = condition {
                        let branch = if self.check(run, *condition) {
                            truthy
                        } else {
                            falsy
                        };
                        self.execute(run, branch, depth + 1)?;
                    }
                }
                Instruction::Unsupported { kind } => {
                    return Err(ErrorCode::unsupported(kind));
                }
            }
        }

        Ok(())
    }

    fn check(&self, run: &Run, condition: Condition) -> bool {
        match condition {
            Condition::TileAheadWalkable => self.grid.is_walkable(run.world.position.ahead()),
            Condition::CollectiblesRemaining => run.world.remaining_collectibles > 0,
        }
    }
}
