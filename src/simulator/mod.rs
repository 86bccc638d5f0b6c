/// Simulator module - runs instruction trees against a level grid
// Sub-modules
mod error;
mod world;

// Implementation modules
mod execute_impl;

// Public exports
pub use error::{ErrorCode, UnknownErrorCode};
pub use world::WorldState;

use crate::catalog::LevelDefinition;
use crate::config::EngineConfig;
use crate::goal;
use crate::program::Instruction;
use crate::trace::{SimulationMetadata, SimulationResult};
use execute_impl::Run;
use tracing::debug;
use world::Grid;

/// Per-run knobs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationOptions {
    /// Overrides the level's step limit when set
    pub step_limit: Option<u32>,
    /// Record the step log
    pub capture_log: bool,
    /// Budget when neither the override nor the level sets one
    pub default_step_limit: u32,
    pub max_depth: usize,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        SimulationOptions {
            step_limit: None,
            capture_log: true,
            default_step_limit: 200,
            max_depth: 10,
        }
    }
}

impl SimulationOptions {
    pub fn from_config(config: &EngineConfig) -> Self {
        SimulationOptions {
            default_step_limit: config.default_step_limit,
            max_depth: config.max_depth,
            ..Default::default()
        }
    }

    pub fn with_step_limit(mut self, limit: u32) -> Self {
        self.step_limit = Some(limit);
        self
    }

    pub fn without_log(mut self) -> Self {
        self.capture_log = false;
        self
    }
}

/// Deterministic interpreter for one level.
///
/// Holds no state between runs, so a single simulator can be shared and
/// `run` called any number of times with identical results.
pub struct Simulator<'a> {
    pub(super) level: &'a LevelDefinition,
    pub(super) grid: Grid<'a>,
    pub(super) options: SimulationOptions,
}

impl<'a> Simulator<'a> {
    pub fn new(level: &'a LevelDefinition) -> Self {
        Simulator {
            level,
            grid: Grid::new(level),
            options: SimulationOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SimulationOptions) -> Self {
        self.options = options;
        self
    }

    /// Effective step budget: override, then level goal, then default
    pub fn step_limit(&self) -> u32 {
        self.options
            .step_limit
            .or(self.level.goal.step_limit)
            .unwrap_or(self.options.default_step_limit)
    }

    pub fn run(&self, program: &[Instruction]) -> SimulationResult {
        let mut run = Run {
            world: WorldState::new(self.level),
            log: Vec::new(),
            step_limit: self.step_limit(),
        };

        let execution = self.execute(&mut run, program, 0);
        let world = &run.world;
        let verdict = goal::evaluate(
            self.level,
            execution,
            world.position.point(),
            world.remaining_collectibles,
            world.steps_taken,
        );

        debug!(
            level_id = %self.level.id,
            steps = world.steps_taken,
            success = verdict.success,
            stars = verdict.stars,
            error_code = ?verdict.error_code,
            "simulation finished"
        );

        SimulationResult {
            success: verdict.success,
            steps: world.steps_taken,
            stars: verdict.stars,
            error_code: verdict.error_code,
            remaining_collectibles: world.remaining_collectibles,
            position: world.position,
            log: run.log,
            metadata: SimulationMetadata {
                best_steps: self.level.best_steps,
                goal: self.level.goal.clone(),
            },
        }
    }
}

/// Run `program` on `level` with default options
pub fn simulate(level: &LevelDefinition, program: &[Instruction]) -> SimulationResult {
    Simulator::new(level).run(program)
}
