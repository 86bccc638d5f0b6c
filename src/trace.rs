/// Step log and run outcome records used for replay and client animation
use crate::catalog::{LevelGoal, Position};
use crate::program::Instruction;
use crate::simulator::ErrorCode;
use serde::{Deserialize, Serialize};

/// One executed instruction, captured before it took effect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationStep {
    /// 1-based position in execution order
    pub index: u32,

    /// The executed instruction, including its full subtree
    pub instruction: Instruction,

    /// Agent position before execution
    pub position: Position,

    /// Collectibles still on the grid before execution
    pub collectibles: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationMetadata {
    pub best_steps: u32,
    pub goal: LevelGoal,
}

/// Terminal outcome of one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub success: bool,
    pub steps: u32,
    pub stars: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    pub remaining_collectibles: u32,
    /// Final agent position
    pub position: Position,
    #[serde(default)]
    pub log: Vec<SimulationStep>,
    pub metadata: SimulationMetadata,
}

impl SimulationResult {
    /// Instructions of the step log in execution order
    pub fn executed_instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.log.iter().map(|step| &step.instruction)
    }
}
