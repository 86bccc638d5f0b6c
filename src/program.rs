/// Instruction tree definitions for student programs
use serde::{Deserialize, Serialize};
use std::fmt;

/// A program is an ordered sequence of top-level instructions
pub type Program = Vec<Instruction>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnDirection {
    Left,
    Right,
}

impl TurnDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            TurnDirection::Left => "left",
            TurnDirection::Right => "right",
        }
    }
}

/// Condition evaluated by a `conditional` instruction against the current world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Condition {
    /// The tile the agent would move into is walkable
    TileAheadWalkable,
    /// At least one collectible is still on the grid
    CollectiblesRemaining,
}

impl Condition {
    pub fn as_str(self) -> &'static str {
        match self {
            Condition::TileAheadWalkable => "tile-ahead-walkable",
            Condition::CollectiblesRemaining => "collectibles-remaining",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "tile-ahead-walkable" => Some(Condition::TileAheadWalkable),
            "collectibles-remaining" => Some(Condition::CollectiblesRemaining),
            _ => None,
        }
    }
}

/// One node of the instruction tree.
///
/// Serialized as a `type`-tagged JSON object. Kinds the engine does not know
/// deserialize into [`Instruction::Unsupported`] so the simulator can report them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "InstructionRepr", into = "InstructionRepr")]
pub enum Instruction {
    Move,
    Turn {
        direction: TurnDirection,
    },
    Collect,
    Repeat {
        times: u32,
        body: Vec<Instruction>,
    },
    Conditional {
        condition: Option<Condition>,
        truthy: Vec<Instruction>,
        falsy: Vec<Instruction>,
    },
    Unsupported {
        kind: String,
    },
}

/// Canonical block codes used by level allow-lists
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BlockCode {
    Move,
    TurnLeft,
    TurnRight,
    Collect,
    Repeat,
    Conditional,
    Other(String),
}

impl BlockCode {
    pub fn as_str(&self) -> &str {
        match self {
            BlockCode::Move => "MOVE",
            BlockCode::TurnLeft => "TURN_LEFT",
            BlockCode::TurnRight => "TURN_RIGHT",
            BlockCode::Collect => "COLLECT",
            BlockCode::Repeat => "REPEAT",
            BlockCode::Conditional => "CONDITIONAL",
            BlockCode::Other(code) => code,
        }
    }
}

impl fmt::Display for BlockCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upper-case an instruction kind into code form (`look-around` -> `LOOK_AROUND`)
pub(crate) fn kind_to_code(kind: &str) -> String {
    kind.trim().to_ascii_uppercase().replace(['-', ' '], "_")
}

impl Instruction {
    pub fn turn(direction: TurnDirection) -> Self {
        Instruction::Turn { direction }
    }

    pub fn repeat(times: u32, body: Vec<Instruction>) -> Self {
        Instruction::Repeat { times, body }
    }

    pub fn conditional(
        condition: Condition,
        truthy: Vec<Instruction>,
        falsy: Vec<Instruction>,
    ) -> Self {
        Instruction::Conditional {
            condition: Some(condition),
            truthy,
            falsy,
        }
    }

    /// The wire name of this instruction's kind
    pub fn kind(&self) -> &str {
        match self {
            Instruction::Move => "move",
            Instruction::Turn { .. } => "turn",
            Instruction::Collect => "collect",
            Instruction::Repeat { .. } => "repeat",
            Instruction::Conditional { .. } => "conditional",
            Instruction::Unsupported { kind } => kind,
        }
    }

    pub fn block_code(&self) -> BlockCode {
        match self {
            Instruction::Move => BlockCode::Move,
            Instruction::Turn {
                direction: TurnDirection::Left,
            } => BlockCode::TurnLeft,
            Instruction::Turn {
                direction: TurnDirection::Right,
            } => BlockCode::TurnRight,
            Instruction::Collect => BlockCode::Collect,
            Instruction::Repeat { .. } => BlockCode::Repeat,
            Instruction::Conditional { .. } => BlockCode::Conditional,
            Instruction::Unsupported { kind } => BlockCode::Other(kind_to_code(kind)),
        }
    }
}

/// Flat wire shape shared by every instruction kind
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct InstructionRepr {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    direction: Option<TurnDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    times: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    body: Option<Vec<Instruction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    condition: Option<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    truthy: Option<Vec<Instruction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    falsy: Option<Vec<Instruction>>,
}

impl TryFrom<InstructionRepr> for Instruction {
    type Error = String;

    fn try_from(repr: InstructionRepr) -> Result<Self, Self::Error> {
        let instruction = match repr.kind.as_str() {
            "move" => Instruction::Move,
            "collect" => Instruction::Collect,
            "turn" => Instruction::Turn {
                direction: repr
                    .direction
                    .ok_or_else(|| "turn instruction requires a direction".to_string())?,
            },
            "repeat" => Instruction::Repeat {
                times: repr
                    .times
                    .ok_or_else(|| "repeat instruction requires times".to_string())?,
                body: repr.body.unwrap_or_default(),
            },
            "conditional" => Instruction::Conditional {
                condition: repr.condition,
                truthy: repr.truthy.unwrap_or_default(),
                falsy: repr.falsy.unwrap_or_default(),
            },
            "" => return Err("instruction type must not be empty".to_string()),
            other => Instruction::Unsupported {
                kind: other.to_string(),
            },
        };
        Ok(instruction)
    }
}

impl From<Instruction> for InstructionRepr {
    fn from(instruction: Instruction) -> Self {
        let kind = instruction.kind().to_string();
        match instruction {
            Instruction::Move | Instruction::Collect | Instruction::Unsupported { .. } => {
                InstructionRepr {
                    kind,
                    ..Default::default()
                }
            }
            Instruction::Turn { direction } => InstructionRepr {
                kind,
                direction: Some(direction),
                ..Default::default()
            },
            Instruction::Repeat { times, body } => InstructionRepr {
                kind,
                times: Some(times),
                body: Some(body),
                ..Default::default()
            },
            Instruction::Conditional {
                condition,
                truthy,
                falsy,
            } => InstructionRepr {
                kind,
                condition,
                truthy: Some(truthy),
                falsy: Some(falsy),
                ..Default::default()
            },
        }
    }
}
