use codeadventure_engine::catalog::{Facing, Position};
use codeadventure_engine::program::TurnDirection;
use codeadventure_engine::{
    parse_program, simulate, CompleteRequest, Engine, Instruction, LevelCatalog,
    SimulationOptions, Simulator,
};

const TOWER_SOLUTION: &str = "repeat 7\n    if tile-ahead-walkable\n        move\n    else\n        turn right\ncollect\n";

#[test]
fn test_log_records_state_before_each_step() {
    let catalog = LevelCatalog::builtin();
    let level = catalog.level("level-1-3").unwrap();
    let program = parse_program("move\ncollect\nturn left\n").unwrap();
    let result = simulate(level, &program);

    let indices: Vec<u32> = result.log.iter().map(|step| step.index).collect();
    assert_eq!(indices, vec![1, 2, 3]);

    assert_eq!(result.log[0].position, Position::new(0, 2, Facing::East));
    assert_eq!(result.log[1].position, Position::new(1, 2, Facing::East));
    assert_eq!(result.log[1].collectibles, 2);
    assert_eq!(result.log[2].collectibles, 1);
    assert_eq!(
        result.log[2].instruction,
        Instruction::turn(TurnDirection::Left)
    );
}

#[test]
fn test_nested_blocks_are_logged_in_execution_order() {
    let catalog = LevelCatalog::builtin();
    let level = catalog.level("level-2-2").unwrap();
    let result = simulate(level, &parse_program(TOWER_SOLUTION).unwrap());
    assert_eq!(result.log.len(), 16);

    let kinds: Vec<&str> = result
        .executed_instructions()
        .map(|instruction| instruction.kind())
        .collect();
    assert_eq!(&kinds[..3], &["repeat", "conditional", "move"]);
    assert_eq!(kinds[8], "turn");
    assert_eq!(kinds[15], "collect");
}

#[test]
fn test_replaying_a_three_star_run_is_identical() {
    let engine = Engine::builtin();
    let program = parse_program(TOWER_SOLUTION).unwrap();
    let first = engine.run_program("ada", "level-2-2", &program).unwrap();
    assert_eq!(first.stars, 3);
    engine
        .complete_level("ada", "level-2-2", CompleteRequest::from_result(&first))
        .unwrap();

    let replay_log = engine.profile("ada").progress["level-2-2"].replay_log.clone();
    let replayed = engine.run_program("ada", "level-2-2", &program).unwrap();
    assert_eq!(replayed.log, replay_log);
    assert_eq!(replayed, first);
}

#[test]
fn test_log_can_be_disabled() {
    let catalog = LevelCatalog::builtin();
    let level = catalog.level("level-2-2").unwrap();
    let program = parse_program(TOWER_SOLUTION).unwrap();
    let result = Simulator::new(level)
        .with_options(SimulationOptions::default().without_log())
        .run(&program);
    assert!(result.success);
    assert!(result.log.is_empty());
    assert_eq!(result.steps, 16);
}

#[test]
fn test_log_survives_serialization() {
    let catalog = LevelCatalog::builtin();
    let level = catalog.level("level-2-2").unwrap();
    let result = simulate(level, &parse_program(TOWER_SOLUTION).unwrap());
    let json = serde_json::to_string(&result).unwrap();
    let back = serde_json::from_str(&json).unwrap();
    assert_eq!(result, back);
}
