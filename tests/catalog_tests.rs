use codeadventure_engine::catalog::{CatalogError, Facing, Point, Position};
use codeadventure_engine::diagnostic::report_json_error;
use codeadventure_engine::{simulate, Instruction, LevelCatalog};

#[test]
fn test_bundled_course_layout() {
    let catalog = LevelCatalog::builtin();
    assert_eq!(catalog.courses().len(), 1);
    assert_eq!(catalog.level_count(), 5);

    let ids: Vec<&str> = catalog.levels_in_order().map(|l| l.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["level-1-1", "level-1-2", "level-1-3", "level-2-1", "level-2-2"]
    );
    assert_eq!(catalog.predecessor("level-2-1"), None);
    assert_eq!(catalog.predecessor("level-2-2"), Some("level-2-1"));
    assert_eq!(
        catalog.chapter_of("level-1-3").map(|c| c.id.as_str()),
        Some("chapter-1")
    );
}

#[test]
fn test_first_level_geometry() {
    let catalog = LevelCatalog::builtin();
    let level = catalog.level("level-1-1").unwrap();
    assert_eq!((level.width, level.height), (5, 5));
    assert_eq!(level.start, Position::new(0, 2, Facing::East));
    assert_eq!(level.goal.reach_target, Some(Point::new(4, 2)));
    assert_eq!(level.goal.step_limit, Some(8));
    assert_eq!(level.best_steps, 4);
    assert!(level.in_bounds(Point::new(4, 4)));
    assert!(!level.in_bounds(Point::new(5, 2)));
}

#[test]
fn test_every_bundled_level_has_hints_and_par() {
    let catalog = LevelCatalog::builtin();
    for level in catalog.levels_in_order() {
        assert!(!level.hints.is_empty(), "{} has no hints", level.id);
        assert!(level.best_steps > 0);
        // A single turn never wins a bundled level
        let result = simulate(level, &[Instruction::turn(
            codeadventure_engine::program::TurnDirection::Left,
        )]);
        assert!(!result.success, "{} was won by a single turn", level.id);
    }
}

#[test]
fn test_zero_sized_level_rejected() {
    let source = r#"{
        "chapters": [{"id": "c", "title": "C", "order": 1, "levelIds": ["flat"]}],
        "levels": [{
            "id": "flat", "name": "Flat", "width": 0, "height": 1, "tiles": [],
            "start": {"x": 0, "y": 0, "facing": "north"}, "goal": {}, "bestSteps": 1
        }]
    }"#;
    assert!(matches!(
        LevelCatalog::from_json_str(source),
        Err(CatalogError::InvalidLevel { .. })
    ));
}

#[test]
fn test_course_with_unknown_chapter_rejected() {
    let source = r#"{
        "courses": [{"id": "k", "name": "K", "chapterIds": ["missing"]}],
        "chapters": [],
        "levels": []
    }"#;
    assert!(matches!(
        LevelCatalog::from_json_str(source),
        Err(CatalogError::UnknownChapter { .. })
    ));
}

#[test]
fn test_missing_catalog_file() {
    let result = LevelCatalog::from_file(std::path::Path::new("/definitely/not/here.json"));
    assert!(matches!(result, Err(CatalogError::Read { .. })));
}

#[test]
fn test_malformed_catalog_diagnostic() {
    let source = "{\n  \"chapters\": [,]\n}";
    let err = serde_json::from_str::<serde_json::Value>(source).unwrap_err();
    let diagnostic = report_json_error("catalog.json", source, &err);
    assert!(diagnostic.contains("Invalid JSON"));
}
