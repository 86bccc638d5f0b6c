use codeadventure_engine::progress::{
    LevelStatus, ProgressError, SettingsPatch, BADGE_CHAPTER_MASTER, BADGE_FIRST_CLEAR,
    BADGE_PERFECTIONIST, BADGE_STAR_COLLECTOR, BADGE_TRAVELER,
};
use codeadventure_engine::{
    parse_program, CompleteRequest, Engine, EngineConfig, EngineError, LevelCatalog,
};
use std::sync::Arc;

fn completion(stars: u8, steps: u32) -> CompleteRequest {
    CompleteRequest {
        stars,
        steps,
        ..Default::default()
    }
}

const ALL_LEVELS: [&str; 5] = ["level-1-1", "level-1-2", "level-1-3", "level-2-1", "level-2-2"];

#[test]
fn test_new_student_starts_clean() {
    let engine = Engine::builtin();
    let profile = engine.profile("ada");
    assert_eq!(profile.avatar.equipped, "starter-cape");
    assert!(profile.progress.is_empty());
    assert!(profile.achievements.badges.is_empty());
    assert!(!profile.sandbox_unlocked);
}

#[test]
fn test_stars_never_decrease() {
    let engine = Engine::builtin();
    let mut best = 0;
    for stars in [1, 3, 0, 2, 1] {
        let record = engine
            .complete_level("ada", "level-1-1", completion(stars, 6))
            .unwrap();
        best = best.max(stars);
        assert_eq!(record.stars, best);
    }
}

#[test]
fn test_best_steps_only_improve() {
    let engine = Engine::builtin();
    engine.complete_level("ada", "level-1-1", completion(2, 6)).unwrap();
    let record = engine.complete_level("ada", "level-1-1", completion(1, 9)).unwrap();
    assert_eq!(record.steps, 6);
    assert_eq!(record.best_difference, Some(2));

    let record = engine.complete_level("ada", "level-1-1", completion(3, 4)).unwrap();
    assert_eq!(record.steps, 4);
    assert_eq!(record.best_difference, Some(0));
}

#[test]
fn test_hints_and_duration_accumulate() {
    let engine = Engine::builtin();
    let request = completion(1, 8).with_hints(2).with_duration(30);
    engine.complete_level("ada", "level-1-1", request.clone()).unwrap();
    let record = engine.complete_level("ada", "level-1-1", request).unwrap();
    assert_eq!(record.hints_used, 4);
    assert_eq!(record.duration_seconds, 60);
    assert!(record.completed_at_epoch_ms > 0);
}

#[test]
fn test_completion_from_simulation() {
    let engine = Engine::builtin();
    let program = parse_program("move\nmove\nmove\nmove\n").unwrap();
    let result = engine.run_program("ada", "level-1-1", &program).unwrap();
    let record = engine
        .complete_level("ada", "level-1-1", CompleteRequest::from_result(&result))
        .unwrap();
    assert_eq!(record.stars, 3);
    assert_eq!(record.best_difference, Some(0));
    assert_eq!(record.replay_log, result.log);
}

#[test]
fn test_invalid_completions() {
    let engine = Engine::builtin();
    assert_eq!(
        engine.complete_level("ada", "nope", completion(1, 1)),
        Err(EngineError::LevelNotFound("nope".to_string()))
    );
    assert!(matches!(
        engine.complete_level("ada", "level-1-1", completion(4, 1)),
        Err(EngineError::Progress(ProgressError::InvalidCompletion(_)))
    ));
    // A rejected completion leaves no trace
    assert!(engine.profile("ada").progress.is_empty());
}

#[test]
fn test_unlock_chain_both_directions() {
    let engine = Engine::builtin();
    let store = engine.store();
    assert_eq!(store.status("ada", "level-1-1"), LevelStatus::Unlocked);
    assert_eq!(store.status("ada", "level-1-2"), LevelStatus::Locked);
    // First level of every chapter is open
    assert_eq!(store.status("ada", "level-2-1"), LevelStatus::Unlocked);
    assert_eq!(store.status("ada", "level-2-2"), LevelStatus::Locked);

    // Zero stars does not clear a level
    engine.complete_level("ada", "level-1-1", completion(0, 12)).unwrap();
    assert_eq!(store.status("ada", "level-1-2"), LevelStatus::Locked);

    engine.complete_level("ada", "level-1-1", completion(1, 8)).unwrap();
    assert_eq!(store.status("ada", "level-1-1"), LevelStatus::Completed);
    assert_eq!(store.status("ada", "level-1-2"), LevelStatus::Unlocked);
    assert_eq!(store.status("ada", "level-1-3"), LevelStatus::Locked);
}

#[test]
fn test_sandbox_follows_cleared_levels() {
    let engine = Engine::builtin();
    let program = parse_program("move\n").unwrap();
    assert_eq!(
        engine.sandbox_run("ada", "level-1-1", &program),
        Err(EngineError::SandboxLocked)
    );

    engine.complete_level("ada", "level-1-1", completion(0, 3)).unwrap();
    assert!(!engine.profile("ada").sandbox_unlocked);

    engine.complete_level("ada", "level-1-1", completion(1, 8)).unwrap();
    assert!(engine.profile("ada").sandbox_unlocked);
    let result = engine.sandbox_run("ada", "level-1-1", &program).unwrap();
    assert_eq!(result.steps, 1);
    // Sandbox runs never touch progress
    assert_eq!(engine.profile("ada").progress["level-1-1"].stars, 1);

    engine.reset("ada").unwrap();
    assert!(!engine.profile("ada").sandbox_unlocked);
}

#[test]
fn test_badges_recomputed_and_sorted() {
    let engine = Engine::builtin();
    engine.complete_level("ada", "level-1-1", completion(1, 8)).unwrap();
    let badges: Vec<String> = engine.profile("ada").achievements.badges.into_iter().collect();
    assert_eq!(badges, vec![BADGE_FIRST_CLEAR.to_string()]);

    for level in ALL_LEVELS {
        engine.complete_level("ada", level, completion(3, 1)).unwrap();
    }
    let profile = engine.profile("ada");
    let badges: Vec<&str> = profile.achievements.badges.iter().map(String::as_str).collect();
    assert_eq!(
        badges,
        vec![
            BADGE_CHAPTER_MASTER,
            BADGE_FIRST_CLEAR,
            BADGE_PERFECTIONIST,
            BADGE_TRAVELER
        ]
    );
    assert_eq!(profile.achievements.compendium.len(), 5);
    assert!(profile.achievements.compendium.contains("level-2-2-3star"));
}

/// One chapter of `count` single-tile levels named `t1`, `t2`, ...
fn long_course(count: usize) -> LevelCatalog {
    let ids: Vec<String> = (1..=count).map(|i| format!("\"t{i}\"")).collect();
    let levels: Vec<String> = (1..=count)
        .map(|i| {
            format!(
                r#"{{"id": "t{i}", "name": "T{i}", "width": 1, "height": 1, "tiles": [],
                    "start": {{"x": 0, "y": 0, "facing": "north"}}, "goal": {{}}, "bestSteps": 1}}"#
            )
        })
        .collect();
    let source = format!(
        r#"{{"chapters": [{{"id": "long", "title": "Long", "order": 1, "levelIds": [{}]}}],
            "levels": [{}]}}"#,
        ids.join(", "),
        levels.join(", ")
    );
    LevelCatalog::from_json_str(&source).unwrap()
}

#[test]
fn test_traveler_and_star_collector_thresholds() {
    let engine = Engine::new(long_course(10), EngineConfig::default());
    let badges = |engine: &Engine| engine.profile("ada").achievements.badges;

    for level in ["t1", "t2", "t3", "t4"] {
        engine.complete_level("ada", level, completion(3, 1)).unwrap();
    }
    assert!(!badges(&engine).contains(BADGE_TRAVELER));

    engine.complete_level("ada", "t5", completion(1, 3)).unwrap();
    assert!(badges(&engine).contains(BADGE_TRAVELER));

    for level in ["t6", "t7", "t8", "t9", "t10"] {
        engine.complete_level("ada", level, completion(3, 1)).unwrap();
    }
    engine.complete_level("ada", "t5", completion(2, 2)).unwrap();
    // 9 perfect levels and one on 2 stars make 29
    let total: u32 = engine
        .profile("ada")
        .progress
        .values()
        .map(|record| u32::from(record.stars))
        .sum();
    assert_eq!(total, 29);
    assert!(badges(&engine).contains(BADGE_CHAPTER_MASTER));
    assert!(!badges(&engine).contains(BADGE_STAR_COLLECTOR));

    engine.complete_level("ada", "t5", completion(3, 1)).unwrap();
    let all: Vec<String> = badges(&engine).into_iter().collect();
    assert_eq!(
        all,
        vec![
            BADGE_CHAPTER_MASTER,
            BADGE_FIRST_CLEAR,
            BADGE_PERFECTIONIST,
            BADGE_STAR_COLLECTOR,
            BADGE_TRAVELER
        ]
    );
}

#[test]
fn test_replay_log_follows_latest_completion() {
    let engine = Engine::builtin();
    let wiggle_late = parse_program("move\nmove\nturn left\nturn right\nmove\nmove\n").unwrap();
    let wiggle_early = parse_program("turn right\nturn left\nmove\nmove\nmove\nmove\n").unwrap();
    let first = engine.run_program("ada", "level-1-1", &wiggle_late).unwrap();
    let second = engine.run_program("ada", "level-1-1", &wiggle_early).unwrap();
    assert_eq!((first.steps, second.steps), (6, 6));
    assert_ne!(first.log, second.log);

    engine
        .complete_level("ada", "level-1-1", CompleteRequest::from_result(&first))
        .unwrap();
    let record = engine
        .complete_level("ada", "level-1-1", CompleteRequest::from_result(&second))
        .unwrap();
    assert_eq!(record.replay_log, second.log);

    // A slower run still replaces the replay but not the best steps
    engine.complete_level("ada", "level-1-1", completion(3, 4)).unwrap();
    let record = engine.complete_level("ada", "level-1-1", completion(1, 8)).unwrap();
    assert_eq!(record.steps, 4);
    assert!(record.replay_log.is_empty());
}

#[test]
fn test_outfit_unlocks_at_reward_threshold() {
    let engine = Engine::builtin();
    engine.complete_level("ada", "level-1-1", completion(2, 6)).unwrap();
    assert!(!engine.profile("ada").avatar.unlocked.contains("explorer-boots"));
    assert_eq!(
        engine.equip_outfit("ada", "explorer-boots"),
        Err(EngineError::Progress(ProgressError::OutfitLocked(
            "explorer-boots".to_string()
        )))
    );

    engine.complete_level("ada", "level-1-1", completion(3, 4)).unwrap();
    engine.complete_level("ada", "level-1-1", completion(3, 4)).unwrap();
    let avatar = engine.equip_outfit("ada", "explorer-boots").unwrap();
    assert_eq!(avatar.equipped, "explorer-boots");
    assert_eq!(avatar.unlocked.len(), 2);
}

#[test]
fn test_settings_merge_and_survive_reset() {
    let engine = Engine::builtin();
    let settings = engine
        .update_settings(
            "ada",
            SettingsPatch {
                language: Some("en-US".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(settings.language, "en-US");
    assert_eq!(settings.volume, 0.8);

    engine.complete_level("ada", "level-1-1", completion(3, 4)).unwrap();
    engine.equip_outfit("ada", "explorer-boots").unwrap();
    engine.reset("ada").unwrap();

    let profile = engine.profile("ada");
    assert!(profile.progress.is_empty());
    assert!(profile.achievements.badges.is_empty());
    assert_eq!(profile.avatar.equipped, "starter-cape");
    assert_eq!(profile.settings.language, "en-US");
}

#[test]
fn test_students_are_independent() {
    let engine = Engine::builtin();
    engine.complete_level("ada", "level-1-1", completion(3, 4)).unwrap();
    assert!(engine.profile("grace").progress.is_empty());
    assert_eq!(engine.store().status("grace", "level-1-2"), LevelStatus::Locked);
}

#[test]
fn test_concurrent_completions_are_all_recorded() {
    let engine = Arc::new(Engine::new(LevelCatalog::builtin(), EngineConfig::default()));
    std::thread::scope(|scope| {
        for level in ALL_LEVELS {
            let engine = Arc::clone(&engine);
            scope.spawn(move || {
                for stars in 1..=3 {
                    engine
                        .complete_level("ada", level, completion(stars, 10 - u32::from(stars)))
                        .unwrap();
                }
            });
        }
    });

    let profile = engine.profile("ada");
    assert_eq!(profile.progress.len(), 5);
    assert!(profile.progress.values().all(|record| record.stars == 3));
    assert!(profile.achievements.badges.contains(BADGE_CHAPTER_MASTER));
    assert!(profile.sandbox_unlocked);
}
