/// Read-only projections of a profile against the catalog (map, level detail, prep)
use super::profile::{Achievements, Avatar, StudentLevelProgress, StudentProfile, StudentSettings};
use crate::catalog::{LevelCatalog, LevelDefinition, LevelGoal, LevelRewards, Position, Tile};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelStatus {
    Locked,
    Unlocked,
    Completed,
}

/// Whether the student may play `level_id`.
///
/// The first level of a chapter is always open; any other level opens once its
/// predecessor in the chapter has at least one star.
pub fn is_unlocked(catalog: &LevelCatalog, profile: &StudentProfile, level_id: &str) -> bool {
    match catalog.predecessor(level_id) {
        Some(previous) => profile.has_cleared(previous),
        None => catalog.slot(level_id).is_some(),
    }
}

pub fn level_status(
    catalog: &LevelCatalog,
    profile: &StudentProfile,
    level_id: &str,
    unlock_all: bool,
) -> LevelStatus {
    if profile.has_cleared(level_id) {
        LevelStatus::Completed
    } else if unlock_all || is_unlocked(catalog, profile, level_id) {
        LevelStatus::Unlocked
    } else {
        LevelStatus::Locked
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelSummary {
    pub id: String,
    pub name: String,
    pub status: LevelStatus,
    pub stars: u8,
    pub best_difference: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterView {
    pub id: String,
    pub title: String,
    pub levels: Vec<LevelSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapView {
    pub chapters: Vec<ChapterView>,
}

pub fn map_view(catalog: &LevelCatalog, profile: &StudentProfile, unlock_all: bool) -> MapView {
    let chapters = catalog
        .chapters()
        .iter()
        .map(|chapter| ChapterView {
            id: chapter.id.clone(),
            title: chapter.title.clone(),
            levels: chapter
                .level_ids
                .iter()
                .filter_map(|id| catalog.level(id))
                .map(|level| {
                    let record = profile.progress.get(&level.id);
                    LevelSummary {
                        id: level.id.clone(),
                        name: level.name.clone(),
                        status: level_status(catalog, profile, &level.id, unlock_all),
                        stars: record.map_or(0, |r| r.stars),
                        best_difference: record.and_then(|r| r.best_difference),
                    }
                })
                .collect(),
        })
        .collect();
    MapView { chapters }
}

/// Everything a client needs to render a playable level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDetail {
    pub id: String,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub tiles: Vec<Tile>,
    pub start: Position,
    pub goal: LevelGoal,
    pub best_steps: u32,
    pub hints: Vec<String>,
    pub allowed_blocks: BTreeSet<String>,
    pub comic: String,
    pub rewards: LevelRewards,
    pub chapter_id: String,
    pub status: LevelStatus,
    pub progress: Option<StudentLevelProgress>,
}

impl LevelDetail {
    pub fn new(
        level: &LevelDefinition,
        chapter_id: &str,
        status: LevelStatus,
        progress: Option<StudentLevelProgress>,
    ) -> Self {
        LevelDetail {
            id: level.id.clone(),
            name: level.name.clone(),
            width: level.width,
            height: level.height,
            tiles: level.tiles.clone(),
            start: level.start,
            goal: level.goal.clone(),
            best_steps: level.best_steps,
            hints: level.hints.clone(),
            allowed_blocks: level.allowed_blocks.clone(),
            comic: level.comic.clone(),
            rewards: level.rewards.clone(),
            chapter_id: chapter_id.to_string(),
            status,
            progress,
        }
    }
}

/// Briefing shown before a level starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelPrep {
    pub level_id: String,
    pub victory_condition: LevelGoal,
    pub allowed_blocks: BTreeSet<String>,
    pub comic: String,
    pub rewards: LevelRewards,
}

pub fn level_prep(level: &LevelDefinition) -> LevelPrep {
    LevelPrep {
        level_id: level.id.clone(),
        victory_condition: level.goal.clone(),
        allowed_blocks: level.allowed_blocks.clone(),
        comic: level.comic.clone(),
        rewards: level.rewards.clone(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub id: String,
    pub settings: StudentSettings,
    pub avatar: Avatar,
    pub sandbox_unlocked: bool,
    pub achievements: Achievements,
}

pub fn profile_summary(profile: &StudentProfile) -> ProfileSummary {
    ProfileSummary {
        id: profile.id.clone(),
        settings: profile.settings.clone(),
        avatar: profile.avatar.clone(),
        sandbox_unlocked: profile.sandbox_unlocked,
        achievements: profile.achievements.clone(),
    }
}
