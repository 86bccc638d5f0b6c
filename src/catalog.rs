//! Level catalog: courses, chapters and level definitions.
//!
//! The catalog is built once (from the bundled JSON or a file) and shared read-only.
//! Construction precomputes an index from level id to its chapter and position so
//! unlock checks and lookups never rescan the course structure.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::{fs, io};
use thiserror::Error;

#[cfg(feature = "builtin-catalog")]
pub const BUILTIN_CATALOG: &str = include_str!("data/catalog.json");

/// Cardinal facing; turning cycles north -> east -> south -> west
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    North,
    East,
    South,
    West,
}

impl Facing {
    const CYCLE: [Facing; 4] = [Facing::North, Facing::East, Facing::South, Facing::West];

    fn cycle_index(self) -> usize {
        match self {
            Facing::North => 0,
            Facing::East => 1,
            Facing::South => 2,
            Facing::West => 3,
        }
    }

    pub fn turned_right(self) -> Facing {
        Self::CYCLE[(self.cycle_index() + 1) % 4]
    }

    pub fn turned_left(self) -> Facing {
        Self::CYCLE[(self.cycle_index() + 3) % 4]
    }

    /// Grid delta for one step forward; y grows southward
    pub fn delta(self) -> (i32, i32) {
        match self {
            Facing::North => (0, -1),
            Facing::East => (1, 0),
            Facing::South => (0, 1),
            Facing::West => (-1, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub facing: Facing,
}

impl Position {
    pub fn new(x: i32, y: i32, facing: Facing) -> Self {
        Position { x, y, facing }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// The point one step ahead in the current facing
    pub fn ahead(&self) -> Point {
        let (dx, dy) = self.facing.delta();
        Point::new(self.x + dx, self.y + dy)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub x: i32,
    pub y: i32,
    pub walkable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collectible: Option<String>,
}

/// Success conditions; every clause that is present must hold
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelGoal {
    #[serde(default, alias = "collectibles", skip_serializing_if = "Option::is_none")]
    pub collectibles_required: Option<u32>,
    #[serde(default, alias = "reach", skip_serializing_if = "Option::is_none")]
    pub reach_target: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelRewards {
    #[serde(default, alias = "outfit")]
    pub outfit_id: Option<String>,
    #[serde(alias = "stars")]
    pub stars_required: u8,
}

impl Default for LevelRewards {
    fn default() -> Self {
        LevelRewards {
            outfit_id: None,
            stars_required: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDefinition {
    pub id: String,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub tiles: Vec<Tile>,
    pub start: Position,
    #[serde(default)]
    pub goal: LevelGoal,
    pub best_steps: u32,
    #[serde(default)]
    pub hints: Vec<String>,
    #[serde(default, alias = "allowedInstructionKinds")]
    pub allowed_blocks: BTreeSet<String>,
    #[serde(default)]
    pub comic: String,
    #[serde(default)]
    pub rewards: LevelRewards,
}

impl LevelDefinition {
    pub fn in_bounds(&self, point: Point) -> bool {
        point.x >= 0 && point.y >= 0 && (point.x as u32) < self.width && (point.y as u32) < self.height
    }

    /// Number of collectibles placed on the grid at the start of a run
    pub fn collectible_count(&self) -> u32 {
        self.tiles
            .iter()
            .filter(|tile| tile.collectible.is_some())
            .count() as u32
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterDefinition {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub order: i32,
    pub level_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub chapter_ids: Vec<String>,
}

/// On-disk catalog shape
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSource {
    #[serde(default)]
    pub courses: Vec<CourseDefinition>,
    pub chapters: Vec<ChapterDefinition>,
    pub levels: Vec<LevelDefinition>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate level id '{0}'")]
    DuplicateLevel(String),
    #[error("duplicate chapter id '{0}'")]
    DuplicateChapter(String),
    #[error("chapter '{chapter}' references unknown level '{level}'")]
    UnknownLevel { chapter: String, level: String },
    #[error("course '{course}' references unknown chapter '{chapter}'")]
    UnknownChapter { course: String, chapter: String },
    #[error("invalid level '{id}': {reason}")]
    InvalidLevel { id: String, reason: String },
}

/// Where a level sits in the course structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelSlot {
    /// Index into [`LevelCatalog::chapters`]
    pub chapter: usize,
    /// Position within the chapter
    pub index: usize,
}

/// Immutable, indexed level catalog
#[derive(Debug, Clone)]
pub struct LevelCatalog {
    courses: Vec<CourseDefinition>,
    chapters: Vec<ChapterDefinition>,
    levels: HashMap<String, LevelDefinition>,
    slots: HashMap<String, LevelSlot>,
}

impl LevelCatalog {
    #[cfg(feature = "builtin-catalog")]
    pub fn builtin() -> Self {
        LevelCatalog::from_json_str(BUILTIN_CATALOG).expect("builtin catalog should be valid")
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let source: CatalogSource = serde_json::from_str(json)?;
        LevelCatalog::from_source(source)
    }

    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        LevelCatalog::from_json_str(&contents)
    }

    /// Build the index, checking that every reference resolves exactly once
    pub fn from_source(source: CatalogSource) -> Result<Self, CatalogError> {
        let mut levels = HashMap::with_capacity(source.levels.len());
        for level in source.levels {
            if level.width == 0 || level.height == 0 {
                return Err(CatalogError::InvalidLevel {
                    id: level.id,
                    reason: "grid must be at least 1x1".to_string(),
                });
            }
            if levels.contains_key(&level.id) {
                return Err(CatalogError::DuplicateLevel(level.id));
            }
            levels.insert(level.id.clone(), level);
        }

        let mut chapter_ids = BTreeSet::new();
        for chapter in &source.chapters {
            if !chapter_ids.insert(chapter.id.as_str()) {
                return Err(CatalogError::DuplicateChapter(chapter.id.clone()));
            }
        }

        // Courses fix which chapters are playable and in which course they appear;
        // without courses, every chapter belongs to one implicit course.
        let mut courses = source.courses;
        if courses.is_empty() {
            courses.push(CourseDefinition {
                id: "default".to_string(),
                name: "Default course".to_string(),
                description: String::new(),
                chapter_ids: source.chapters.iter().map(|c| c.id.clone()).collect(),
            });
        }

        let by_id: HashMap<&str, &ChapterDefinition> =
            source.chapters.iter().map(|c| (c.id.as_str(), c)).collect();
        let mut ordered: Vec<ChapterDefinition> = Vec::new();
        for course in &courses {
            let mut course_chapters = Vec::with_capacity(course.chapter_ids.len());
            for chapter_id in &course.chapter_ids {
                let chapter = by_id.get(chapter_id.as_str()).ok_or_else(|| {
                    CatalogError::UnknownChapter {
                        course: course.id.clone(),
                        chapter: chapter_id.clone(),
                    }
                })?;
                course_chapters.push((*chapter).clone());
            }
            course_chapters.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
            ordered.extend(course_chapters);
        }

        let mut slots = HashMap::with_capacity(levels.len());
        for (chapter_index, chapter) in ordered.iter().enumerate() {
            for (index, level_id) in chapter.level_ids.iter().enumerate() {
                if !levels.contains_key(level_id) {
                    return Err(CatalogError::UnknownLevel {
                        chapter: chapter.id.clone(),
                        level: level_id.clone(),
                    });
                }
                let slot = LevelSlot {
                    chapter: chapter_index,
                    index,
                };
                if slots.insert(level_id.clone(), slot).is_some() {
                    return Err(CatalogError::InvalidLevel {
                        id: level_id.clone(),
                        reason: "level appears in more than one chapter".to_string(),
                    });
                }
            }
        }

        if let Some(orphan) = levels.keys().find(|id| !slots.contains_key(*id)) {
            return Err(CatalogError::InvalidLevel {
                id: orphan.clone(),
                reason: "level is not part of any chapter".to_string(),
            });
        }

        Ok(LevelCatalog {
            courses,
            chapters: ordered,
            levels,
            slots,
        })
    }

    pub fn level(&self, id: &str) -> Option<&LevelDefinition> {
        self.levels.get(id)
    }

    pub fn slot(&self, id: &str) -> Option<LevelSlot> {
        self.slots.get(id).copied()
    }

    pub fn courses(&self) -> &[CourseDefinition] {
        &self.courses
    }

    /// Chapters in play order
    pub fn chapters(&self) -> &[ChapterDefinition] {
        &self.chapters
    }

    pub fn chapter_of(&self, level_id: &str) -> Option<&ChapterDefinition> {
        self.slot(level_id).map(|slot| &self.chapters[slot.chapter])
    }

    /// The level that must be cleared before `level_id` unlocks, if any
    pub fn predecessor(&self, level_id: &str) -> Option<&str> {
        let slot = self.slot(level_id)?;
        if slot.index == 0 {
            return None;
        }
        self.chapters[slot.chapter]
            .level_ids
            .get(slot.index - 1)
            .map(String::as_str)
    }

    /// Every level in play order
    pub fn levels_in_order(&self) -> impl Iterator<Item = &LevelDefinition> {
        self.chapters
            .iter()
            .flat_map(|chapter| chapter.level_ids.iter())
            .filter_map(|id| self.levels.get(id))
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn level(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": id,
            "width": 2,
            "height": 1,
            "tiles": [{"x": 0, "y": 0, "walkable": true}, {"x": 1, "y": 0, "walkable": true}],
            "start": {"x": 0, "y": 0, "facing": "east"},
            "goal": {"reach": {"x": 1, "y": 0}},
            "bestSteps": 1
        })
    }

    #[test]
    fn test_facing_cycle() {
        assert_eq!(Facing::North.turned_right(), Facing::East);
        assert_eq!(Facing::West.turned_right(), Facing::North);
        assert_eq!(Facing::North.turned_left(), Facing::West);
        assert_eq!(Facing::East.turned_left().turned_right(), Facing::East);
    }

    #[test]
    fn test_chapters_sorted_by_order() {
        let source = json!({
            "chapters": [
                {"id": "b", "title": "B", "order": 2, "levelIds": ["l2"]},
                {"id": "a", "title": "A", "order": 1, "levelIds": ["l1"]}
            ],
            "levels": [level("l1"), level("l2")]
        });
        let catalog = LevelCatalog::from_json_str(&source.to_string()).unwrap();
        let ids: Vec<_> = catalog.chapters().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(catalog.slot("l2"), Some(LevelSlot { chapter: 1, index: 0 }));
    }

    #[test]
    fn test_predecessor() {
        let source = json!({
            "chapters": [{"id": "a", "title": "A", "order": 1, "levelIds": ["l1", "l2"]}],
            "levels": [level("l1"), level("l2")]
        });
        let catalog = LevelCatalog::from_json_str(&source.to_string()).unwrap();
        assert_eq!(catalog.predecessor("l1"), None);
        assert_eq!(catalog.predecessor("l2"), Some("l1"));
        assert_eq!(catalog.predecessor("missing"), None);
    }

    #[test]
    fn test_unknown_level_rejected() {
        let source = json!({
            "chapters": [{"id": "a", "title": "A", "levelIds": ["l1", "ghost"]}],
            "levels": [level("l1")]
        });
        let result = LevelCatalog::from_json_str(&source.to_string());
        assert!(matches!(result, Err(CatalogError::UnknownLevel { .. })));
    }

    #[test]
    fn test_duplicate_level_rejected() {
        let source = json!({
            "chapters": [{"id": "a", "title": "A", "levelIds": ["l1"]}],
            "levels": [level("l1"), level("l1")]
        });
        let result = LevelCatalog::from_json_str(&source.to_string());
        assert!(matches!(result, Err(CatalogError::DuplicateLevel(id)) if id == "l1"));
    }

    #[test]
    fn test_orphan_level_rejected() {
        let source = json!({
            "chapters": [{"id": "a", "title": "A", "levelIds": ["l1"]}],
            "levels": [level("l1"), level("l2")]
        });
        let result = LevelCatalog::from_json_str(&source.to_string());
        assert!(matches!(result, Err(CatalogError::InvalidLevel { id, .. }) if id == "l2"));
    }

    #[test]
    fn test_original_field_aliases() {
        let mut value = level("l1");
        value["rewards"] = json!({"stars": 2, "outfit": "boots"});
        value["allowedBlocks"] = json!(["MOVE"]);
        let parsed: LevelDefinition = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.rewards.stars_required, 2);
        assert_eq!(parsed.rewards.outfit_id.as_deref(), Some("boots"));
        assert_eq!(parsed.goal.reach_target, Some(Point::new(1, 0)));
        assert!(parsed.allowed_blocks.contains("MOVE"));
    }

    #[cfg(feature = "builtin-catalog")]
    #[test]
    fn test_builtin_catalog_parses() {
        let catalog = LevelCatalog::builtin();
        assert!(catalog.level("level-1-1").is_some());
        assert!(catalog.level("level-1-3").is_some());
        assert_eq!(catalog.levels_in_order().count(), catalog.level_count());
    }
}
