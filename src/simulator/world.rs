use crate::catalog::{LevelDefinition, Point, Position};
use std::collections::{HashMap, HashSet};

/// What the simulator needs to know about one grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Cell<'a> {
    pub walkable: bool,
    pub collectible: Option<&'a str>,
}

/// Point-indexed view of a level's tiles.
///
/// A point is walkable if any tile placed there is walkable; the first tile
/// listed at a point decides its collectible.
#[derive(Debug, Clone)]
pub(crate) struct Grid<'a> {
    level: &'a LevelDefinition,
    cells: HashMap<Point, Cell<'a>>,
}

impl<'a> Grid<'a> {
    pub fn new(level: &'a LevelDefinition) -> Self {
        let mut cells: HashMap<Point, Cell<'a>> = HashMap::with_capacity(level.tiles.len());
        for tile in &level.tiles {
            let cell = cells.entry(Point::new(tile.x, tile.y)).or_insert(Cell {
                walkable: false,
                collectible: tile.collectible.as_deref(),
            });
            cell.walkable |= tile.walkable;
        }
        Grid { level, cells }
    }

    pub fn is_walkable(&self, point: Point) -> bool {
        self.level.in_bounds(point) && self.cells.get(&point).is_some_and(|cell| cell.walkable)
    }

    pub fn collectible_at(&self, point: Point) -> Option<&'a str> {
        self.cells.get(&point).and_then(|cell| cell.collectible)
    }
}

/// Mutable state of a single run; never shared between runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldState {
    pub position: Position,
    pub steps_taken: u32,
    pub remaining_collectibles: u32,
    /// `x:y:type` keys of collectibles already picked up
    pub visited_collectibles: HashSet<String>,
}

impl WorldState {
    pub fn new(level: &LevelDefinition) -> Self {
        WorldState {
            position: level.start,
            steps_taken: 0,
            remaining_collectibles: level.collectible_count(),
            visited_collectibles: HashSet::new(),
        }
    }

    /// Record a pickup; returns false when this collectible was already taken
    pub fn collect(&mut self, point: Point, kind: &str) -> bool {
        let key = format!("{}:{}:{}", point.x, point.y, kind);
        if !self.visited_collectibles.insert(key) {
            return false;
        }
        self.remaining_collectibles = self.remaining_collectibles.saturating_sub(1);
        true
    }
}
