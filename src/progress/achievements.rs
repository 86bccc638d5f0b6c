//! Derived profile state: badges, compendium and sandbox access.
//!
//! Everything here is rebuilt from `profile.progress` on every mutation; nothing is
//! updated incrementally, so a reset or a merged record can never leave stale badges.

use super::profile::{Achievements, StudentProfile};
use crate::catalog::LevelCatalog;

pub const BADGE_FIRST_CLEAR: &str = "first-clear";
pub const BADGE_TRAVELER: &str = "traveler";
pub const BADGE_PERFECTIONIST: &str = "perfectionist";
pub const BADGE_CHAPTER_MASTER: &str = "chapter-master";
pub const BADGE_STAR_COLLECTOR: &str = "star-collector";

const TRAVELER_LEVELS: usize = 5;
const PERFECTIONIST_LEVELS: usize = 3;
const STAR_COLLECTOR_STARS: u32 = 30;

/// Aggregate counts over the catalog's levels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressTotals {
    pub completed_levels: usize,
    pub perfect_levels: usize,
    pub total_stars: u32,
    pub catalog_levels: usize,
}

pub fn totals(profile: &StudentProfile, catalog: &LevelCatalog) -> ProgressTotals {
    let mut totals = ProgressTotals {
        catalog_levels: catalog.level_count(),
        ..Default::default()
    };
    for level in catalog.levels_in_order() {
        let stars = profile.stars_for(&level.id);
        if stars > 0 {
            totals.completed_levels += 1;
        }
        if stars == 3 {
            totals.perfect_levels += 1;
        }
        totals.total_stars += u32::from(stars);
    }
    totals
}

/// Rebuild badges, compendium and `sandbox_unlocked` from scratch
pub fn recompute_derived_state(profile: &mut StudentProfile, catalog: &LevelCatalog) {
    let totals = totals(profile, catalog);

    let mut achievements = Achievements::default();
    if totals.completed_levels >= 1 {
        achievements.badges.insert(BADGE_FIRST_CLEAR.to_string());
    }
    if totals.completed_levels >= TRAVELER_LEVELS {
        achievements.badges.insert(BADGE_TRAVELER.to_string());
    }
    if totals.perfect_levels >= PERFECTIONIST_LEVELS {
        achievements.badges.insert(BADGE_PERFECTIONIST.to_string());
    }
    if totals.catalog_levels > 0 && totals.completed_levels == totals.catalog_levels {
        achievements.badges.insert(BADGE_CHAPTER_MASTER.to_string());
    }
    if totals.total_stars >= STAR_COLLECTOR_STARS {
        achievements.badges.insert(BADGE_STAR_COLLECTOR.to_string());
    }

    for level in catalog.levels_in_order() {
        if profile.stars_for(&level.id) == 3 {
            achievements.compendium.insert(format!("{}-3star", level.id));
        }
    }

    profile.achievements = achievements;
    profile.sandbox_unlocked = totals.completed_levels > 0;
}
