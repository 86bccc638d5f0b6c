/// Progress module - student profiles, completion merging and derived state
mod achievements;
mod profile;
mod store;
mod views;

pub use achievements::{
    recompute_derived_state, totals, ProgressTotals, BADGE_CHAPTER_MASTER, BADGE_FIRST_CLEAR,
    BADGE_PERFECTIONIST, BADGE_STAR_COLLECTOR, BADGE_TRAVELER,
};
pub use profile::{
    Achievements, Avatar, CompleteRequest, SettingsPatch, StudentLevelProgress, StudentProfile,
    StudentSettings,
};
pub use store::{merge_progress, ProgressStore};
pub use views::{
    is_unlocked, level_prep, level_status, map_view, profile_summary, ChapterView, LevelDetail,
    LevelPrep, LevelStatus, LevelSummary, MapView, ProfileSummary,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgressError {
    #[error("level `{0}` does not exist")]
    LevelNotFound(String),
    #[error("level `{0}` is locked")]
    LevelLocked(String),
    #[error("outfit `{0}` has not been unlocked")]
    OutfitLocked(String),
    #[error("invalid completion: {0}")]
    InvalidCompletion(String),
}
