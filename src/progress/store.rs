use super::achievements::recompute_derived_state;
use super::profile::{
    Avatar, CompleteRequest, SettingsPatch, StudentLevelProgress, StudentProfile, StudentSettings,
};
use super::views::{self, LevelDetail, LevelStatus, MapView, ProfileSummary};
use super::ProgressError;
use crate::catalog::{LevelCatalog, LevelDefinition};
use crate::config::EngineConfig;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

/// Per-student progress behind one coarse readers-writer lock.
///
/// Reads (profile, map, level views) share the lock. Every mutation holds the
/// write lock for its whole read-modify-write, derived-state recompute included,
/// and is applied to a copy that only replaces the stored profile on success.
pub struct ProgressStore {
    catalog: Arc<LevelCatalog>,
    starter_outfit: String,
    default_settings: StudentSettings,
    unlock_all_levels: bool,
    profiles: RwLock<HashMap<String, StudentProfile>>,
}

impl ProgressStore {
    pub fn new(catalog: Arc<LevelCatalog>, config: &EngineConfig) -> Self {
        ProgressStore {
            catalog,
            starter_outfit: config.starter_outfit.clone(),
            default_settings: config.default_settings.clone(),
            unlock_all_levels: config.unlock_all_levels,
            profiles: RwLock::new(HashMap::new()),
        }
    }

    pub fn catalog(&self) -> &LevelCatalog {
        &self.catalog
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, StudentProfile>> {
        self.profiles.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, StudentProfile>> {
        self.profiles.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn fresh_profile(&self, student_id: &str) -> StudentProfile {
        StudentProfile::new(student_id, &self.starter_outfit, self.default_settings.clone())
    }

    /// Run `f` against the student's profile, creating it on first access
    pub fn with_profile<R>(&self, student_id: &str, f: impl FnOnce(&StudentProfile) -> R) -> R {
        {
            let profiles = self.read();
            if let Some(profile) = profiles.get(student_id) {
                return f(profile);
            }
        }
        let mut profiles = self.write();
        let profile = profiles
            .entry(student_id.to_string())
            .or_insert_with(|| self.fresh_profile(student_id));
        f(profile)
    }

    pub fn profile(&self, student_id: &str) -> StudentProfile {
        self.with_profile(student_id, StudentProfile::clone)
    }

    /// Store a profile loaded from durable storage, replacing any cached copy.
    ///
    /// Derived state is recomputed against this catalog before the profile is stored.
    pub fn insert(&self, mut profile: StudentProfile) {
        recompute_derived_state(&mut profile, &self.catalog);
        self.write().insert(profile.id.clone(), profile);
    }

    /// Apply `f` to a copy of the profile and commit it (with derived state) on success
    fn mutate<R>(
        &self,
        student_id: &str,
        f: impl FnOnce(&mut StudentProfile) -> Result<R, ProgressError>,
    ) -> Result<R, ProgressError> {
        let mut profiles = self.write();
        let mut profile = match profiles.get(student_id) {
            Some(profile) => profile.clone(),
            None => self.fresh_profile(student_id),
        };
        let output = f(&mut profile)?;
        recompute_derived_state(&mut profile, &self.catalog);
        profiles.insert(student_id.to_string(), profile);
        Ok(output)
    }

    fn level(&self, level_id: &str) -> Result<&LevelDefinition, ProgressError> {
        self.catalog
            .level(level_id)
            .ok_or_else(|| ProgressError::LevelNotFound(level_id.to_string()))
    }

    /// Merge a completion into the student's record for `level_id`.
    ///
    /// Stars never decrease and hints and duration accumulate. Steps and best difference
    /// are only replaced by a starred run with strictly fewer steps, while the replay log
    /// is always the latest run's. Meeting the level's reward threshold unlocks its outfit.
    pub fn complete(
        &self,
        student_id: &str,
        level_id: &str,
        request: CompleteRequest,
    ) -> Result<StudentLevelProgress, ProgressError> {
        let level = self.level(level_id)?;
        if request.stars > 3 {
            return Err(ProgressError::InvalidCompletion(format!(
                "stars must be between 0 and 3, got {}",
                request.stars
            )));
        }
        let now = now_epoch_ms();

        self.mutate(student_id, |profile| {
            let merged = merge_progress(profile.progress.remove(level_id), request, level, now);

            if merged.stars >= level.rewards.stars_required {
                if let Some(outfit) = &level.rewards.outfit_id {
                    if profile.avatar.unlocked.insert(outfit.clone()) {
                        info!(student_id, level_id, outfit = %outfit, "outfit unlocked");
                    }
                }
            }

            info!(
                student_id,
                level_id,
                stars = merged.stars,
                steps = merged.steps,
                "level completed"
            );
            profile.progress.insert(level_id.to_string(), merged.clone());
            Ok(merged)
        })
    }

    pub fn equip_outfit(&self, student_id: &str, outfit: &str) -> Result<Avatar, ProgressError> {
        self.mutate(student_id, |profile| {
            if !profile.avatar.unlocked.contains(outfit) {
                return Err(ProgressError::OutfitLocked(outfit.to_string()));
            }
            profile.avatar.equipped = outfit.to_string();
            Ok(profile.avatar.clone())
        })
    }

    pub fn update_settings(
        &self,
        student_id: &str,
        patch: SettingsPatch,
    ) -> Result<StudentSettings, ProgressError> {
        self.mutate(student_id, |profile| {
            profile.settings.apply(patch);
            Ok(profile.settings.clone())
        })
    }

    /// Clear progress, achievements and avatar back to a new profile; settings survive
    pub fn reset(&self, student_id: &str) -> Result<(), ProgressError> {
        self.mutate(student_id, |profile| {
            let settings = std::mem::take(&mut profile.settings);
            *profile = self.fresh_profile(student_id);
            profile.settings = settings;
            info!(student_id, "profile reset");
            Ok(())
        })
    }

    pub fn map(&self, student_id: &str) -> MapView {
        self.with_profile(student_id, |profile| {
            views::map_view(&self.catalog, profile, self.unlock_all_levels)
        })
    }

    pub fn status(&self, student_id: &str, level_id: &str) -> LevelStatus {
        self.with_profile(student_id, |profile| {
            views::level_status(&self.catalog, profile, level_id, self.unlock_all_levels)
        })
    }

    /// Full level data for the student; locked levels are refused
    pub fn level_detail(
        &self,
        student_id: &str,
        level_id: &str,
    ) -> Result<LevelDetail, ProgressError> {
        let level = self.level(level_id)?;
        let chapter_id = self
            .catalog
            .chapter_of(level_id)
            .map(|chapter| chapter.id.clone())
            .unwrap_or_default();
        self.with_profile(student_id, |profile| {
            let status = views::level_status(&self.catalog, profile, level_id, self.unlock_all_levels);
            if status == LevelStatus::Locked {
                return Err(ProgressError::LevelLocked(level_id.to_string()));
            }
            Ok(LevelDetail::new(
                level,
                &chapter_id,
                status,
                profile.progress.get(level_id).cloned(),
            ))
        })
    }

    pub fn summary(&self, student_id: &str) -> ProfileSummary {
        self.with_profile(student_id, views::profile_summary)
    }

    pub fn sandbox_unlocked(&self, student_id: &str) -> bool {
        self.with_profile(student_id, |profile| profile.sandbox_unlocked)
    }
}

/// Monotonic-best merge of a completion into an existing record
pub fn merge_progress(
    existing: Option<StudentLevelProgress>,
    request: CompleteRequest,
    level: &LevelDefinition,
    now_ms: u64,
) -> StudentLevelProgress {
    let best_difference = request
        .best_difference
        .unwrap_or_else(|| i64::from(request.steps) - i64::from(level.best_steps));

    let Some(mut record) = existing else {
        return StudentLevelProgress {
            level_id: level.id.clone(),
            stars: request.stars,
            steps: request.steps,
            hints_used: request.hints_used,
            duration_seconds: request.duration_seconds,
            best_difference: Some(best_difference),
            completed_at_epoch_ms: now_ms,
            replay_log: request.replay_log,
        };
    };

    let improved = request.stars > 0 && (record.stars == 0 || request.steps < record.steps);
    record.stars = record.stars.max(request.stars);
    record.hints_used = record.hints_used.saturating_add(request.hints_used);
    record.duration_seconds = record.duration_seconds.saturating_add(request.duration_seconds);
    record.completed_at_epoch_ms = now_ms;
    record.replay_log = request.replay_log;
    if improved {
        record.steps = request.steps;
        record.best_difference = Some(best_difference);
    }
    record
}

fn now_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
