use crate::trace::{SimulationResult, SimulationStep};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StudentSettings {
    pub volume: f32,
    pub low_motion: bool,
    pub language: String,
    pub resettable: bool,
}

impl Default for StudentSettings {
    fn default() -> Self {
        StudentSettings {
            volume: 0.8,
            low_motion: false,
            language: "zh-CN".to_string(),
            resettable: true,
        }
    }
}

/// Partial settings update; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_motion: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resettable: Option<bool>,
}

impl StudentSettings {
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(volume) = patch.volume {
            self.volume = volume.clamp(0.0, 1.0);
        }
        if let Some(low_motion) = patch.low_motion {
            self.low_motion = low_motion;
        }
        if let Some(language) = patch.language {
            self.language = language;
        }
        if let Some(resettable) = patch.resettable {
            self.resettable = resettable;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Avatar {
    pub equipped: String,
    pub unlocked: BTreeSet<String>,
}

impl Avatar {
    pub fn starter(outfit: &str) -> Self {
        Avatar {
            equipped: outfit.to_string(),
            unlocked: BTreeSet::from([outfit.to_string()]),
        }
    }
}

/// Badges and compendium entries; always rebuilt from progress, sorted by construction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievements {
    pub badges: BTreeSet<String>,
    pub compendium: BTreeSet<String>,
}

/// Best-known outcome of one level for one student
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentLevelProgress {
    pub level_id: String,
    pub stars: u8,
    pub steps: u32,
    #[serde(alias = "hints")]
    pub hints_used: u32,
    #[serde(alias = "duration")]
    pub duration_seconds: u64,
    /// `steps - bestSteps` of the best run
    pub best_difference: Option<i64>,
    #[serde(alias = "completedAt")]
    pub completed_at_epoch_ms: u64,
    /// Step log of the latest completion, not necessarily the best one
    #[serde(default)]
    pub replay_log: Vec<SimulationStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub id: String,
    pub avatar: Avatar,
    #[serde(default)]
    pub achievements: Achievements,
    #[serde(default)]
    pub settings: StudentSettings,
    #[serde(default)]
    pub sandbox_unlocked: bool,
    #[serde(default)]
    pub progress: BTreeMap<String, StudentLevelProgress>,
}

impl StudentProfile {
    pub fn new(id: impl Into<String>, starter_outfit: &str, settings: StudentSettings) -> Self {
        StudentProfile {
            id: id.into(),
            avatar: Avatar::starter(starter_outfit),
            achievements: Achievements::default(),
            settings,
            sandbox_unlocked: false,
            progress: BTreeMap::new(),
        }
    }

    pub fn stars_for(&self, level_id: &str) -> u8 {
        self.progress.get(level_id).map_or(0, |record| record.stars)
    }

    pub fn has_cleared(&self, level_id: &str) -> bool {
        self.stars_for(level_id) > 0
    }
}

/// Client-reported completion of a level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteRequest {
    pub stars: u8,
    pub steps: u32,
    #[serde(default, alias = "hints")]
    pub hints_used: u32,
    #[serde(default, alias = "duration")]
    pub duration_seconds: u64,
    #[serde(default)]
    pub best_difference: Option<i64>,
    #[serde(default)]
    pub replay_log: Vec<SimulationStep>,
}

impl CompleteRequest {
    pub fn from_result(result: &SimulationResult) -> Self {
        CompleteRequest {
            stars: result.stars,
            steps: result.steps,
            best_difference: Some(i64::from(result.steps) - i64::from(result.metadata.best_steps)),
            replay_log: result.log.clone(),
            ..Default::default()
        }
    }

    pub fn with_hints(mut self, hints_used: u32) -> Self {
        self.hints_used = hints_used;
        self
    }

    pub fn with_duration(mut self, duration_seconds: u64) -> Self {
        self.duration_seconds = duration_seconds;
        self
    }
}
