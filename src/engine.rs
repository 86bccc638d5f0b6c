/// Engine facade: the operations a client calls, over one shared progress store
use crate::catalog::{LevelCatalog, LevelDefinition};
use crate::config::EngineConfig;
use crate::hint;
use crate::persistence::{ProfileRepository, RepositoryError};
use crate::program::Instruction;
use crate::progress::{
    level_prep, Avatar, CompleteRequest, LevelDetail, LevelPrep, MapView, ProfileSummary,
    ProgressError, ProgressStore, SettingsPatch, StudentLevelProgress, StudentProfile,
    StudentSettings,
};
use crate::simulator::{ErrorCode, SimulationOptions, Simulator};
use crate::trace::SimulationResult;
use crate::validator::{validate, ValidationError};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("level `{0}` does not exist")]
    LevelNotFound(String),
    #[error("level `{0}` is locked")]
    LevelLocked(String),
    #[error("sandbox is locked until a level is cleared")]
    SandboxLocked,
    #[error("program rejected: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Progress(ProgressError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<ProgressError> for EngineError {
    fn from(err: ProgressError) -> Self {
        match err {
            ProgressError::LevelNotFound(id) => EngineError::LevelNotFound(id),
            ProgressError::LevelLocked(id) => EngineError::LevelLocked(id),
            other => EngineError::Progress(other),
        }
    }
}

/// Shared entry point for running programs and tracking student progress.
///
/// The engine is `Send + Sync`; wrap it in an `Arc` to serve concurrent requests.
pub struct Engine {
    catalog: Arc<LevelCatalog>,
    store: ProgressStore,
    config: EngineConfig,
}

impl Engine {
    pub fn new(catalog: LevelCatalog, config: EngineConfig) -> Self {
        let catalog = Arc::new(catalog);
        Engine {
            store: ProgressStore::new(Arc::clone(&catalog), &config),
            catalog,
            config,
        }
    }

    /// Engine over the bundled course with default config
    #[cfg(feature = "builtin-catalog")]
    pub fn builtin() -> Self {
        Engine::new(LevelCatalog::builtin(), EngineConfig::default())
    }

    pub fn catalog(&self) -> &LevelCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &ProgressStore {
        &self.store
    }

    fn level(&self, level_id: &str) -> Result<&LevelDefinition, EngineError> {
        self.catalog.level(level_id).ok_or_else(|| {
            warn!(level_id, "unknown level requested");
            EngineError::LevelNotFound(level_id.to_string())
        })
    }

    /// Validate and simulate `program` on `level_id`
    pub fn run_program(
        &self,
        student_id: &str,
        level_id: &str,
        program: &[Instruction],
    ) -> Result<SimulationResult, EngineError> {
        self.run_program_with(
            student_id,
            level_id,
            program,
            SimulationOptions::from_config(&self.config),
        )
    }

    pub fn run_program_with(
        &self,
        student_id: &str,
        level_id: &str,
        program: &[Instruction],
        options: SimulationOptions,
    ) -> Result<SimulationResult, EngineError> {
        let level = self.level(level_id)?;
        if let Err(err) = validate(level, program) {
            debug!(student_id, level_id, code = %err.code(), "program rejected");
            return Err(err.into());
        }
        Ok(Simulator::new(level).with_options(options).run(program))
    }

    /// Free-play run; refused until the student has cleared a level
    pub fn sandbox_run(
        &self,
        student_id: &str,
        level_id: &str,
        program: &[Instruction],
    ) -> Result<SimulationResult, EngineError> {
        if !self.store.sandbox_unlocked(student_id) {
            return Err(EngineError::SandboxLocked);
        }
        self.run_program(student_id, level_id, program)
    }

    pub fn complete_level(
        &self,
        student_id: &str,
        level_id: &str,
        request: CompleteRequest,
    ) -> Result<StudentLevelProgress, EngineError> {
        Ok(self.store.complete(student_id, level_id, request)?)
    }

    pub fn map(&self, student_id: &str) -> MapView {
        self.store.map(student_id)
    }

    pub fn level_detail(&self, student_id: &str, level_id: &str) -> Result<LevelDetail, EngineError> {
        Ok(self.store.level_detail(student_id, level_id)?)
    }

    pub fn level_prep(&self, level_id: &str) -> Result<LevelPrep, EngineError> {
        self.level(level_id).map(level_prep)
    }

    /// The student id is accepted for parity with the other calls; hints depend only on the level
    pub fn hint(
        &self,
        _student_id: &str,
        level_id: &str,
        attempts: u32,
        last_error: Option<&ErrorCode>,
    ) -> Result<String, EngineError> {
        let level = self.level(level_id)?;
        Ok(hint::hint(level, attempts, last_error))
    }

    pub fn profile(&self, student_id: &str) -> StudentProfile {
        self.store.profile(student_id)
    }

    pub fn profile_summary(&self, student_id: &str) -> ProfileSummary {
        self.store.summary(student_id)
    }

    pub fn equip_outfit(&self, student_id: &str, outfit: &str) -> Result<Avatar, EngineError> {
        Ok(self.store.equip_outfit(student_id, outfit)?)
    }

    pub fn update_settings(
        &self,
        student_id: &str,
        patch: SettingsPatch,
    ) -> Result<StudentSettings, EngineError> {
        Ok(self.store.update_settings(student_id, patch)?)
    }

    pub fn reset(&self, student_id: &str) -> Result<(), EngineError> {
        Ok(self.store.reset(student_id)?)
    }

    /// Load the student's stored profile into the store; `false` if nothing was stored
    pub async fn hydrate(
        &self,
        repository: &dyn ProfileRepository,
        student_id: &str,
    ) -> Result<bool, EngineError> {
        match repository.load(student_id).await? {
            Some(profile) if profile.id != student_id => {
                warn!(student_id, stored_id = %profile.id, "stored profile has a different id");
                Err(RepositoryError::IdMismatch {
                    expected: student_id.to_string(),
                    found: profile.id,
                }
                .into())
            }
            Some(profile) => {
                self.store.insert(profile);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Save the student's current profile
    pub async fn persist(
        &self,
        repository: &dyn ProfileRepository,
        student_id: &str,
    ) -> Result<(), EngineError> {
        let profile = self.store.profile(student_id);
        repository.save(&profile).await?;
        Ok(())
    }
}
