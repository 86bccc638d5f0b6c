/// Profile persistence trait and implementations
///
/// The progress store keeps profiles in memory; a [`ProfileRepository`] is the
/// durable side that profiles are hydrated from and persisted to.
use crate::progress::StudentProfile;
use async_trait::async_trait;
use std::collections::HashMap;
#[cfg(feature = "tokio-runtime")]
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};
#[cfg(feature = "tokio-runtime")]
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("profile data is malformed: {0}")]
    Serialization(String),
    #[error("invalid student id: {0}")]
    InvalidId(String),
    #[error("stored profile belongs to `{found}`, expected `{expected}`")]
    IdMismatch { expected: String, found: String },
}

/// Async trait for loading and saving student profiles
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Load a stored profile, or `None` if the student has never been saved
    async fn load(&self, student_id: &str) -> Result<Option<StudentProfile>, RepositoryError>;

    async fn save(&self, profile: &StudentProfile) -> Result<(), RepositoryError>;
}

/// Filesystem-based repository storing one `<student-id>.json` file per profile.
///
/// Only available with the `tokio-runtime` feature.
#[cfg(feature = "tokio-runtime")]
pub struct FolderRepository {
    base_path: PathBuf,
}

#[cfg(feature = "tokio-runtime")]
impl FolderRepository {
    /// Create a repository rooted at `base_path`; the directory is created on first save
    ///
    /// # Example
    /// ```no_run
    /// use codeadventure_engine::persistence::FolderRepository;
    /// use std::path::PathBuf;
    ///
    /// let repository = FolderRepository::new(PathBuf::from("./profiles"));
    /// ```
    pub fn new(base_path: PathBuf) -> Self {
        FolderRepository { base_path }
    }

    fn path_for(&self, student_id: &str) -> Result<PathBuf, RepositoryError> {
        // Ids map one-to-one onto file names and must stay inside the folder
        if student_id.is_empty()
            || student_id.contains("..")
            || student_id.contains(['/', '\\'])
        {
            return Err(RepositoryError::InvalidId(student_id.to_string()));
        }
        Ok(self.base_path.join(format!("{}.json", student_id)))
    }
}

#[cfg(feature = "tokio-runtime")]
#[async_trait]
impl ProfileRepository for FolderRepository {
    async fn load(&self, student_id: &str) -> Result<Option<StudentProfile>, RepositoryError> {
        let path = self.path_for(student_id)?;
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(RepositoryError::Io(e.to_string())),
        };
        let profile = serde_json::from_str(&content)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        debug!(student_id, path = %path.display(), "profile loaded");
        Ok(Some(profile))
    }

    async fn save(&self, profile: &StudentProfile) -> Result<(), RepositoryError> {
        let path = self.path_for(&profile.id)?;
        let json = serde_json::to_string_pretty(profile)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        tokio::fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| RepositoryError::Io(e.to_string()))?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| RepositoryError::Io(e.to_string()))?;
        debug!(student_id = %profile.id, path = %path.display(), "profile saved");
        Ok(())
    }
}

/// In-memory profile store, useful for tests and embedding
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    profiles: Arc<RwLock<HashMap<String, StudentProfile>>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, student_id: &str) -> bool {
        self.profiles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(student_id)
    }

    /// Remove a stored profile, returning whether it existed
    pub fn remove(&self, student_id: &str) -> bool {
        self.profiles
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(student_id)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.profiles.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ProfileRepository for InMemoryRepository {
    async fn load(&self, student_id: &str) -> Result<Option<StudentProfile>, RepositoryError> {
        let profiles = self.profiles.read().unwrap_or_else(PoisonError::into_inner);
        Ok(profiles.get(student_id).cloned())
    }

    async fn save(&self, profile: &StudentProfile) -> Result<(), RepositoryError> {
        let mut profiles = self.profiles.write().unwrap_or_else(PoisonError::into_inner);
        profiles.insert(profile.id.clone(), profile.clone());
        Ok(())
    }
}
