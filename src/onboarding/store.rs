//! Onboarding progress persistence.
//!
//! Progress lives in one JSON file wrapped in a versioned envelope. It is
//! read once when the service starts and rewritten after every change.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;
use tokio::sync::RwLock;

use super::progress::{OnboardingAction, OnboardingProgress, OnboardingView};

/// Serialization version of the stored envelope
pub const STORAGE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum OnboardingError {
    #[error("Failed to persist onboarding progress: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode onboarding progress: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    progress: &'a OnboardingProgress,
}

/// Accepts the versioned envelope or a bare progress object
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredProgress {
    Versioned {
        version: u32,
        progress: OnboardingProgress,
    },
    Bare(OnboardingProgress),
}

pub struct OnboardingStore {
    path: PathBuf,
}

impl OnboardingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored progress, or defaults when the file is missing or unreadable
    pub async fn load(&self) -> OnboardingProgress {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return OnboardingProgress::default(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read onboarding progress");
                return OnboardingProgress::default();
            }
        };

        match serde_json::from_slice::<StoredProgress>(&bytes) {
            Ok(StoredProgress::Versioned { version, progress }) if version == STORAGE_VERSION => {
                progress
            }
            Ok(StoredProgress::Versioned { version, .. }) => {
                tracing::warn!(version, "Unsupported onboarding progress version, using defaults");
                OnboardingProgress::default()
            }
            Ok(StoredProgress::Bare(progress)) => progress,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to parse onboarding progress");
                OnboardingProgress::default()
            }
        }
    }

    pub async fn save(&self, progress: &OnboardingProgress) -> Result<(), OnboardingError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(&EnvelopeRef {
            version: STORAGE_VERSION,
            progress,
        })?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, bytes).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), OnboardingError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-wide onboarding state with save-on-change
pub struct OnboardingService {
    store: OnboardingStore,
    progress: RwLock<OnboardingProgress>,
}

impl OnboardingService {
    /// Load stored progress once
    pub async fn load(store: OnboardingStore) -> Self {
        let progress = store.load().await;
        tracing::info!(
            path = %store.path().display(),
            step = ?progress.current_step,
            "Onboarding progress loaded"
        );
        Self {
            store,
            progress: RwLock::new(progress),
        }
    }

    pub async fn view(&self) -> OnboardingView {
        OnboardingView::from(&*self.progress.read().await)
    }

    /// Apply an action and persist the result if it changed anything
    pub async fn apply(&self, action: &OnboardingAction) -> Result<OnboardingView, OnboardingError> {
        if *action == OnboardingAction::Reset {
            return self.reset().await;
        }

        let mut progress = self.progress.write().await;
        let before = progress.clone();
        progress.apply(action);

        if *progress != before {
            self.store.save(&progress).await?;
            tracing::debug!(action = ?action, step = ?progress.current_step, "Onboarding progress saved");
        }
        Ok(OnboardingView::from(&*progress))
    }

    /// Restore defaults and remove the stored file
    pub async fn reset(&self) -> Result<OnboardingView, OnboardingError> {
        let mut progress = self.progress.write().await;
        *progress = OnboardingProgress::default();
        self.store.clear().await?;
        tracing::info!("Onboarding progress reset");
        Ok(OnboardingView::from(&*progress))
    }
}
