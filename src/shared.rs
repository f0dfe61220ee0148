//! Thread-safe handle for hosts that record sessions off the main thread.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::adapter::DifficultyAdapter;
use crate::params::DifficultyParams;
use crate::snapshot::PerformanceSnapshot;

/// Cloneable handle serializing access to one [`DifficultyAdapter`].
///
/// History and both derived fields change under a single lock, so readers
/// never see a half-applied recording.
#[derive(Clone, Debug, Default)]
pub struct SharedDifficultyAdapter {
    inner: Arc<Mutex<DifficultyAdapter>>,
}

impl SharedDifficultyAdapter {
    pub fn new(adapter: DifficultyAdapter) -> Self {
        Self {
            inner: Arc::new(Mutex::new(adapter)),
        }
    }

    // Every adapter operation is total and leaves it consistent, so a
    // poisoned lock is safe to recover.
    fn lock(&self) -> MutexGuard<'_, DifficultyAdapter> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn record_session(&self, snapshot: PerformanceSnapshot) -> DifficultyParams {
        self.lock().record_session(snapshot)
    }

    pub fn reset(&self) {
        self.lock().reset();
    }

    pub fn current_params(&self) -> DifficultyParams {
        self.lock().current_params()
    }

    pub fn player_skill_estimate(&self) -> f64 {
        self.lock().player_skill_estimate()
    }

    pub fn is_player_struggling(&self) -> bool {
        self.lock().is_player_struggling()
    }

    pub fn history_len(&self) -> usize {
        self.lock().history().len()
    }

    /// Run `f` against the adapter under the lock.
    pub fn with<R>(&self, f: impl FnOnce(&DifficultyAdapter) -> R) -> R {
        f(&self.lock())
    }
}

impl From<DifficultyAdapter> for SharedDifficultyAdapter {
    fn from(adapter: DifficultyAdapter) -> Self {
        Self::new(adapter)
    }
}
