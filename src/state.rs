use crate::errors::TallyError;
use crate::models::{PerUserSnapshot, UserId};
use crate::storage::persist_data;
use crate::tally::{ResetReport, TallyStore};
use chrono::{DateTime, Utc};
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub store: Arc<Mutex<TallyStore>>,
    pub token: Arc<str>,
    pub command_prefix: Arc<str>,
}

/// Result of a mutation whose in-memory effect stands even if writing the
/// snapshot failed.
#[derive(Debug)]
pub struct Persisted<T> {
    pub value: T,
    pub persist_error: Option<TallyError>,
}

impl<T> Persisted<T> {
    pub fn warning(&self) -> Option<String> {
        self.persist_error
            .as_ref()
            .map(|err| format!("change kept in memory but not saved: {err}"))
    }
}

impl AppState {
    pub fn new(data_path: PathBuf, store: TallyStore, token: &str, command_prefix: &str) -> Self {
        Self {
            data_path,
            store: Arc::new(Mutex::new(store)),
            token: Arc::from(token),
            command_prefix: Arc::from(command_prefix),
        }
    }

    pub async fn record(
        &self,
        user: UserId,
        amount: i64,
    ) -> Result<Persisted<PerUserSnapshot>, TallyError> {
        let mut store = self.store.lock().await;
        let snapshot = store.record(user, amount)?;
        info!(user_id = user, amount, "tally recorded");
        let persist_error = self.save(&store).await;
        Ok(Persisted {
            value: snapshot,
            persist_error,
        })
    }

    /// Runs the reset rules and saves, whether or not anything was cleared.
    pub async fn check_resets(&self, now: DateTime<Utc>) -> Persisted<ResetReport> {
        let mut store = self.store.lock().await;
        let report = store.maybe_reset_at(now);
        if !report.is_empty() {
            info!(windows = ?report.cleared, "reset tally windows");
        }
        let persist_error = self.save(&store).await;
        Persisted {
            value: report,
            persist_error,
        }
    }

    pub async fn snapshot(&self, user: UserId) -> PerUserSnapshot {
        self.store.lock().await.snapshot(user)
    }

    async fn save(&self, store: &TallyStore) -> Option<TallyError> {
        match persist_data(&self.data_path, store.data()).await {
            Ok(()) => None,
            Err(err) => {
                error!("failed to persist tally data: {err}");
                Some(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WindowKind;
    use crate::storage::{ensure_data_dir, load_data};
    use chrono::TimeZone;

    #[tokio::test]
    async fn record_saves_the_full_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tally_data.json");
        let state = AppState::new(path.clone(), TallyStore::new(), "t", "!");

        let outcome = state.record(7, 4).await.unwrap();
        assert!(outcome.persist_error.is_none());
        assert_eq!(outcome.value.weekly.count, 4);

        let reloaded = load_data(&path).await;
        assert_eq!(reloaded.count(WindowKind::Monthly, 7), 4);
    }

    #[tokio::test]
    async fn failed_save_keeps_the_in_memory_update() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("tally_data.json");
        let state = AppState::new(path, TallyStore::new(), "t", "!");

        let outcome = state.record(7, 4).await.unwrap();
        assert!(matches!(outcome.persist_error, Some(TallyError::Persistence { .. })));
        assert!(outcome.warning().is_some());
        assert_eq!(state.snapshot(7).await.daily.count, 4);
    }

    #[tokio::test]
    async fn uncreatable_data_dir_still_serves_tallies() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("plain_file");
        std::fs::write(&blocker, b"").unwrap();
        let path = blocker.join("data").join("tally_data.json");

        assert!(ensure_data_dir(&path).await.is_err());
        let state = AppState::new(path.clone(), load_data(&path).await, "t", "!");

        let first = state.record(7, 5).await.unwrap();
        assert!(matches!(first.persist_error, Some(TallyError::Persistence { .. })));
        let second = state.record(7, 3).await.unwrap();
        assert!(second.persist_error.is_some());
        assert_eq!(second.value.daily.count, 8);
        assert_eq!(state.snapshot(7).await.monthly.count, 8);
    }

    #[tokio::test]
    async fn invalid_amount_skips_the_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tally_data.json");
        let state = AppState::new(path.clone(), TallyStore::new(), "t", "!");

        assert!(matches!(state.record(7, 0).await, Err(TallyError::InvalidAmount(0))));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn reset_check_saves_even_when_nothing_cleared() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tally_data.json");
        let state = AppState::new(path.clone(), TallyStore::new(), "t", "!");
        let now = Utc.with_ymd_and_hms(2026, 1, 14, 9, 0, 0).unwrap();

        let first = state.check_resets(now).await;
        assert_eq!(first.value.cleared, vec![WindowKind::Daily]);

        std::fs::remove_file(&path).unwrap();
        let second = state.check_resets(now).await;
        assert!(second.value.is_empty());
        assert!(path.exists());
    }
}
