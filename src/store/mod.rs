use crate::errors::AppError;
use crate::AppResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tokio::sync::broadcast;

mod status;
pub use status::*;

const CHANGE_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateState {
    pub update_available: bool,
    pub latest_version: Option<String>,
    pub release_notes: Option<String>,
    pub download_url: Option<String>,
    pub last_check: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct PersistedState {
    last_ocr_result: Option<String>,
    ocr_history: Vec<HistoryEntry>,
    ocr_status: JobStatus,
    last_ocr_error: Option<String>,
    update_available: bool,
    latest_version: Option<String>,
    release_notes: Option<String>,
    download_url: Option<String>,
    last_update_check: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreChange {
    LastResult,
    History,
    Status,
    Update,
}

/// The shared key-value store every surface reads and writes. Consistency is
/// last write wins; writers persist the whole state and broadcast a change
/// notification to subscribed surfaces.
pub struct Store {
    path: PathBuf,
    state: RwLock<PersistedState>,
    changes: broadcast::Sender<StoreChange>,
}

impl Store {
    pub fn open<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();
        let state = match std::fs::read(&path) {
            Ok(raw) => serde_json::from_slice(&raw).unwrap_or_else(|e| {
                tracing::warn!("Discarding unreadable state file: {}", e);
                PersistedState::default()
            }),
            Err(_) => PersistedState::default(),
        };
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Ok(Self {
            path,
            state: RwLock::new(state),
            changes,
        })
    }

    pub fn default_path() -> AppResult<PathBuf> {
        let base = dirs::data_local_dir().ok_or_else(|| AppError::SystemError {
            message: "Could not determine the local data directory".to_string(),
        })?;
        Ok(base.join("snaptext").join("state.json"))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }

    /// A process that died mid-job leaves a processing status behind; reset
    /// it so the next job is not rejected by the transition rules.
    pub fn reconcile_stale_status(&self) -> AppResult<()> {
        if self.status().is_processing() {
            tracing::warn!("Resetting stale processing status from a previous run");
            self.mutate(StoreChange::Status, |state| {
                state.ocr_status = JobStatus::Idle;
            })?;
        }
        Ok(())
    }

    pub fn status(&self) -> JobStatus {
        self.read(|state| state.ocr_status)
    }

    pub fn last_result(&self) -> Option<String> {
        self.read(|state| state.last_ocr_result.clone())
    }

    pub fn last_error(&self) -> Option<String> {
        self.read(|state| state.last_ocr_error.clone())
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.read(|state| state.ocr_history.clone())
    }

    pub fn update_state(&self) -> UpdateState {
        self.read(|state| UpdateState {
            update_available: state.update_available,
            latest_version: state.latest_version.clone(),
            release_notes: state.release_notes.clone(),
            download_url: state.download_url.clone(),
            last_check: state.last_update_check,
        })
    }

    pub fn set_last_result(&self, text: &str) -> AppResult<()> {
        self.mutate(StoreChange::LastResult, |state| {
            state.last_ocr_result = Some(text.to_string());
        })
    }

    pub fn set_last_error(&self, message: &str) -> AppResult<()> {
        self.mutate(StoreChange::Status, |state| {
            state.last_ocr_error = Some(message.to_string());
        })
    }

    pub fn append_history(&self, entry: HistoryEntry) -> AppResult<()> {
        self.mutate(StoreChange::History, |state| {
            state.ocr_history.push(entry);
        })
    }

    /// Attaches a late-arriving answer to the entry with the given
    /// timestamp. Returns false when no entry matches.
    pub fn attach_answer(&self, timestamp: DateTime<Utc>, answer: &str) -> AppResult<bool> {
        let mut attached = false;
        self.mutate(StoreChange::History, |state| {
            if let Some(entry) = state
                .ocr_history
                .iter_mut()
                .find(|entry| entry.timestamp == timestamp)
            {
                entry.answer = Some(answer.to_string());
                attached = true;
            }
        })?;
        Ok(attached)
    }

    /// Validated status transition; illegal moves are rejected.
    pub fn set_status(&self, next: JobStatus) -> AppResult<JobStatus> {
        let current = self.status();
        if !current.can_transition_to(next) {
            return Err(AppError::IllegalStatusTransition {
                from: current.to_string(),
                to: next.to_string(),
            });
        }
        self.mutate(StoreChange::Status, |state| {
            state.ocr_status = next;
        })?;
        Ok(next)
    }

    /// Unconditional status write, reserved for forcing a terminal state
    /// when a job must not be left observable as processing.
    pub fn force_status(&self, next: JobStatus) -> AppResult<()> {
        self.mutate(StoreChange::Status, |state| {
            state.ocr_status = next;
        })
    }

    pub fn set_update_available(
        &self,
        latest_version: &str,
        release_notes: &str,
        download_url: &str,
    ) -> AppResult<()> {
        self.mutate(StoreChange::Update, |state| {
            state.update_available = true;
            state.latest_version = Some(latest_version.to_string());
            state.release_notes = Some(release_notes.to_string());
            state.download_url = Some(download_url.to_string());
        })
    }

    pub fn dismiss_update(&self) -> AppResult<()> {
        self.mutate(StoreChange::Update, |state| {
            state.update_available = false;
        })
    }

    pub fn set_last_update_check(&self, at: DateTime<Utc>) -> AppResult<()> {
        self.mutate(StoreChange::Update, |state| {
            state.last_update_check = Some(at);
        })
    }

    fn read<T>(&self, f: impl FnOnce(&PersistedState) -> T) -> T {
        let state = self.state.read().expect("state lock poisoned");
        f(&state)
    }

    fn mutate(&self, change: StoreChange, f: impl FnOnce(&mut PersistedState)) -> AppResult<()> {
        let mut state = self.state.write().expect("state lock poisoned");
        f(&mut state);
        self.persist(&state)?;
        drop(state);
        // Nobody listening is fine; surfaces subscribe on demand.
        let _ = self.changes.send(change);
        Ok(())
    }

    fn persist(&self, state: &PersistedState) -> AppResult<()> {
        let parent = self.path.parent().ok_or_else(|| AppError::SystemError {
            message: format!("State path has no parent: {}", self.path.to_string_lossy()),
        })?;
        std::fs::create_dir_all(parent)?;
        let raw = serde_json::to_vec_pretty(state)?;
        let temp = tempfile::NamedTempFile::new_in(parent)?;
        std::fs::write(temp.path(), raw)?;
        temp.persist(&self.path)
            .map_err(|e| AppError::SystemError {
                message: format!("Could not persist state file: {}", e),
            })?;
        Ok(())
    }
}
