//! The session store: load-or-generate startup and tick-driven saving.

use std::path::PathBuf;

use meadow_common::Vector3;
use meadow_kernel::{Generate, GeneratorConfig, SessionState};

use crate::blob::BlobStore;
use crate::config::SessionConfig;
use crate::schedule::SaveScheduler;
use crate::snapshot::{self, SnapshotError};

/// Errors from storage and persistence operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
    #[error("storage rejected write to {0:?}")]
    WriteRejected(String),
    #[error("config error in {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// How the live session came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOrigin {
    /// Restored from a stored snapshot.
    Loaded,
    /// Generated because no usable snapshot existed.
    Fresh,
}

/// Read the snapshot under `key`.
///
/// `Ok(None)` covers both "nothing stored" and "stored but unreadable"; the
/// latter is logged. Only storage faults are errors.
pub fn load_session<S: BlobStore + ?Sized>(
    storage: &S,
    key: &str,
) -> Result<Option<SessionState>, StoreError> {
    let Some(blob) = storage.load_blob(key)? else {
        tracing::debug!(key, "no stored session");
        return Ok(None);
    };
    match snapshot::decode(&blob) {
        Ok(state) => Ok(Some(state)),
        Err(e) => {
            tracing::warn!(key, "discarding unreadable session snapshot: {e}");
            Ok(None)
        }
    }
}

/// Generate a new world, place the player at spawn, and write it right away.
///
/// The state is returned even when the write fails, so the session can still
/// start; the write outcome is returned alongside it.
pub fn initialize_fresh<S, G>(
    storage: &mut S,
    key: &str,
    generator: &mut G,
    config: &GeneratorConfig,
) -> (SessionState, Result<(), StoreError>)
where
    S: BlobStore + ?Sized,
    G: Generate + ?Sized,
{
    let state = SessionState::fresh(generator.generate(config));
    let written = write_snapshot(storage, key, &state);
    if let Err(e) = &written {
        tracing::warn!(key, "initial save of fresh world failed: {e}");
    }
    (state, written)
}

fn write_snapshot<S: BlobStore + ?Sized>(
    storage: &mut S,
    key: &str,
    state: &SessionState,
) -> Result<(), StoreError> {
    let blob = snapshot::encode(state)?;
    storage.save_blob(key, &blob)
}

/// Owns the live session and keeps it in sync with storage.
///
/// The frame loop calls [`record_player_movement`](Self::record_player_movement)
/// and [`tick`](Self::tick); everything else reads through [`state`](Self::state).
#[derive(Debug)]
pub struct SessionStore<S> {
    storage: S,
    key: String,
    state: SessionState,
    origin: SessionOrigin,
    scheduler: SaveScheduler,
    unsaved: Option<StoreError>,
}

impl<S: BlobStore> SessionStore<S> {
    /// Load the stored session, or generate and store a fresh one.
    pub fn startup<G: Generate + ?Sized>(
        mut storage: S,
        config: &SessionConfig,
        generator: &mut G,
    ) -> Result<Self, StoreError> {
        let key = config.storage_key.clone();
        let (state, origin, unsaved) = match load_session(&storage, &key)? {
            Some(state) => {
                tracing::info!(
                    plants = state.plants().len(),
                    "restored session from storage"
                );
                (state, SessionOrigin::Loaded, None)
            }
            None => {
                let (state, written) =
                    initialize_fresh(&mut storage, &key, generator, &config.generator);
                tracing::info!(plants = state.plants().len(), "generated fresh world");
                (state, SessionOrigin::Fresh, written.err())
            }
        };

        Ok(Self {
            storage,
            key,
            state,
            origin,
            scheduler: SaveScheduler::new(config.save_policy),
            unsaved,
        })
    }

    /// Read-only view of the live session.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn origin(&self) -> SessionOrigin {
        self.origin
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Why the freshly generated world is not in storage yet.
    ///
    /// Set when the initial write at startup failed; cleared by the next
    /// successful [`tick`](Self::tick) or [`flush`](Self::flush).
    pub fn unsaved_error(&self) -> Option<&StoreError> {
        self.unsaved.as_ref()
    }

    /// Apply a movement delta computed by the input layer.
    pub fn record_player_movement(&mut self, delta: Vector3) {
        self.state.move_player(delta);
    }

    /// Per-frame hook. Writes the session when the save policy allows it.
    ///
    /// Returns whether a write happened. On error nothing is recorded, so the
    /// next eligible tick retries.
    pub fn tick(&mut self, now_ms: u64) -> Result<bool, StoreError> {
        if !self.scheduler.is_due(now_ms) {
            return Ok(false);
        }
        write_snapshot(&mut self.storage, &self.key, &self.state)?;
        self.scheduler.mark_saved(now_ms);
        self.unsaved = None;
        tracing::debug!(now_ms, "session saved");
        Ok(true)
    }

    /// Write the session now, regardless of the save policy.
    pub fn flush(&mut self) -> Result<(), StoreError> {
        write_snapshot(&mut self.storage, &self.key, &self.state)?;
        self.unsaved = None;
        tracing::debug!("session flushed");
        Ok(())
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }
}
