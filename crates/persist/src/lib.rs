//! Persistence: session snapshots in a key-value blob store, load-or-generate
//! startup, and the save cadence driven by the frame loop.
//!
//! # Invariants
//! - One snapshot under one fixed key; no versioning, no checksum.
//! - A malformed snapshot never aborts a session; it is replaced by a fresh world.
//! - A failed write is reported and retried on the next eligible tick.

pub mod blob;
pub mod config;
pub mod schedule;
pub mod snapshot;
pub mod store;

pub use blob::{BlobStore, FileBlobStore, MemoryBlobStore};
pub use config::SessionConfig;
pub use schedule::{SavePolicy, SaveScheduler};
pub use snapshot::{STATE_KEY, SnapshotError};
pub use store::{SessionOrigin, SessionStore, StoreError, initialize_fresh, load_session};
