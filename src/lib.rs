//! Keyed session-duration tracking.
//!
//! A [`SessionTracker`] accumulates active time for a named session,
//! persisting it through a [`SessionStore`] so the total survives process
//! restarts. Accounting suspends while the hosting surface reports itself
//! hidden and resumes when it becomes visible again; periodic duration
//! snapshots are delivered through a registered callback.

pub mod models;
pub mod store;
pub mod tracker;
pub mod visibility;

pub use models::SessionRecord;
pub use store::{MemoryStore, SessionStore, SqliteStore};
pub use tracker::{
    format_duration, DurationReading, SessionTracker, StartOptions, TickCallback,
    VisibilityCallback, DEFAULT_TICK_INTERVAL,
};
pub use visibility::{Visibility, VisibilitySource};
