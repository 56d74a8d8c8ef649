mod config;
mod controller;
mod format;

pub use config::{StartOptions, TickCallback, VisibilityCallback, DEFAULT_TICK_INTERVAL};
pub use controller::{DurationReading, SessionTracker};
pub use format::format_duration;
