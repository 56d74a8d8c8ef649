use std::{sync::Arc, time::Duration};

use super::DurationReading;

/// Invoked on every reporting tick with the current total duration.
pub type TickCallback = Arc<dyn Fn(DurationReading) + Send + Sync>;

/// Invoked after each visibility-driven pause/resume with the freshly
/// formatted persisted duration.
pub type VisibilityCallback = Arc<dyn Fn(String) + Send + Sync>;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Optional per-start configuration. Omitted fields keep whatever the tracker
/// already has (callback and cadence carry over between starts).
#[derive(Clone, Default)]
pub struct StartOptions {
    pub on_tick: Option<TickCallback>,
    pub tick_interval: Option<Duration>,
    pub on_visibility_change: Option<VisibilityCallback>,
}

impl StartOptions {
    pub fn on_tick(mut self, callback: impl Fn(DurationReading) + Send + Sync + 'static) -> Self {
        self.on_tick = Some(Arc::new(callback));
        self
    }

    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = Some(interval);
        self
    }

    pub fn on_visibility_change(
        mut self,
        callback: impl Fn(String) + Send + Sync + 'static,
    ) -> Self {
        self.on_visibility_change = Some(Arc::new(callback));
        self
    }
}
