use serde::{Deserialize, Serialize};

/// Persisted accounting state for one session key.
///
/// `duration` only ever grows; time spent while the surface is hidden is never
/// added to it. `last_paused_time` doubles as the resume reference point: the
/// next pause settles `now - last_paused_time` into `duration`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionRecord {
    pub duration: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_paused_time: Option<i64>,
}

impl SessionRecord {
    /// Fold the active window since the last pause/resume boundary into
    /// `duration` and stamp the pause instant. A record that has never been
    /// paused settles zero. Clock regression clamps the delta to zero rather
    /// than shrinking the total.
    pub fn settle_pause(&mut self, now_ms: i64) {
        let baseline = self.last_paused_time.unwrap_or(now_ms);
        let elapsed = (now_ms - baseline).max(0) as u64;
        self.duration = self.duration.saturating_add(elapsed);
        self.last_paused_time = Some(now_ms);
    }

    /// Stamp the resume instant. `duration` is untouched; settled time and
    /// time elapsed since this boundary are summed at read time instead.
    pub fn mark_resumed(&mut self, now_ms: i64) {
        self.last_paused_time = Some(now_ms);
    }
}
