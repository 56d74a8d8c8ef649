use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::{bail, Result};
use chrono::Utc;
use log::error;
use serde::Serialize;
use tokio::{
    sync::{watch, Mutex},
    task::{AbortHandle, JoinHandle},
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::{models::SessionRecord, store::SessionStore, visibility::Visibility};

use super::{
    config::{StartOptions, TickCallback, VisibilityCallback, DEFAULT_TICK_INTERVAL},
    format_duration,
};

/// Duration snapshot delivered to tick callbacks and returned by `read`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationReading {
    pub milliseconds: u64,
    pub format: String,
}

struct Reporting {
    on_tick: Option<TickCallback>,
    tick_interval: Duration,
}

struct Watcher {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Keyed session-duration tracker.
///
/// Owns one reporting schedule and one visibility subscription at a time;
/// calling `start` again re-binds both. Clones share the same slots, so a
/// clone handed to a background task pauses and resumes the same session.
#[derive(Clone)]
pub struct SessionTracker {
    store: Arc<dyn SessionStore>,
    visibility: watch::Receiver<Visibility>,
    reporting: Arc<Mutex<Reporting>>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    watcher: Arc<Mutex<Option<Watcher>>>,
    /// Record snapshot bound at `start` and mutated in place by the
    /// visibility handler. Not reloaded from storage per event.
    snapshot: Arc<Mutex<SessionRecord>>,
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

fn stored_duration(store: &dyn SessionStore, session_key: &str) -> Result<u64> {
    let record = load_record(store, session_key)?;
    Ok(record.duration)
}

fn load_record(store: &dyn SessionStore, session_key: &str) -> Result<SessionRecord> {
    Ok(match store.get(session_key)? {
        // Malformed content falls back to an empty record.
        Some(raw) => serde_json::from_str(&raw).unwrap_or_default(),
        None => SessionRecord::default(),
    })
}

impl SessionTracker {
    pub fn new(store: Arc<dyn SessionStore>, visibility: watch::Receiver<Visibility>) -> Self {
        Self {
            store,
            visibility,
            reporting: Arc::new(Mutex::new(Reporting {
                on_tick: None,
                tick_interval: DEFAULT_TICK_INTERVAL,
            })),
            ticker: Arc::new(Mutex::new(None)),
            watcher: Arc::new(Mutex::new(None)),
            snapshot: Arc::new(Mutex::new(SessionRecord::default())),
        }
    }

    /// Begin tracking `session_key`: bind the visibility handler, anchor the
    /// active run at now, and schedule periodic reporting.
    ///
    /// Returns the schedule's abort handle, or `None` when no tick callback
    /// is registered (reporting is simply skipped). The handle is also kept
    /// internally so `pause` and `reset` can cancel the schedule.
    pub async fn start(
        &self,
        session_key: &str,
        options: StartOptions,
    ) -> Result<Option<AbortHandle>> {
        if session_key.is_empty() {
            bail!("session key must be provided");
        }

        {
            let mut reporting = self.reporting.lock().await;
            if let Some(on_tick) = options.on_tick {
                reporting.on_tick = Some(on_tick);
            }
            if let Some(interval) = options.tick_interval {
                reporting.tick_interval = interval;
            }
        }

        let record = load_record(self.store.as_ref(), session_key)?;
        *self.snapshot.lock().await = record;

        self.spawn_watcher(session_key, options.on_visibility_change)
            .await;

        let anchor = Instant::now();
        Ok(self.period(anchor, session_key).await)
    }

    /// Schedule periodic reporting, superseding any prior schedule. Each tick
    /// recomputes the total from the stored duration plus a fresh wall-clock
    /// delta against `anchor`, so timer jitter never accumulates as drift.
    async fn period(&self, anchor: Instant, session_key: &str) -> Option<AbortHandle> {
        let (on_tick, tick_interval) = {
            let reporting = self.reporting.lock().await;
            (reporting.on_tick.clone(), reporting.tick_interval)
        };
        let on_tick = on_tick?;

        let mut ticker = self.ticker.lock().await;
        if let Some(old) = ticker.take() {
            old.abort();
        }

        let store = self.store.clone();
        let key = session_key.to_string();
        let handle = tokio::spawn(async move {
            let mut interval = time::interval(tick_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first interval tick resolves immediately; consume it so the
            // callback first fires one full period after scheduling.
            interval.tick().await;
            loop {
                interval.tick().await;

                let settled = match stored_duration(store.as_ref(), &key) {
                    Ok(duration) => duration,
                    Err(err) => {
                        error!("tick for session '{key}' could not read the store: {err:#}");
                        0
                    }
                };
                let elapsed = anchor.elapsed().as_millis() as u64;
                let total = settled.saturating_add(elapsed);

                on_tick(DurationReading {
                    milliseconds: total,
                    format: format_duration(total),
                });
            }
        });

        let abort = handle.abort_handle();
        *ticker = Some(handle);
        Some(abort)
    }

    /// Suspend accounting: settle the active window into `record`, persist
    /// it, and cancel the reporting schedule.
    ///
    /// `record` is usually the snapshot bound at `start`; callers invoking
    /// this directly should pass a freshly loaded record. Pausing twice in
    /// quick succession settles a near-zero second delta.
    pub async fn pause(&self, session_key: &str, record: &mut SessionRecord) -> Result<()> {
        record.settle_pause(now_ms());
        self.save_record(session_key, record)?;
        self.cancel_ticker().await;
        Ok(())
    }

    /// Resume accounting: stamp the resume instant, persist it, and re-arm
    /// periodic reporting from a fresh anchor. `duration` is not folded into
    /// the anchor; ticks re-add the stored duration each time.
    pub async fn resume(&self, session_key: &str, record: &mut SessionRecord) -> Result<()> {
        record.mark_resumed(now_ms());
        self.save_record(session_key, record)?;
        self.period(Instant::now(), session_key).await;
        Ok(())
    }

    /// Cancel the reporting schedule and overwrite the stored record with an
    /// empty one. Destructive.
    pub async fn reset(&self, session_key: &str) -> Result<()> {
        self.cancel_ticker().await;
        self.save_record(session_key, &SessionRecord::default())
    }

    /// The settled persisted duration, ignoring any in-progress active run.
    pub fn session_duration(&self, session_key: &str) -> Result<u64> {
        stored_duration(self.store.as_ref(), session_key)
    }

    /// Pure query over the settled duration and its formatting.
    pub fn read(&self, session_key: &str) -> Result<DurationReading> {
        let milliseconds = self.session_duration(session_key)?;
        Ok(DurationReading {
            format: format_duration(milliseconds),
            milliseconds,
        })
    }

    /// Tear down the reporting schedule and the visibility subscription.
    pub async fn shutdown(&self) {
        self.cancel_ticker().await;
        if let Some(watcher) = self.watcher.lock().await.take() {
            watcher.cancel.cancel();
            watcher.handle.abort();
        }
    }

    async fn spawn_watcher(&self, session_key: &str, on_change: Option<VisibilityCallback>) {
        let mut slot = self.watcher.lock().await;
        if let Some(old) = slot.take() {
            old.cancel.cancel();
            old.handle.abort();
        }

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let mut visibility = self.visibility.clone();
        let tracker = self.clone();
        let key = session_key.to_string();

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = visibility.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let state = *visibility.borrow_and_update();
                        if let Err(err) = tracker.handle_visibility_change(&key, state, on_change.as_ref()).await {
                            error!("visibility handler for session '{key}' failed: {err:#}");
                        }
                    }
                    _ = token.cancelled() => break,
                }
            }
        });

        *slot = Some(Watcher { cancel, handle });
    }

    async fn handle_visibility_change(
        &self,
        session_key: &str,
        state: Visibility,
        on_change: Option<&VisibilityCallback>,
    ) -> Result<()> {
        {
            let mut snapshot = self.snapshot.lock().await;
            match state {
                Visibility::Hidden => self.pause(session_key, &mut snapshot).await?,
                Visibility::Visible => self.resume(session_key, &mut snapshot).await?,
            }
        }

        if let Some(on_change) = on_change {
            let duration = self.session_duration(session_key)?;
            on_change(format_duration(duration));
        }
        Ok(())
    }

    fn save_record(&self, session_key: &str, record: &SessionRecord) -> Result<()> {
        self.store.set(session_key, &serde_json::to_string(record)?)
    }

    async fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }
}
