use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Whether the hosting surface is currently shown to the user. Anything that
/// is not hidden counts as visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Broadcast point for visibility transitions. The host publishes through
/// `set`; each tracker `start` holds a receiver cloned from `subscribe`.
#[derive(Debug, Clone)]
pub struct VisibilitySource {
    sender: watch::Sender<Visibility>,
}

impl VisibilitySource {
    /// Starts out visible, matching a freshly shown surface.
    pub fn new() -> Self {
        let (sender, _) = watch::channel(Visibility::Visible);
        Self { sender }
    }

    pub fn subscribe(&self) -> watch::Receiver<Visibility> {
        self.sender.subscribe()
    }

    pub fn set(&self, state: Visibility) {
        self.sender.send_replace(state);
    }

    pub fn current(&self) -> Visibility {
        *self.sender.borrow()
    }
}

impl Default for VisibilitySource {
    fn default() -> Self {
        Self::new()
    }
}
