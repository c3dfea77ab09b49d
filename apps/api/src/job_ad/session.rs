//! In-memory session store. One `FormModel` per session, never shared.
//!
//! Sessions end on an explicit delete or after sitting idle longer than the
//! configured timeout; `spawn_sweeper` runs the idle check in the background.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::info;
use uuid::Uuid;

use crate::job_ad::form::FormModel;

/// Handle to one session's form. Holding the lock for a whole action keeps
/// actions on the same session strictly one at a time.
pub type SessionHandle = Arc<Mutex<FormModel>>;

struct SessionEntry {
    form: SessionHandle,
    last_seen: Instant,
}

#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session with an all-default form.
    pub async fn create(&self) -> (Uuid, SessionHandle) {
        let id = Uuid::new_v4();
        let form = Arc::new(Mutex::new(FormModel::new()));
        let entry = SessionEntry {
            form: form.clone(),
            last_seen: Instant::now(),
        };
        self.sessions.write().await.insert(id, entry);
        (id, form)
    }

    /// Looks up a session and marks it as active.
    pub async fn get(&self, id: Uuid) -> Option<SessionHandle> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id)?;
        entry.last_seen = Instant::now();
        Some(entry.form.clone())
    }

    /// Returns whether the session existed.
    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops every session not looked up within `max_idle`. Returns how many
    /// were dropped. An action already holding a handle finishes normally.
    pub async fn prune_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_seen.elapsed() <= max_idle);
        before - sessions.len()
    }

    /// Prunes idle sessions periodically for the life of the process.
    pub fn spawn_sweeper(&self, max_idle: Duration) -> JoinHandle<()> {
        let store = self.clone();
        let period = (max_idle / 4).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let dropped = store.prune_idle(max_idle).await;
                if dropped > 0 {
                    info!(
                        "Expired {dropped} idle session(s), {} active",
                        store.len().await
                    );
                }
            }
        })
    }
}
