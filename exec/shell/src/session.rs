//! Named working-directory and environment contexts.
//!
//! A session is not a live shell: it only remembers the cwd and env of the
//! first invocation that used its id, so later calls behave as if they
//! continued in the same shell.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use chrono::DateTime;
use chrono::Utc;
use tracing::debug;

/// A session's fixed context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub id: String,
    pub cwd: Option<PathBuf>,
    pub env: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
}

/// Process-wide session map. Clones share the same sessions.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, Arc<SessionContext>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the session for `id`, creating it from `cwd` and `env` if unseen.
    ///
    /// First write wins: for a known id the supplied values are ignored.
    pub fn get_or_create(
        &self,
        id: &str,
        cwd: Option<PathBuf>,
        env: &HashMap<String, String>,
    ) -> Arc<SessionContext> {
        let mut sessions = self.lock();
        if let Some(existing) = sessions.get(id) {
            return Arc::clone(existing);
        }
        let context = Arc::new(SessionContext {
            id: id.to_string(),
            cwd,
            env: env.clone(),
            created_at: Utc::now(),
        });
        debug!(session_id = id, cwd = ?context.cwd, "Created session context");
        sessions.insert(id.to_string(), Arc::clone(&context));
        context
    }

    pub fn get(&self, id: &str) -> Option<Arc<SessionContext>> {
        self.lock().get(id).cloned()
    }

    /// Forgets a session. Returns whether it existed.
    pub fn close(&self, id: &str) -> bool {
        self.lock().remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<SessionContext>>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "session.test.rs"]
mod tests;
