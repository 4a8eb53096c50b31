use std::sync::{Arc, Mutex, MutexGuard};

use super::{RecentTaskStore, SessionStore, SettingsStore};
use crate::error::Result;
use crate::session::Session;
use crate::settings::Settings;

#[derive(Default)]
struct MemoryState {
    settings: Option<Settings>,
    sessions: Vec<Session>,
    recent_tasks: Vec<String>,
}

/// Keeps everything in process memory. Clones share the same state, so a
/// test can hand one clone to the controller and inspect another.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn sessions(&self) -> Vec<Session> {
        self.lock().sessions.clone()
    }

    pub fn recent_tasks(&self) -> Vec<String> {
        self.lock().recent_tasks.clone()
    }

    pub fn settings(&self) -> Option<Settings> {
        self.lock().settings.clone()
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Result<Option<Settings>> {
        Ok(self.lock().settings.clone())
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        self.lock().settings = Some(settings.clone());
        Ok(())
    }
}

impl SessionStore for MemoryStore {
    fn append(&self, session: &Session) -> Result<()> {
        self.lock().sessions.push(session.clone());
        Ok(())
    }

    fn remove(&self, id: &str) -> Result<()> {
        self.lock().sessions.retain(|s| s.id != id);
        Ok(())
    }

    fn remove_many(&self, ids: &[String]) -> Result<()> {
        self.lock().sessions.retain(|s| !ids.contains(&s.id));
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<Session>> {
        Ok(self.sessions())
    }
}

impl RecentTaskStore for MemoryStore {
    fn load(&self) -> Result<Vec<String>> {
        Ok(self.recent_tasks())
    }

    fn save(&self, tasks: &[String]) -> Result<()> {
        self.lock().recent_tasks = tasks.to_vec();
        Ok(())
    }
}
