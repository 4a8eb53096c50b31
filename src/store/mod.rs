//! Persistence collaborators.
//!
//! The core only talks to these traits. Local JSON files and an in-memory
//! store ship with the crate; a remote backend plugs in by implementing the
//! same traits.

mod json;
mod memory;

pub use json::{DataPaths, JsonRecentTaskStore, JsonSessionStore, JsonSettingsStore};
pub use memory::MemoryStore;

use crate::error::Result;
use crate::session::Session;
use crate::settings::Settings;

pub trait SettingsStore {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<Settings>>;
    fn save(&self, settings: &Settings) -> Result<()>;
}

pub trait SessionStore {
    fn append(&self, session: &Session) -> Result<()>;
    fn remove(&self, id: &str) -> Result<()>;
    fn remove_many(&self, ids: &[String]) -> Result<()>;
    fn load_all(&self) -> Result<Vec<Session>>;
}

pub trait RecentTaskStore {
    fn load(&self) -> Result<Vec<String>>;
    fn save(&self, tasks: &[String]) -> Result<()>;
}

/// Copies every session from `source` into `target` when `target` holds
/// none yet. Returns how many sessions were copied.
pub fn seed_sessions_if_empty(source: &dyn SessionStore, target: &dyn SessionStore) -> Result<usize> {
    if !target.load_all()?.is_empty() {
        return Ok(0);
    }
    let sessions = source.load_all()?;
    for session in &sessions {
        target.append(session)?;
    }
    tracing::info!(count = sessions.len(), "seeded session store");
    Ok(sessions.len())
}

/// Writes the settings found in `source` (or the defaults) into `target`
/// when `target` has none. Returns true when something was written.
pub fn seed_settings_if_missing(source: &dyn SettingsStore, target: &dyn SettingsStore) -> Result<bool> {
    if target.load()?.is_some() {
        return Ok(false);
    }
    let settings = source.load()?.unwrap_or_default();
    target.save(&settings)?;
    tracing::info!("seeded settings store");
    Ok(true)
}
