//! JSON files under a single data directory.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{RecentTaskStore, SessionStore, SettingsStore};
use crate::error::{Error, Result};
use crate::session::Session;
use crate::settings::Settings;

const APP_DIR: &str = "rtomato";

/// Where every file of the app lives.
///
/// Production code uses [`DataPaths::from_system`]; tests point
/// [`DataPaths::with_root`] at a temp dir.
#[derive(Debug, Clone)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    pub fn from_system() -> Result<Self> {
        dirs::data_dir()
            .map(|d| Self::with_root(d.join(APP_DIR)))
            .ok_or(Error::DataDir)
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn settings_file(&self) -> PathBuf {
        self.root.join("settings.json")
    }

    pub fn sessions_file(&self) -> PathBuf {
        self.root.join("sessions.json")
    }

    pub fn recent_tasks_file(&self) -> PathBuf {
        self.root.join("recent_tasks.json")
    }

    pub fn log_file(&self) -> PathBuf {
        self.root.join("rtomato.log")
    }

    pub fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|source| Error::Io {
            path: self.root.clone(),
            source,
        })
    }
}

/// `Ok(None)` when the file does not exist yet.
fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(Error::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })
}

fn save_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| Error::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let content = serde_json::to_string_pretty(data).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, content).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ============================================================================
// Settings
// ============================================================================

pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(paths: &DataPaths) -> Self {
        Self {
            path: paths.settings_file(),
        }
    }
}

impl SettingsStore for JsonSettingsStore {
    fn load(&self) -> Result<Option<Settings>> {
        Ok(load_json::<Value>(&self.path)?.map(Settings::from_json_value))
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        save_json(&self.path, settings)
    }
}

// ============================================================================
// Sessions
// ============================================================================

pub struct JsonSessionStore {
    path: PathBuf,
}

impl JsonSessionStore {
    pub fn new(paths: &DataPaths) -> Self {
        Self {
            path: paths.sessions_file(),
        }
    }

    /// Raw entries on disk. Rewrites go through these so entries that no
    /// longer parse as a [`Session`] are carried along untouched.
    fn read_entries(&self) -> Result<Vec<Value>> {
        Ok(load_json(&self.path)?.unwrap_or_default())
    }

    fn retain_entries(&self, keep: impl Fn(&str) -> bool) -> Result<()> {
        let mut entries = self.read_entries()?;
        entries.retain(|entry| entry.get("id").and_then(Value::as_str).is_none_or(&keep));
        save_json(&self.path, &entries)
    }
}

impl SessionStore for JsonSessionStore {
    fn append(&self, session: &Session) -> Result<()> {
        let mut entries = self.read_entries()?;
        let entry = serde_json::to_value(session).map_err(|source| Error::Json {
            path: self.path.clone(),
            source,
        })?;
        entries.push(entry);
        save_json(&self.path, &entries)
    }

    fn remove(&self, id: &str) -> Result<()> {
        self.retain_entries(|entry_id| entry_id != id)
    }

    fn remove_many(&self, ids: &[String]) -> Result<()> {
        self.retain_entries(|entry_id| !ids.iter().any(|id| id == entry_id))
    }

    /// Entries that no longer parse are skipped rather than failing the
    /// whole list.
    fn load_all(&self) -> Result<Vec<Session>> {
        let entries = self.read_entries()?;
        let mut sessions = Vec::with_capacity(entries.len());
        for entry in entries {
            match serde_json::from_value::<Session>(entry) {
                Ok(session) => sessions.push(session),
                Err(e) => tracing::warn!(error = %e, path = %self.path.display(), "skipping malformed session"),
            }
        }
        Ok(sessions)
    }
}

// ============================================================================
// Recent tasks
// ============================================================================

pub struct JsonRecentTaskStore {
    path: PathBuf,
}

impl JsonRecentTaskStore {
    pub fn new(paths: &DataPaths) -> Self {
        Self {
            path: paths.recent_tasks_file(),
        }
    }
}

impl RecentTaskStore for JsonRecentTaskStore {
    fn load(&self) -> Result<Vec<String>> {
        Ok(load_json(&self.path)?.unwrap_or_default())
    }

    fn save(&self, tasks: &[String]) -> Result<()> {
        save_json(&self.path, tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionType;
    use chrono::Local;
    use tempfile::TempDir;

    fn paths() -> (TempDir, DataPaths) {
        let dir = TempDir::new().unwrap();
        let paths = DataPaths::with_root(dir.path().join("data"));
        (dir, paths)
    }

    #[test]
    fn file_names_live_under_root() {
        let paths = DataPaths::with_root("/tmp/rtomato-test");
        assert_eq!(paths.settings_file(), Path::new("/tmp/rtomato-test/settings.json"));
        assert_eq!(paths.sessions_file(), Path::new("/tmp/rtomato-test/sessions.json"));
        assert_eq!(paths.log_file(), Path::new("/tmp/rtomato-test/rtomato.log"));
    }

    #[test]
    fn missing_files_load_as_empty() {
        let (_dir, paths) = paths();
        assert!(JsonSettingsStore::new(&paths).load().unwrap().is_none());
        assert!(JsonSessionStore::new(&paths).load_all().unwrap().is_empty());
        assert!(JsonRecentTaskStore::new(&paths).load().unwrap().is_empty());
    }

    #[test]
    fn settings_persist_and_merge_partial_files() {
        let (_dir, paths) = paths();
        let store = JsonSettingsStore::new(&paths);
        let settings = Settings {
            work_duration: 45.0,
            ..Settings::default()
        };
        store.save(&settings).unwrap();
        assert_eq!(store.load().unwrap(), Some(settings));

        fs::write(paths.settings_file(), r#"{"shortBreakDuration": 7}"#).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.short_break_duration, 7.0);
        assert_eq!(loaded.work_duration, 25.0);
    }

    #[test]
    fn broken_settings_file_is_an_error() {
        let (_dir, paths) = paths();
        paths.ensure_root().unwrap();
        fs::write(paths.settings_file(), "{ not json").unwrap();
        let err = JsonSettingsStore::new(&paths).load().unwrap_err();
        assert!(matches!(err, Error::Json { .. }));
    }

    #[test]
    fn sessions_append_and_remove() {
        let (_dir, paths) = paths();
        let store = JsonSessionStore::new(&paths);
        let a = Session::new("A", SessionType::Work, 1500, Local::now());
        let b = Session::new("B", SessionType::Work, 1500, Local::now());
        let c = Session::new("Short Break", SessionType::Break, 300, Local::now());
        for s in [&a, &b, &c] {
            store.append(s).unwrap();
        }

        store.remove(&a.id).unwrap();
        assert_eq!(store.load_all().unwrap().len(), 2);

        store.remove_many(&[b.id.clone(), c.id.clone()]).unwrap();
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn malformed_session_entries_are_skipped() {
        let (_dir, paths) = paths();
        let store = JsonSessionStore::new(&paths);
        store.append(&Session::new("A", SessionType::Work, 60, Local::now())).unwrap();

        let mut raw: Vec<Value> =
            serde_json::from_str(&fs::read_to_string(paths.sessions_file()).unwrap()).unwrap();
        raw.push(serde_json::json!({ "id": "broken" }));
        fs::write(paths.sessions_file(), serde_json::to_string(&raw).unwrap()).unwrap();

        let sessions = store.load_all().unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].task_name, "A");
    }

    #[test]
    fn unparseable_entries_survive_rewrites() {
        let (_dir, paths) = paths();
        let store = JsonSessionStore::new(&paths);
        let a = Session::new("A", SessionType::Work, 60, Local::now());
        store.append(&a).unwrap();

        let mut raw: Vec<Value> =
            serde_json::from_str(&fs::read_to_string(paths.sessions_file()).unwrap()).unwrap();
        raw.push(serde_json::json!({ "id": "legacy", "taskName": "Old" }));
        raw.push(serde_json::json!({ "id": "bad-date", "completedAt": "yesterday" }));
        fs::write(paths.sessions_file(), serde_json::to_string(&raw).unwrap()).unwrap();

        store.append(&Session::new("B", SessionType::Work, 60, Local::now())).unwrap();
        store.remove(&a.id).unwrap();

        let on_disk: Vec<Value> =
            serde_json::from_str(&fs::read_to_string(paths.sessions_file()).unwrap()).unwrap();
        let ids: Vec<&str> = on_disk.iter().filter_map(|e| e["id"].as_str()).collect();
        assert_eq!(on_disk.len(), 3);
        assert!(ids.contains(&"legacy") && ids.contains(&"bad-date"));
        assert_eq!(store.load_all().unwrap().len(), 1);
    }

    #[test]
    fn recent_tasks_round_trip() {
        let (_dir, paths) = paths();
        let store = JsonRecentTaskStore::new(&paths);
        store.save(&["A".to_string(), "B".to_string()]).unwrap();
        assert_eq!(store.load().unwrap(), vec!["A", "B"]);
    }
}
