use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::phase::Phase;
use crate::store::SessionStore;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum SessionType {
    Work,
    Break,
    LongBreak,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Break => "break",
            Self::LongBreak => "longBreak",
        }
    }
}

impl From<Phase> for SessionType {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Work => Self::Work,
            Phase::ShortBreak => Self::Break,
            Phase::LongBreak => Self::LongBreak,
        }
    }
}

/// One finished (or explicitly ended) interval. Never edited once built.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub task_name: String,
    /// Elapsed minutes.
    pub duration: f64,
    #[serde(rename = "type")]
    pub kind: SessionType,
    pub completed_at: DateTime<Local>,
    pub date: NaiveDate,
}

impl Session {
    pub fn new(
        task_name: impl Into<String>,
        kind: SessionType,
        elapsed_secs: u64,
        completed_at: DateTime<Local>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            task_name: task_name.into(),
            duration: elapsed_secs as f64 / 60.0,
            kind,
            completed_at,
            date: completed_at.date_naive(),
        }
    }

    pub fn is_work(&self) -> bool {
        self.kind == SessionType::Work
    }
}

/// Work sessions dated `today`. Always derived, never stored.
pub fn todays_completed_count(sessions: &[Session], today: NaiveDate) -> usize {
    sessions
        .iter()
        .filter(|s| s.is_work() && s.date == today)
        .count()
}

// ============================================================================
// Session Log
// ============================================================================

/// The displayed session list together with the store backing it.
///
/// The list is updated first; the store is told afterwards and its failures
/// are only logged, so the list always reflects what the user did.
pub struct SessionLog {
    sessions: Vec<Session>,
    store: Box<dyn SessionStore>,
}

impl SessionLog {
    pub fn load(store: Box<dyn SessionStore>) -> Self {
        let mut sessions = match store.load_all() {
            Ok(sessions) => sessions,
            Err(e) => {
                tracing::warn!(error = %e, "could not load sessions, starting empty");
                Vec::new()
            }
        };
        sessions.sort_by_key(|s| s.completed_at);
        tracing::debug!(count = sessions.len(), "sessions loaded");
        Self { sessions, store }
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn append(&mut self, session: Session) {
        if let Err(e) = self.store.append(&session) {
            tracing::warn!(error = %e, id = %session.id, "could not persist session");
        }
        self.sessions.push(session);
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id != id);
        if self.sessions.len() == before {
            return false;
        }
        if let Err(e) = self.store.remove(id) {
            tracing::warn!(error = %e, id, "could not delete session from store");
        }
        true
    }

    /// Removes every session dated `date`, whatever its type. Returns how
    /// many were removed.
    pub fn clear_day(&mut self, date: NaiveDate) -> usize {
        let ids: Vec<String> = self
            .sessions
            .iter()
            .filter(|s| s.date == date)
            .map(|s| s.id.clone())
            .collect();
        if ids.is_empty() {
            return 0;
        }
        self.sessions.retain(|s| s.date != date);
        if let Err(e) = self.store.remove_many(&ids) {
            tracing::warn!(error = %e, count = ids.len(), "could not delete sessions from store");
        }
        ids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn new_session_derives_duration_and_date() {
        let session = Session::new("Write", SessionType::Work, 6, at(16, 9));
        assert!((session.duration - 0.1).abs() < 1e-9);
        assert_eq!(session.date, NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
        assert!(!session.id.is_empty());
    }

    #[test]
    fn serialized_shape_is_camel_case() {
        let session = Session::new("Write", SessionType::LongBreak, 60, at(16, 9));
        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value["type"], "longBreak");
        assert_eq!(value["taskName"], "Write");
        assert_eq!(value["date"], "2026-10-16");
        assert!(value["completedAt"].is_string());
    }

    #[test]
    fn todays_count_only_counts_work_today() {
        let sessions = vec![
            Session::new("A", SessionType::Work, 1500, at(16, 9)),
            Session::new("Short Break", SessionType::Break, 300, at(16, 10)),
            Session::new("A", SessionType::Work, 1500, at(15, 9)),
            Session::new("B", SessionType::Work, 1500, at(16, 11)),
        ];
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert_eq!(todays_completed_count(&sessions, today), 2);
        assert_eq!(todays_completed_count(&[], today), 0);
    }

    #[test]
    fn log_remove_and_clear_day() {
        let store = MemoryStore::default();
        let mut log = SessionLog::load(Box::new(store.clone()));
        let first = Session::new("A", SessionType::Work, 1500, at(16, 9));
        let first_id = first.id.clone();
        log.append(first);
        log.append(Session::new("Short Break", SessionType::Break, 300, at(16, 10)));
        log.append(Session::new("A", SessionType::Work, 1500, at(15, 9)));

        assert!(log.remove(&first_id));
        assert!(!log.remove(&first_id));
        assert_eq!(store.sessions().len(), 2);

        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert_eq!(log.clear_day(today), 1);
        assert_eq!(log.sessions().len(), 1);
        assert_eq!(store.sessions().len(), 1);
    }

    #[test]
    fn load_orders_by_completion() {
        let store = MemoryStore::default();
        store.append(&Session::new("late", SessionType::Work, 60, at(16, 12))).unwrap();
        store.append(&Session::new("early", SessionType::Work, 60, at(16, 8))).unwrap();
        let log = SessionLog::load(Box::new(store));
        assert_eq!(log.sessions()[0].task_name, "early");
    }
}
