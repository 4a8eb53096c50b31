//! The controller: the one place that mutates timer state.
//!
//! It owns the settings, the state machine, the tick source, the recorder
//! and the session log, and keeps the ticker in step with `is_running`.

use std::time::Instant;

use chrono::{Local, NaiveDate};

use crate::error::TimerError;
use crate::notify::{CommandSoundPlayer, DesktopNotifier, Notifier, SilentNotifier, SilentSoundPlayer, SoundPlayer};
use crate::recent::RecentTasks;
use crate::recorder::SessionRecorder;
use crate::report::{self, DailyReport, MonthlyReport, SearchFilter, WeeklyReport};
use crate::session::{self, Session, SessionLog};
use crate::settings::{Preset, Settings};
use crate::store::{
    DataPaths, JsonRecentTaskStore, JsonSessionStore, JsonSettingsStore, MemoryStore, RecentTaskStore,
    SessionStore, SettingsStore,
};
use crate::ticker::Ticker;
use crate::timer::Timer;

/// Everything the controller talks to but does not implement.
pub struct Collaborators {
    pub settings: Box<dyn SettingsStore>,
    pub sessions: Box<dyn SessionStore>,
    pub recent_tasks: Box<dyn RecentTaskStore>,
    pub notifier: Box<dyn Notifier>,
    pub sound: Box<dyn SoundPlayer>,
}

impl Collaborators {
    /// JSON files under `paths`, desktop notifications and system sounds.
    pub fn local(paths: &DataPaths, notifications: bool) -> Self {
        Self {
            settings: Box::new(JsonSettingsStore::new(paths)),
            sessions: Box::new(JsonSessionStore::new(paths)),
            recent_tasks: Box::new(JsonRecentTaskStore::new(paths)),
            notifier: Box::new(DesktopNotifier::new(notifications)),
            sound: Box::new(CommandSoundPlayer),
        }
    }

    /// Memory-only stores sharing `store`, with no notifications or sound.
    pub fn in_memory(store: &MemoryStore) -> Self {
        Self {
            settings: Box::new(store.clone()),
            sessions: Box::new(store.clone()),
            recent_tasks: Box::new(store.clone()),
            notifier: Box::new(SilentNotifier),
            sound: Box::new(SilentSoundPlayer),
        }
    }
}

pub struct App {
    /// What the store holds: loaded settings without run-only overrides.
    saved: Settings,
    settings: Settings,
    settings_store: Box<dyn SettingsStore>,
    timer: Timer,
    ticker: Ticker,
    recorder: SessionRecorder,
    log: SessionLog,
}

impl App {
    pub fn new(collaborators: Collaborators) -> Self {
        Self::with_overrides(collaborators, |_| {})
    }

    /// Loads persisted settings, lets `overrides` adjust them for this run
    /// only, and builds the controller. Overrides are not saved.
    pub fn with_overrides(collaborators: Collaborators, overrides: impl FnOnce(&mut Settings)) -> Self {
        let Collaborators {
            settings: settings_store,
            sessions,
            recent_tasks,
            notifier,
            sound,
        } = collaborators;

        let saved = match settings_store.load() {
            Ok(Some(settings)) => settings,
            Ok(None) => Settings::default(),
            Err(e) => {
                tracing::warn!(error = %e, "could not load settings, using defaults");
                Settings::default()
            }
        }
        .sanitized();
        let mut settings = saved.clone();
        overrides(&mut settings);
        let settings = settings.sanitized();

        Self {
            timer: Timer::new(settings.clone()),
            saved,
            settings,
            settings_store,
            ticker: Ticker::default(),
            recorder: SessionRecorder::new(notifier, sound, RecentTasks::load(recent_tasks)),
            log: SessionLog::load(sessions),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn sessions(&self) -> &[Session] {
        self.log.sessions()
    }

    pub fn recent_tasks(&self) -> &[String] {
        self.recorder.recent_tasks()
    }

    // ========================================================================
    // Timer control
    // ========================================================================

    pub fn set_task(&mut self, name: impl Into<String>) {
        self.timer.set_task_name(name);
    }

    pub fn start(&mut self, now: Instant) -> Result<(), TimerError> {
        if let Err(e) = self.timer.start() {
            tracing::debug!(error = %e, "start ignored");
            return Err(e);
        }
        self.ticker.start(now);
        tracing::info!(phase = ?self.timer.phase(), task = %self.timer.task_name(), "timer started");

        if !self.timer.phase().is_break() && self.saved.last_selected_task != self.timer.task_name() {
            let task = self.timer.task_name().to_string();
            self.edit_settings(|s| s.last_selected_task = task.clone());
        }
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), TimerError> {
        self.timer.pause().inspect_err(|e| tracing::debug!(error = %e, "pause ignored"))?;
        self.ticker.stop();
        tracing::info!(time_left = self.timer.time_left(), "timer paused");
        Ok(())
    }

    pub fn toggle(&mut self, now: Instant) -> Result<(), TimerError> {
        if self.timer.is_running() { self.pause() } else { self.start(now) }
    }

    pub fn reset(&mut self) {
        self.ticker.stop();
        self.timer.reset();
        tracing::info!("timer reset");
    }

    /// Ends the current break now and records the time actually spent.
    pub fn end_break(&mut self) -> Result<Session, TimerError> {
        let end = self
            .timer
            .end_break()
            .inspect_err(|e| tracing::debug!(error = %e, "end break ignored"))?;
        self.ticker.stop();
        Ok(self.recorder.complete_session(&end, self.timer.settings(), Local::now(), &mut self.log))
    }

    /// Applies one second to the timer. A completion is recorded, and the
    /// ticker is stopped and restarted only if the next phase auto-started.
    pub fn tick(&mut self, now: Instant) -> Option<Session> {
        let end = self.timer.tick()?;
        self.ticker.stop();
        let session = self
            .recorder
            .complete_session(&end, &self.settings, Local::now(), &mut self.log);
        if end.auto_started {
            self.ticker.start(now);
        }
        Some(session)
    }

    /// Delivers every tick that has come due by `now`.
    pub fn poll(&mut self, now: Instant) -> Vec<Session> {
        let mut completed = Vec::new();
        while self.ticker.fire(now) {
            completed.extend(self.tick(now));
        }
        completed
    }

    // ========================================================================
    // Settings
    // ========================================================================

    /// Persists and adopts new settings, replacing any run-only overrides.
    /// A failed save is logged and the new value is still used for this run.
    pub fn update_settings(&mut self, settings: Settings) {
        let settings = settings.sanitized();
        self.persist(settings.clone());
        self.adopt(settings);
    }

    pub fn apply_preset(&mut self, preset: Preset) {
        self.edit_settings(|s| *s = s.clone().with_preset(preset));
    }

    pub fn add_custom_task(&mut self, name: &str) {
        self.edit_settings(|s| s.custom_task_list.push(name.to_string()));
    }

    pub fn remove_custom_task(&mut self, name: &str) {
        self.edit_settings(|s| s.custom_task_list.retain(|t| t != name));
    }

    /// Applies `edit` to both the stored settings and the ones in effect,
    /// so overrides given for this run stay out of the store.
    fn edit_settings(&mut self, edit: impl Fn(&mut Settings)) {
        let mut saved = self.saved.clone();
        edit(&mut saved);
        let mut effective = self.settings.clone();
        edit(&mut effective);
        self.persist(saved.sanitized());
        self.adopt(effective.sanitized());
    }

    fn persist(&mut self, settings: Settings) {
        if let Err(e) = self.settings_store.save(&settings) {
            tracing::warn!(error = %e, "could not persist settings");
        }
        self.saved = settings;
    }

    fn adopt(&mut self, settings: Settings) {
        if self.timer.apply_settings(settings.clone()) {
            tracing::info!("settings change deferred until the current phase ends");
        }
        self.settings = settings;
    }

    // ========================================================================
    // Session log and reports
    // ========================================================================

    pub fn delete_session(&mut self, id: &str) -> bool {
        self.log.remove(id)
    }

    pub fn clear_today(&mut self) -> usize {
        let removed = self.log.clear_day(today());
        tracing::info!(removed, "cleared today's sessions");
        removed
    }

    pub fn todays_completed_count(&self) -> usize {
        session::todays_completed_count(self.log.sessions(), today())
    }

    pub fn daily_report(&self, filter: &str) -> DailyReport {
        report::daily(self.log.sessions(), today(), &SearchFilter::new(filter))
    }

    pub fn weekly_report(&self, filter: &str) -> WeeklyReport {
        report::weekly(self.log.sessions(), today(), &SearchFilter::new(filter))
    }

    pub fn monthly_report(&self, filter: &str) -> MonthlyReport {
        report::monthly(self.log.sessions(), today(), &SearchFilter::new(filter))
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
