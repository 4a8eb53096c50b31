//! Turns finished phases into session records and signals the user.

use chrono::{DateTime, Local};

use crate::notify::{Notifier, SoundPlayer};
use crate::phase::Phase;
use crate::recent::RecentTasks;
use crate::session::{Session, SessionLog, SessionType};
use crate::settings::Settings;
use crate::timer::PhaseEnd;

pub struct SessionRecorder {
    notifier: Box<dyn Notifier>,
    sound: Box<dyn SoundPlayer>,
    recent: RecentTasks,
}

impl SessionRecorder {
    pub fn new(notifier: Box<dyn Notifier>, sound: Box<dyn SoundPlayer>, recent: RecentTasks) -> Self {
        Self {
            notifier,
            sound,
            recent,
        }
    }

    pub fn recent_tasks(&self) -> &[String] {
        self.recent.tasks()
    }

    /// Builds the session for `end`, appends it to `log` and fires the
    /// phase-end sound and notification.
    pub fn complete_session(
        &mut self,
        end: &PhaseEnd,
        settings: &Settings,
        now: DateTime<Local>,
        log: &mut SessionLog,
    ) -> Session {
        let task_name = match end.phase {
            Phase::Work => end.task_name.clone(),
            Phase::ShortBreak | Phase::LongBreak => end.phase.label().to_string(),
        };
        let session = Session::new(task_name, SessionType::from(end.phase), end.elapsed_secs, now);

        tracing::info!(
            kind = ?session.kind,
            task = %session.task_name,
            minutes = session.duration,
            ended_early = end.ended_early,
            "session completed"
        );
        log.append(session.clone());

        if settings.sound_enabled {
            self.sound.play(settings.sound_type, settings.sound_volume);
        }
        let (title, body) = phase_end_message(end);
        self.notifier.notify(title, body);

        if end.phase == Phase::Work {
            self.recent.push(&end.task_name);
        }
        session
    }
}

fn phase_end_message(end: &PhaseEnd) -> (&'static str, &'static str) {
    match (end.phase, end.next) {
        (Phase::Work, Phase::LongBreak) => ("Long Break Time! 🌴", "Great work! Take a longer break."),
        (Phase::Work, _) => ("Break Time! ☕", "Time for a short break."),
        (_, _) if end.ended_early => ("Break Ended", "Ready when you are. Start the next pomodoro 🍅"),
        (_, _) => ("Back to Work! 🎯", "Let's focus on your next session 🍅"),
    }
}
