//! The phase state machine: work, short break, long break.
//!
//! `Timer` knows nothing about wall-clock time or persistence. It is driven
//! one second at a time through [`Timer::tick`] and reports every finished
//! phase as a [`PhaseEnd`] for the recorder to turn into a session.

use crate::duration::seconds_for;
use crate::error::TimerError;
use crate::phase::Phase;
use crate::settings::Settings;

/// What the state machine reports when a phase is over.
#[derive(Clone, Debug, PartialEq)]
pub struct PhaseEnd {
    pub phase: Phase,
    pub elapsed_secs: u64,
    /// Task active when the phase ended; only meaningful for work phases.
    pub task_name: String,
    pub next: Phase,
    pub auto_started: bool,
    pub ended_early: bool,
}

#[derive(Clone, Debug)]
pub struct Timer {
    settings: Settings,
    pending: Option<Settings>,
    phase: Phase,
    phase_total: u64,
    time_left: u64,
    running: bool,
    cycle_count: u32,
    task_name: String,
}

impl Timer {
    pub fn new(settings: Settings) -> Self {
        let task_name = settings.last_selected_task.clone();
        let mut timer = Self {
            settings,
            pending: None,
            phase: Phase::Work,
            phase_total: 0,
            time_left: 0,
            running: false,
            cycle_count: 0,
            task_name,
        };
        timer.enter(Phase::Work);
        timer
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn time_left(&self) -> u64 {
        self.time_left
    }

    pub fn phase_total(&self) -> u64 {
        self.phase_total
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn cycle_count(&self) -> u32 {
        self.cycle_count
    }

    pub fn task_name(&self) -> &str {
        &self.task_name
    }

    /// Settings the current phase was sized from.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn has_pending_settings(&self) -> bool {
        self.pending.is_some()
    }

    pub fn set_task_name(&mut self, name: impl Into<String>) {
        self.task_name = name.into();
    }

    pub fn progress(&self) -> f64 {
        if self.phase_total == 0 {
            return 0.0;
        }
        let elapsed = self.phase_total - self.time_left;
        (elapsed as f64 / self.phase_total as f64).clamp(0.0, 1.0)
    }

    /// Work phases still to complete before the next long break.
    pub fn until_long_break(&self) -> u32 {
        let every = self.settings.pomodoros_until_long_break.max(1);
        every - (self.cycle_count % every)
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    pub fn start(&mut self) -> Result<(), TimerError> {
        if self.running {
            return Err(TimerError::AlreadyRunning);
        }
        if self.phase == Phase::Work && self.task_name.trim().is_empty() {
            self.task_name = self.settings.fallback_task_name().to_string();
        }
        self.running = true;
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), TimerError> {
        if !self.running {
            return Err(TimerError::NotRunning);
        }
        self.running = false;
        Ok(())
    }

    /// Advances the countdown by one second. Returns the finished phase when
    /// this tick brought the countdown to zero.
    pub fn tick(&mut self) -> Option<PhaseEnd> {
        if !self.running || self.time_left == 0 {
            return None;
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left == 0 {
            Some(self.complete())
        } else {
            None
        }
    }

    /// Ends the current break before its countdown runs out. The phase end
    /// carries the seconds actually spent, not the configured length.
    pub fn end_break(&mut self) -> Result<PhaseEnd, TimerError> {
        if !self.phase.is_break() {
            return Err(TimerError::NotOnBreak);
        }
        self.running = false;
        let elapsed_secs = self.phase_total - self.time_left;
        let phase = self.phase;
        self.apply_pending();
        self.enter(Phase::Work);
        Ok(PhaseEnd {
            phase,
            elapsed_secs,
            task_name: self.task_name.clone(),
            next: Phase::Work,
            auto_started: false,
            ended_early: true,
        })
    }

    /// Back to a fresh work phase. Whatever was in progress is discarded.
    pub fn reset(&mut self) {
        self.running = false;
        self.apply_pending();
        self.cycle_count = 0;
        self.enter(Phase::Work);
    }

    /// Takes new settings. Timing changes retarget the countdown right away
    /// when stopped and wait for the next phase boundary while running.
    /// Returns true when the change was deferred.
    pub fn apply_settings(&mut self, settings: Settings) -> bool {
        if self.settings.same_timing(&settings) {
            self.settings = settings;
            self.pending = None;
            return false;
        }
        if self.running {
            self.pending = Some(settings);
            return true;
        }
        self.settings = settings;
        self.pending = None;
        self.enter(Phase::Work);
        false
    }

    fn complete(&mut self) -> PhaseEnd {
        self.running = false;
        let phase = self.phase;
        let elapsed_secs = self.phase_total;
        self.apply_pending();

        let next = match phase {
            Phase::Work => {
                self.cycle_count += 1;
                if self.cycle_count % self.settings.pomodoros_until_long_break.max(1) == 0 {
                    Phase::LongBreak
                } else {
                    Phase::ShortBreak
                }
            }
            Phase::ShortBreak | Phase::LongBreak => Phase::Work,
        };

        self.enter(next);
        self.running = next.is_break();

        PhaseEnd {
            phase,
            elapsed_secs,
            task_name: self.task_name.clone(),
            next,
            auto_started: self.running,
            ended_early: false,
        }
    }

    fn apply_pending(&mut self) {
        if let Some(settings) = self.pending.take() {
            self.settings = settings;
        }
    }

    fn enter(&mut self, phase: Phase) {
        self.phase = phase;
        // a zero-length phase could never reach completion
        self.phase_total = seconds_for(&self.settings, phase).max(1);
        self.time_left = self.phase_total;
    }
}
