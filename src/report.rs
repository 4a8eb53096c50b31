//! Daily, weekly and monthly statistics over the flat session list.
//!
//! Everything here is a pure function of `(sessions, today, filter)`; the
//! caller supplies `today` so reports are reproducible.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, Timelike, Weekday};

use crate::session::Session;

pub type TaskCounts = BTreeMap<String, usize>;

/// Case-insensitive substring match on the task name. Blank matches all.
#[derive(Clone, Debug, Default)]
pub struct SearchFilter {
    needle: String,
}

impl SearchFilter {
    pub fn new(term: &str) -> Self {
        Self {
            needle: term.trim().to_lowercase(),
        }
    }

    pub fn matches(&self, session: &Session) -> bool {
        self.needle.is_empty() || session.task_name.to_lowercase().contains(&self.needle)
    }

    fn apply<'a>(&'a self, sessions: &'a [Session]) -> impl Iterator<Item = &'a Session> + 'a {
        sessions.iter().filter(move |s| self.matches(s))
    }
}

fn count_tasks<'a>(sessions: impl Iterator<Item = &'a Session>) -> TaskCounts {
    let mut counts = TaskCounts::new();
    for session in sessions.filter(|s| s.is_work()) {
        *counts.entry(session.task_name.clone()).or_default() += 1;
    }
    counts
}

/// Task counts ordered by descending count, ties by name.
pub fn sorted_by_count(counts: &TaskCounts) -> Vec<(&str, usize)> {
    let mut sorted: Vec<(&str, usize)> = counts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    sorted
}

// ============================================================================
// Daily
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct DailyReport {
    pub date: NaiveDate,
    pub total_pomodoros: usize,
    pub total_work_minutes: f64,
    pub task_breakdown: TaskCounts,
    /// Every session of the day, breaks included, keyed by local hour.
    pub hourly_breakdown: BTreeMap<u32, usize>,
    pub sessions: Vec<Session>,
}

pub fn daily(sessions: &[Session], today: NaiveDate, filter: &SearchFilter) -> DailyReport {
    let todays: Vec<Session> = filter
        .apply(sessions)
        .filter(|s| s.date == today)
        .cloned()
        .collect();

    let mut hourly_breakdown: BTreeMap<u32, usize> = BTreeMap::new();
    for session in &todays {
        *hourly_breakdown.entry(session.completed_at.hour()).or_default() += 1;
    }

    DailyReport {
        date: today,
        total_pomodoros: todays.iter().filter(|s| s.is_work()).count(),
        total_work_minutes: todays.iter().filter(|s| s.is_work()).map(|s| s.duration).sum(),
        task_breakdown: count_tasks(todays.iter()),
        hourly_breakdown,
        sessions: todays,
    }
}

// ============================================================================
// Weekly
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub pomodoros: usize,
    pub work_minutes: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WeeklyReport {
    /// The Sunday that opens the week.
    pub week_start: NaiveDate,
    /// Always seven buckets, Sunday through Saturday.
    pub days: Vec<DayBucket>,
    pub task_stats: TaskCounts,
    pub total_pomodoros: usize,
}

impl WeeklyReport {
    pub fn sorted_task_stats(&self) -> Vec<(&str, usize)> {
        sorted_by_count(&self.task_stats)
    }

    pub fn total_work_minutes(&self) -> f64 {
        self.days.iter().map(|d| d.work_minutes).sum()
    }
}

pub fn week_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(i64::from(today.weekday().num_days_from_sunday()))
}

pub fn weekly(sessions: &[Session], today: NaiveDate, filter: &SearchFilter) -> WeeklyReport {
    let start = week_start(today);
    let end = start + Duration::days(6);
    let in_week: Vec<&Session> = filter
        .apply(sessions)
        .filter(|s| s.date >= start && s.date <= end)
        .collect();

    let days = (0..7)
        .map(|offset| {
            let date = start + Duration::days(offset);
            let work: Vec<&&Session> = in_week.iter().filter(|s| s.date == date && s.is_work()).collect();
            DayBucket {
                date,
                weekday: date.weekday(),
                pomodoros: work.len(),
                work_minutes: work.iter().map(|s| s.duration).sum(),
            }
        })
        .collect();

    WeeklyReport {
        week_start: start,
        days,
        task_stats: count_tasks(in_week.iter().copied()),
        total_pomodoros: in_week.iter().filter(|s| s.is_work()).count(),
    }
}

// ============================================================================
// Monthly
// ============================================================================

const MONTH_WINDOWS: i64 = 5;

/// A 7-day slice of the month counted from day 1, not aligned to weekdays.
#[derive(Clone, Debug, PartialEq)]
pub struct WeekWindow {
    /// 1-based position in the month; survives dropping of empty windows.
    pub index: u32,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub pomodoros: usize,
    pub work_minutes: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MonthlyReport {
    pub month_start: NaiveDate,
    /// Windows without work sessions are left out.
    pub weeks: Vec<WeekWindow>,
    pub task_categories: TaskCounts,
    pub total_pomodoros: usize,
}

impl MonthlyReport {
    pub fn sorted_task_categories(&self) -> Vec<(&str, usize)> {
        sorted_by_count(&self.task_categories)
    }
}

pub fn month_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(i64::from(today.day0()))
}

pub fn monthly(sessions: &[Session], today: NaiveDate, filter: &SearchFilter) -> MonthlyReport {
    let start = month_start(today);
    let in_month: Vec<&Session> = filter
        .apply(sessions)
        .filter(|s| s.date.year() == today.year() && s.date.month() == today.month())
        .collect();

    let weeks = (0..MONTH_WINDOWS)
        .filter_map(|i| {
            let window_start = start + Duration::days(i * 7);
            let window_end = window_start + Duration::days(6);
            let work: Vec<&&Session> = in_month
                .iter()
                .filter(|s| s.is_work() && s.date >= window_start && s.date <= window_end)
                .collect();
            if work.is_empty() {
                return None;
            }
            Some(WeekWindow {
                index: i as u32 + 1,
                start: window_start,
                end: window_end,
                pomodoros: work.len(),
                work_minutes: work.iter().map(|s| s.duration).sum(),
            })
        })
        .collect();

    MonthlyReport {
        month_start: start,
        weeks,
        task_categories: count_tasks(in_month.iter().copied()),
        total_pomodoros: in_month.iter().filter(|s| s.is_work()).count(),
    }
}
