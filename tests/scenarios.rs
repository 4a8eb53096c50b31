//! End-to-end runs through the controller with in-memory collaborators.

use std::time::{Duration, Instant};

use chrono::{Local, TimeZone};
use rtomato::{
    App, Collaborators, Phase, Preset, Session, SessionType, Settings, Timer,
    duration::seconds_for,
    report::{self, SearchFilter},
    store::{DataPaths, MemoryStore, SessionStore, SettingsStore},
};
use tempfile::TempDir;

fn app_with(store: &MemoryStore, settings: Settings) -> App {
    SettingsStore::save(store, &settings).unwrap();
    App::new(Collaborators::in_memory(store))
}

/// Ticks one second at a time until the current phase ends.
fn finish_phase(app: &mut App) -> Session {
    let now = Instant::now();
    loop {
        if let Some(session) = app.tick(now) {
            return session;
        }
    }
}

#[test]
fn classic_cycle_reaches_long_break_on_fourth_pomodoro() {
    let store = MemoryStore::default();
    let mut app = app_with(&store, Settings::default());

    let mut observed = Vec::new();
    for _ in 0..4 {
        app.start(Instant::now()).unwrap();
        let session = finish_phase(&mut app);
        assert_eq!(session.kind, SessionType::Work);
        observed.push(app.timer().phase());
        assert!(app.timer().is_running(), "break should start on its own");
        finish_phase(&mut app);
        assert_eq!(app.timer().phase(), Phase::Work);
        assert!(!app.timer().is_running());
    }

    assert_eq!(
        observed,
        vec![Phase::ShortBreak, Phase::ShortBreak, Phase::ShortBreak, Phase::LongBreak]
    );
    assert_eq!(app.todays_completed_count(), 4);
    assert_eq!(store.sessions().len(), 8);
}

#[test]
fn six_second_work_phase_records_a_tenth_of_a_minute() {
    let store = MemoryStore::default();
    let settings = Settings {
        work_duration: 0.1,
        pomodoros_until_long_break: 2,
        ..Settings::default()
    };
    let mut app = app_with(&store, settings);
    assert_eq!(seconds_for(app.settings(), Phase::Work), 6);

    app.start(Instant::now()).unwrap();
    let mut completions = Vec::new();
    for _ in 0..6 {
        completions.extend(app.tick(Instant::now()));
    }

    assert_eq!(completions.len(), 1);
    assert_eq!(completions[0].kind, SessionType::Work);
    assert!((completions[0].duration - 0.1).abs() < 1e-9);
    assert_eq!(completions[0].task_name, "Focus");
}

#[test]
fn ended_break_records_actual_time() {
    let store = MemoryStore::default();
    let mut app = app_with(&store, Settings::default().with_preset(Preset::Test));
    app.set_task("Draft");
    app.start(Instant::now()).unwrap();
    finish_phase(&mut app);

    // k = 2 of n = 3 seconds
    app.tick(Instant::now());
    app.tick(Instant::now());
    let session = app.end_break().unwrap();

    assert_eq!(session.kind, SessionType::Break);
    assert!((session.duration - 2.0 / 60.0).abs() < 1e-9);
    assert_eq!(app.timer().phase(), Phase::Work);
    assert!(!app.timer().is_running());
    assert_eq!(app.recent_tasks(), ["Draft"]);
}

#[test]
fn reset_discards_progress_from_any_phase() {
    let store = MemoryStore::default();
    let mut app = app_with(&store, Settings::default().with_preset(Preset::Test));
    let work_secs = seconds_for(app.settings(), Phase::Work);

    app.start(Instant::now()).unwrap();
    finish_phase(&mut app);
    app.start(Instant::now()).ok();
    app.tick(Instant::now());
    app.reset();

    let timer = app.timer();
    assert_eq!(timer.phase(), Phase::Work);
    assert_eq!(timer.time_left(), work_secs);
    assert_eq!(timer.cycle_count(), 0);
    assert!(!timer.is_running());
    assert_eq!(store.sessions().len(), 1);
}

#[test]
fn settings_saved_mid_phase_apply_at_the_boundary() {
    let store = MemoryStore::default();
    let mut app = app_with(&store, Settings::default().with_preset(Preset::Test));
    let t0 = Instant::now();
    app.start(t0).unwrap();
    app.poll(t0 + Duration::from_secs(2));

    app.update_settings(Settings::default());
    assert_eq!(app.timer().time_left(), 4, "running countdown must not be retargeted");
    assert_eq!(store.settings().unwrap().work_duration, 25.0);

    let done = app.poll(t0 + Duration::from_secs(6));
    assert_eq!(done.len(), 1);
    assert_eq!(app.timer().time_left(), 5 * 60);
}

#[test]
fn every_completion_is_a_long_break_when_cycle_is_one() {
    let mut timer = Timer::new(Settings {
        pomodoros_until_long_break: 1,
        ..Settings::default().with_preset(Preset::Test)
    });
    for _ in 0..3 {
        timer.start().unwrap();
        let end = std::iter::repeat_with(|| timer.tick()).flatten().next().unwrap();
        assert_eq!(end.next, Phase::LongBreak);
        timer.end_break().unwrap();
    }
}

#[test]
fn daily_report_for_two_a_and_one_b() {
    let today = chrono::NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
    let at = |h| Local.with_ymd_and_hms(2026, 10, 16, h, 0, 0).unwrap();
    let sessions = vec![
        Session::new("A", SessionType::Work, 1500, at(9)),
        Session::new("A", SessionType::Work, 1500, at(10)),
        Session::new("B", SessionType::Work, 1500, at(11)),
    ];

    let daily = report::daily(&sessions, today, &SearchFilter::default());
    assert_eq!(daily.total_pomodoros, 3);
    assert_eq!(daily.task_breakdown.len(), 2);
    assert_eq!(daily.task_breakdown["A"], 2);
    assert_eq!(daily.task_breakdown["B"], 1);
}

#[test]
fn file_backed_app_survives_restart() {
    let dir = TempDir::new().unwrap();
    let paths = DataPaths::with_root(dir.path());

    {
        let mut app = App::new(Collaborators::local(&paths, false));
        app.apply_preset(Preset::Test);
        app.set_task("Persisted");
        app.start(Instant::now()).unwrap();
        finish_phase(&mut app);
    }

    let app = App::new(Collaborators::local(&paths, false));
    assert_eq!(app.settings().work_duration, 0.1);
    assert_eq!(app.settings().last_selected_task, "Persisted");
    assert_eq!(app.timer().task_name(), "Persisted");
    assert_eq!(app.sessions().len(), 1);
    assert_eq!(app.recent_tasks(), ["Persisted"]);
    assert_eq!(
        rtomato::store::JsonSessionStore::new(&paths).load_all().unwrap()[0].task_name,
        "Persisted"
    );
}
