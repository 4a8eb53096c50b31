use clap::{Parser, Subcommand, ValueEnum};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{self, Clear, ClearType, disable_raw_mode, enable_raw_mode},
};
use rtomato::{
    App, Collaborators, Preset, Settings,
    duration::{format_minutes, format_time},
    report::{self, DailyReport, MonthlyReport, WeeklyReport},
    store::DataPaths,
};
use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
    sync::Mutex,
    time::{Duration, Instant},
};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Type Aliases & Constants
// ============================================================================

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
const FRAME_RATE: Duration = Duration::from_millis(50);
const LOG_ENV: &str = "RTOMATO_LOG";

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser)]
#[command(author, version, about = "🍅 rtomato - Pomodoro timer with session reports")]
struct Args {
    /// Directory holding settings, sessions and the log file
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(clap::Args, Clone, Default)]
struct RunArgs {
    /// Work length for this run, e.g. 25, 25m, 90s, 1h30m
    #[arg(short, long, value_parser = parse_duration)]
    work: Option<f64>,
    #[arg(short = 'b', long, value_parser = parse_duration)]
    short_break: Option<f64>,
    #[arg(short, long, value_parser = parse_duration)]
    long_break: Option<f64>,
    /// Pomodoros before a long break
    #[arg(short, long)]
    sessions: Option<u32>,
    /// Save a preset's timing before starting. It also replaces -w/-b/-l/-s
    /// for this run; other run flags are never saved
    #[arg(short, long, value_enum)]
    preset: Option<Preset>,
    /// Task for the first work phase
    #[arg(short, long)]
    task: Option<String>,
    #[arg(long)]
    no_sound: bool,
    #[arg(long)]
    no_notify: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Run the timer (default)
    Run(RunArgs),
    /// Print a daily, weekly or monthly report
    Report {
        #[arg(value_enum, default_value_t = Period::Daily)]
        period: Period,
        /// Only count sessions whose task contains this text
        #[arg(short, long, default_value = "")]
        filter: String,
    },
    /// List or delete recorded sessions
    Sessions {
        #[command(subcommand)]
        action: SessionAction,
    },
    /// Show or change persisted settings
    Settings {
        #[arg(long, value_enum)]
        preset: Option<Preset>,
        #[arg(long)]
        add_task: Vec<String>,
        #[arg(long)]
        remove_task: Vec<String>,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    /// Today's sessions with their ids
    List,
    Delete { id: String },
    /// Delete every session recorded today
    ClearToday,
}

#[derive(Clone, Copy, ValueEnum)]
enum Period {
    Daily,
    Weekly,
    Monthly,
}

fn parse_duration(s: &str) -> std::result::Result<f64, String> {
    let s = s.trim().to_lowercase();
    let mut total = 0.0;
    let mut num = String::new();

    for c in s.chars() {
        match c {
            '0'..='9' | '.' => num.push(c),
            'h' => { total += num.parse::<f64>().map_err(|_| "Invalid hours")? * 60.0; num.clear(); }
            'm' => { total += num.parse::<f64>().map_err(|_| "Invalid minutes")?; num.clear(); }
            's' => { total += num.parse::<f64>().map_err(|_| "Invalid seconds")? / 60.0; num.clear(); }
            _ => return Err("Invalid format".into()),
        }
    }
    if !num.is_empty() {
        total += num.parse::<f64>().map_err(|_| "Invalid minutes")?;
    }

    if total > 0.0 { Ok(total) } else { Err("Duration must be > 0".into()) }
}

impl RunArgs {
    fn apply(&self, settings: &mut Settings) {
        if let Some(w) = self.work { settings.work_duration = w; }
        if let Some(b) = self.short_break { settings.short_break_duration = b; }
        if let Some(l) = self.long_break { settings.long_break_duration = l; }
        if let Some(s) = self.sessions { settings.pomodoros_until_long_break = s; }
        if self.no_sound { settings.sound_enabled = false; }
    }
}

// ============================================================================
// Driver
// ============================================================================

struct Driver {
    app: App,
    task_input: Option<String>,
    message: String,
}

impl Driver {
    /// Returns true when the user asked to quit.
    fn handle_key(&mut self, key: KeyEvent, now: Instant) -> bool {
        if let Some(input) = self.task_input.as_mut() {
            match key.code {
                KeyCode::Char(c) => input.push(c),
                KeyCode::Backspace => { input.pop(); }
                KeyCode::Enter => {
                    let task = input.trim().to_string();
                    self.message = format!("task: {}", if task.is_empty() { "(default)" } else { task.as_str() });
                    self.app.set_task(task);
                    self.task_input = None;
                }
                KeyCode::Esc => self.task_input = None,
                _ => {}
            }
            return false;
        }

        if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc)
            || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
        {
            return true;
        }

        let outcome = match key.code {
            KeyCode::Char(' ') => self.app.toggle(now).map(|_| String::new()),
            KeyCode::Char('r') => {
                self.app.reset();
                Ok("reset".into())
            }
            KeyCode::Char('e') => self
                .app
                .end_break()
                .map(|s| format!("break ended after {}", format_minutes(s.duration))),
            KeyCode::Char('t') => {
                if self.app.timer().is_running() {
                    Ok("pause before changing the task".into())
                } else {
                    self.task_input = Some(String::new());
                    Ok(String::new())
                }
            }
            KeyCode::Char(d @ '1'..='9') => {
                let idx = d as usize - '1' as usize;
                match self.app.recent_tasks().get(idx).cloned() {
                    Some(task) if !self.app.timer().is_running() => {
                        self.app.set_task(task.clone());
                        Ok(format!("task: {task}"))
                    }
                    _ => Ok(String::new()),
                }
            }
            _ => Ok(String::new()),
        };
        self.message = outcome.unwrap_or_else(|e| e.to_string());
        false
    }

    fn status_line(&self) -> String {
        let timer = self.app.timer();
        if let Some(input) = &self.task_input {
            return format!("Task name: {input}_");
        }
        let state = if timer.is_running() { "▶" } else { "⏸" };
        let task = if timer.phase().is_break() { "" } else { timer.task_name() };
        format!(
            "{} {:<11} {} {}  {:>3.0}%  {}  today: {}  long break in {}  {}",
            timer.phase().icon(),
            timer.phase().label(),
            state,
            format_time(timer.time_left()),
            timer.progress() * 100.0,
            task,
            self.app.todays_completed_count(),
            timer.until_long_break(),
            self.message,
        )
    }

    fn draw(&self, out: &mut impl Write) -> io::Result<()> {
        let width = terminal::size().map(|(w, _)| w as usize).unwrap_or(80);
        let line: String = self.status_line().chars().take(width.saturating_sub(1)).collect();
        execute!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine))?;
        write!(out, "{line}")?;
        out.flush()
    }
}

fn run(app: App) -> Result<()> {
    let mut driver = Driver {
        app,
        task_input: None,
        message: "space: start/pause  t: task  1-9: recent task  e: end break  r: reset  q: quit".into(),
    };
    let mut stdout = io::stdout();

    enable_raw_mode()?;
    execute!(stdout, cursor::Hide)?;
    let res = event_loop(&mut driver, &mut stdout);
    execute!(stdout, cursor::Show)?;
    disable_raw_mode()?;
    println!();
    res
}

fn event_loop(driver: &mut Driver, stdout: &mut io::Stdout) -> Result<()> {
    loop {
        driver.draw(stdout)?;

        let now = Instant::now();
        let timeout = driver
            .app
            .ticker()
            .until_next(now)
            .map_or(FRAME_RATE, |d| d.min(FRAME_RATE));
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if driver.handle_key(key, Instant::now()) {
                    return Ok(());
                }
            }
        }

        for session in driver.app.poll(Instant::now()) {
            driver.message = format!("✔ {} ({})", session.task_name, format_minutes(session.duration));
        }
    }
}

// ============================================================================
// Reports
// ============================================================================

fn print_daily(r: &DailyReport) {
    println!("📅 {}", r.date);
    println!("  Pomodoros:   {}", r.total_pomodoros);
    println!("  Focus time:  {:.0} min", r.total_work_minutes);
    println!("  Task types:  {}", r.task_breakdown.len());
    for (task, count) in report::sorted_by_count(&r.task_breakdown) {
        println!("    {task:<24} {count}");
    }
    if !r.hourly_breakdown.is_empty() {
        println!("  By hour:");
        for (hour, count) in &r.hourly_breakdown {
            println!("    {hour:02}:00  {}", "█".repeat(*count));
        }
    }
}

fn print_weekly(r: &WeeklyReport) {
    println!("📊 Week of {}", r.week_start);
    let max = r.days.iter().map(|d| d.pomodoros).max().unwrap_or(0).max(1);
    for day in &r.days {
        let width = day.pomodoros * 30 / max;
        println!(
            "  {} {}  {:<30} {:>2}  {:.0} min",
            day.weekday,
            day.date,
            "█".repeat(width),
            day.pomodoros,
            day.work_minutes
        );
    }
    println!("  Total: {} pomodoros, {:.0} min", r.total_pomodoros, r.total_work_minutes());
    for (task, count) in r.sorted_task_stats() {
        println!("    {task:<24} {count}");
    }
}

fn print_monthly(r: &MonthlyReport) {
    println!("🗓  Month from {}", r.month_start);
    for week in &r.weeks {
        println!(
            "  Week {} ({} – {})  {:>3}  {:.0} min",
            week.index, week.start, week.end, week.pomodoros, week.work_minutes
        );
    }
    println!("  Total: {} pomodoros", r.total_pomodoros);
    for (task, count) in r.sorted_task_categories() {
        println!("    {task:<24} {count}");
    }
}

// ============================================================================
// Main
// ============================================================================

fn init_logging(paths: &DataPaths) -> Result<()> {
    paths.ensure_root()?;
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(paths.log_file())?;
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let paths = match args.data_dir {
        Some(dir) => DataPaths::with_root(dir),
        None => DataPaths::from_system()?,
    };
    init_logging(&paths)?;

    match args.command {
        None => launch(&paths, args.run),
        Some(Command::Run(run_args)) => launch(&paths, run_args),
        Some(Command::Report { period, filter }) => {
            let app = App::new(Collaborators::local(&paths, false));
            match period {
                Period::Daily => print_daily(&app.daily_report(&filter)),
                Period::Weekly => print_weekly(&app.weekly_report(&filter)),
                Period::Monthly => print_monthly(&app.monthly_report(&filter)),
            }
            Ok(())
        }
        Some(Command::Sessions { action }) => {
            let mut app = App::new(Collaborators::local(&paths, false));
            match action {
                SessionAction::List => {
                    for s in app.daily_report("").sessions {
                        println!(
                            "{}  {}  {:<10} {:<24} {}",
                            s.id,
                            s.completed_at.format("%H:%M"),
                            s.kind.as_str(),
                            s.task_name,
                            format_minutes(s.duration)
                        );
                    }
                }
                SessionAction::Delete { id } => {
                    if !app.delete_session(&id) {
                        return Err(format!("no session with id {id}").into());
                    }
                }
                SessionAction::ClearToday => println!("removed {} sessions", app.clear_today()),
            }
            Ok(())
        }
        Some(Command::Settings { preset, add_task, remove_task }) => {
            let mut app = App::new(Collaborators::local(&paths, false));
            if let Some(preset) = preset {
                app.apply_preset(preset);
            }
            for task in &add_task {
                app.add_custom_task(task);
            }
            for task in &remove_task {
                app.remove_custom_task(task);
            }
            println!("{}", serde_json::to_string_pretty(app.settings())?);
            Ok(())
        }
    }
}

fn launch(paths: &DataPaths, run_args: RunArgs) -> Result<()> {
    let notifications = !run_args.no_notify;
    let mut app = App::with_overrides(Collaborators::local(paths, notifications), |s| run_args.apply(s));
    if let Some(preset) = run_args.preset {
        app.apply_preset(preset);
    }
    if let Some(task) = &run_args.task {
        app.set_task(task.clone());
    }
    tracing::info!(data_dir = %paths.root().display(), "rtomato started");
    run(app)
}
