//! Minute-based settings to whole-second countdowns, and back to text.

use crate::phase::Phase;
use crate::settings::Settings;

pub fn minutes_for(settings: &Settings, phase: Phase) -> f64 {
    match phase {
        Phase::Work => settings.work_duration,
        Phase::ShortBreak => settings.short_break_duration,
        Phase::LongBreak => settings.long_break_duration,
    }
}

/// Length of `phase` in whole seconds. Rounded, so fractional presets such as
/// 0.05 min land on 3 s instead of truncating.
pub fn seconds_for(settings: &Settings, phase: Phase) -> u64 {
    let secs = (minutes_for(settings, phase) * 60.0).round();
    if secs.is_finite() && secs > 0.0 { secs as u64 } else { 0 }
}

/// `mm:ss`, zero padded. Minutes are not wrapped into hours.
pub fn format_time(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Short human label for a minute count: `6s`, `25m`, `2.5m`.
pub fn format_minutes(minutes: f64) -> String {
    if minutes < 1.0 {
        format!("{}s", (minutes * 60.0).round() as u64)
    } else if minutes.fract() == 0.0 {
        format!("{}m", minutes as u64)
    } else {
        format!("{:.1}m", minutes)
    }
}
