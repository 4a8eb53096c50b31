use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_TASK_NAME: &str = "Focus";
pub const MAX_PHASE_MINUTES: f64 = 240.0;
pub const MIN_PHASE_MINUTES: f64 = 1.0 / 60.0;
pub const MAX_POMODOROS_UNTIL_LONG_BREAK: u32 = 10;

// ============================================================================
// Settings
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SoundType {
    #[default]
    Bell,
    Chime,
    Digital,
    Soft,
}

impl SoundType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bell => "bell",
            Self::Chime => "chime",
            Self::Digital => "digital",
            Self::Soft => "soft",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub work_duration: f64,
    pub short_break_duration: f64,
    pub long_break_duration: f64,
    pub pomodoros_until_long_break: u32,
    pub sound_enabled: bool,
    pub sound_volume: f64,
    pub sound_type: SoundType,
    pub default_task_name: String,
    pub last_selected_task: String,
    pub custom_task_list: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            work_duration: 25.0,
            short_break_duration: 5.0,
            long_break_duration: 15.0,
            pomodoros_until_long_break: 4,
            sound_enabled: true,
            sound_volume: 0.5,
            sound_type: SoundType::Bell,
            default_task_name: DEFAULT_TASK_NAME.into(),
            last_selected_task: String::new(),
            custom_task_list: Vec::new(),
        }
    }
}

impl Settings {
    /// Builds settings from an arbitrary persisted value. Every field that
    /// deserializes on its own is kept; every other field takes its default.
    pub fn from_json_value(value: Value) -> Self {
        let Value::Object(incoming) = value else {
            tracing::warn!("persisted settings are not an object, using defaults");
            return Self::default();
        };

        let mut merged = match serde_json::to_value(Self::default()) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };

        for (key, field) in incoming {
            if !merged.contains_key(&key) {
                continue;
            }
            let previous = merged.insert(key.clone(), field);
            if serde_json::from_value::<Self>(Value::Object(merged.clone())).is_err() {
                tracing::warn!(field = %key, "ignoring malformed settings field");
                if let Some(previous) = previous {
                    merged.insert(key, previous);
                }
            }
        }

        serde_json::from_value::<Self>(Value::Object(merged))
            .unwrap_or_default()
            .sanitized()
    }

    /// Clamps every field into its valid range.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        self.work_duration = clamp_minutes(self.work_duration, defaults.work_duration);
        self.short_break_duration =
            clamp_minutes(self.short_break_duration, defaults.short_break_duration);
        self.long_break_duration =
            clamp_minutes(self.long_break_duration, defaults.long_break_duration);
        self.pomodoros_until_long_break = self
            .pomodoros_until_long_break
            .clamp(1, MAX_POMODOROS_UNTIL_LONG_BREAK);
        self.sound_volume = if self.sound_volume.is_finite() {
            self.sound_volume.clamp(0.0, 1.0)
        } else {
            defaults.sound_volume
        };

        let mut tasks: Vec<String> = Vec::with_capacity(self.custom_task_list.len());
        for task in self.custom_task_list.drain(..) {
            let task = task.trim().to_string();
            if !task.is_empty() && !tasks.contains(&task) {
                tasks.push(task);
            }
        }
        self.custom_task_list = tasks;
        self
    }

    /// True when both values describe the same phase lengths and cycle.
    pub fn same_timing(&self, other: &Self) -> bool {
        self.work_duration == other.work_duration
            && self.short_break_duration == other.short_break_duration
            && self.long_break_duration == other.long_break_duration
            && self.pomodoros_until_long_break == other.pomodoros_until_long_break
    }

    pub fn with_preset(mut self, preset: Preset) -> Self {
        let (work, short, long, count) = preset.timing();
        self.work_duration = work;
        self.short_break_duration = short;
        self.long_break_duration = long;
        self.pomodoros_until_long_break = count;
        self
    }

    /// The name a work phase falls back to when no task was entered.
    pub fn fallback_task_name(&self) -> &str {
        let name = self.default_task_name.trim();
        if name.is_empty() { DEFAULT_TASK_NAME } else { name }
    }
}

fn clamp_minutes(minutes: f64, default: f64) -> f64 {
    if minutes.is_finite() {
        minutes.clamp(MIN_PHASE_MINUTES, MAX_PHASE_MINUTES)
    } else {
        default
    }
}

// ============================================================================
// Presets
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Preset {
    Classic,
    Short,
    Long,
    Study,
    Test,
}

impl Preset {
    /// (work, short break, long break, pomodoros until long break)
    pub fn timing(&self) -> (f64, f64, f64, u32) {
        match self {
            Self::Classic => (25.0, 5.0, 15.0, 4),
            Self::Short => (15.0, 3.0, 10.0, 4),
            Self::Long => (45.0, 10.0, 30.0, 3),
            Self::Study => (50.0, 10.0, 20.0, 2),
            Self::Test => (0.1, 0.05, 0.12, 2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_fields_take_defaults() {
        let settings = Settings::from_json_value(json!({ "workDuration": 50 }));
        assert_eq!(settings.work_duration, 50.0);
        assert_eq!(settings.short_break_duration, 5.0);
        assert_eq!(settings.sound_type, SoundType::Bell);
        assert_eq!(settings.default_task_name, DEFAULT_TASK_NAME);
    }

    #[test]
    fn malformed_field_does_not_discard_the_rest() {
        let settings = Settings::from_json_value(json!({
            "workDuration": "lots",
            "longBreakDuration": 20,
            "soundType": "kazoo",
            "soundVolume": 0.8,
        }));
        assert_eq!(settings.work_duration, 25.0);
        assert_eq!(settings.long_break_duration, 20.0);
        assert_eq!(settings.sound_type, SoundType::Bell);
        assert_eq!(settings.sound_volume, 0.8);
    }

    #[test]
    fn non_object_falls_back_to_defaults() {
        assert_eq!(Settings::from_json_value(json!([1, 2, 3])), Settings::default());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let settings = Settings::from_json_value(json!({ "theme": "nord", "soundType": "chime" }));
        assert_eq!(settings.sound_type, SoundType::Chime);
    }

    #[test]
    fn sanitized_clamps_ranges_and_cleans_task_list() {
        let settings = Settings {
            work_duration: 0.0,
            long_break_duration: f64::NAN,
            pomodoros_until_long_break: 0,
            sound_volume: 3.0,
            custom_task_list: vec!["  Write ".into(), "".into(), "Write".into(), "Read".into()],
            ..Settings::default()
        }
        .sanitized();

        assert_eq!(settings.work_duration, MIN_PHASE_MINUTES);
        assert_eq!(settings.long_break_duration, 15.0);
        assert_eq!(settings.pomodoros_until_long_break, 1);
        assert_eq!(settings.sound_volume, 1.0);
        assert_eq!(settings.custom_task_list, vec!["Write", "Read"]);
    }

    #[test]
    fn preset_touches_only_timing() {
        let base = Settings {
            sound_enabled: false,
            last_selected_task: "Thesis".into(),
            ..Settings::default()
        };
        let settings = base.clone().with_preset(Preset::Test);
        assert_eq!(settings.work_duration, 0.1);
        assert_eq!(settings.pomodoros_until_long_break, 2);
        assert!(!settings.sound_enabled);
        assert_eq!(settings.last_selected_task, "Thesis");
        assert!(!settings.same_timing(&base));
    }

    #[test]
    fn camel_case_round_trip_shape() {
        let value = serde_json::to_value(Settings::default()).unwrap();
        assert!(value.get("pomodorosUntilLongBreak").is_some());
        assert_eq!(value["soundType"], "bell");
    }

    #[test]
    fn fallback_task_name_never_blank() {
        let settings = Settings {
            default_task_name: "   ".into(),
            ..Settings::default()
        };
        assert_eq!(settings.fallback_task_name(), DEFAULT_TASK_NAME);
    }
}
