//! Phase-end signalling: desktop notifications and sounds.
//!
//! Both are fire-and-forget. Implementations swallow their own failures.

use std::path::Path;
use std::process::{Command, Stdio};

use notify_rust::{Notification, Urgency};

use crate::settings::SoundType;

pub trait Notifier {
    fn notify(&self, title: &str, body: &str);
}

pub trait SoundPlayer {
    fn play(&self, sound: SoundType, volume: f64);
}

// ============================================================================
// Desktop
// ============================================================================

pub struct DesktopNotifier {
    enabled: bool,
}

impl DesktopNotifier {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, body: &str) {
        if !self.enabled {
            return;
        }
        if let Err(e) = Notification::new()
            .summary(title)
            .body(body)
            .appname("rtomato")
            .icon("alarm-clock")
            .urgency(Urgency::Critical)
            .show()
        {
            tracing::debug!(error = %e, "desktop notification failed");
        }
    }
}

/// Plays a freedesktop sound through `paplay`, falling back to `aplay`.
pub struct CommandSoundPlayer;

impl CommandSoundPlayer {
    fn candidates(sound: SoundType) -> [(&'static str, &'static str); 3] {
        let themed = match sound {
            SoundType::Bell => "/usr/share/sounds/freedesktop/stereo/bell.oga",
            SoundType::Chime => "/usr/share/sounds/freedesktop/stereo/complete.oga",
            SoundType::Digital => "/usr/share/sounds/freedesktop/stereo/alarm-clock-elapsed.oga",
            SoundType::Soft => "/usr/share/sounds/freedesktop/stereo/message.oga",
        };
        [
            ("paplay", themed),
            ("paplay", "/usr/share/sounds/freedesktop/stereo/complete.oga"),
            ("aplay", "/usr/share/sounds/generic.wav"),
        ]
    }
}

/// paplay takes volume on a 0..=65536 scale.
pub fn paplay_volume(volume: f64) -> u32 {
    (volume.clamp(0.0, 1.0) * 65536.0).round() as u32
}

impl SoundPlayer for CommandSoundPlayer {
    fn play(&self, sound: SoundType, volume: f64) {
        std::thread::spawn(move || {
            for (cmd, file) in Self::candidates(sound) {
                if !Path::new(file).exists() {
                    continue;
                }
                let mut command = Command::new(cmd);
                if cmd == "paplay" {
                    command.arg(format!("--volume={}", paplay_volume(volume)));
                }
                let spawned = command
                    .arg(file)
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .spawn();
                if let Err(e) = spawned {
                    tracing::debug!(error = %e, cmd, "sound player failed to start");
                }
                break;
            }
        });
    }
}

// ============================================================================
// Silent
// ============================================================================

pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, _title: &str, _body: &str) {}
}

pub struct SilentSoundPlayer;

impl SoundPlayer for SilentSoundPlayer {
    fn play(&self, _sound: SoundType, _volume: f64) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_maps_to_paplay_scale() {
        assert_eq!(paplay_volume(0.0), 0);
        assert_eq!(paplay_volume(0.5), 32768);
        assert_eq!(paplay_volume(1.0), 65536);
        assert_eq!(paplay_volume(2.0), 65536);
    }

    #[test]
    fn every_sound_has_a_themed_file_first() {
        for sound in [SoundType::Bell, SoundType::Chime, SoundType::Digital, SoundType::Soft] {
            let candidates = CommandSoundPlayer::candidates(sound);
            assert_eq!(candidates[0].0, "paplay");
            assert!(candidates[0].1.ends_with(".oga"));
        }
    }
}
