//! Pomodoro timer core: phase state machine, session recording and
//! day/week/month reports, with pluggable persistence.

pub mod app;
pub mod duration;
pub mod error;
pub mod notify;
pub mod phase;
pub mod recent;
pub mod recorder;
pub mod report;
pub mod session;
pub mod settings;
pub mod store;
pub mod ticker;
pub mod timer;

pub use app::{App, Collaborators};
pub use error::{Error, Result, TimerError};
pub use phase::Phase;
pub use session::{Session, SessionType};
pub use settings::{Preset, Settings, SoundType};
pub use timer::{PhaseEnd, Timer};
