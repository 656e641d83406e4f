//! Pomodoro countdown state machine driven by one-second ticks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default focus length in minutes.
pub const DEFAULT_FOCUS_MINUTES: u32 = 25;
/// Default break length in minutes.
pub const DEFAULT_BREAK_MINUTES: u32 = 5;

/// Kind of pomodoro session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    /// Working interval.
    Focus,
    /// Rest interval.
    Break,
}

impl SessionKind {
    /// The kind that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Focus => Self::Break,
            Self::Break => Self::Focus,
        }
    }
}

/// Session lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomodoroSettings {
    /// Focus length in minutes.
    pub focus_minutes: u32,
    /// Break length in minutes.
    pub break_minutes: u32,
}

impl Default for PomodoroSettings {
    fn default() -> Self {
        Self {
            focus_minutes: DEFAULT_FOCUS_MINUTES,
            break_minutes: DEFAULT_BREAK_MINUTES,
        }
    }
}

impl PomodoroSettings {
    /// Length of the given session kind in minutes.
    #[must_use]
    pub const fn minutes(&self, kind: SessionKind) -> u32 {
        match kind {
            SessionKind::Focus => self.focus_minutes,
            SessionKind::Break => self.break_minutes,
        }
    }
}

/// Reported when a countdown reaches zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionCompleted {
    /// Kind of the session that just finished.
    pub kind: SessionKind,
    /// Planned length of that session.
    pub minutes: u32,
}

/// Countdown timer alternating focus and break sessions.
#[derive(Debug, Clone)]
pub struct PomodoroTimer {
    settings: PomodoroSettings,
    kind: SessionKind,
    remaining_secs: u32,
    active: bool,
    completed_focus: u32,
}

impl Default for PomodoroTimer {
    fn default() -> Self {
        Self::new(PomodoroSettings::default())
    }
}

impl PomodoroTimer {
    /// Idle timer positioned at the start of a focus session.
    #[must_use]
    pub const fn new(settings: PomodoroSettings) -> Self {
        Self {
            settings,
            kind: SessionKind::Focus,
            remaining_secs: settings.focus_minutes.saturating_mul(60),
            active: false,
            completed_focus: 0,
        }
    }

    /// Current session kind.
    #[must_use]
    pub const fn kind(&self) -> SessionKind {
        self.kind
    }

    /// Seconds left in the current session.
    #[must_use]
    pub const fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    /// Whether the countdown is running.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Number of focus sessions finished since construction.
    #[must_use]
    pub const fn completed_focus(&self) -> u32 {
        self.completed_focus
    }

    /// Configured lengths.
    #[must_use]
    pub const fn settings(&self) -> PomodoroSettings {
        self.settings
    }

    /// Full length of the current session in seconds.
    #[must_use]
    pub const fn total_secs(&self) -> u32 {
        self.settings.minutes(self.kind).saturating_mul(60)
    }

    /// Start or resume the countdown.
    pub const fn start(&mut self) {
        if self.remaining_secs > 0 {
            self.active = true;
        }
    }

    /// Pause the countdown.
    pub const fn pause(&mut self) {
        self.active = false;
    }

    /// Flip between running and paused.
    pub const fn toggle(&mut self) {
        if self.active {
            self.pause();
        } else {
            self.start();
        }
    }

    /// Stop and rewind the current session.
    pub const fn reset(&mut self) {
        self.active = false;
        self.remaining_secs = self.total_secs();
    }

    /// Stop and jump to the start of another session kind.
    pub const fn switch_session(&mut self, kind: SessionKind) {
        self.kind = kind;
        self.reset();
    }

    /// Advance one second. Returns the completion when the countdown reaches zero.
    ///
    /// On completion the timer stops, counts finished focus sessions and positions
    /// itself at the start of the other session kind.
    pub const fn tick(&mut self) -> Option<SessionCompleted> {
        if !self.active {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            return None;
        }

        let finished = SessionCompleted {
            kind: self.kind,
            minutes: self.settings.minutes(self.kind),
        };
        if matches!(self.kind, SessionKind::Focus) {
            self.completed_focus = self.completed_focus.saturating_add(1);
        }
        self.switch_session(self.kind.next());
        Some(finished)
    }

    /// Elapsed share of the current session, from 0 to 100.
    #[must_use]
    pub fn progress(&self) -> f64 {
        let total = self.total_secs();
        if total == 0 {
            return 100.0;
        }
        let elapsed = total.saturating_sub(self.remaining_secs);
        f64::from(elapsed) * 100.0 / f64::from(total)
    }

    /// Remaining time formatted as `MM:SS`.
    #[must_use]
    pub fn remaining_display(&self) -> String {
        format!("{:02}:{:02}", self.remaining_secs / 60, self.remaining_secs % 60)
    }
}

impl fmt::Display for PomodoroTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.remaining_display())
    }
}
