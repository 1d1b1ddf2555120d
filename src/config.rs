use crate::cli::LogFormat;
use serde::Serialize;
use std::time::Duration;

/// The user-facing options read by the dispatch pipeline. Owned by the shell,
/// flipped by the checkbox panel, passed by reference into every dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Toggles {
    pub terse: bool,
    pub throttle: bool,
    pub motion_events: bool,
    pub suppress_default_pointer: bool,
    /// Only consulted when the shell starts.
    pub mouse_in_pointer: bool,
}

impl Default for Toggles {
    fn default() -> Self {
        Self {
            terse: true,
            throttle: false,
            motion_events: false,
            suppress_default_pointer: true,
            mouse_in_pointer: true,
        }
    }
}

/// A checkbox in the toggle panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Toggle {
    Terse,
    Throttle,
    MotionEvents,
    SuppressDefaultPointer,
}

impl Toggle {
    pub const ALL: [Toggle; 4] = [
        Toggle::Terse,
        Toggle::Throttle,
        Toggle::MotionEvents,
        Toggle::SuppressDefaultPointer,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Toggle::Terse => "Terse",
            Toggle::Throttle => "Throttle",
            Toggle::MotionEvents => "Motion Events",
            Toggle::SuppressDefaultPointer => "Ret 0 on WM_POINTER*",
        }
    }
}

impl Toggles {
    pub fn get(&self, toggle: Toggle) -> bool {
        match toggle {
            Toggle::Terse => self.terse,
            Toggle::Throttle => self.throttle,
            Toggle::MotionEvents => self.motion_events,
            Toggle::SuppressDefaultPointer => self.suppress_default_pointer,
        }
    }

    /// Flips one option and returns its new state.
    pub fn toggle(&mut self, toggle: Toggle) -> bool {
        let slot = match toggle {
            Toggle::Terse => &mut self.terse,
            Toggle::Throttle => &mut self.throttle,
            Toggle::MotionEvents => &mut self.motion_events,
            Toggle::SuppressDefaultPointer => &mut self.suppress_default_pointer,
        };
        *slot = !*slot;
        *slot
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub toggles: Toggles,
    pub max_log_lines: usize,
    pub headless: bool,
    pub stats_json: bool,
    pub inject_interval: Duration,
    pub log_filter: String,
    pub log_format: LogFormat,
    pub verbose: bool,
}

impl From<&crate::cli::Args> for Config {
    fn from(a: &crate::cli::Args) -> Self {
        Self {
            toggles: Toggles {
                terse: a.terse,
                throttle: a.throttle,
                motion_events: a.motion_events,
                suppress_default_pointer: a.suppress_default_pointer,
                mouse_in_pointer: a.mouse_in_pointer,
            },
            max_log_lines: a.max_log_lines.max(1),
            headless: a.headless,
            stats_json: a.stats_json,
            inject_interval: a.inject_interval,
            log_filter: a.log_filter.clone(),
            log_format: a.log_format,
            verbose: a.verbose,
        }
    }
}

impl Config {
    pub fn inject_interval(&self) -> Duration {
        self.inject_interval
    }
}
