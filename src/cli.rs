use clap::{ArgAction, Parser, ValueEnum};
use std::time::Duration;

fn parse_duration(text: &str) -> Result<Duration, humantime::DurationError> {
    humantime::parse_duration(text)
}

/// Output format of the diagnostic log on stderr.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Diagnostic window that traces Windows pointer, touch and mouse messages.
/// With --headless, reads `TIME_MS KIND WPARAM LPARAM` records from stdin and
/// writes the trace to stdout instead.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Log only the header line of each message (no derived fields).
    #[arg(long, default_value_t = true, action = ArgAction::Set, value_name = "BOOL")]
    pub terse: bool,

    /// Drop repeats of the same message arriving within 500ms of the last logged one.
    #[arg(long, default_value_t = false, action = ArgAction::Set, value_name = "BOOL")]
    pub throttle: bool,

    /// Trace continuous movement (WM_POINTERUPDATE, WM_NCPOINTERUPDATE, WM_MOUSEMOVE).
    #[arg(long, default_value_t = false, action = ArgAction::Set, value_name = "BOOL")]
    pub motion_events: bool,

    /// Answer 0 to WM_POINTER* messages instead of passing them to the default handler.
    #[arg(long, default_value_t = true, action = ArgAction::Set, value_name = "BOOL")]
    pub suppress_default_pointer: bool,

    /// Promote mouse input to WM_POINTER* messages (EnableMouseInPointer). Read once at start-up.
    #[arg(long, default_value_t = true, action = ArgAction::Set, value_name = "BOOL")]
    pub mouse_in_pointer: bool,

    /// Maximum number of lines kept in the on-screen log; older lines are discarded.
    #[arg(long, default_value = "5000", value_name = "N")]
    pub max_log_lines: usize,

    /// Read event records from stdin and write the trace to stdout instead of opening a window.
    #[arg(long, action = ArgAction::SetTrue)]
    pub headless: bool,

    /// Print the session statistics on exit as JSON instead of text.
    #[arg(long, action = ArgAction::SetTrue)]
    pub stats_json: bool,

    /// Delay between two samples of the synthetic pen stroke (e.g. "16ms").
    #[arg(long, default_value = "16ms", value_parser = parse_duration, value_name = "DURATION")]
    pub inject_interval: Duration,

    /// Diagnostic log filter (tracing EnvFilter syntax).
    #[arg(long, env = "RUST_LOG", default_value = "pointer_trace=info", value_name = "FILTER")]
    pub log_filter: String,

    /// Diagnostic log format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, value_name = "FORMAT")]
    pub log_format: LogFormat,

    /// Include module targets in diagnostic output.
    #[arg(short, long, action = ArgAction::SetTrue)]
    pub verbose: bool,
}

/// Parses command line arguments using clap.
pub fn parse_args() -> Args {
    Args::parse()
}
