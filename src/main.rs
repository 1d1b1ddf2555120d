// Main application entry point.
// Parses the command line, sets up diagnostics and hands over to the window
// shell or, with --headless, to the stdin/stdout shell.

use pointer_trace::cli;
use pointer_trace::config::Config;
use pointer_trace::shell;
use pointer_trace::telemetry::init_tracing;

fn main() -> anyhow::Result<()> {
    let args = cli::parse_args();
    let cfg = Config::from(&args);
    init_tracing(&cfg);

    if cfg.headless {
        shell::headless::run(&cfg)
    } else {
        run_window_shell(&cfg)
    }
}

#[cfg(windows)]
fn run_window_shell(cfg: &Config) -> anyhow::Result<()> {
    shell::win32::run(cfg)
}

#[cfg(not(windows))]
fn run_window_shell(_cfg: &Config) -> anyhow::Result<()> {
    anyhow::bail!("the window shell is only available on Windows; use --headless to trace records from stdin")
}
