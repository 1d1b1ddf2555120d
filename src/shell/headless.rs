// Headless shell: reads text records from stdin, traces them to stdout and
// prints the session statistics to stderr on EOF or on a termination signal.

use super::report_stats;
use crate::config::{Config, Toggles};
use crate::dispatch::{Disposition, Dispatcher};
use crate::event::read_record;
use crate::logger::WriterSink;
use std::io::{self, BufRead, Write};
use std::process::exit;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, error};

#[derive(Debug, Error)]
pub enum HeadlessError {
    #[error("error reading input record: {0}")]
    Read(#[source] io::Error),
    #[error("error writing trace output: {0}")]
    Write(#[source] io::Error),
}

impl HeadlessError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            HeadlessError::Read(_) => 3,
            HeadlessError::Write(_) => 4,
        }
    }
}

fn lock(dispatcher: &Mutex<Dispatcher>) -> MutexGuard<'_, Dispatcher> {
    dispatcher.lock().unwrap_or_else(|poisoned| {
        error!("Dispatcher mutex was poisoned; continuing with its last state");
        poisoned.into_inner()
    })
}

/// Dispatches every record from `reader`, tracing into `writer`, until EOF.
pub fn process<R: BufRead, W: Write>(
    dispatcher: &Mutex<Dispatcher>,
    toggles: &Toggles,
    mut reader: R,
    writer: W,
) -> Result<(), HeadlessError> {
    let mut sink = WriterSink::new(writer);
    let mut line_no = 0u64;

    while let Some(timed) = read_record(&mut reader, &mut line_no).map_err(HeadlessError::Read)? {
        let disposition = lock(dispatcher).dispatch(&timed.record, timed.time_ms, toggles, &mut sink);
        match disposition {
            Disposition::Default => debug!(line = line_no, "Passed to default handling"),
            Disposition::Handled(value) => debug!(line = line_no, value, "Handled"),
        }
        if let Some(e) = sink.take_error() {
            return Err(HeadlessError::Write(e));
        }
    }

    sink.finish().map_err(HeadlessError::Write)
}

/// Runs the headless shell on stdin/stdout. Exits the process with 3/4 on
/// I/O errors and with `128 + signal` when interrupted.
pub fn run(cfg: &Config) -> anyhow::Result<()> {
    let dispatcher = Arc::new(Mutex::new(Dispatcher::new()));
    let stats_printed = Arc::new(AtomicBool::new(false));

    #[cfg(unix)]
    spawn_signal_handler(Arc::clone(&dispatcher), Arc::clone(&stats_printed), cfg)?;

    let result = process(&dispatcher, &cfg.toggles, io::stdin().lock(), io::stdout().lock());

    if let Err(e) = &result {
        error!(error = %e, "Headless run aborted");
        eprintln!("{e}");
    }

    if !stats_printed.swap(true, Ordering::SeqCst) {
        let dispatcher = lock(&dispatcher);
        report_stats(&dispatcher, &cfg.toggles, cfg.stats_json, io::stderr())?;
    }

    match result {
        Ok(()) => Ok(()),
        Err(e) => exit(e.exit_code()),
    }
}

#[cfg(unix)]
fn spawn_signal_handler(
    dispatcher: Arc<Mutex<Dispatcher>>,
    stats_printed: Arc<AtomicBool>,
    cfg: &Config,
) -> io::Result<()> {
    use signal_hook::consts::signal::{SIGINT, SIGQUIT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGTERM, SIGINT, SIGQUIT])?;
    let toggles = cfg.toggles;
    let stats_json = cfg.stats_json;

    std::thread::Builder::new()
        .name("signal-handler".to_string())
        .spawn(move || {
            if let Some(sig) = signals.forever().next() {
                if !stats_printed.swap(true, Ordering::SeqCst) {
                    eprintln!("\nReceived signal {sig}, printing final stats and exiting");
                    let dispatcher = lock(&dispatcher);
                    let _ = report_stats(&dispatcher, &toggles, stats_json, io::stderr());
                }
                exit(128 + sig);
            }
        })?;
    Ok(())
}
