//! Front ends that own the toggle set, feed records into the dispatch
//! pipeline and display its log.

pub mod headless;
pub mod layout;
#[cfg(windows)]
pub mod win32;

use crate::config::Toggles;
use crate::dispatch::Dispatcher;
use std::io::{self, Write};

/// Writes the session statistics in the requested form.
pub fn report_stats(dispatcher: &Dispatcher, toggles: &Toggles, json: bool, writer: impl Write) -> io::Result<()> {
    let runtime = dispatcher.runtime_ms();
    if json {
        dispatcher.stats().print_stats_json(toggles, runtime, writer)
    } else {
        dispatcher.stats().print_stats(toggles, runtime, writer)
    }
}
