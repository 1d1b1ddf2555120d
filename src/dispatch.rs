// This module defines the dispatch pipeline: the per-message decision of
// whether to trace an event and what to write for it. The decision is driven
// by the static message table in `names`, the toggles owned by the shell and
// the per-kind rate limiter owned by the dispatcher.

pub mod decode;
pub mod names;
pub mod stats;
pub mod throttle;


use crate::config::Toggles;
use crate::event::EventRecord;
use crate::logger::LogSink;
use crate::util::format_word;
use names::{message_info, MessageInfo, Reply};
use stats::{Outcome, StatsCollector};
use throttle::RateLimiter;
use tracing::{debug, trace};

/// How the window procedure should answer a dispatched message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// Hand the message to the default window procedure unchanged.
    Default,
    /// Return this value without default processing.
    Handled(isize),
}

/// Owns the pipeline state that outlives a single message: the rate limiter
/// and the session statistics.
#[derive(Debug, Default)]
pub struct Dispatcher {
    limiter: RateLimiter,
    stats: StatsCollector,
    first_event_ms: Option<u64>,
    last_event_ms: Option<u64>,
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Traces one event into `sink` and decides how it is answered.
    ///
    /// Unknown kinds and, with motion events disabled, movement messages are
    /// passed on without a line and without touching the rate limiter. With
    /// throttling on, a kind seen less than 500ms after its last logged event
    /// is dropped; the next logged event of that kind reports how many were
    /// dropped.
    pub fn dispatch(
        &mut self,
        record: &EventRecord,
        now_ms: u64,
        toggles: &Toggles,
        sink: &mut dyn LogSink,
    ) -> Disposition {
        self.first_event_ms.get_or_insert(now_ms);
        self.last_event_ms = Some(now_ms);

        let Some(info) = message_info(record.kind) else {
            trace!(kind = record.kind, "Unrecognized message passed through");
            self.stats.record(record.kind, Outcome::Unrecognized);
            return Disposition::Default;
        };

        if info.motion && !toggles.motion_events {
            trace!(message = info.name, "Motion event skipped");
            self.stats.record(record.kind, Outcome::MotionSkipped);
            return Disposition::Default;
        }

        if toggles.throttle && self.limiter.should_suppress(record.kind, now_ms) {
            debug!(
                message = info.name,
                pending = self.limiter.suppressed(record.kind),
                "Message throttled"
            );
            self.stats.record(record.kind, Outcome::Throttled);
            return fall_through(info, toggles);
        }

        self.log(info, record, toggles, sink);
        self.stats.record(record.kind, Outcome::Logged);

        match info.reply {
            Reply::Return(value) => Disposition::Handled(value),
            Reply::FallThrough => fall_through(info, toggles),
        }
    }

    fn log(&mut self, info: &MessageInfo, record: &EventRecord, toggles: &Toggles, sink: &mut dyn LogSink) {
        if !toggles.terse {
            sink.write_line("");
        }

        sink.write_line(&format!(
            "{}(wParam: {}, lParam: {})",
            info.name,
            format_word(record.wparam),
            format_word(record.lparam as usize)
        ));

        let throttled = self.limiter.take_suppressed(record.kind);
        if throttled > 0 {
            sink.write_line(&format!("; (throttled {throttled} previous {} messages)", info.name));
        }

        if toggles.terse {
            return;
        }

        for field in info.fields {
            if let Some(value) = decode::render(field.source, record) {
                sink.write_line(&format!("; - {} = {}  {}", field.source.expr(), value, field.desc));
            }
        }
    }

    pub fn stats(&self) -> &StatsCollector {
        &self.stats
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Milliseconds between the first and the last dispatched event, or
    /// `None` before the first event.
    pub fn runtime_ms(&self) -> Option<u64> {
        self.last_event_ms
            .and_then(|last| self.first_event_ms.map(|first| last.saturating_sub(first)))
    }
}

/// The answer for a message that was logged (or dropped) without a fixed
/// reply of its own.
fn fall_through(info: &MessageInfo, toggles: &Toggles) -> Disposition {
    if toggles.suppress_default_pointer && info.pointer {
        Disposition::Handled(0)
    } else {
        Disposition::Default
    }
}
