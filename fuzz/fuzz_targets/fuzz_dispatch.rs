// fuzz/fuzz_targets/fuzz_dispatch.rs
#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pointer_trace::config::Toggles;
use pointer_trace::event::{EventRecord, HitTestInput};
use pointer_trace::logger::LogBuffer;
use pointer_trace::Dispatcher;

// Cap the sequence length to keep fuzz runs short.
const MAX_EVENTS_PER_FUZZ_CASE: usize = 1000;

#[derive(Arbitrary, Debug)]
struct FuzzEvent {
    // Biased towards the traced range 0x0200..=0x02FF.
    kind_low: u8,
    other_kind: Option<u32>,
    wparam: usize,
    lparam: isize,
    hit_test: Option<(u32, i32, i32, u32)>,
    // Time may go backwards.
    time_delta: i16,
}

#[derive(Arbitrary, Debug)]
struct FuzzCase {
    terse: bool,
    throttle: bool,
    motion_events: bool,
    suppress_default_pointer: bool,
    max_log_lines: u8,
    events: Vec<FuzzEvent>,
}

fuzz_target!(|case: FuzzCase| {
    let toggles = Toggles {
        terse: case.terse,
        throttle: case.throttle,
        motion_events: case.motion_events,
        suppress_default_pointer: case.suppress_default_pointer,
        ..Toggles::default()
    };
    let mut dispatcher = Dispatcher::new();
    let mut log = LogBuffer::new(case.max_log_lines as usize);
    let mut now: u64 = 1 << 32;

    for event in case.events.iter().take(MAX_EVENTS_PER_FUZZ_CASE) {
        now = now.saturating_add_signed(event.time_delta as i64);
        let kind = event.other_kind.unwrap_or(0x0200 | event.kind_low as u32);
        let mut record = EventRecord::new(kind, event.wparam, event.lparam);
        if let Some((pointer_id, x, y, orientation)) = event.hit_test {
            record = record.with_hit_test(HitTestInput { pointer_id, x, y, orientation });
        }
        let _ = dispatcher.dispatch(&record, now, &toggles, &mut log);
        assert!(log.len() <= log.max_lines());
    }

    let _ = dispatcher.runtime_ms();
    let _ = dispatcher.stats().print_stats(&toggles, dispatcher.runtime_ms(), std::io::sink());
});
